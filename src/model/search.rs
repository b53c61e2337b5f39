//! Plain-text search and replace over a [`Document`].
//!
//! A search session is a single pass around the document: starting at an
//! origin, forward matches are visited up to the end, then from the top back
//! up to the origin. Walking off either end of that pass reports
//! [`EditorError::NotFound`] and the next call starts a fresh pass from the
//! top, so navigation is always bounded by the document length.

use super::cursor::{Cursor, Position};
use super::document::Document;
use super::selection::{Selection, Span};
use crate::error::{EditorError, Result};

/// A located occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHit {
    pub span: Span,
    /// This step crossed a document boundary to reach the match.
    pub wrapped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// The selected match was replaced; `next` is the following occurrence.
    Replaced { next: Option<SearchHit> },
    /// Nothing was selected yet; the next occurrence is now selected.
    Selected(SearchHit),
}

#[derive(Debug, Clone)]
pub struct SearchState {
    query: String,
    needle: Vec<char>,
    case_sensitive: bool,
    origin: Position,
    last_match: Option<Position>,
    resume: Option<Position>,
    /// The session has moved into the part of the pass before the origin.
    wrapped: bool,
}

impl SearchState {
    /// New session whose pass starts at `origin`.
    pub fn new(query: &str, case_sensitive: bool, origin: Position) -> Result<Self> {
        if query.is_empty() {
            return Err(EditorError::EmptyQuery);
        }
        Ok(Self {
            query: query.to_string(),
            needle: query.chars().map(|c| fold(c, case_sensitive)).collect(),
            case_sensitive,
            origin,
            last_match: None,
            resume: None,
            wrapped: false,
        })
    }

    /// Start a session at the cursor (or the selection end) and jump to the
    /// first occurrence after it.
    pub fn find(
        query: &str,
        case_sensitive: bool,
        doc: &Document,
        cursor: &mut Cursor,
        selection: &mut Selection,
    ) -> (Result<Self>, Result<SearchHit>) {
        let origin = match selection.current_span(cursor) {
            Some(span) => span.end,
            None => Position::new(cursor.row(), cursor.col() + 1),
        };
        match Self::new(query, case_sensitive, origin) {
            Ok(mut state) => {
                let hit = state.find_next(doc, cursor, selection);
                (Ok(state), hit)
            }
            Err(e) => (Err(e.clone()), Err(e)),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// 1-based index of the current match among all matches in the
    /// document, and their total.
    pub fn match_info(&self, doc: &Document) -> Option<(usize, usize)> {
        let current = self.last_match?;
        let end = Self::doc_end(doc);
        let mut from = Position::default();
        let mut index = None;
        let mut total = 0;
        while let Some(at) = self.scan_forward(doc, from, end) {
            total += 1;
            if at == current {
                index = Some(total);
            }
            from = Position::new(at.row, at.col + 1);
        }
        index.map(|i| (i, total))
    }

    fn match_span(&self, at: Position) -> Span {
        Span::new(at, Position::new(at.row, at.col + self.needle.len()))
    }

    fn matches_at(&self, doc: &Document, at: Position) -> bool {
        let line: Vec<char> = doc.line(at.row).unwrap_or_default().chars().collect();
        match_at(&line, at.col, &self.needle, self.case_sensitive)
    }

    fn doc_end(doc: &Document) -> Position {
        Position::new(doc.line_count(), 0)
    }

    /// Move to the next occurrence in this pass.
    pub fn find_next(
        &mut self,
        doc: &Document,
        cursor: &mut Cursor,
        selection: &mut Selection,
    ) -> Result<SearchHit> {
        let end = Self::doc_end(doc);
        let from = self.resume.unwrap_or(self.origin);
        let (found, wrapped) = if self.wrapped {
            (self.scan_forward(doc, from, self.origin), true)
        } else {
            match self.scan_forward(doc, from, end) {
                Some(at) => (Some(at), false),
                None => (self.scan_forward(doc, Position::default(), self.origin), true),
            }
        };
        let crossed = wrapped && !self.wrapped;
        self.land(found, wrapped, crossed, doc, cursor, selection)
    }

    /// Move to the previous occurrence in this pass. Without a current match
    /// the walk starts from the far end of the pass, just before the origin.
    pub fn find_previous(
        &mut self,
        doc: &Document,
        cursor: &mut Cursor,
        selection: &mut Selection,
    ) -> Result<SearchHit> {
        let end = Self::doc_end(doc);
        let top = Position::default();
        let (found, wrapped) = match self.last_match {
            Some(m) if !self.wrapped => (self.scan_backward(doc, self.origin, m), false),
            Some(m) => match self.scan_backward(doc, top, m) {
                Some(at) => (Some(at), true),
                None => (self.scan_backward(doc, self.origin, end), false),
            },
            None => match self.scan_backward(doc, top, self.origin) {
                Some(at) => (Some(at), true),
                None => (self.scan_backward(doc, self.origin, end), false),
            },
        };
        let before = self.wrapped || self.last_match.is_none();
        let crossed = before && !wrapped;
        self.land(found, wrapped, crossed, doc, cursor, selection)
    }

    fn land(
        &mut self,
        found: Option<Position>,
        wrapped: bool,
        crossed: bool,
        doc: &Document,
        cursor: &mut Cursor,
        selection: &mut Selection,
    ) -> Result<SearchHit> {
        let Some(at) = found else {
            tracing::debug!(query = %self.query, "search pass exhausted");
            self.origin = Position::default();
            self.last_match = None;
            self.resume = None;
            self.wrapped = false;
            return Err(EditorError::NotFound(self.query.clone()));
        };

        let span = self.match_span(at);
        self.last_match = Some(at);
        self.resume = Some(Position::new(at.row, at.col + 1));
        self.wrapped = wrapped;
        cursor.move_to(doc, span.start);
        selection.set(span.end);

        Ok(SearchHit {
            span,
            wrapped: crossed,
        })
    }

    /// Replace the selected match and advance, or select the next match when
    /// the selection is not the current match.
    pub fn replace_one(
        &mut self,
        doc: &mut Document,
        cursor: &mut Cursor,
        selection: &mut Selection,
        replacement: &str,
    ) -> Result<ReplaceOutcome> {
        let selected = selection.current_span(cursor);
        let current = self
            .last_match
            .filter(|m| selected == Some(self.match_span(*m)) && self.matches_at(&*doc, *m));

        let Some(at) = current else {
            return self
                .find_next(doc, cursor, selection)
                .map(ReplaceOutcome::Selected);
        };

        let removed = self.match_span(at);
        doc.delete_range(removed)?;
        let end = doc.insert_text(at, replacement)?;
        selection.clear();
        cursor.move_to(doc, end);

        self.origin = remap(self.origin, removed, end);
        self.resume = Some(end);
        let next = self.find_next(doc, cursor, selection).ok();
        Ok(ReplaceOutcome::Replaced { next })
    }

    /// Replace every occurrence from the top of the document, matching
    /// against the content as it changes. Returns the number replaced.
    pub fn replace_all(
        &mut self,
        doc: &mut Document,
        cursor: &mut Cursor,
        selection: &mut Selection,
        replacement: &str,
    ) -> Result<usize> {
        let mut from = Position::default();
        let mut count = 0;
        let mut last_end = None;

        while let Some(at) = self.scan_forward(doc, from, Self::doc_end(doc)) {
            doc.delete_range(self.match_span(at))?;
            let end = doc.insert_text(at, replacement)?;
            count += 1;
            from = end;
            last_end = Some(end);
        }

        self.origin = Position::default();
        self.last_match = None;
        self.resume = None;
        self.wrapped = false;

        let Some(end) = last_end else {
            return Err(EditorError::NotFound(self.query.clone()));
        };
        selection.clear();
        cursor.move_to(doc, end);
        tracing::debug!(query = %self.query, count, "replaced all");
        Ok(count)
    }

    /// First match start `p` with `from <= p < until`.
    fn scan_forward(&self, doc: &Document, from: Position, until: Position) -> Option<Position> {
        let last_row = until.row.min(doc.line_count() - 1);
        for row in from.row..=last_row {
            let line: Vec<char> = doc.line(row)?.chars().collect();
            let start = if row == from.row { from.col } else { 0 };
            let limit = if row == until.row { until.col } else { usize::MAX };
            let found = (start..line.len())
                .take_while(|col| *col < limit)
                .find(|col| match_at(&line, *col, &self.needle, self.case_sensitive));
            if let Some(col) = found {
                return Some(Position::new(row, col));
            }
        }
        None
    }

    /// Last match start `p` with `floor <= p < below`.
    fn scan_backward(&self, doc: &Document, floor: Position, below: Position) -> Option<Position> {
        let top_row = below.row.min(doc.line_count() - 1);
        for row in (floor.row..=top_row).rev() {
            let line: Vec<char> = doc.line(row)?.chars().collect();
            let lowest = if row == floor.row { floor.col } else { 0 };
            let limit = if row == below.row {
                below.col.min(line.len())
            } else {
                line.len()
            };
            let found = (lowest..limit)
                .rev()
                .find(|col| match_at(&line, *col, &self.needle, self.case_sensitive));
            if let Some(col) = found {
                return Some(Position::new(row, col));
            }
        }
        None
    }
}

fn fold(c: char, case_sensitive: bool) -> char {
    if case_sensitive {
        c
    } else {
        c.to_lowercase().next().unwrap_or(c)
    }
}

fn match_at(line: &[char], col: usize, needle: &[char], case_sensitive: bool) -> bool {
    col + needle.len() <= line.len()
        && line[col..col + needle.len()]
            .iter()
            .zip(needle)
            .all(|(c, n)| fold(*c, case_sensitive) == *n)
}

/// Where `pos` ends up after `removed` was replaced by text ending at `inserted_end`.
fn remap(pos: Position, removed: Span, inserted_end: Position) -> Position {
    if pos <= removed.start {
        pos
    } else if pos < removed.end {
        inserted_end
    } else if pos.row == removed.end.row {
        Position::new(inserted_end.row, inserted_end.col + (pos.col - removed.end.col))
    } else {
        Position::new(pos.row + inserted_end.row - removed.end.row, pos.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        doc: Document,
        cursor: Cursor,
        selection: Selection,
    }

    fn fixture(text: &str, row: usize, col: usize) -> Fixture {
        let doc = Document::from_text(text);
        let mut cursor = Cursor::default();
        cursor.move_to(&doc, Position::new(row, col));
        Fixture {
            doc,
            cursor,
            selection: Selection::default(),
        }
    }

    fn p(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn find_visits_each_match_then_reports_not_found() {
        let mut f = fixture("Foo\nbar", 0, 0);
        let (state, hit) = SearchState::find("o", false, &f.doc, &mut f.cursor, &mut f.selection);
        let mut state = state.unwrap();
        assert_eq!(hit.unwrap().span.start, p(0, 1));
        assert_eq!(f.cursor.position(), p(0, 1));
        assert_eq!(
            f.selection.current_span(&f.cursor),
            Some(Span::new(p(0, 1), p(0, 2)))
        );

        let hit = state.find_next(&f.doc, &mut f.cursor, &mut f.selection).unwrap();
        assert_eq!(hit.span.start, p(0, 2));

        let miss = state.find_next(&f.doc, &mut f.cursor, &mut f.selection);
        assert_eq!(miss, Err(EditorError::NotFound("o".to_string())));
        assert_eq!(f.cursor.position(), p(0, 2));
    }

    #[test]
    fn pass_wraps_before_origin_and_then_restarts() {
        let mut f = fixture("x one\ntwo x\nx", 1, 0);
        let (state, hit) = SearchState::find("x", true, &f.doc, &mut f.cursor, &mut f.selection);
        let mut state = state.unwrap();

        let first = hit.unwrap();
        assert_eq!(first.span.start, p(1, 4));
        assert!(!first.wrapped);

        let hit = state.find_next(&f.doc, &mut f.cursor, &mut f.selection).unwrap();
        assert_eq!(hit.span.start, p(2, 0));

        let hit = state.find_next(&f.doc, &mut f.cursor, &mut f.selection).unwrap();
        assert_eq!(hit.span.start, p(0, 0));
        assert!(hit.wrapped);

        assert!(state.find_next(&f.doc, &mut f.cursor, &mut f.selection).is_err());

        // A new pass starts from the top.
        let hit = state.find_next(&f.doc, &mut f.cursor, &mut f.selection).unwrap();
        assert_eq!(hit.span.start, p(0, 0));
    }

    #[test]
    fn case_sensitivity() {
        let mut f = fixture("abc ABC", 0, 0);
        let (_, hit) = SearchState::find("ABC", true, &f.doc, &mut f.cursor, &mut f.selection);
        assert_eq!(hit.unwrap().span.start, p(0, 4));

        let mut f = fixture("abc ABC", 0, 6);
        let (_, hit) = SearchState::find("ABC", false, &f.doc, &mut f.cursor, &mut f.selection);
        let hit = hit.unwrap();
        assert_eq!(hit.span.start, p(0, 0));
        assert!(hit.wrapped);
    }

    #[test]
    fn empty_query_is_rejected() {
        let mut f = fixture("abc", 0, 0);
        let (state, hit) = SearchState::find("", false, &f.doc, &mut f.cursor, &mut f.selection);
        assert_eq!(state.unwrap_err(), EditorError::EmptyQuery);
        assert_eq!(hit, Err(EditorError::EmptyQuery));
    }

    #[test]
    fn no_match_leaves_cursor() {
        let mut f = fixture("abc\ndef", 1, 1);
        let (_, hit) = SearchState::find("zz", false, &f.doc, &mut f.cursor, &mut f.selection);
        assert!(matches!(hit, Err(EditorError::NotFound(_))));
        assert_eq!(f.cursor.position(), p(1, 1));
        assert!(!f.selection.is_active());
    }

    #[test]
    fn previous_walks_backwards_and_wraps_to_end() {
        let mut f = fixture("a.a\na", 1, 1);
        let mut state = SearchState::new("a", true, p(1, 1)).unwrap();

        let hit = state
            .find_previous(&f.doc, &mut f.cursor, &mut f.selection)
            .unwrap();
        assert_eq!(hit.span.start, p(1, 0));
        let hit = state
            .find_previous(&f.doc, &mut f.cursor, &mut f.selection)
            .unwrap();
        assert_eq!(hit.span.start, p(0, 2));
        let hit = state
            .find_previous(&f.doc, &mut f.cursor, &mut f.selection)
            .unwrap();
        assert_eq!(hit.span.start, p(0, 0));
        assert!(!hit.wrapped);
        assert!(
            state
                .find_previous(&f.doc, &mut f.cursor, &mut f.selection)
                .is_err()
        );
    }

    #[test]
    fn cursor_on_a_match_still_ends_the_pass() {
        let mut f = fixture("foo foo", 0, 0);
        let (state, hit) = SearchState::find("foo", true, &f.doc, &mut f.cursor, &mut f.selection);
        let mut state = state.unwrap();
        assert_eq!(hit.unwrap().span.start, p(0, 4));

        let hit = state.find_next(&f.doc, &mut f.cursor, &mut f.selection).unwrap();
        assert_eq!(hit.span.start, p(0, 0));
        assert!(hit.wrapped);

        let miss = state.find_next(&f.doc, &mut f.cursor, &mut f.selection);
        assert_eq!(miss, Err(EditorError::NotFound("foo".to_string())));
        assert_eq!(f.cursor.position(), p(0, 0));
    }

    #[test]
    fn every_pass_is_bounded_by_the_match_count() {
        for (text, row, col, query) in [
            ("oFoo\nbar", 0, 0, "o"),
            ("foo foo", 0, 0, "foo"),
            ("aaa", 0, 1, "a"),
            ("ab\nab\nab", 1, 0, "ab"),
        ] {
            let mut f = fixture(text, row, col);
            let (state, hit) =
                SearchState::find(query, false, &f.doc, &mut f.cursor, &mut f.selection);
            let mut state = state.unwrap();
            let total = state.match_info(&f.doc).unwrap().1;
            assert!(hit.is_ok());

            let mut visited = 1;
            while state
                .find_next(&f.doc, &mut f.cursor, &mut f.selection)
                .is_ok()
            {
                visited += 1;
                assert!(visited <= total, "{text:?}: pass revisited a match");
            }
            assert_eq!(visited, total, "{text:?}");
        }
    }

    #[test]
    fn previous_after_next_steps_back_across_the_wrap() {
        let mut f = fixture("x.x", 0, 1);
        let (state, _) = SearchState::find("x", true, &f.doc, &mut f.cursor, &mut f.selection);
        let mut state = state.unwrap();
        assert_eq!(f.cursor.position(), p(0, 2));

        let hit = state.find_next(&f.doc, &mut f.cursor, &mut f.selection).unwrap();
        assert_eq!(hit.span.start, p(0, 0));
        let hit = state
            .find_previous(&f.doc, &mut f.cursor, &mut f.selection)
            .unwrap();
        assert_eq!(hit.span.start, p(0, 2));
        assert!(hit.wrapped);
        assert!(
            state
                .find_previous(&f.doc, &mut f.cursor, &mut f.selection)
                .is_err()
        );
    }

    #[test]
    fn match_info_counts_in_document_order() {
        let mut f = fixture("ab ab\nab", 1, 1);
        let (state, _) = SearchState::find("ab", true, &f.doc, &mut f.cursor, &mut f.selection);
        let state = state.unwrap();
        assert_eq!(f.cursor.position(), p(0, 0));
        assert_eq!(state.match_info(&f.doc), Some((1, 3)));
        assert_eq!(SearchState::new("ab", true, p(0, 0)).unwrap().match_info(&f.doc), None);
    }

    #[test]
    fn overlapping_matches_are_distinct_for_navigation() {
        let mut f = fixture("aaa", 0, 0);
        let mut state = SearchState::new("aa", true, p(0, 0)).unwrap();
        let a = state.find_next(&f.doc, &mut f.cursor, &mut f.selection).unwrap();
        let b = state.find_next(&f.doc, &mut f.cursor, &mut f.selection).unwrap();
        assert_eq!(a.span.start, p(0, 0));
        assert_eq!(b.span.start, p(0, 1));
    }

    #[test]
    fn replace_one_selects_then_replaces() {
        let mut f = fixture("cat cat", 0, 0);
        let mut state = SearchState::new("cat", true, p(0, 0)).unwrap();
        f.selection.clear();

        let outcome = state
            .replace_one(&mut f.doc, &mut f.cursor, &mut f.selection, "dog")
            .unwrap();
        assert!(matches!(outcome, ReplaceOutcome::Selected(_)));
        assert_eq!(f.doc.lines(), vec!["cat cat"]);

        let outcome = state
            .replace_one(&mut f.doc, &mut f.cursor, &mut f.selection, "dog")
            .unwrap();
        let ReplaceOutcome::Replaced { next } = outcome else {
            panic!("expected a replacement");
        };
        assert_eq!(f.doc.lines(), vec!["dog cat"]);
        assert_eq!(next.unwrap().span.start, p(0, 4));

        let outcome = state
            .replace_one(&mut f.doc, &mut f.cursor, &mut f.selection, "dog")
            .unwrap();
        assert_eq!(outcome, ReplaceOutcome::Replaced { next: None });
        assert_eq!(f.doc.lines(), vec!["dog dog"]);
    }

    #[test]
    fn replace_all_counts_and_clears_matches() {
        let mut f = fixture("one two one\none", 1, 0);
        let mut state = SearchState::new("one", true, p(0, 0)).unwrap();
        let n = state
            .replace_all(&mut f.doc, &mut f.cursor, &mut f.selection, "1")
            .unwrap();
        assert_eq!(n, 3);
        assert_eq!(f.doc.lines(), vec!["1 two 1", "1"]);
        assert!(!f.doc.text().contains("one"));
        assert_eq!(f.cursor.position(), p(1, 1));
    }

    #[test]
    fn replace_all_does_not_rescan_its_own_output() {
        let mut f = fixture("a a", 0, 0);
        let mut state = SearchState::new("a", true, p(0, 0)).unwrap();
        let n = state
            .replace_all(&mut f.doc, &mut f.cursor, &mut f.selection, "aa")
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(f.doc.lines(), vec!["aa aa"]);
    }

    #[test]
    fn replace_all_uses_post_edit_content() {
        let mut f = fixture("aaaa", 0, 0);
        let mut state = SearchState::new("aa", true, p(0, 0)).unwrap();
        let n = state
            .replace_all(&mut f.doc, &mut f.cursor, &mut f.selection, "b")
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(f.doc.lines(), vec!["bb"]);
    }

    #[test]
    fn replace_all_without_matches_is_not_found() {
        let mut f = fixture("abc", 0, 1);
        let mut state = SearchState::new("z", true, p(0, 0)).unwrap();
        let err = state
            .replace_all(&mut f.doc, &mut f.cursor, &mut f.selection, "y")
            .unwrap_err();
        assert_eq!(err, EditorError::NotFound("z".to_string()));
        assert!(!f.doc.is_modified());
        assert_eq!(f.cursor.position(), p(0, 1));
    }

    #[test]
    fn remap_shifts_positions_after_the_edit() {
        let removed = Span::new(p(0, 2), p(0, 5));
        assert_eq!(remap(p(0, 1), removed, p(0, 3)), p(0, 1));
        assert_eq!(remap(p(0, 3), removed, p(0, 3)), p(0, 3));
        assert_eq!(remap(p(0, 7), removed, p(0, 3)), p(0, 5));
        assert_eq!(remap(p(0, 7), removed, p(1, 1)), p(1, 3));
        assert_eq!(remap(p(2, 4), removed, p(1, 1)), p(3, 4));
    }
}
