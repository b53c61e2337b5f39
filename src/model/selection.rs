use super::cursor::{Cursor, Position};
use super::document::Document;

/// A range of text with `start <= end` in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    /// Build a span from two positions in either order.
    pub fn new(a: Position, b: Position) -> Self {
        Self::normalize(a, b)
    }

    pub fn normalize(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether the character starting at `pos` is covered.
    pub fn contains(&self, pos: Position) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Rows that hold at least one covered character, or the single row of an
    /// empty span. A span ending at column 0 does not touch its last row.
    pub fn touched_rows(&self) -> std::ops::RangeInclusive<usize> {
        let last = if self.end.row > self.start.row && self.end.col == 0 {
            self.end.row - 1
        } else {
            self.end.row
        };
        self.start.row..=last
    }
}

/// Bounds of the alphanumeric run at `col`, or ending just before it.
/// `None` when `col` is past the line or touches no word.
pub fn word_bounds(line: &[char], col: usize) -> Option<(usize, usize)> {
    if col >= line.len() {
        return None;
    }
    let mut start = col;
    while start > 0 && line[start - 1].is_alphanumeric() {
        start -= 1;
    }
    let mut end = col;
    while end < line.len() && line[end].is_alphanumeric() {
        end += 1;
    }
    (start < end).then_some((start, end))
}

/// Anchor-based selection. The far edge is always the live cursor, so any
/// cursor movement while active extends the selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    anchor: Option<Position>,
}

impl Selection {
    pub fn is_active(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn anchor(&self) -> Option<Position> {
        self.anchor
    }

    /// Activate with an explicit anchor.
    pub fn set(&mut self, anchor: Position) {
        self.anchor = Some(anchor);
    }

    pub fn clear(&mut self) {
        self.anchor = None;
    }

    /// Start selecting at the cursor, or drop the active selection.
    pub fn toggle(&mut self, cursor: &Cursor) {
        self.anchor = match self.anchor {
            Some(_) => None,
            None => Some(cursor.position()),
        };
    }

    /// Anchor at the document start and move the cursor to its end.
    pub fn select_all(&mut self, doc: &Document, cursor: &mut Cursor) {
        self.anchor = Some(Position::default());
        cursor.move_to(doc, doc.end_position());
    }

    /// Select the word at the cursor, leaving the cursor at its end.
    /// Returns `false` and changes nothing when there is no word there.
    pub fn select_word(&mut self, doc: &Document, cursor: &mut Cursor) -> bool {
        let row = cursor.row();
        let line: Vec<char> = doc.line(row).unwrap_or_default().chars().collect();
        let Some((start, end)) = word_bounds(&line, cursor.col()) else {
            return false;
        };
        self.anchor = Some(Position::new(row, start));
        cursor.move_to(doc, Position::new(row, end));
        true
    }

    pub fn select_line(&mut self, doc: &Document, cursor: &mut Cursor) {
        let row = cursor.row();
        self.anchor = Some(Position::new(row, 0));
        cursor.move_to(doc, Position::new(row, doc.line_len(row)));
    }

    pub fn current_span(&self, cursor: &Cursor) -> Option<Span> {
        self.anchor
            .map(|anchor| Span::normalize(anchor, cursor.position()))
    }

    /// Current span, only if it covers at least one character.
    pub fn non_empty_span(&self, cursor: &Cursor) -> Option<Span> {
        self.current_span(cursor).filter(|span| !span.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn normalize_is_direction_independent() {
        let points = [p(0, 0), p(0, 3), p(1, 0), p(1, 2), p(4, 1)];
        for a in points {
            for b in points {
                let span = Span::normalize(a, b);
                assert_eq!(span, Span::normalize(b, a));
                assert!(span.start <= span.end);
            }
        }
    }

    #[test]
    fn contains_is_half_open() {
        let span = Span::new(p(0, 2), p(1, 1));
        assert!(!span.contains(p(0, 1)));
        assert!(span.contains(p(0, 2)));
        assert!(span.contains(p(0, 50)));
        assert!(span.contains(p(1, 0)));
        assert!(!span.contains(p(1, 1)));
    }

    #[test]
    fn touched_rows_skip_trailing_column_zero() {
        assert_eq!(Span::new(p(1, 3), p(3, 0)).touched_rows(), 1..=2);
        assert_eq!(Span::new(p(1, 3), p(3, 1)).touched_rows(), 1..=3);
        assert_eq!(Span::new(p(2, 0), p(2, 0)).touched_rows(), 2..=2);
    }

    #[test]
    fn toggle_tracks_live_cursor() {
        let doc = Document::from_text("hello\nworld");
        let mut cursor = Cursor::default();
        cursor.move_to(&doc, p(1, 3));
        let mut sel = Selection::default();
        assert_eq!(sel.current_span(&cursor), None);

        sel.toggle(&cursor);
        assert!(sel.is_active());
        cursor.move_up(&doc);
        cursor.move_home();
        assert_eq!(sel.current_span(&cursor), Some(Span::new(p(0, 0), p(1, 3))));

        sel.toggle(&cursor);
        assert!(!sel.is_active());
        assert_eq!(sel.current_span(&cursor), None);
    }

    #[test]
    fn select_all_spans_document() {
        let doc = Document::from_text("ab\ncde");
        let mut cursor = Cursor::default();
        let mut sel = Selection::default();
        sel.select_all(&doc, &mut cursor);
        assert_eq!(cursor.position(), p(1, 3));
        assert_eq!(sel.current_span(&cursor), Some(Span::new(p(0, 0), p(1, 3))));
    }

    #[test]
    fn empty_span_is_filtered() {
        let cursor = Cursor::default();
        let mut sel = Selection::default();
        sel.toggle(&cursor);
        assert!(sel.current_span(&cursor).is_some());
        assert!(sel.non_empty_span(&cursor).is_none());
    }

    #[test]
    fn word_bounds_follow_alphanumeric_runs() {
        let line: Vec<char> = "foo_bar baz9".chars().collect();
        assert_eq!(word_bounds(&line, 1), Some((0, 3)));
        assert_eq!(word_bounds(&line, 3), Some((0, 3)));
        assert_eq!(word_bounds(&line, 4), Some((4, 7)));
        assert_eq!(word_bounds(&line, 10), Some((8, 12)));
        assert_eq!(word_bounds(&line, 12), None);

        let line: Vec<char> = "a  b".chars().collect();
        assert_eq!(word_bounds(&line, 2), None);
    }

    #[test]
    fn select_line_spans_the_whole_row() {
        let doc = Document::from_text("one\ntwo three");
        let mut cursor = Cursor::default();
        cursor.move_to(&doc, p(1, 4));
        let mut sel = Selection::default();
        sel.select_line(&doc, &mut cursor);
        assert_eq!(sel.current_span(&cursor), Some(Span::new(p(1, 0), p(1, 9))));
    }

    #[test]
    fn select_word_without_word_changes_nothing() {
        let doc = Document::from_text("x ,y");
        let mut cursor = Cursor::default();
        cursor.move_to(&doc, p(0, 2));
        let mut sel = Selection::default();
        assert!(!sel.select_word(&doc, &mut cursor));
        assert!(!sel.is_active());
        assert_eq!(cursor.position(), p(0, 2));
    }
}
