//! Command dispatch for the editing core.
//!
//! `Editor` is the single owner of the document and all positional state.
//! Each [`Command`] runs to completion inside [`Editor::execute`], after which
//! the viewport is recomputed and a [`Status`] describes the result.

use std::fmt;
use std::path::Path;

use crate::error::{EditorError, Result};
use crate::model::clipboard::Clipboard;
use crate::model::config::AppConfig;
use crate::model::cursor::{Cursor, Position};
use crate::model::document::Document;
use crate::model::search::{ReplaceOutcome, SearchHit, SearchState};
use crate::model::selection::{Selection, Span};
use crate::model::viewport::Viewport;
use crate::msg::Command;

const PREVIEW_LEN: usize = 24;
const NO_WORD: &str = "No word at cursor";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

/// Result of one command, for the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// File name, modified marker, 1-based cursor and selection extent.
    pub summary: String,
    pub notice: Option<Notice>,
}

impl Status {
    pub fn is_error(&self) -> bool {
        matches!(self.notice, Some(Notice::Error(_)))
    }

    pub fn message(&self) -> Option<&str> {
        match &self.notice {
            Some(Notice::Info(msg) | Notice::Error(msg)) => Some(msg),
            None => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(msg) => f.write_str(msg),
            None => f.write_str(&self.summary),
        }
    }
}

pub struct Editor {
    document: Document,
    cursor: Cursor,
    selection: Selection,
    search: Option<SearchState>,
    viewport: Viewport,
    tab_width: usize,
    case_sensitive: bool,
    quit_pending: bool,
    should_quit: bool,
}

impl Editor {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            cursor: Cursor::default(),
            selection: Selection::default(),
            search: None,
            viewport: Viewport::default(),
            tab_width: 4,
            case_sensitive: false,
            quit_pending: false,
            should_quit: false,
        }
    }

    pub fn with_config(mut self, config: &AppConfig) -> Self {
        self.tab_width = config.editor.tab_width.max(1);
        self.case_sensitive = config.search.case_sensitive;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn cursor(&self) -> Position {
        self.cursor.position()
    }

    /// Place the cursor, clamped into the document.
    pub fn set_cursor(&mut self, pos: Position) {
        self.cursor.move_to(&self.document, pos);
        self.viewport.recompute(self.cursor.position());
    }

    pub fn selection(&self) -> Option<Span> {
        self.selection.current_span(&self.cursor)
    }

    pub fn search(&self) -> Option<&SearchState> {
        self.search.as_ref()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// Unsaved changes are blocking a quit until confirmed with `ForceQuit`.
    pub fn quit_pending(&self) -> bool {
        self.quit_pending
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Run one command to completion and report the outcome.
    pub fn execute(&mut self, command: Command, clipboard: &mut Clipboard) -> Status {
        tracing::debug!(?command, "execute");

        if !matches!(command, Command::Quit | Command::Resize { .. }) {
            self.quit_pending = false;
        }

        let notice = match self.apply(command, clipboard) {
            Ok(info) => info.map(Notice::Info),
            Err(err) => {
                if err.is_defect() {
                    tracing::error!(%err, "editing invariant violated");
                } else {
                    tracing::debug!(%err, "command failed");
                }
                Some(Notice::Error(err.to_string()))
            }
        };

        self.cursor.clamp(&self.document);
        self.viewport.recompute(self.cursor.position());

        Status {
            summary: self.summary(),
            notice,
        }
    }

    fn apply(&mut self, command: Command, clipboard: &mut Clipboard) -> Result<Option<String>> {
        let doc = &self.document;
        match command {
            Command::InsertChar('\n') | Command::Newline => {
                self.delete_selection()?;
                let pos = self.cursor.position();
                self.document.split_line(pos)?;
                self.cursor
                    .move_to(&self.document, Position::new(pos.row + 1, 0));
            }
            Command::InsertChar(ch) => {
                self.delete_selection()?;
                let pos = self.cursor.position();
                self.document.insert_char(pos, ch)?;
                self.cursor
                    .move_to(&self.document, Position::new(pos.row, pos.col + 1));
            }
            Command::Backspace => {
                if !self.delete_selection()? {
                    self.backspace()?;
                }
            }
            Command::DeleteForward => {
                if !self.delete_selection()? {
                    self.delete_forward()?;
                }
            }
            Command::Tab => return self.tab(),

            Command::MoveLeft => self.cursor.move_left(doc),
            Command::MoveRight => self.cursor.move_right(doc),
            Command::MoveUp => self.cursor.move_up(doc),
            Command::MoveDown => self.cursor.move_down(doc),
            Command::MoveHome => self.cursor.move_home(),
            Command::MoveEnd => self.cursor.move_end(doc),
            Command::MoveWordLeft => self.cursor.move_word_left(doc),
            Command::MoveWordRight => self.cursor.move_word_right(doc),
            Command::PageUp => {
                self.cursor.page_up(doc, self.viewport.rows);
                self.viewport.page(false, doc.line_count());
            }
            Command::PageDown => {
                self.cursor.page_down(doc, self.viewport.rows);
                self.viewport.page(true, doc.line_count());
            }
            Command::GotoLine(input) => self.cursor.goto_line(doc, &input)?,

            Command::ToggleSelection => {
                self.selection.toggle(&self.cursor);
                let msg = if self.selection.is_active() {
                    "Mark set"
                } else {
                    "Mark unset"
                };
                return Ok(Some(msg.to_string()));
            }
            Command::SelectAll => self.selection.select_all(doc, &mut self.cursor),
            Command::SelectWord => {
                if !self.selection.select_word(doc, &mut self.cursor) {
                    return Ok(Some(NO_WORD.to_string()));
                }
            }
            Command::SelectLine => self.selection.select_line(doc, &mut self.cursor),
            Command::Copy => {
                clipboard.copy(doc, &self.cursor, &self.selection)?;
                return Ok(Some(format!("Copied: {}", clipboard.preview(PREVIEW_LEN))));
            }
            Command::CopyWord => {
                if clipboard.copy_word(doc, &self.cursor).is_none() {
                    return Ok(Some(NO_WORD.to_string()));
                }
                return Ok(Some(format!("Copied: {}", clipboard.preview(PREVIEW_LEN))));
            }
            Command::Cut => {
                clipboard.cut(&mut self.document, &mut self.cursor, &mut self.selection)?;
                return Ok(Some(format!("Cut: {}", clipboard.preview(PREVIEW_LEN))));
            }
            Command::Paste => {
                let pasted =
                    clipboard.paste(&mut self.document, &mut self.cursor, &mut self.selection)?;
                if !pasted {
                    return Ok(Some("Clipboard is empty".to_string()));
                }
            }

            Command::Find {
                query,
                case_sensitive,
            } => {
                let (state, hit) = SearchState::find(
                    &query,
                    case_sensitive,
                    doc,
                    &mut self.cursor,
                    &mut self.selection,
                );
                if let Ok(state) = state {
                    self.search = Some(state);
                }
                return Ok(Some(self.match_message(hit?)));
            }
            Command::FindNext => {
                let state = self.search.as_mut().ok_or(EditorError::NoSearch)?;
                let hit = state.find_next(doc, &mut self.cursor, &mut self.selection)?;
                return Ok(Some(self.match_message(hit)));
            }
            Command::FindPrevious => {
                let state = self.search.as_mut().ok_or(EditorError::NoSearch)?;
                let hit = state.find_previous(doc, &mut self.cursor, &mut self.selection)?;
                return Ok(Some(self.match_message(hit)));
            }
            Command::Replace {
                query,
                replacement,
                all,
            } => return self.replace(&query, &replacement, all),

            Command::Save => {
                let path = self.document.save_current()?;
                return Ok(Some(self.saved_message(&path.display().to_string())));
            }
            Command::SaveAs(path) => {
                self.document.save(&path)?;
                return Ok(Some(self.saved_message(&path.display().to_string())));
            }
            Command::Open(path) => return self.open(&path),

            Command::Quit => {
                if self.document.is_modified() {
                    self.quit_pending = true;
                    return Ok(Some(
                        "Unsaved changes. Quit without saving? (y/n)".to_string(),
                    ));
                }
                self.should_quit = true;
            }
            Command::ForceQuit => {
                self.should_quit = true;
            }
            Command::Resize { rows, cols } => {
                self.viewport.resize(rows, cols, self.cursor.position());
            }
        }
        Ok(None)
    }

    /// Delete the selected span, if any, and drop the selection.
    /// Returns whether any text was removed.
    fn delete_selection(&mut self) -> Result<bool> {
        let span = self.selection.non_empty_span(&self.cursor);
        self.selection.clear();
        let Some(span) = span else {
            return Ok(false);
        };
        self.document.delete_range(span)?;
        self.cursor.move_to(&self.document, span.start);
        Ok(true)
    }

    fn backspace(&mut self) -> Result<()> {
        let pos = self.cursor.position();
        if pos.col > 0 {
            let prev = Position::new(pos.row, pos.col - 1);
            self.document.delete_range(Span::new(prev, pos))?;
            self.cursor.move_to(&self.document, prev);
        } else if pos.row > 0 {
            let prev_len = self.document.line_len(pos.row - 1);
            self.document.join_line(pos.row - 1)?;
            self.cursor
                .move_to(&self.document, Position::new(pos.row - 1, prev_len));
        }
        Ok(())
    }

    fn delete_forward(&mut self) -> Result<()> {
        let pos = self.cursor.position();
        if pos.col < self.document.line_len(pos.row) {
            let next = Position::new(pos.row, pos.col + 1);
            self.document.delete_range(Span::new(pos, next))?;
        } else if pos.row + 1 < self.document.line_count() {
            self.document.join_line(pos.row)?;
        }
        Ok(())
    }

    /// Indent the selected lines, or insert spaces at the cursor.
    fn tab(&mut self) -> Result<Option<String>> {
        let indent = " ".repeat(self.tab_width);

        let Some(span) = self.selection.current_span(&self.cursor) else {
            let end = self
                .document
                .insert_text(self.cursor.position(), &indent)?;
            self.cursor.move_to(&self.document, end);
            return Ok(None);
        };

        let rows = span.touched_rows();
        for row in rows.clone() {
            self.document.insert_text(Position::new(row, 0), &indent)?;
        }

        let shift = |pos: Position| {
            if rows.contains(&pos.row) {
                Position::new(pos.row, pos.col + self.tab_width)
            } else {
                pos
            }
        };
        if let Some(anchor) = self.selection.anchor() {
            self.selection.set(shift(anchor));
        }
        let moved = shift(self.cursor.position());
        self.cursor.move_to(&self.document, moved);

        let count = rows.count();
        let noun = if count == 1 { "line" } else { "lines" };
        Ok(Some(format!("Indented {count} {noun}")))
    }

    fn replace(&mut self, query: &str, replacement: &str, all: bool) -> Result<Option<String>> {
        let reuse = self
            .search
            .as_ref()
            .is_some_and(|state| state.query() == query);
        if !reuse {
            let origin = match self.selection.current_span(&self.cursor) {
                Some(span) => span.start,
                None => self.cursor.position(),
            };
            self.search = Some(SearchState::new(query, self.case_sensitive, origin)?);
        }
        let Some(state) = self.search.as_mut() else {
            return Err(EditorError::NoSearch);
        };

        if all {
            let count =
                state.replace_all(&mut self.document, &mut self.cursor, &mut self.selection, replacement)?;
            let noun = if count == 1 { "occurrence" } else { "occurrences" };
            return Ok(Some(format!("Replaced {count} {noun}")));
        }

        let outcome =
            state.replace_one(&mut self.document, &mut self.cursor, &mut self.selection, replacement)?;
        let msg = match outcome {
            ReplaceOutcome::Selected(_) => "Match selected; replace again to confirm",
            ReplaceOutcome::Replaced { next: Some(_) } => "Replaced 1 occurrence",
            ReplaceOutcome::Replaced { next: None } => "Replaced 1 occurrence; no more matches",
        };
        Ok(Some(msg.to_string()))
    }

    /// Replace the document with the file at `path`. Unsaved changes are
    /// discarded; confirming that is up to the caller.
    fn open(&mut self, path: &Path) -> Result<Option<String>> {
        self.document = Document::open(path)?;
        self.cursor = Cursor::default();
        self.selection.clear();
        self.search = None;
        self.viewport.top_row = 0;
        self.viewport.left_col = 0;

        let lines = self.document.line_count();
        let noun = if lines == 1 { "line" } else { "lines" };
        Ok(Some(format!("Opened {} ({lines} {noun})", path.display())))
    }

    fn match_message(&self, hit: SearchHit) -> String {
        let mut msg = match self
            .search
            .as_ref()
            .and_then(|state| state.match_info(&self.document))
        {
            Some((index, total)) => format!("Match {index} of {total}"),
            None => "Match found".to_string(),
        };
        if hit.wrapped {
            msg.push_str("; search wrapped");
        }
        msg
    }

    fn saved_message(&self, path: &str) -> String {
        let lines = self.document.line_count();
        let noun = if lines == 1 { "line" } else { "lines" };
        format!("Wrote {lines} {noun} to {path}")
    }

    /// Status-bar summary: name, modified marker, cursor and selection.
    pub fn summary(&self) -> String {
        let pos = self.cursor.position();
        let modified = if self.document.is_modified() {
            " [+]"
        } else {
            ""
        };
        let mut out = format!(
            "{}{modified} | Ln {}, Col {}",
            self.document.display_name(),
            pos.row + 1,
            pos.col + 1
        );
        if let Some(span) = self.selection() {
            out.push_str(&format!(
                " | Sel {}:{}-{}:{}",
                span.start.row + 1,
                span.start.col + 1,
                span.end.row + 1,
                span.end.col + 1
            ));
        }
        out
    }
}
