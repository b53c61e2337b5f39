//! Process-wide clipboard.
//!
//! One `Clipboard` is created empty at startup, owned by the application and
//! handed to each command by `&mut`. It outlives any single document and is
//! only dropped at process exit.

use super::cursor::{Cursor, Position};
use super::document::Document;
use super::selection::{Selection, word_bounds};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipKind {
    /// Exact character range, possibly spanning lines.
    CharSpan,
    /// Whole lines, captured when nothing was selected.
    LineSpan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardContent {
    pub kind: ClipKind,
    pub lines: Vec<String>,
}

impl ClipboardContent {
    pub fn chars(text: &str) -> Self {
        Self {
            kind: ClipKind::CharSpan,
            lines: text.split('\n').map(str::to_string).collect(),
        }
    }

    pub fn line(text: String) -> Self {
        Self {
            kind: ClipKind::LineSpan,
            lines: vec![text],
        }
    }

    /// The captured text, lines joined by `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

#[derive(Debug, Default)]
pub struct Clipboard {
    content: Option<ClipboardContent>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> Option<&ClipboardContent> {
        self.content.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }

    /// Overwrite the stored content.
    pub fn store(&mut self, content: ClipboardContent) {
        self.content = Some(content);
    }

    /// Copy the selection, or the current line when nothing is selected.
    pub fn copy(
        &mut self,
        doc: &Document,
        cursor: &Cursor,
        selection: &Selection,
    ) -> Result<&ClipboardContent> {
        let content = match selection.non_empty_span(cursor) {
            Some(span) => ClipboardContent::chars(&doc.text_in(span)?),
            None => ClipboardContent::line(doc.line(cursor.row()).unwrap_or_default()),
        };
        Ok(self.content.insert(content))
    }

    /// Copy the word at the cursor. `None` when there is no word there, in
    /// which case the previous content is kept.
    pub fn copy_word(&mut self, doc: &Document, cursor: &Cursor) -> Option<&ClipboardContent> {
        let line: Vec<char> = doc.line(cursor.row()).unwrap_or_default().chars().collect();
        let (start, end) = word_bounds(&line, cursor.col())?;
        let word: String = line[start..end].iter().collect();
        Some(self.content.insert(ClipboardContent::chars(&word)))
    }

    /// Copy, then remove the copied text from the document.
    pub fn cut(
        &mut self,
        doc: &mut Document,
        cursor: &mut Cursor,
        selection: &mut Selection,
    ) -> Result<&ClipboardContent> {
        let content = match selection.non_empty_span(cursor) {
            Some(span) => {
                let removed = doc.delete_range(span)?;
                cursor.move_to(doc, span.start);
                ClipboardContent::chars(&removed)
            }
            None => {
                let row = cursor.row();
                let removed = doc.remove_line(row)?;
                cursor.move_to(doc, Position::new(row, 0));
                ClipboardContent::line(removed)
            }
        };
        selection.clear();
        Ok(self.content.insert(content))
    }

    /// Insert the stored content at the cursor, replacing any selection.
    ///
    /// Returns `false` without touching anything when the clipboard was never
    /// filled.
    pub fn paste(
        &self,
        doc: &mut Document,
        cursor: &mut Cursor,
        selection: &mut Selection,
    ) -> Result<bool> {
        let Some(content) = &self.content else {
            return Ok(false);
        };

        if let Some(span) = selection.current_span(cursor) {
            doc.delete_range(span)?;
            cursor.move_to(doc, span.start);
        }
        selection.clear();

        match content.kind {
            ClipKind::LineSpan => {
                let row = cursor.row();
                doc.insert_lines(row, &content.lines)?;
                cursor.move_to(doc, Position::new(row + content.lines.len(), 0));
            }
            ClipKind::CharSpan => {
                let end = doc.insert_text(cursor.position(), &content.text())?;
                cursor.move_to(doc, end);
            }
        }
        Ok(true)
    }

    /// Short description for the status line.
    pub fn preview(&self, max_len: usize) -> String {
        match &self.content {
            None => "empty".to_string(),
            Some(content) if content.lines.len() == 1 => {
                let line = &content.lines[0];
                if line.chars().count() > max_len {
                    let cut: String = line.chars().take(max_len).collect();
                    format!("{cut}...")
                } else {
                    line.clone()
                }
            }
            Some(content) => format!("{} lines", content.lines.len()),
        }
    }
}
