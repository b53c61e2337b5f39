use super::document::Document;
use crate::error::{EditorError, Result};

/// A point between characters: row and char column, both 0-indexed.
///
/// Ordering is document order (row first, then column).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// The single editing position. Every movement clamps instead of failing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pos: Position,
}

impl Cursor {
    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn row(&self) -> usize {
        self.pos.row
    }

    pub fn col(&self) -> usize {
        self.pos.col
    }

    /// Jump to `pos`, clamped into the document.
    pub fn move_to(&mut self, doc: &Document, pos: Position) {
        self.pos = doc.clamp(pos);
    }

    /// Re-validate after the document changed underneath the cursor.
    pub fn clamp(&mut self, doc: &Document) {
        self.pos = doc.clamp(self.pos);
    }

    pub fn move_left(&mut self, doc: &Document) {
        if self.pos.col > 0 {
            self.pos.col -= 1;
        } else if self.pos.row > 0 {
            self.pos.row -= 1;
            self.pos.col = doc.line_len(self.pos.row);
        }
    }

    pub fn move_right(&mut self, doc: &Document) {
        if self.pos.col < doc.line_len(self.pos.row) {
            self.pos.col += 1;
        } else if self.pos.row + 1 < doc.line_count() {
            self.pos.row += 1;
            self.pos.col = 0;
        }
    }

    pub fn move_up(&mut self, doc: &Document) {
        self.move_rows(doc, -1);
    }

    pub fn move_down(&mut self, doc: &Document) {
        self.move_rows(doc, 1);
    }

    pub fn move_home(&mut self) {
        self.pos.col = 0;
    }

    pub fn move_end(&mut self, doc: &Document) {
        self.pos.col = doc.line_len(self.pos.row);
    }

    pub fn page_up(&mut self, doc: &Document, rows: usize) {
        self.move_rows(doc, -(rows.max(1) as isize));
    }

    pub fn page_down(&mut self, doc: &Document, rows: usize) {
        self.move_rows(doc, rows.max(1) as isize);
    }

    /// Vertical move with the column re-clamped to the target line.
    /// No preferred column is remembered across moves.
    fn move_rows(&mut self, doc: &Document, delta: isize) {
        let last = doc.line_count() - 1;
        let row = self.pos.row.saturating_add_signed(delta).min(last);
        self.pos = Position::new(row, self.pos.col.min(doc.line_len(row)));
    }

    /// Jump to a 1-based line number typed by the user.
    ///
    /// Out-of-range numbers clamp; only input that is not a positive
    /// integer is rejected.
    pub fn goto_line(&mut self, doc: &Document, input: &str) -> Result<()> {
        let n = input
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| EditorError::InvalidLineNumber(input.trim().to_string()))?;
        self.pos = Position::new((n - 1).min(doc.line_count() - 1), 0);
        Ok(())
    }

    /// Start of the next word; continues onto the next line at line end.
    pub fn move_word_right(&mut self, doc: &Document) {
        let line: Vec<char> = doc.line(self.pos.row).unwrap_or_default().chars().collect();
        let mut col = self.pos.col;

        while col < line.len() && line[col].is_alphanumeric() {
            col += 1;
        }
        while col < line.len() && line[col].is_whitespace() {
            col += 1;
        }
        if col == self.pos.col && col < line.len() {
            // punctuation
            col += 1;
        }

        if col >= line.len() && self.pos.col == line.len() && self.pos.row + 1 < doc.line_count() {
            self.pos = Position::new(self.pos.row + 1, 0);
        } else {
            self.pos.col = col.min(line.len());
        }
    }

    /// Start of the previous word; from column 0 moves to the previous line end.
    pub fn move_word_left(&mut self, doc: &Document) {
        if self.pos.col == 0 {
            if self.pos.row > 0 {
                self.pos.row -= 1;
                self.pos.col = doc.line_len(self.pos.row);
            }
            return;
        }

        let line: Vec<char> = doc.line(self.pos.row).unwrap_or_default().chars().collect();
        let mut col = self.pos.col.min(line.len());

        while col > 0 && line[col - 1].is_whitespace() {
            col -= 1;
        }
        if col > 0 && !line[col - 1].is_alphanumeric() {
            col -= 1;
        } else {
            while col > 0 && line[col - 1].is_alphanumeric() {
                col -= 1;
            }
        }
        self.pos.col = col;
    }
}
