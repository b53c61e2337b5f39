use std::ops::Range;

use super::cursor::Position;

/// Visible window into the document, derived from the cursor and the
/// terminal size. Editing commands never move it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub top_row: usize,
    pub left_col: usize,
    pub rows: usize,
    pub cols: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            top_row: 0,
            left_col: 0,
            rows: 24,
            cols: 80,
        }
    }
}

impl Viewport {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            top_row: 0,
            left_col: 0,
            rows: rows.max(1),
            cols: cols.max(1),
        }
    }

    /// Adopt a new terminal size and keep the cursor visible.
    pub fn resize(&mut self, rows: usize, cols: usize, cursor: Position) {
        self.rows = rows.max(1);
        self.cols = cols.max(1);
        self.recompute(cursor);
    }

    /// Scroll by the smallest amount that brings the cursor into view.
    pub fn recompute(&mut self, cursor: Position) {
        if cursor.row < self.top_row {
            self.top_row = cursor.row;
        } else if cursor.row >= self.top_row + self.rows {
            self.top_row = cursor.row + 1 - self.rows;
        }

        if cursor.col < self.left_col {
            self.left_col = cursor.col;
        } else if cursor.col >= self.left_col + self.cols {
            self.left_col = cursor.col + 1 - self.cols;
        }
    }

    /// Jump a full page. `recompute` must follow with the moved cursor.
    pub fn page(&mut self, down: bool, line_count: usize) {
        let max_top = line_count.saturating_sub(1);
        self.top_row = if down {
            (self.top_row + self.rows).min(max_top)
        } else {
            self.top_row.saturating_sub(self.rows)
        };
    }

    pub fn contains(&self, pos: Position) -> bool {
        (self.top_row..self.top_row + self.rows).contains(&pos.row)
            && (self.left_col..self.left_col + self.cols).contains(&pos.col)
    }

    /// Document rows currently on screen.
    pub fn visible_rows(&self, line_count: usize) -> Range<usize> {
        self.top_row.min(line_count)..(self.top_row + self.rows).min(line_count)
    }

    /// Screen offset of a visible position, relative to the text area.
    pub fn to_screen(&self, pos: Position) -> Option<(usize, usize)> {
        self.contains(pos)
            .then(|| (pos.row - self.top_row, pos.col - self.left_col))
    }
}
