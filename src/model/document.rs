use ropey::Rope;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::cursor::Position;
use super::selection::Span;
use crate::error::{EditorError, IoErrorKind, Result};

/// The text being edited, backed by a Rope whose only line break is `\n`.
///
/// An empty rope still has one (empty) line, so `line_count() >= 1` holds
/// after every mutation.
#[derive(Debug, Clone)]
pub struct Document {
    rope: Rope,
    path: Option<PathBuf>,
    modified: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty, unnamed document.
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            path: None,
            modified: false,
        }
    }

    /// Create an unnamed document holding `text`.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(&normalize_line_endings(text)),
            path: None,
            modified: false,
        }
    }

    /// Create an empty document bound to a path that does not exist yet.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            rope: Rope::new(),
            path: Some(path),
            modified: false,
        }
    }

    /// Read a file into a new document.
    pub fn open(path: &Path) -> Result<Self> {
        let mut doc = Self::new();
        doc.load(path)?;
        Ok(doc)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// File name for the status bar.
    pub fn display_name(&self) -> String {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "[No Name]".to_string())
    }

    /// Total number of lines in the document.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Length of a line in chars, excluding the line break.
    pub fn line_len(&self, row: usize) -> usize {
        if row >= self.line_count() {
            return 0;
        }
        let len = self.rope.line(row).len_chars();
        if row + 1 < self.line_count() {
            len - 1
        } else {
            len
        }
    }

    /// Get the text of a specific line (without trailing newline).
    pub fn line(&self, row: usize) -> Option<String> {
        if row >= self.line_count() {
            return None;
        }
        let mut s: String = self.rope.line(row).chunks().collect();
        if s.ends_with('\n') {
            s.pop();
        }
        Some(s)
    }

    /// All lines, without line breaks.
    pub fn lines(&self) -> Vec<String> {
        (0..self.line_count())
            .filter_map(|row| self.line(row))
            .collect()
    }

    /// Full content, lines joined by `\n`.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn is_valid(&self, pos: Position) -> bool {
        pos.row < self.line_count() && pos.col <= self.line_len(pos.row)
    }

    /// Nearest valid position to `pos`.
    pub fn clamp(&self, pos: Position) -> Position {
        let row = pos.row.min(self.line_count() - 1);
        Position::new(row, pos.col.min(self.line_len(row)))
    }

    /// Position just past the last character.
    pub fn end_position(&self) -> Position {
        let row = self.line_count() - 1;
        Position::new(row, self.line_len(row))
    }

    fn char_idx(&self, pos: Position) -> Result<usize> {
        if !self.is_valid(pos) {
            return Err(EditorError::OutOfBounds {
                row: pos.row,
                col: pos.col,
            });
        }
        Ok(self.rope.line_to_char(pos.row) + pos.col)
    }

    /// Insert a character. A `'\n'` splits the line.
    pub fn insert_char(&mut self, pos: Position, ch: char) -> Result<()> {
        let idx = self.char_idx(pos)?;
        self.rope.insert_char(idx, ch);
        self.modified = true;
        Ok(())
    }

    /// Insert (possibly multi-line) text and return the position right after it.
    pub fn insert_text(&mut self, pos: Position, text: &str) -> Result<Position> {
        let idx = self.char_idx(pos)?;
        if text.is_empty() {
            return Ok(pos);
        }
        let text = normalize_line_endings(text);
        self.rope.insert(idx, &text);
        self.modified = true;

        let end = match text.rfind('\n') {
            Some(last_break) => Position::new(
                pos.row + text.matches('\n').count(),
                text[last_break + 1..].chars().count(),
            ),
            None => Position::new(pos.row, pos.col + text.chars().count()),
        };
        Ok(end)
    }

    /// Text covered by `span`, lines joined by `\n`.
    pub fn text_in(&self, span: Span) -> Result<String> {
        let start = self.char_idx(span.start)?;
        let end = self.char_idx(span.end)?;
        Ok(self.rope.slice(start..end).to_string())
    }

    /// Remove the text covered by `span`, joining lines across boundaries.
    pub fn delete_range(&mut self, span: Span) -> Result<String> {
        let start = self.char_idx(span.start)?;
        let end = self.char_idx(span.end)?;
        if start == end {
            return Ok(String::new());
        }
        let removed = self.rope.slice(start..end).to_string();
        self.rope.remove(start..end);
        self.modified = true;
        Ok(removed)
    }

    /// Break the line at `pos`; the remainder becomes the next line.
    pub fn split_line(&mut self, pos: Position) -> Result<()> {
        self.insert_char(pos, '\n')
    }

    /// Append line `row + 1` onto line `row`.
    pub fn join_line(&mut self, row: usize) -> Result<()> {
        if row + 1 >= self.line_count() {
            return Err(EditorError::OutOfBounds { row, col: 0 });
        }
        let brk = self.rope.line_to_char(row) + self.line_len(row);
        self.rope.remove(brk..brk + 1);
        self.modified = true;
        Ok(())
    }

    /// Insert whole lines above `row` (`row == line_count()` appends).
    pub fn insert_lines(&mut self, row: usize, lines: &[String]) -> Result<()> {
        if row > self.line_count() {
            return Err(EditorError::OutOfBounds { row, col: 0 });
        }
        if lines.is_empty() {
            return Ok(());
        }
        let block = lines.join("\n");
        if row == self.line_count() {
            let end = self.rope.len_chars();
            self.rope.insert(end, &format!("\n{block}"));
        } else {
            let at = self.rope.line_to_char(row);
            self.rope.insert(at, &format!("{block}\n"));
        }
        self.modified = true;
        Ok(())
    }

    /// Remove line `row` together with its line break and return its text.
    /// The only line of a document is emptied instead of removed.
    pub fn remove_line(&mut self, row: usize) -> Result<String> {
        let text = self
            .line(row)
            .ok_or(EditorError::OutOfBounds { row, col: 0 })?;
        let count = self.line_count();
        let range = if count == 1 {
            0..self.rope.len_chars()
        } else if row + 1 < count {
            self.rope.line_to_char(row)..self.rope.line_to_char(row + 1)
        } else {
            self.rope.line_to_char(row) - 1..self.rope.len_chars()
        };
        self.rope.remove(range);
        self.modified = true;
        Ok(text)
    }

    /// Replace the whole content with the file at `path`.
    ///
    /// On failure the document is left untouched.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let text = fs::read_to_string(path).map_err(|e| EditorError::io(path, &e))?;
        self.rope = Rope::from_str(&normalize_line_endings(&text));
        self.path = Some(path.to_path_buf());
        self.modified = false;
        tracing::info!(path = %path.display(), lines = self.line_count(), "loaded");
        Ok(())
    }

    /// Write the content to `path` and make it the document's file.
    ///
    /// The text goes to a sibling temp file first, which is then renamed over
    /// the target, so a failed write never truncates the existing file. An
    /// existing file keeps its permissions, and a symlink is written through.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        let target = resolve_link(path);
        let existing = fs::metadata(&target).ok();
        if let Some(meta) = &existing
            && meta.permissions().readonly()
        {
            return Err(EditorError::Io {
                path: path.to_path_buf(),
                kind: IoErrorKind::PermissionDenied,
            });
        }

        let tmp = temp_path(&target).ok_or_else(|| EditorError::Io {
            path: path.to_path_buf(),
            kind: IoErrorKind::Other("not a file path".to_string()),
        })?;

        let written = self
            .write_to(&tmp)
            .and_then(|()| match &existing {
                Some(meta) => fs::set_permissions(&tmp, meta.permissions()),
                None => Ok(()),
            })
            .and_then(|()| fs::rename(&tmp, &target));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(EditorError::io(path, &e));
        }

        self.path = Some(path.to_path_buf());
        self.modified = false;
        tracing::info!(path = %path.display(), lines = self.line_count(), "saved");
        Ok(())
    }

    /// Save to the document's own path.
    pub fn save_current(&mut self) -> Result<PathBuf> {
        let path = self.path.clone().ok_or(EditorError::NoFileName)?;
        self.save(&path)?;
        Ok(path)
    }

    fn write_to(&self, tmp: &Path) -> std::io::Result<()> {
        let file = fs::File::create(tmp)?;
        let mut writer = BufWriter::new(file);
        for chunk in self.rope.chunks() {
            writer.write_all(chunk.as_bytes())?;
        }
        writer.flush()?;
        writer.get_ref().sync_all()
    }
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// The file a symlink points at; any other path unchanged.
fn resolve_link(path: &Path) -> PathBuf {
    let is_link = fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink());
    if is_link {
        fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    } else {
        path.to_path_buf()
    }
}

fn temp_path(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_string_lossy();
    Some(path.with_file_name(format!(".{name}.nib-tmp")))
}
