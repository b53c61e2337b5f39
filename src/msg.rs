use crossterm::event::KeyEvent;
use std::path::PathBuf;

/// Everything the main loop reacts to.
#[derive(Debug)]
pub enum Msg {
    Key(KeyEvent),
    /// New terminal size as (width, height).
    Resize(u16, u16),
}

/// The complete editing command set. Input adapters produce these; the
/// editor consumes them in `Editor::execute`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // -- Text
    InsertChar(char),
    Newline,
    Backspace,
    DeleteForward,
    /// Insert spaces, or indent every line touched by the selection.
    Tab,

    // -- Navigation
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    MoveHome,
    MoveEnd,
    MoveWordLeft,
    MoveWordRight,
    PageUp,
    PageDown,
    /// Raw user input; validated by the cursor.
    GotoLine(String),

    // -- Selection & clipboard
    ToggleSelection,
    SelectAll,
    /// Select the word under (or just before) the cursor.
    SelectWord,
    SelectLine,
    Copy,
    /// Copy the word under the cursor without selecting it.
    CopyWord,
    Cut,
    Paste,

    // -- Search
    Find { query: String, case_sensitive: bool },
    FindNext,
    FindPrevious,
    Replace {
        query: String,
        replacement: String,
        all: bool,
    },

    // -- File
    Save,
    SaveAs(PathBuf),
    /// Replace the document with a file; unsaved changes are discarded.
    Open(PathBuf),

    // -- Session
    /// Quit, or ask for confirmation when there are unsaved changes.
    Quit,
    /// Quit and discard unsaved changes.
    ForceQuit,
    Resize { rows: usize, cols: usize },
}
