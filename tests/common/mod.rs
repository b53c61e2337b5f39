//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use nib::{Clipboard, Command, Document, Editor, Position, Status};

/// An editor over `text` with the cursor placed at (row, col).
pub fn test_editor(text: &str, row: usize, col: usize) -> Editor {
    let mut editor = Editor::new(Document::from_text(text));
    editor.set_cursor(Position::new(row, col));
    editor
}

/// Run each command in order, returning the last status.
pub fn run(editor: &mut Editor, clipboard: &mut Clipboard, commands: &[Command]) -> Status {
    let mut last = None;
    for command in commands {
        last = Some(editor.execute(command.clone(), clipboard));
    }
    last.unwrap_or_else(|| Status {
        summary: editor.summary(),
        notice: None,
    })
}

pub fn lines(editor: &Editor) -> Vec<String> {
    editor.document().lines()
}

pub fn pos(row: usize, col: usize) -> Position {
    Position::new(row, col)
}

pub fn repeat(command: Command, times: usize) -> Vec<Command> {
    vec![command; times]
}
