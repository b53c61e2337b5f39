//! nib: a small terminal text editor.
//!
//! The editing core (`model`, `editor`) is terminal-agnostic and driven by
//! [`msg::Command`] values; `app` adapts key events and draws with ratatui.

pub mod app;
pub mod cli;
pub mod editor;
pub mod error;
pub mod model;
pub mod msg;

pub use editor::{Editor, Notice, Status};
pub use error::{EditorError, IoErrorKind};
pub use model::clipboard::{ClipKind, Clipboard, ClipboardContent};
pub use model::cursor::Position;
pub use model::document::Document;
pub use model::selection::Span;
pub use msg::Command;
