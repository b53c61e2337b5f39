//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;

use crate::error::{EditorError, IoErrorKind};
use crate::model::document::Document;

/// A small terminal text editor
#[derive(Parser, Debug)]
#[command(name = "nib", version, about = "A small terminal text editor")]
pub struct CliArgs {
    /// File to open (created on first save if it does not exist)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,
}

impl CliArgs {
    /// Build the startup document.
    ///
    /// A missing file becomes an empty document bound to that path; any
    /// other read failure is returned and aborts startup.
    pub fn open_document(&self) -> Result<Document, EditorError> {
        let Some(path) = &self.path else {
            return Ok(Document::new());
        };

        match Document::open(path) {
            Ok(doc) => Ok(doc),
            Err(EditorError::Io {
                kind: IoErrorKind::NotFound,
                ..
            }) => {
                tracing::info!(path = %path.display(), "new file");
                Ok(Document::with_path(path.clone()))
            }
            Err(err) => Err(err),
        }
    }
}
