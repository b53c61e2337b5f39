use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Classified file-system failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoErrorKind {
    NotFound,
    PermissionDenied,
    DiskFull,
    Other(String),
}

impl IoErrorKind {
    pub fn label(&self) -> &str {
        match self {
            IoErrorKind::NotFound => "file not found",
            IoErrorKind::PermissionDenied => "permission denied",
            IoErrorKind::DiskFull => "disk full",
            IoErrorKind::Other(msg) => msg,
        }
    }
}

impl From<&io::Error> for IoErrorKind {
    fn from(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => IoErrorKind::NotFound,
            io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => {
                IoErrorKind::PermissionDenied
            }
            io::ErrorKind::StorageFull | io::ErrorKind::QuotaExceeded => IoErrorKind::DiskFull,
            _ => IoErrorKind::Other(err.to_string()),
        }
    }
}

/// Every failure the editing core can report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EditorError {
    /// A position outside the document reached a mutation. Always a bug.
    #[error("position {row}:{col} is outside the document")]
    OutOfBounds { row: usize, col: usize },

    #[error("{}: {}", path.display(), kind.label())]
    Io { path: PathBuf, kind: IoErrorKind },

    #[error("\"{0}\" not found")]
    NotFound(String),

    #[error("search query is empty")]
    EmptyQuery,

    #[error("no previous search")]
    NoSearch,

    #[error("invalid line number: {0:?}")]
    InvalidLineNumber(String),

    #[error("no file name (use Save As)")]
    NoFileName,
}

impl EditorError {
    pub fn io(path: &Path, err: &io::Error) -> Self {
        EditorError::Io {
            path: path.to_path_buf(),
            kind: IoErrorKind::from(err),
        }
    }

    pub fn is_defect(&self) -> bool {
        matches!(self, EditorError::OutOfBounds { .. })
    }
}

pub type Result<T> = std::result::Result<T, EditorError>;
