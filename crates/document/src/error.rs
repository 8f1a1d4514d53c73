use std::path::PathBuf;
use thiserror::Error;

/// Result type for document operations
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Errors that can occur while loading or saving a document
#[derive(Error, Debug)]
pub enum DocumentError {
    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Reading or writing a specific file failed
    #[error("{action} {}: {source}", path.display())]
    File {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File content is not valid UTF-8
    #[error("{} is not valid UTF-8 text", path.display())]
    NotUtf8 { path: PathBuf },

    /// A quoted value never reaches its closing quote
    #[error("line {line}: unterminated {quote}-quoted value")]
    UnterminatedQuote { line: usize, quote: &'static str },
}

impl DocumentError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            action: "failed to read",
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            action: "failed to write",
            path: path.into(),
            source,
        }
    }

    /// True when the underlying cause is a missing file.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::IoError(err) | Self::File { source: err, .. } => {
                err.kind() == std::io::ErrorKind::NotFound
            }
            _ => false,
        }
    }
}
