use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for file cache operations
#[derive(Debug, Error)]
pub enum FileCacheError {
    #[error("File not accessible: {}: {source}", .path.display())]
    NotAccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read file: {}: {source}", .path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Path not cached: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Stream copy aborted: {}: {source}", .path.display())]
    CopyAborted {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid path {}: {reason}", .path.display())]
    InvalidPath { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl FileCacheError {
    /// Wrap this error into an `io::Error` so it can travel through a reader.
    ///
    /// The kind of the underlying cause is preserved for `CopyAborted`.
    pub fn into_io_error(self) -> io::Error {
        let kind = match &self {
            Self::CopyAborted { source, .. }
            | Self::ReadError { source, .. }
            | Self::NotAccessible { source, .. } => source.kind(),
            Self::NotFound(_) => io::ErrorKind::NotFound,
            Self::InvalidPath { .. } | Self::Config(_) => io::ErrorKind::InvalidInput,
        };
        io::Error::new(kind, self)
    }

    /// True when the error means "nothing cached for this path"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type alias for file cache operations
pub type Result<T> = std::result::Result<T, FileCacheError>;
