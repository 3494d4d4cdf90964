//! Error type shared by the index decoder, the index writer and the loader

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while decoding indexes or loading a fortune tree.
#[derive(Debug, Error)]
pub enum FortuneError {
    /// Stat or read failure, passed through untouched.
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("{0} is not a valid fortune file")]
    NotAFortuneFile(PathBuf),
    #[error("no fortune index found at {0}")]
    MissingIndex(PathBuf),
    #[error("index {path} has version {found}, expected {expected}")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
    #[error("index {path} is malformed: {reason}")]
    MalformedIndex { path: PathBuf, reason: String },
    #[error("{path} does not honor the length filter (shortest {shortest}, longest {longest})")]
    LengthFilter {
        path: PathBuf,
        shortest: u32,
        longest: u32,
    },
    #[error("invalid path argument: {0}")]
    InvalidArgument(String),
    #[error("failed to serialize tree: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FortuneError>;

impl FortuneError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        FortuneError::MalformedIndex {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
