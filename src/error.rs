//! Error taxonomy shared by the indexing core and the commands built on it
//!
//! A stale or unreadable cache is absent from this list: the storage layer
//! reports it as `None` and the lookup recovers by rebuilding. Missing
//! arguments are rejected by the argument parser before any of this runs.

use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// An argument was present but unacceptable
    #[error("{0}")]
    Validation(String),

    /// Environment configuration is missing or invalid
    #[error("{0}")]
    Config(String),

    #[error("Line {line} is out of range")]
    OutOfRange { line: u64 },

    /// The cache still disagrees with itself after a fresh rebuild
    #[error("Index cache is corrupt: {0}")]
    CorruptIndex(String),

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("{context}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Error::Io { context: context.into(), source }
    }

    /// True for the error kind produced by either line-locator bounds check
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Error::OutOfRange { .. })
    }
}

/// Attaches a message to an `io::Result`, mirroring `anyhow::Context`
pub(crate) trait IoContext<T> {
    fn io_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn io_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| Error::io(f(), e))
    }
}
