//! Error taxonomy for snip
//!
//! Every failure in the engine falls into one of three buckets: the pattern
//! could not be compiled, the requested configuration is contradictory, or an
//! input/output operation failed. All of them are fatal to the run; the first
//! one encountered is surfaced to the caller and nothing is retried.

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SnipError>;

#[derive(Debug, Error)]
pub enum SnipError {
    /// No pattern argument was supplied. A pattern is mandatory for every
    /// command.
    #[error("missing pattern")]
    MissingPattern,

    /// The pattern (after inline-flag prefixing) failed to compile.
    #[error("invalid pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A contradictory or malformed configuration: incompatible flags, a
    /// directory argument without --recursive, or a bad field specification.
    #[error("{0}")]
    Config(String),

    /// A filesystem or stream failure: stat, open, read, or write.
    #[error("{}: {source}", .path.as_deref().unwrap_or("<stdin>"))]
    Io {
        path: Option<String>,
        #[source]
        source: io::Error,
    },
}

impl SnipError {
    /// Attach a path to a bare I/O error.
    pub fn io(path: Option<String>, source: io::Error) -> Self {
        SnipError::Io { path, source }
    }
}

impl From<io::Error> for SnipError {
    fn from(source: io::Error) -> Self {
        SnipError::Io { path: None, source }
    }
}
