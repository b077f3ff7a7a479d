use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the text buffer engine.
///
/// Offset-taking reads never fail (they clamp); everything that can fail
/// reports through this enum. No operation catches an underlying failure
/// and silently mutates state.
#[derive(Debug, Error)]
pub enum Error {
    /// Delete or replace was given a range whose start does not precede
    /// its end (delete additionally rejects empty ranges).
    #[error("invalid range: start must come before end")]
    InvalidRange,

    /// A search produced no match, or replace-all matched zero occurrences.
    #[error("no match found")]
    NotFound,

    /// A regex pattern failed to compile.
    #[error("invalid search pattern: {0}")]
    InvalidPattern(String),

    /// A string was parsed as an EOL sequence but is not one of `"\n"`,
    /// `"\r\n"`, `"\r"`.
    #[error("invalid end-of-line sequence: {0:?}")]
    InvalidEol(String),

    /// Undo was called with an empty past, or redo with an empty future.
    #[error("no edit history in that direction")]
    NoHistory,

    /// Load was asked for a file that does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Any other filesystem failure: open, read, write, create, rename.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
