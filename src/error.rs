//! Error types for the parse pipeline and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while turning a file into a [`ParseResult`](crate::ParseResult).
///
/// Every variant is terminal for the file it names.
#[derive(Debug, Error)]
pub enum Error {
    /// The file extension has no known grammar.
    #[error("unsupported file type: {}", path.display())]
    UnsupportedLanguage { path: PathBuf },

    /// The parser rejected the source.
    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is unreadable or invalid.
    #[error("invalid config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

impl Error {
    /// The file this error is about.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Error::UnsupportedLanguage { path }
            | Error::Parse { path, .. }
            | Error::Io { path, .. }
            | Error::Config { path, .. } => path,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
