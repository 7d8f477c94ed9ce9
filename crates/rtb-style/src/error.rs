//! Error types for the stylesheet compiler.

use std::path::PathBuf;

use crate::parser::ParseError;

/// Result type alias for compiler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while compiling a stylesheet.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The stylesheet could not be parsed.
    ///
    /// Holds every lexical error collected by the token source, followed by
    /// the structural error that aborted parsing (if any).
    #[error("{}", summarize(.errors))]
    Parse { errors: Vec<ParseError> },

    /// File I/O error.
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An embedded image asset has an unsupported header.
    #[error("Invalid image '{path}': {message}")]
    InvalidImage { path: PathBuf, message: String },

    /// Stylesheet watcher error.
    #[cfg(feature = "watch")]
    #[error("Watch error: {0}")]
    Watch(String),
}

impl Error {
    /// Create a parse error from collected diagnostics.
    pub fn parse(errors: Vec<ParseError>) -> Self {
        Self::Parse { errors }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an image header error.
    pub fn invalid_image(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidImage {
            path: path.into(),
            message: message.into(),
        }
    }

    /// The located diagnostics carried by this error, if it is a parse error.
    pub fn diagnostics(&self) -> &[ParseError] {
        match self {
            Self::Parse { errors } => errors,
            _ => &[],
        }
    }
}

fn summarize(errors: &[ParseError]) -> String {
    match errors {
        [] => "stylesheet failed to parse".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
    }
}
