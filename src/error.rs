//! Error type shared by the letter generation pipeline.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors that can end a letter generation call.
///
/// Missing or corrupt assets never show up here: they are recovered where they
/// occur and logged. Only faults that leave no usable output are reported.
#[derive(Debug)]
pub enum LetterError {
    /// Neither the configured faces nor a built-in fallback could be loaded.
    FontLoad(genpdf::error::Error),
    /// The page margins leave no room for the header or footer bands.
    Geometry(String),
    /// The typesetting engine failed while laying out or writing the document.
    Render(genpdf::error::Error),
    /// The letter content could not be parsed as JSON.
    Content(serde_json::Error),
    /// The configuration could not be parsed as JSON.
    Config(serde_json::Error),
    /// Reading an input file or writing the output file failed.
    Io {
        /// Path involved in the failed operation.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// A rendered PDF could not be opened for inspection.
    Inspect(lopdf::Error),
}

impl LetterError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for LetterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FontLoad(err) => write!(f, "No usable font face: {err}"),
            Self::Geometry(message) => write!(f, "Invalid page geometry: {message}"),
            Self::Render(err) => write!(f, "Failed to render letter: {err}"),
            Self::Content(err) => write!(f, "Failed to parse letter content: {err}"),
            Self::Config(err) => write!(f, "Failed to parse letter configuration: {err}"),
            Self::Io { path, source } => write!(f, "I/O error on {}: {source}", path.display()),
            Self::Inspect(err) => write!(f, "Failed to inspect PDF: {err}"),
        }
    }
}

impl std::error::Error for LetterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FontLoad(err) | Self::Render(err) => Some(err),
            Self::Content(err) | Self::Config(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Inspect(err) => Some(err),
            Self::Geometry(_) => None,
        }
    }
}

impl From<lopdf::Error> for LetterError {
    fn from(err: lopdf::Error) -> Self {
        Self::Inspect(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn io_error_reports_path_and_source() {
        let err = LetterError::io(
            "/tmp/out.pdf",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/out.pdf"));
        assert!(err.source().is_some());
    }

    #[test]
    fn geometry_error_has_no_source() {
        let err = LetterError::Geometry("top margin too small".into());
        assert!(err.source().is_none());
        assert!(err.to_string().contains("top margin too small"));
    }
}
