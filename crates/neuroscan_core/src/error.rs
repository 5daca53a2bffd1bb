use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the upload page and its collaborators.
///
/// Every variant is terminal to the operation that raised it only; the page
/// stays usable and the selected file (if any) is kept.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The picker or drop zone refused a file.
    #[error("Unsupported file {name}: {reason}")]
    InvalidFileType { name: String, reason: String },

    /// The analysis backend reported a failure.
    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    /// A session marker exists but cannot be trusted.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UploadError {
    pub(crate) fn invalid_file(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFileType {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type UploadResult<T> = std::result::Result<T, UploadError>;
