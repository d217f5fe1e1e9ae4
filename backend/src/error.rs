use crate::docx::DocxError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Docx(#[from] DocxError),

    /// Only raised in strict mode; otherwise a missing marker skips the step.
    #[error("template has no {0} marker")]
    MissingMarker(String),

    #[error("sample '{name}' could not be parsed: {reason}")]
    Sample { name: String, reason: String },
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }
}
