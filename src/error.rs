//! Top-level scan errors.

use thiserror::Error;

use crate::ocr::ExtractionError;

/// Message reported when a required capability is unavailable.
pub const MISSING_DEPENDENCIES: &str = "Failed to initiate resumeParser library. Missing dependencies.";

/// Message reported when a scan is started without a file.
pub const MISSING_FILE: &str = "Missing file stream.";

/// Errors surfaced by [`ResumeScanner`](crate::scanner::ResumeScanner).
///
/// Every variant is also emitted as an `Error` event before being returned.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A PDF renderer, OCR engine or geocoder is not usable.
    #[error("{MISSING_DEPENDENCIES} {hints}")]
    MissingDependency { hints: String },

    #[error("{MISSING_FILE}")]
    MissingFile,

    /// The file failed extension, size or filename validation.
    #[error("{0}")]
    InvalidFile(String),

    #[error("Processing failed: {0}")]
    ProcessingFailure(#[from] ExtractionError),
}

impl ScanError {
    /// The message carried by the `Error` event for this failure.
    pub fn event_message(&self) -> String {
        match self {
            ScanError::MissingDependency { .. } => MISSING_DEPENDENCIES.to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_messages() {
        let missing = ScanError::MissingDependency {
            hints: "install poppler-utils".to_string(),
        };
        assert_eq!(
            missing.event_message(),
            "Failed to initiate resumeParser library. Missing dependencies."
        );
        assert!(missing.to_string().ends_with("install poppler-utils"));
        assert_eq!(ScanError::MissingFile.event_message(), "Missing file stream.");
    }
}
