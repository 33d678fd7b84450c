//! Helpers for driving external command-line tools.

use std::path::{Path, PathBuf};

use super::extractor::ExtractionError;

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Handle command output, extracting stdout on success or returning appropriate error.
pub fn handle_cmd_output(
    result: std::io::Result<std::process::Output>,
    tool_name: &str,
    error_prefix: &str,
) -> Result<String, ExtractionError> {
    match result {
        Ok(output) => {
            if output.status.success() {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(ExtractionError::ExtractionFailed(format!(
                    "{}: {}",
                    error_prefix,
                    stderr.trim()
                )))
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ExtractionError::ToolNotFound(tool_name.to_string()))
        }
        Err(e) => Err(ExtractionError::Io(e)),
    }
}

/// Find the image pdftoppm wrote for `page`.
///
/// pdftoppm pads the page number to the width of the page count, so
/// `page-1.png`, `page-01.png` and `page-001.png` are all possible.
pub fn find_page_image(dir: &Path, prefix: &str, page: u32) -> Option<PathBuf> {
    (1..=4)
        .map(|digits| dir.join(format!("{}-{:0width$}.png", prefix, page, width = digits)))
        .find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_page_image_padding() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page-003.png"), b"").unwrap();

        assert_eq!(
            find_page_image(dir.path(), "page", 3),
            Some(dir.path().join("page-003.png"))
        );
        assert_eq!(find_page_image(dir.path(), "page", 4), None);
    }

    #[test]
    fn test_missing_tool_maps_to_tool_not_found() {
        let result = std::process::Command::new("resumescan-no-such-tool").output();
        let err = handle_cmd_output(result, "resumescan-no-such-tool", "failed").unwrap_err();
        assert!(matches!(err, ExtractionError::ToolNotFound(_)));
    }

    #[test]
    fn test_check_binary_missing() {
        assert!(!check_binary("resumescan-no-such-tool"));
    }
}
