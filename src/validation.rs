//! Upload validation: extension, size and filename rules.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::ValidatorConfig;

/// Longest filename accepted when the filename check is enabled.
pub const MAX_FILE_NAME_LEN: usize = 255;

const FILE_NAME_MESSAGE: &str = "Problem found with filename. Allowed characters: letters, numbers, _ or -. Note: Dash (-) can be used anywhere except beginning of filename. Filename length can't be longer than 255 characters.";

static FILE_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9 ._-]+\.[a-zA-Z0-9]{2,15}$").expect("filename regex should compile")
});

/// Anything with a name and a size in bytes.
pub trait FileDescriptor {
    fn name(&self) -> &str;
    fn size(&self) -> u64;
}

/// Outcome of validating one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub success: bool,
    pub message: String,
    pub extension_error: bool,
    pub file_size_error: bool,
    pub file_name_has_special_chars: bool,
}

/// Validates uploaded files against configured rules.
#[derive(Debug, Clone)]
pub struct FileValidator {
    extensions: Vec<String>,
    max_file_size: u64,
    check_special_chars: bool,
}

impl Default for FileValidator {
    fn default() -> Self {
        Self::from_config(&ValidatorConfig::default())
    }
}

impl FileValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ValidatorConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            max_file_size: config.max_file_size,
            check_special_chars: config.check_special_chars_in_file_name,
        }
    }

    /// Enable or disable the filename character check.
    pub fn with_file_name_check(mut self, enabled: bool) -> Self {
        self.check_special_chars = enabled;
        self
    }

    pub fn with_extensions<S: AsRef<str>>(mut self, extensions: &[S]) -> Self {
        self.extensions = extensions.iter().map(|e| e.as_ref().to_string()).collect();
        self
    }

    /// Set the size limit in bytes; 0 disables the check.
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Restore default rules.
    pub fn reset(&mut self) {
        let check = self.check_special_chars;
        *self = Self::default();
        self.check_special_chars = check;
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Validate a file. Each rule is checked independently.
    pub fn validate<F: FileDescriptor + ?Sized>(&self, file: &F) -> ValidationResult {
        let name = file.name();
        let mut result = ValidationResult::default();

        if self.check_special_chars && has_special_chars(name) {
            result.file_name_has_special_chars = true;
        }

        let extension = file_extension(name);
        if !self.extensions.is_empty() && !self.extensions.iter().any(|e| e == extension) {
            result.extension_error = true;
        }

        if self.max_file_size > 0 && file.size() > self.max_file_size {
            result.file_size_error = true;
        }

        result.success = !(result.extension_error
            || result.file_size_error
            || result.file_name_has_special_chars);
        if !result.success {
            result.message = self.error_message(&result);
        }
        result
    }

    /// Filename problems take precedence over size, size over extension.
    fn error_message(&self, result: &ValidationResult) -> String {
        if result.file_name_has_special_chars {
            FILE_NAME_MESSAGE.to_string()
        } else if result.file_size_error {
            format!(
                "File size cannot be larger than {}mb.",
                self.max_file_size / 1_000_000
            )
        } else if result.extension_error {
            let verb = if self.extensions.len() == 1 { "is" } else { "are" };
            format!(
                "Only {} {} accepted. Please try again.",
                self.extensions.join(","),
                verb
            )
        } else {
            String::new()
        }
    }
}

/// Text after the last `.`, or the whole name when there is none.
pub fn file_extension(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// True when `name` breaks the filename rules.
pub fn has_special_chars(name: &str) -> bool {
    name.starts_with('-') || name.len() > MAX_FILE_NAME_LEN || !FILE_NAME_PATTERN.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upload(&'static str, u64);

    impl FileDescriptor for Upload {
        fn name(&self) -> &str {
            self.0
        }
        fn size(&self) -> u64 {
            self.1
        }
    }

    #[test]
    fn test_accepts_allowed_file() {
        let result = FileValidator::new().validate(&Upload("resume.pdf", 1024));
        assert!(result.success);
        assert!(result.message.is_empty());
    }

    #[test]
    fn test_unsupported_extension_sets_only_extension_flag() {
        for name in ["resume.docx", "resume.txt", "resume", "resume.PDF"] {
            let result = FileValidator::new().validate(&Upload(name, 10));
            assert!(!result.success, "{name}");
            assert!(result.extension_error, "{name}");
            assert!(!result.file_size_error, "{name}");
            assert!(!result.file_name_has_special_chars, "{name}");
            assert_eq!(
                result.message,
                "Only pdf,jpg,png are accepted. Please try again."
            );
        }
    }

    #[test]
    fn test_single_extension_message() {
        let validator = FileValidator::new().with_extensions(&["pdf"]);
        let result = validator.validate(&Upload("photo.png", 10));
        assert_eq!(result.message, "Only pdf is accepted. Please try again.");
    }

    #[test]
    fn test_oversized_file_reports_size_message() {
        let validator = FileValidator::new();
        for name in ["big.pdf", "big.exe"] {
            let result = validator.validate(&Upload(name, 100_000_001));
            assert!(result.file_size_error);
            assert_eq!(result.message, "File size cannot be larger than 100mb.");
        }

        let both = validator.validate(&Upload("big.exe", 200_000_000));
        assert!(both.extension_error && both.file_size_error);
    }

    #[test]
    fn test_size_at_limit_is_accepted() {
        let result = FileValidator::new().validate(&Upload("cv.jpg", 100_000_000));
        assert!(result.success);
    }

    #[test]
    fn test_filename_check_only_when_enabled() {
        let upload = Upload("-resume.pdf", 10);
        assert!(FileValidator::new().validate(&upload).success);

        let result = FileValidator::new()
            .with_file_name_check(true)
            .validate(&upload);
        assert!(result.file_name_has_special_chars);
        assert_eq!(result.message, FILE_NAME_MESSAGE);
    }

    #[test]
    fn test_special_char_rules() {
        assert!(!has_special_chars("my resume_v2-final.pdf"));
        assert!(has_special_chars("-resume.pdf"));
        assert!(has_special_chars("résumé.pdf"));
        assert!(has_special_chars("resume.p"));
        assert!(has_special_chars("resume"));
        let long = format!("{}.pdf", "a".repeat(252));
        assert!(has_special_chars(&long));
    }

    #[test]
    fn test_disabled_rules() {
        let validator = FileValidator::new()
            .with_extensions::<&str>(&[])
            .with_max_file_size(0);
        assert!(validator.validate(&Upload("anything.bin", u64::MAX)).success);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut validator = FileValidator::new()
            .with_extensions(&["pdf"])
            .with_max_file_size(5);
        validator.reset();
        assert_eq!(validator.extensions(), ["pdf", "jpg", "png"]);
        assert_eq!(validator.max_file_size(), 100_000_000);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("a.b.pdf"), "pdf");
        assert_eq!(file_extension("noext"), "noext");
        assert_eq!(file_extension("trailing."), "");
    }
}
