//! Contact field extraction from resume text.
//!
//! Three fixed patterns are searched independently and the first match in
//! document order wins. A field with no match is an empty string.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// `A-z` in the first domain alternative also spans `[\]^_` and the backtick.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[a-z][a-z0-9._-]+@(?:(?:[a-zA-z]+\.[a-z]{2,3})|(?:[a-z0-9._-]+\.[a-z0-9_-]+))",
    )
    .expect("email regex should compile")
});

static LEADING_NON_LETTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^a-zA-Z]+").expect("prefix regex should compile"));

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\s+?\+[0-9]{2}-)?(\s+0)?[6-9][0-9]{9}").expect("phone regex should compile")
});

static LINKEDIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s?linkedin\.com/in/[a-zA-Z-]+(?:[0-9a-zA-Z]{0,9})?")
        .expect("linkedin regex should compile")
});

/// Contact details found in a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub email: String,
    pub contact: String,
    #[serde(rename = "linkedIn")]
    pub linked_in: String,
}

impl ExtractionResult {
    /// Run all three extractors over `text`.
    pub fn from_text(text: &str) -> Self {
        Self {
            email: extract_email(text),
            contact: extract_contact(text),
            linked_in: extract_linkedin(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_empty() && self.contact.is_empty() && self.linked_in.is_empty()
    }
}

/// First email address in `text`.
pub fn extract_email(text: &str) -> String {
    EMAIL_PATTERN
        .find(text)
        .map(|m| LEADING_NON_LETTERS.replace(m.as_str(), "").into_owned())
        .unwrap_or_default()
}

/// First phone number in `text`, including any country-code prefix.
pub fn extract_contact(text: &str) -> String {
    PHONE_PATTERN
        .find(text)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// First `linkedin.com/in/...` profile path in `text`.
pub fn extract_linkedin(text: &str) -> String {
    LINKEDIN_PATTERN
        .find(text)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_after_label() {
        assert_eq!(
            extract_email("Contact: john.doe@example.com"),
            "john.doe@example.com"
        );
    }

    #[test]
    fn test_email_first_match_wins() {
        let text = "a.b@first.org then second@other.io";
        assert_eq!(extract_email(text), "a.b@first.org");
    }

    #[test]
    fn test_email_requires_leading_letter() {
        assert_eq!(extract_email("mail 12345@example.com"), "");
        assert_eq!(extract_email("mail x12345@example.com"), "x12345@example.com");
    }

    #[test]
    fn test_email_case_insensitive() {
        assert_eq!(extract_email("JANE@EXAMPLE.COM"), "JANE@EXAMPLE.COM");
    }

    #[test]
    fn test_phone_with_country_code() {
        assert_eq!(extract_contact("Phone: +91-9876543210"), "+91-9876543210");
    }

    #[test]
    fn test_phone_bare_digits() {
        assert_eq!(extract_contact("+91-9876543210"), "9876543210");
        assert_eq!(extract_contact("call 9123456789 now"), "9123456789");
    }

    #[test]
    fn test_phone_leading_zero() {
        assert_eq!(extract_contact("tel 09876543210"), "09876543210");
        assert_eq!(extract_contact("tel:09876543210"), "9876543210");
    }

    #[test]
    fn test_phone_must_start_six_to_nine() {
        assert_eq!(extract_contact("id 1234567890"), "");
        assert_eq!(extract_contact("id 5123456789"), "");
    }

    #[test]
    fn test_linkedin_exact_substring() {
        assert_eq!(
            extract_linkedin("see linkedin.com/in/jane-doe123 for more"),
            "linkedin.com/in/jane-doe123"
        );
        assert_eq!(
            extract_linkedin("https://www.linkedin.com/in/john/"),
            "linkedin.com/in/john"
        );
    }

    #[test]
    fn test_no_matches_are_empty_strings() {
        let result = ExtractionResult::from_text("nothing useful here");
        assert_eq!(result, ExtractionResult::default());
        assert!(result.is_empty());

        assert!(ExtractionResult::from_text("").is_empty());
    }

    #[test]
    fn test_full_resume_text() {
        let text = "Jane Doe\nSoftware Engineer\n\
                    jane.doe@mail.com | +91-9988776655\n\
                    linkedin.com/in/janedoe42\n";
        let result = ExtractionResult::from_text(text);
        assert_eq!(result.email, "jane.doe@mail.com");
        assert_eq!(result.contact, "+91-9988776655");
        assert_eq!(result.linked_in, "linkedin.com/in/janedoe42");
    }

    #[test]
    fn test_email_domain_accepts_punctuation_between_cases() {
        assert_eq!(extract_email("mail ab@x^y.com now"), "ab@x^y.com");
        assert_eq!(extract_email("ab@x_y.org"), "ab@x_y.org");
    }

    #[test]
    fn test_serializes_linkedin_in_camel_case() {
        let json = serde_json::to_value(ExtractionResult::from_text("jo@y.com")).unwrap();
        assert_eq!(json["email"], "jo@y.com");
        assert!(json.get("linkedIn").is_some());
    }
}
