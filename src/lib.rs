//! ResumeScan - resume contact extraction and video recording controls.
//!
//! Pulls an email address, phone number and LinkedIn profile URL out of a
//! resume (PDF text layer, falling back to OCR for scanned documents),
//! optionally tags the scan with the device location, and drives a simple
//! camera recorder.

pub mod config;
pub mod error;
pub mod events;
pub mod fields;
pub mod location;
pub mod ocr;
pub mod recorder;
pub mod scanner;
pub mod validation;

pub use config::{OcrFallback, Settings};
pub use error::ScanError;
pub use events::{EventBus, EventKind, ScanEvent};
pub use fields::ExtractionResult;
pub use location::{LocationData, LocationResolver};
pub use scanner::{ResumeFile, ResumeScanner, ScanReport};
pub use validation::{FileValidator, ValidationResult};
