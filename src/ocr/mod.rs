//! OCR and text extraction module.
//!
//! Extracts text from resumes using:
//! - Poppler (`pdfinfo`, `pdftotext`, `pdfimages`, `pdftoppm`) for PDF pages
//! - Tesseract OCR for image files and image-only PDFs
//!
//! Both are injected into [`DocumentExtractor`] through the [`PdfRenderer`]
//! and [`OcrBackend`] traits.

mod backend;
mod extractor;
mod pdf;
mod tesseract;
mod tools;

pub use backend::{OcrBackend, OcrConfig, OcrError, OcrResult};
pub use extractor::{
    DocumentExtractor, DocumentKind, ExtractedText, ExtractionError, ExtractionMethod, PageProbe,
};
pub use pdf::{PdfRenderer, PopplerRenderer};
pub use tesseract::TesseractBackend;
pub use tools::check_binary;
