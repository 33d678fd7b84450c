//! Document text extraction.
//!
//! PDFs are read through their text layer; when the configured
//! [`OcrFallback`] policy decides the text layer is missing, pages are
//! rendered and OCR'd instead. Images go straight to OCR.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::join_all;
use tempfile::TempDir;
use thiserror::Error;

use super::backend::{OcrBackend, OcrError};
use super::pdf::PdfRenderer;
use crate::config::{ExtractionConfig, OcrFallback};

/// Errors that can occur during text extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error("Extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How the input should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image,
}

impl DocumentKind {
    /// PDFs are recognised by extension; everything else is treated as an image.
    pub fn from_extension(extension: &str) -> Self {
        if extension == "pdf" {
            DocumentKind::Pdf
        } else {
            DocumentKind::Image
        }
    }
}

/// Method used to extract text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMethod {
    /// PDF text layer only.
    PdfText,
    /// OCR of an image file.
    Ocr,
    /// PDF pages rendered and OCR'd.
    PdfOcrFallback,
}

/// Result of text extraction.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub text: String,
    pub method: ExtractionMethod,
    pub page_count: Option<u32>,
}

/// Text layer and image presence for one PDF page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageProbe {
    pub page: u32,
    pub text: String,
    pub has_images: bool,
}

impl PageProbe {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl OcrFallback {
    /// Pages (1-based) that should be re-read with OCR.
    pub fn pages_to_ocr(&self, probes: &[PageProbe]) -> Vec<u32> {
        let any_images = probes.iter().any(|p| p.has_images);
        let all_pages = || -> Vec<u32> { probes.iter().map(|p| p.page).collect() };

        match self {
            OcrFallback::FirstPage => match probes.first() {
                Some(first) if first.is_blank() && any_images => all_pages(),
                _ => Vec::new(),
            },
            OcrFallback::AllPages => {
                if any_images && probes.iter().all(PageProbe::is_blank) {
                    all_pages()
                } else {
                    Vec::new()
                }
            }
            OcrFallback::PerPage => probes
                .iter()
                .filter(|p| p.is_blank() && p.has_images)
                .map(|p| p.page)
                .collect(),
        }
    }
}

/// Extracts text using an injected PDF renderer and OCR backend.
#[derive(Clone)]
pub struct DocumentExtractor {
    renderer: Arc<dyn PdfRenderer>,
    ocr: Arc<dyn OcrBackend>,
    render_dpi: u32,
    fallback: OcrFallback,
}

impl DocumentExtractor {
    pub fn new(renderer: Arc<dyn PdfRenderer>, ocr: Arc<dyn OcrBackend>) -> Self {
        let defaults = ExtractionConfig::default();
        Self {
            renderer,
            ocr,
            render_dpi: defaults.render_dpi,
            fallback: defaults.ocr_fallback,
        }
    }

    pub fn with_config(mut self, config: &ExtractionConfig) -> Self {
        self.render_dpi = config.render_dpi;
        self.fallback = config.ocr_fallback;
        self
    }

    pub fn with_fallback(mut self, fallback: OcrFallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn renderer(&self) -> &dyn PdfRenderer {
        self.renderer.as_ref()
    }

    pub fn ocr(&self) -> &dyn OcrBackend {
        self.ocr.as_ref()
    }

    /// Extract all text from `path`.
    pub async fn extract(
        &self,
        path: &Path,
        kind: DocumentKind,
    ) -> Result<ExtractedText, ExtractionError> {
        match kind {
            DocumentKind::Pdf => self.extract_pdf(path).await,
            DocumentKind::Image => self.extract_image(path).await,
        }
    }

    async fn extract_image(&self, path: &Path) -> Result<ExtractedText, ExtractionError> {
        let ocr = self.ocr.clone();
        let path = path.to_path_buf();
        let result = tokio::task::spawn_blocking(move || ocr.ocr_image(&path)).await??;

        Ok(ExtractedText {
            text: result.text,
            method: ExtractionMethod::Ocr,
            page_count: Some(1),
        })
    }

    async fn extract_pdf(&self, path: &Path) -> Result<ExtractedText, ExtractionError> {
        let renderer = self.renderer.clone();
        let pdf = path.to_path_buf();
        let page_count = tokio::task::spawn_blocking(move || renderer.page_count(&pdf)).await??;
        tracing::debug!("{} has {} pages", path.display(), page_count);

        let probes = self.probe_pages(path, page_count).await?;
        let ocr_pages = self.fallback.pages_to_ocr(&probes);

        if ocr_pages.is_empty() {
            return Ok(ExtractedText {
                text: probes.into_iter().map(|p| p.text).collect(),
                method: ExtractionMethod::PdfText,
                page_count: Some(page_count),
            });
        }

        tracing::info!(
            "No usable text layer on {} page(s) of {}, running OCR",
            ocr_pages.len(),
            path.display()
        );
        let ocr_texts = self.ocr_pages(path, ocr_pages.clone()).await?;

        let mut ocr_texts = ocr_texts.into_iter();
        let text = probes
            .into_iter()
            .map(|probe| {
                if ocr_pages.contains(&probe.page) {
                    ocr_texts.next().unwrap_or_default()
                } else {
                    probe.text
                }
            })
            .collect();

        Ok(ExtractedText {
            text,
            method: ExtractionMethod::PdfOcrFallback,
            page_count: Some(page_count),
        })
    }

    /// Probe every page concurrently and wait for all of them.
    async fn probe_pages(
        &self,
        path: &Path,
        page_count: u32,
    ) -> Result<Vec<PageProbe>, ExtractionError> {
        let tasks = (1..=page_count).map(|page| {
            let renderer = self.renderer.clone();
            let pdf: PathBuf = path.to_path_buf();
            tokio::task::spawn_blocking(move || probe_page(renderer.as_ref(), &pdf, page))
        });

        join_all(tasks)
            .await
            .into_iter()
            .map(|joined| -> Result<PageProbe, ExtractionError> { joined? })
            .collect()
    }

    /// Render and OCR the given pages in order.
    async fn ocr_pages(&self, path: &Path, pages: Vec<u32>) -> Result<Vec<String>, ExtractionError> {
        let renderer = self.renderer.clone();
        let ocr = self.ocr.clone();
        let pdf = path.to_path_buf();
        let dpi = self.render_dpi;

        tokio::task::spawn_blocking(move || -> Result<Vec<String>, ExtractionError> {
            let temp_dir = TempDir::new()?;
            let mut texts = Vec::with_capacity(pages.len());
            for page in pages {
                let image = renderer.render_page(&pdf, page, dpi, temp_dir.path())?;
                let result = ocr.ocr_image(&image)?;
                tracing::debug!(
                    "OCR page {} with {} ({}ms)",
                    page,
                    result.backend,
                    result.processing_time_ms
                );
                texts.push(result.text);
            }
            Ok(texts)
        })
        .await?
    }
}

fn probe_page(
    renderer: &dyn PdfRenderer,
    pdf: &Path,
    page: u32,
) -> Result<PageProbe, ExtractionError> {
    let text = renderer.page_text(pdf, page)?;
    let has_images = renderer.page_has_images(pdf, page).unwrap_or_else(|e| {
        tracing::warn!("Image probe failed for page {}: {}", page, e);
        false
    });
    Ok(PageProbe {
        page,
        text,
        has_images,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(page: u32, text: &str, has_images: bool) -> PageProbe {
        PageProbe {
            page,
            text: text.to_string(),
            has_images,
        }
    }

    #[test]
    fn test_first_page_policy() {
        let policy = OcrFallback::FirstPage;
        assert_eq!(
            policy.pages_to_ocr(&[probe(1, " \x0c", false), probe(2, "text", true)]),
            vec![1, 2]
        );
        assert!(policy
            .pages_to_ocr(&[probe(1, "", false), probe(2, "", false)])
            .is_empty());
        assert!(policy
            .pages_to_ocr(&[probe(1, "text", true), probe(2, "", true)])
            .is_empty());
        assert!(policy.pages_to_ocr(&[]).is_empty());
    }

    #[test]
    fn test_all_pages_policy() {
        let policy = OcrFallback::AllPages;
        assert!(policy
            .pages_to_ocr(&[probe(1, "", true), probe(2, "text", false)])
            .is_empty());
        assert_eq!(
            policy.pages_to_ocr(&[probe(1, "", true), probe(2, "\n", false)]),
            vec![1, 2]
        );
    }

    #[test]
    fn test_per_page_policy() {
        let policy = OcrFallback::PerPage;
        assert_eq!(
            policy.pages_to_ocr(&[
                probe(1, "text", true),
                probe(2, "", true),
                probe(3, "", false),
            ]),
            vec![2]
        );
    }

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(DocumentKind::from_extension("pdf"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_extension("png"), DocumentKind::Image);
        assert_eq!(DocumentKind::from_extension("jpg"), DocumentKind::Image);
    }
}
