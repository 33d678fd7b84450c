//! PDF page access: text, embedded images and rasterisation.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::extractor::ExtractionError;
use super::tools::{check_binary, find_page_image, handle_cmd_output};

const POPPLER_TOOLS: [&str; 4] = ["pdfinfo", "pdftotext", "pdfimages", "pdftoppm"];
const POPPLER_HINT: &str = "install poppler-utils";

/// Per-page PDF operations used by the extractor.
pub trait PdfRenderer: Send + Sync {
    fn is_available(&self) -> bool;

    fn availability_hint(&self) -> String;

    fn page_count(&self, pdf: &Path) -> Result<u32, ExtractionError>;

    /// Text layer of a single page (1-based).
    fn page_text(&self, pdf: &Path, page: u32) -> Result<String, ExtractionError>;

    /// Whether the page paints any image.
    fn page_has_images(&self, pdf: &Path, page: u32) -> Result<bool, ExtractionError>;

    /// Rasterise a page to a PNG inside `out_dir`, returning its path.
    fn render_page(
        &self,
        pdf: &Path,
        page: u32,
        dpi: u32,
        out_dir: &Path,
    ) -> Result<PathBuf, ExtractionError>;
}

/// [`PdfRenderer`] backed by the Poppler command-line tools.
#[derive(Debug, Default, Clone)]
pub struct PopplerRenderer;

impl PopplerRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Tool names paired with whether each is installed.
    pub fn check_tools() -> Vec<(String, bool)> {
        POPPLER_TOOLS
            .iter()
            .map(|tool| (tool.to_string(), check_binary(tool)))
            .collect()
    }
}

impl PdfRenderer for PopplerRenderer {
    fn is_available(&self) -> bool {
        POPPLER_TOOLS.iter().all(|tool| check_binary(tool))
    }

    fn availability_hint(&self) -> String {
        let missing: Vec<&str> = POPPLER_TOOLS
            .iter()
            .copied()
            .filter(|tool| !check_binary(tool))
            .collect();
        if missing.is_empty() {
            "Poppler tools are available".to_string()
        } else {
            format!(
                "Missing {}. Install with: apt install poppler-utils",
                missing.join(", ")
            )
        }
    }

    fn page_count(&self, pdf: &Path) -> Result<u32, ExtractionError> {
        let output = Command::new("pdfinfo").arg(pdf).output();
        let stdout = handle_cmd_output(
            output,
            &format!("pdfinfo ({})", POPPLER_HINT),
            "pdfinfo failed",
        )?;
        parse_page_count(&stdout).ok_or_else(|| {
            ExtractionError::ExtractionFailed("pdfinfo reported no page count".to_string())
        })
    }

    fn page_text(&self, pdf: &Path, page: u32) -> Result<String, ExtractionError> {
        let page_str = page.to_string();
        let output = Command::new("pdftotext")
            .args(["-layout", "-enc", "UTF-8", "-f", &page_str, "-l", &page_str])
            .arg(pdf)
            .arg("-") // Output to stdout
            .output();

        handle_cmd_output(
            output,
            &format!("pdftotext ({})", POPPLER_HINT),
            &format!("pdftotext failed on page {}", page),
        )
    }

    fn page_has_images(&self, pdf: &Path, page: u32) -> Result<bool, ExtractionError> {
        let page_str = page.to_string();
        let output = Command::new("pdfimages")
            .args(["-list", "-f", &page_str, "-l", &page_str])
            .arg(pdf)
            .output();

        let listing = handle_cmd_output(
            output,
            &format!("pdfimages ({})", POPPLER_HINT),
            &format!("pdfimages failed on page {}", page),
        )?;
        Ok(count_listed_images(&listing) > 0)
    }

    fn render_page(
        &self,
        pdf: &Path,
        page: u32,
        dpi: u32,
        out_dir: &Path,
    ) -> Result<PathBuf, ExtractionError> {
        let page_str = page.to_string();
        let dpi_str = dpi.to_string();
        let status = Command::new("pdftoppm")
            .args(["-png", "-r", &dpi_str, "-f", &page_str, "-l", &page_str])
            .arg(pdf)
            .arg(out_dir.join("page"))
            .output();

        handle_cmd_output(
            status,
            &format!("pdftoppm ({})", POPPLER_HINT),
            &format!("pdftoppm failed to convert page {}", page),
        )?;

        find_page_image(out_dir, "page", page).ok_or_else(|| {
            ExtractionError::ExtractionFailed(format!("No image generated for page {}", page))
        })
    }
}

/// Read the `Pages:` line from pdfinfo output.
fn parse_page_count(pdfinfo: &str) -> Option<u32> {
    pdfinfo
        .lines()
        .find(|line| line.starts_with("Pages:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|count| count.parse().ok())
}

/// Count image rows in `pdfimages -list` output (after the two header lines).
fn count_listed_images(listing: &str) -> usize {
    listing
        .lines()
        .skip(2)
        .filter(|line| !line.trim().is_empty())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_count() {
        let info = "Title:          Resume\nProducer:       LaTeX\nPages:          3\nEncrypted:      no\n";
        assert_eq!(parse_page_count(info), Some(3));
        assert_eq!(parse_page_count("Title: x\n"), None);
    }

    #[test]
    fn test_count_listed_images() {
        let none = "page   num  type   width height color comp bpc  enc interp  object ID x-ppi y-ppi size ratio\n\
                    --------------------------------------------------------------------------------------------\n";
        assert_eq!(count_listed_images(none), 0);

        let one = format!(
            "{}   1     0 image    2480  3508  rgb     3   8  jpeg   no        12  0   300   300  412K 1.6%\n",
            none
        );
        assert_eq!(count_listed_images(&one), 1);
    }

    #[test]
    fn test_check_tools_lists_poppler() {
        let tools = PopplerRenderer::check_tools();
        assert_eq!(tools.len(), POPPLER_TOOLS.len());
    }
}
