//! External tool status.

use std::path::Path;

use console::style;

use resumescan::config::{Settings, GEOCODER_KEY_ENV};
use resumescan::location::{GoogleGeocoder, ReverseGeocoder};
use resumescan::ocr::{check_binary, OcrBackend, OcrConfig, PopplerRenderer, TesseractBackend};

use super::icons::{error, pending, success};

/// Report which external tools and services are usable.
pub async fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    println!("\n{}", style("Tool Status").bold());
    println!("{}", "-".repeat(50));

    println!("\n{}", style("PDF Tools (poppler-utils):").cyan());
    let mut all_found = true;
    for (tool, available) in PopplerRenderer::check_tools() {
        let status = if available {
            style("✓ found").green()
        } else {
            all_found = false;
            style("✗ not found").red()
        };
        println!("  {:<15} {}", tool, status);
    }

    println!("\n{}", style("OCR:").cyan());
    let tesseract = TesseractBackend::with_config(OcrConfig {
        language: settings.extraction.language.clone(),
    });
    if tesseract.is_available() {
        println!(
            "  {:<15} {} ({})",
            "Tesseract",
            style("✓ available").green(),
            tesseract.language()
        );
    } else {
        all_found = false;
        println!("  {:<15} {}", "Tesseract", style("✗ not available").red());
        println!(
            "                  {}",
            style(tesseract.availability_hint()).dim()
        );
    }
    println!(
        "  {:<15} {}",
        "Fallback",
        style(format!("{:?}", settings.extraction.ocr_fallback)).dim()
    );

    println!("\n{}", style("Recorder:").cyan());
    let ffmpeg = if check_binary("ffmpeg") {
        style("✓ found").green()
    } else {
        style("✗ not found").red()
    };
    println!("  {:<15} {}", "ffmpeg", ffmpeg);
    let device = &settings.recorder.video_device;
    let device_status = if Path::new(device).exists() {
        style("✓ present").green()
    } else {
        style("✗ missing").red()
    };
    println!("  {:<15} {}", device, device_status);

    println!("\n{}", style("Location:").cyan());
    let geocoder = GoogleGeocoder::new(&settings.location)?;
    if geocoder.is_available() {
        println!("  {:<15} {}", "Geocoder", style("✓ configured").green());
    } else {
        println!("  {:<15} {}", "Geocoder", style("○ no API key").yellow());
        println!("                  {}", style(format!("Set {}", GEOCODER_KEY_ENV)).dim());
    }
    let position = match (settings.location.latitude, settings.location.longitude) {
        (Some(lat), Some(lon)) => style(format!("{}, {}", lat, lon)).green(),
        _ => style("not set (use --lat/--lon)".to_string()).dim(),
    };
    println!("  {:<15} {}", "Position", position);

    println!();
    if all_found {
        println!("{} Resume scanning is ready", success());
    } else {
        println!("{} Resume scanning needs missing tools", error());
        println!(
            "  {} Install with: apt install poppler-utils tesseract-ocr",
            pending()
        );
    }

    Ok(())
}
