//! Resume scan command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use resumescan::config::{LocationConfig, OcrFallback, Settings};
use resumescan::events::{EventKind, ScanEvent};
use resumescan::location::{
    FixedPosition, GoogleGeocoder, LocationResolver, NoPosition, PositionSource,
};
use resumescan::ocr::{DocumentExtractor, OcrConfig, PopplerRenderer, TesseractBackend};
use resumescan::scanner::{ResumeFile, ResumeScanner, ScanReport};
use resumescan::validation::FileValidator;

use super::icons::{error, success};

pub struct ScanOptions {
    pub file: PathBuf,
    pub check_filename: bool,
    pub fallback: Option<OcrFallback>,
    pub locate: bool,
    pub position: Option<(f64, f64)>,
    pub json: bool,
}

/// Scan a resume and print the extracted contact details.
pub async fn cmd_scan(settings: &Settings, options: ScanOptions) -> anyhow::Result<()> {
    let file = ResumeFile::from_path(&options.file)
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", options.file.display(), e))?;

    let mut extraction = settings.extraction.clone();
    if let Some(fallback) = options.fallback {
        extraction.ocr_fallback = fallback;
    }
    let ocr = TesseractBackend::with_config(OcrConfig {
        language: extraction.language.clone(),
    });
    let extractor = DocumentExtractor::new(Arc::new(PopplerRenderer::new()), Arc::new(ocr))
        .with_config(&extraction);

    let mut validator_config = settings.validator.clone();
    validator_config.check_special_chars_in_file_name |= options.check_filename;

    let mut scanner = ResumeScanner::new(extractor)
        .with_validator(FileValidator::from_config(&validator_config))
        .with_file(file);

    if options.locate || settings.location.enabled {
        let mut location = settings.location.clone();
        if let Some((latitude, longitude)) = options.position {
            location.latitude = Some(latitude);
            location.longitude = Some(longitude);
        }
        scanner = scanner.with_location(location_resolver(&location)?);
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    bind_progress(&scanner, &pb, options.json);

    let result = scanner.scan().await;
    pb.finish_and_clear();

    match result {
        Ok(report) if options.json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            if options.json {
                println!("{}", serde_json::json!({ "error": e.event_message() }));
            }
            Err(e.into())
        }
    }
}

fn location_resolver(config: &LocationConfig) -> anyhow::Result<LocationResolver> {
    let position: Box<dyn PositionSource> = match FixedPosition::from_config(config) {
        Some(fixed) => Box::new(fixed),
        None => Box::new(NoPosition),
    };
    let geocoder = GoogleGeocoder::new(config)?;
    Ok(LocationResolver::new(position, Box::new(geocoder)))
}

/// Drive the spinner from scan events.
fn bind_progress(scanner: &ResumeScanner, pb: &ProgressBar, quiet: bool) {
    let spinner = pb.clone();
    scanner.on(EventKind::ScanProgress, move |_| {
        spinner.set_message("Extracting text...");
        spinner.enable_steady_tick(Duration::from_millis(100));
    });

    let spinner = pb.clone();
    scanner.on(EventKind::FoundLocation, move |event| {
        if let ScanEvent::FoundLocation(location) = event {
            spinner.set_message(format!("Located: {}", location));
        }
    });

    let spinner = pb.clone();
    scanner.on(EventKind::Error, move |event| {
        if let ScanEvent::Error { message } = event {
            spinner.finish_and_clear();
            if !quiet {
                eprintln!("{} {}", error(), message);
            }
        }
    });
}

fn print_report(report: &ScanReport) {
    let fields = &report.fields;
    let pages = report
        .page_count
        .map(|n| format!(", {} page(s)", n))
        .unwrap_or_default();
    eprintln!(
        "{} Scan complete ({}{})",
        success(),
        style(format!("{:?}", report.method)).dim(),
        pages
    );

    println!("  {:<10} {}", "Email", display_field(&fields.email));
    println!("  {:<10} {}", "Contact", display_field(&fields.contact));
    println!("  {:<10} {}", "LinkedIn", display_field(&fields.linked_in));

    if let Some(location) = &report.location {
        println!("  {:<10} {}", "Country", display_field(&location.country));
        println!("  {:<10} {}", "State", display_field(&location.state));
        println!("  {:<10} {}", "City", display_field(&location.city));
    }
}

fn display_field(value: &str) -> String {
    if value.is_empty() {
        style("-").dim().to_string()
    } else {
        value.to_string()
    }
}
