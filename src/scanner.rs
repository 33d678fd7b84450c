//! Resume scan orchestration.
//!
//! [`ResumeScanner`] owns the event bus, the injected capability clients and
//! the validation rules. A scan runs: dependency check, validation, text
//! extraction (alongside location lookup), then field extraction.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ScanError;
use crate::events::{EventBus, EventKind, ScanEvent};
use crate::fields::ExtractionResult;
use crate::location::{LocationData, LocationResolver};
use crate::ocr::{DocumentExtractor, DocumentKind, ExtractedText, ExtractionMethod};
use crate::validation::{file_extension, FileDescriptor, FileValidator};

/// A resume on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeFile {
    name: String,
    size: u64,
    path: PathBuf,
}

impl ResumeFile {
    /// Describe the file at `path` from its metadata.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            name,
            size: metadata.len(),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn extension(&self) -> &str {
        file_extension(&self.name)
    }

    /// MIME type sniffed from the file contents.
    pub fn sniff_mime_type(&self) -> Option<&'static str> {
        infer::get_from_path(&self.path)
            .ok()
            .flatten()
            .map(|kind| kind.mime_type())
    }
}

impl FileDescriptor for ResumeFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// Everything a successful scan produced.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub fields: ExtractionResult,
    pub method: ExtractionMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationData>,
}

/// Scans one resume, reporting progress through its [`EventBus`].
pub struct ResumeScanner {
    events: EventBus,
    validator: FileValidator,
    extractor: DocumentExtractor,
    location: Option<LocationResolver>,
    file: Option<ResumeFile>,
}

impl ResumeScanner {
    pub fn new(extractor: DocumentExtractor) -> Self {
        Self {
            events: EventBus::new(),
            validator: FileValidator::default(),
            extractor,
            location: None,
            file: None,
        }
    }

    pub fn with_validator(mut self, validator: FileValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Also resolve the device location during scans.
    pub fn with_location(mut self, resolver: LocationResolver) -> Self {
        self.location = Some(resolver);
        self
    }

    pub fn with_file(mut self, file: ResumeFile) -> Self {
        self.file = Some(file);
        self
    }

    /// Share an existing event bus.
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Register a listener, replacing any existing one for `kind`.
    pub fn on<F>(&self, kind: EventKind, listener: F)
    where
        F: Fn(&ScanEvent) + Send + Sync + 'static,
    {
        self.events.on(kind, listener);
    }

    pub fn off(&self, kind: EventKind) {
        self.events.off(kind);
    }

    /// Verify every injected capability is usable.
    pub fn check_dependencies(&self) -> Result<(), ScanError> {
        let mut hints = Vec::new();

        let renderer = self.extractor.renderer();
        if !renderer.is_available() {
            hints.push(renderer.availability_hint());
        }
        let ocr = self.extractor.ocr();
        if !ocr.is_available() {
            hints.push(ocr.availability_hint());
        }
        if let Some(resolver) = &self.location {
            if !resolver.geocoder().is_available() {
                hints.push(resolver.geocoder().availability_hint());
            }
        }

        if hints.is_empty() {
            Ok(())
        } else {
            Err(ScanError::MissingDependency {
                hints: hints.join("; "),
            })
        }
    }

    /// Run a full scan of the configured file.
    pub async fn scan(&self) -> Result<ScanReport, ScanError> {
        self.check_dependencies().map_err(|e| self.fail(e))?;

        let file = self
            .file
            .as_ref()
            .ok_or_else(|| self.fail(ScanError::MissingFile))?;

        let validation = self.validator.validate(file);
        if !validation.success {
            return Err(self.fail(ScanError::InvalidFile(validation.message)));
        }

        let kind = DocumentKind::from_extension(file.extension());
        if let Some(mime) = file.sniff_mime_type() {
            tracing::debug!("{} sniffed as {}", file.name(), mime);
        }

        tracing::info!("Scanning {} ({:?})", file.path().display(), kind);
        self.events.trigger(&ScanEvent::ScanProgress);

        let (extracted, location) = tokio::join!(
            self.extractor.extract(file.path(), kind),
            self.resolve_location()
        );
        let ExtractedText {
            text,
            method,
            page_count,
        } = extracted.map_err(|e| self.fail(e.into()))?;

        let fields = ExtractionResult::from_text(&text);
        tracing::info!(
            "Extracted {} chars via {:?}; email={:?} contact={:?} linkedin={:?}",
            text.len(),
            method,
            fields.email,
            fields.contact,
            fields.linked_in
        );
        self.events.trigger(&ScanEvent::ScanComplete(fields.clone()));

        Ok(ScanReport {
            fields,
            method,
            page_count,
            location,
        })
    }

    async fn resolve_location(&self) -> Option<LocationData> {
        let location = self.location.as_ref()?.resolve().await?;
        self.events
            .trigger(&ScanEvent::FoundLocation(location.clone()));
        Some(location)
    }

    /// Log and emit an error before handing it back.
    fn fail(&self, err: ScanError) -> ScanError {
        tracing::error!("{}", err);
        self.events.trigger(&ScanEvent::error(err.event_message()));
        err
    }
}
