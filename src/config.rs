//! Configuration loading.
//!
//! Settings come from a TOML file, discovered in this order:
//! 1. an explicit path (`--config`)
//! 2. `./resumescan.toml`
//! 3. `<config dir>/resumescan/config.toml`
//!
//! Missing sections fall back to defaults. `GOOGLE_MAPS_API_KEY` in the
//! environment (or `.env`) overrides the geocoder key.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable holding the Google Geocoding API key.
pub const GEOCODER_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

/// Config filename looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "resumescan.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Upload validation rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Accepted file extensions (case-sensitive). Empty accepts anything.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Maximum size in bytes. 0 disables the check.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Reject filenames with characters outside `[A-Za-z0-9 ._-]`.
    #[serde(default)]
    pub check_special_chars_in_file_name: bool,
}

fn default_extensions() -> Vec<String> {
    ["pdf", "jpg", "png"].iter().map(|s| s.to_string()).collect()
}
fn default_max_file_size() -> u64 {
    100_000_000
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            max_file_size: default_max_file_size(),
            check_special_chars_in_file_name: false,
        }
    }
}

/// When a PDF should be re-read with OCR.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OcrFallback {
    /// First page has no text and some page paints an image.
    #[default]
    FirstPage,
    /// Every page has no text and some page paints an image.
    AllPages,
    /// Only pages with no text that paint an image are OCR'd.
    PerPage,
}

/// Text extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Tesseract language.
    #[serde(default = "default_language")]
    pub language: String,
    /// Resolution used when rendering PDF pages for OCR.
    #[serde(default = "default_render_dpi")]
    pub render_dpi: u32,
    #[serde(default)]
    pub ocr_fallback: OcrFallback,
}

fn default_language() -> String {
    "eng".to_string()
}
fn default_render_dpi() -> u32 {
    300
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            render_dpi: default_render_dpi(),
            ocr_fallback: OcrFallback::default(),
        }
    }
}

/// Reverse geocoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Resolve the device location during a scan.
    #[serde(default)]
    pub enabled: bool,
    /// Geocoding endpoint.
    #[serde(default = "default_geocode_endpoint")]
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Device latitude, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Device longitude, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_geocode_endpoint() -> String {
    "https://maps.googleapis.com/maps/api/geocode/json".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_geocode_endpoint(),
            api_key: None,
            latitude: None,
            longitude: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Video recorder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// V4L2 video device.
    #[serde(default = "default_video_device")]
    pub video_device: String,
    /// ALSA audio device. Empty records video only.
    #[serde(default = "default_audio_device")]
    pub audio_device: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_true")]
    pub echo_cancellation: bool,
    /// Recording container and codecs.
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
    /// Filename used for downloads.
    #[serde(default = "default_download_name")]
    pub download_name: String,
}

fn default_video_device() -> String {
    "/dev/video0".to_string()
}
fn default_audio_device() -> String {
    "default".to_string()
}
fn default_width() -> u32 {
    1280
}
fn default_height() -> u32 {
    720
}
fn default_true() -> bool {
    true
}
fn default_mime_type() -> String {
    "video/webm;codecs=vp9,opus".to_string()
}
fn default_download_name() -> String {
    "test.mp4".to_string()
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            video_device: default_video_device(),
            audio_device: default_audio_device(),
            width: default_width(),
            height: default_height(),
            echo_cancellation: default_true(),
            mime_type: default_mime_type(),
            download_name: default_download_name(),
        }
    }
}

/// All settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub validator: ValidatorConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub recorder: RecorderConfig,
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load settings from a specific file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Load settings using the discovery order, then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => discover_config_path(),
        };

        let mut settings = match &path {
            Some(p) => {
                tracing::debug!("Loading config from {}", p.display());
                Self::from_file(p)?
            }
            None => {
                tracing::debug!("No config file found, using defaults");
                Self::default()
            }
        };
        settings.apply_env();
        Ok((settings, path))
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(GEOCODER_KEY_ENV) {
            if !key.trim().is_empty() {
                self.location.api_key = Some(key);
            }
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Find the first existing config file.
pub fn discover_config_path() -> Option<PathBuf> {
    candidate_paths().into_iter().find(|p| p.is_file())
}

fn candidate_paths() -> Vec<PathBuf> {
    [
        Some(PathBuf::from(LOCAL_CONFIG_FILE)),
        dirs::config_dir().map(|d| d.join("resumescan").join("config.toml")),
    ]
    .into_iter()
    .flatten()
    .collect()
}
