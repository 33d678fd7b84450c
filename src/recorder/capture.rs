//! Capture device abstraction and recorded media.

use serde::Serialize;

use super::RecorderError;
use crate::config::RecorderConfig;

/// Requested camera and microphone settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaConstraints {
    pub width: u32,
    pub height: u32,
    pub audio: bool,
    pub echo_cancellation: bool,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self::from_config(&RecorderConfig::default())
    }
}

impl MediaConstraints {
    pub fn from_config(config: &RecorderConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            audio: !config.audio_device.is_empty(),
            echo_cancellation: config.echo_cancellation,
        }
    }
}

/// A camera/microphone that can record.
pub trait CaptureDevice: Send {
    fn is_available(&self) -> bool;

    fn availability_hint(&self) -> String;

    /// Acquire the device for preview.
    fn open(&mut self, constraints: &MediaConstraints) -> Result<(), RecorderError>;

    /// Begin recording in the given container/codec.
    fn start_recording(&mut self, mime_type: &str) -> Result<(), RecorderError>;

    /// Stop recording and hand back the recorded data chunks.
    fn stop_recording(&mut self) -> Result<Vec<Vec<u8>>, RecorderError>;

    /// Release all tracks.
    fn close(&mut self);
}

/// Recorded media with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl Blob {
    pub fn from_chunks(chunks: &[Vec<u8>], mime_type: &str) -> Self {
        Self {
            data: chunks.concat(),
            mime_type: mime_type.to_string(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// A blob ready to be saved under a fixed filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub blob: Blob,
}
