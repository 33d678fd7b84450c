//! Video recorder controls.
//!
//! [`Recorder`] is the state machine behind the record/play/download
//! buttons:
//!
//! ```text
//! Idle --request_camera--> Previewing --toggle_record--> Recording
//!   Recording --toggle_record--> Stopped --play--> Playing
//! ```
//!
//! The camera can be reopened from any state except Recording. Actions that
//! are not enabled in the current state are rejected.

mod capture;
mod ffmpeg;
mod timer;

use thiserror::Error;

pub use capture::{Blob, CaptureDevice, Download, MediaConstraints};
pub use ffmpeg::FfmpegCapture;
pub use timer::ElapsedTimer;

use crate::config::RecorderConfig;

/// MIME type used for in-app playback.
pub const PLAYBACK_MIME_TYPE: &str = "video/webm";

/// MIME type attached to downloads.
pub const DOWNLOAD_MIME_TYPE: &str = "video/mp4";

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("Capture device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Capture failed: {0}")]
    Capture(String),

    #[error("Cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: RecorderState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Previewing,
    Recording,
    Stopped,
    Playing,
}

impl RecorderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecorderState::Idle => "idle",
            RecorderState::Previewing => "previewing",
            RecorderState::Recording => "recording",
            RecorderState::Stopped => "stopped",
            RecorderState::Playing => "playing",
        }
    }
}

impl std::fmt::Display for RecorderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Label on the record button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLabel {
    Start,
    Stop,
}

/// Which buttons are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub record_label: RecordLabel,
    pub record_enabled: bool,
    pub play_enabled: bool,
    pub download_enabled: bool,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            record_label: RecordLabel::Start,
            record_enabled: false,
            play_enabled: false,
            download_enabled: false,
        }
    }
}

/// Record/play/download state machine over a [`CaptureDevice`].
pub struct Recorder<D: CaptureDevice> {
    device: D,
    state: RecorderState,
    controls: Controls,
    chunks: Vec<Vec<u8>>,
    timer: ElapsedTimer,
    mime_type: String,
    download_name: String,
    error_message: Option<String>,
}

impl<D: CaptureDevice> Recorder<D> {
    pub fn new(device: D, config: &RecorderConfig) -> Self {
        Self {
            device,
            state: RecorderState::Idle,
            controls: Controls::default(),
            chunks: Vec::new(),
            timer: ElapsedTimer::new(),
            mime_type: config.mime_type.clone(),
            download_name: config.download_name.clone(),
            error_message: None,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn controls(&self) -> Controls {
        self.controls
    }

    pub fn elapsed(&self) -> ElapsedTimer {
        self.timer
    }

    /// Last device error shown to the user.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Total bytes recorded.
    pub fn recorded_bytes(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Ask for camera access and start previewing.
    ///
    /// An earlier recording stays available for play and download.
    pub fn request_camera(&mut self, constraints: &MediaConstraints) -> Result<(), RecorderError> {
        self.require(self.state != RecorderState::Recording, "open the camera")?;
        tracing::debug!("Using media constraints: {:?}", constraints);

        if let Err(e) = self.device.open(constraints) {
            tracing::error!("Camera access failed: {}", e);
            self.error_message = Some(format!("Camera access error: {}", e));
            return Err(e);
        }

        self.error_message = None;
        self.state = RecorderState::Previewing;
        self.controls.record_enabled = true;
        self.controls.record_label = RecordLabel::Start;
        Ok(())
    }

    /// The record button: starts when labelled Start, stops when labelled Stop.
    pub fn toggle_record(&mut self) -> Result<(), RecorderError> {
        self.require(self.controls.record_enabled, "record")?;
        match self.controls.record_label {
            RecordLabel::Start => self.start_recording(),
            RecordLabel::Stop => self.stop_recording(),
        }
    }

    fn start_recording(&mut self) -> Result<(), RecorderError> {
        self.chunks.clear();
        if let Err(e) = self.device.start_recording(&self.mime_type) {
            tracing::error!("Failed to start recording: {}", e);
            self.error_message = Some(format!("Exception while starting recorder: {}", e));
            return Err(e);
        }

        tracing::info!("Recording started ({})", self.mime_type);
        self.timer.reset();
        self.state = RecorderState::Recording;
        self.controls.record_label = RecordLabel::Stop;
        self.controls.play_enabled = false;
        self.controls.download_enabled = false;
        Ok(())
    }

    fn stop_recording(&mut self) -> Result<(), RecorderError> {
        let chunks = self.device.stop_recording()?;
        self.chunks = chunks.into_iter().filter(|c| !c.is_empty()).collect();

        tracing::info!(
            "Recording stopped after {} ({} bytes)",
            self.timer,
            self.recorded_bytes()
        );
        self.state = RecorderState::Stopped;
        self.controls.record_enabled = false;
        self.controls.play_enabled = true;
        self.controls.download_enabled = true;
        Ok(())
    }

    /// Advance the counter by one second while recording.
    pub fn tick(&mut self) -> ElapsedTimer {
        if self.state == RecorderState::Recording {
            self.timer.tick();
        }
        self.timer
    }

    /// The recording as a playable blob.
    pub fn play(&mut self) -> Result<Blob, RecorderError> {
        self.require(self.controls.play_enabled, "play")?;
        self.state = RecorderState::Playing;
        Ok(Blob::from_chunks(&self.chunks, PLAYBACK_MIME_TYPE))
    }

    /// The recording as a download with the configured filename.
    pub fn download(&self) -> Result<Download, RecorderError> {
        self.require(self.controls.download_enabled, "download")?;
        Ok(Download {
            filename: self.download_name.clone(),
            blob: Blob::from_chunks(&self.chunks, DOWNLOAD_MIME_TYPE),
        })
    }

    /// Release the camera. A recording in progress is stopped first; any
    /// recording leaves the recorder Stopped, ready for play and download.
    pub fn close(&mut self) {
        if self.state == RecorderState::Recording {
            if let Err(e) = self.stop_recording() {
                tracing::warn!("Failed to stop recording on close: {}", e);
            }
        }
        self.device.close();

        let has_recording = !self.chunks.is_empty();
        self.state = if has_recording {
            RecorderState::Stopped
        } else {
            RecorderState::Idle
        };
        self.controls = Controls {
            play_enabled: has_recording,
            download_enabled: has_recording,
            ..Controls::default()
        };
    }

    fn require(&self, allowed: bool, action: &'static str) -> Result<(), RecorderError> {
        if allowed {
            Ok(())
        } else {
            Err(RecorderError::InvalidState {
                action,
                state: self.state,
            })
        }
    }
}
