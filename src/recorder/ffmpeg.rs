//! Capture device backed by ffmpeg (V4L2 video, ALSA audio).

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use tempfile::TempDir;

use super::capture::{CaptureDevice, MediaConstraints};
use super::RecorderError;
use crate::config::RecorderConfig;
use crate::ocr::check_binary;

/// Records from a local camera by driving an `ffmpeg` subprocess.
pub struct FfmpegCapture {
    video_device: String,
    audio_device: String,
    constraints: Option<MediaConstraints>,
    session: Option<Session>,
}

struct Session {
    child: Child,
    output: PathBuf,
    /// ffmpeg stderr, written to a file so the child never blocks on a full pipe.
    log: PathBuf,
    _dir: TempDir,
}

impl FfmpegCapture {
    pub fn new(config: &RecorderConfig) -> Self {
        Self {
            video_device: config.video_device.clone(),
            audio_device: config.audio_device.clone(),
            constraints: None,
            session: None,
        }
    }

    /// Command-line arguments for a recording written to `output`.
    fn ffmpeg_args(
        &self,
        constraints: &MediaConstraints,
        mime_type: &str,
        output: &Path,
    ) -> Vec<String> {
        let mut args: Vec<String> = ["-hide_banner", "-loglevel", "error"]
            .map(String::from)
            .to_vec();

        args.extend(["-f", "v4l2", "-video_size"].map(String::from));
        args.push(format!("{}x{}", constraints.width, constraints.height));
        args.push("-i".to_string());
        args.push(self.video_device.clone());

        let with_audio = constraints.audio && !self.audio_device.is_empty();
        if with_audio {
            args.extend(["-f", "alsa", "-i"].map(String::from));
            args.push(self.audio_device.clone());
            if constraints.echo_cancellation {
                // FFT denoiser; ffmpeg has no acoustic echo canceller.
                args.extend(["-af", "afftdn"].map(String::from));
            }
        }

        let (video_codec, audio_codec) = codecs_for(mime_type);
        args.extend(["-c:v", video_codec].map(String::from));
        if with_audio {
            args.extend(["-c:a", audio_codec].map(String::from));
        }

        args.push("-y".to_string());
        args.push(output.display().to_string());
        args
    }
}

/// Video and audio encoders for a recording MIME type.
fn codecs_for(mime_type: &str) -> (&'static str, &'static str) {
    let mime = mime_type.to_lowercase();
    if mime.contains("vp8") {
        ("libvpx", "libopus")
    } else if mime.starts_with("video/webm") {
        ("libvpx-vp9", "libopus")
    } else {
        ("libx264", "aac")
    }
}

/// Capture error carrying whatever ffmpeg logged.
fn capture_failure(log: &Path) -> RecorderError {
    let stderr = std::fs::read_to_string(log).unwrap_or_default();
    RecorderError::Capture(format!("ffmpeg failed: {}", stderr.trim()))
}

fn extension_for(mime_type: &str) -> &'static str {
    if mime_type.to_lowercase().starts_with("video/webm") {
        "webm"
    } else {
        "mp4"
    }
}

impl CaptureDevice for FfmpegCapture {
    fn is_available(&self) -> bool {
        check_binary("ffmpeg") && Path::new(&self.video_device).exists()
    }

    fn availability_hint(&self) -> String {
        if !check_binary("ffmpeg") {
            "ffmpeg not installed. Install with: apt install ffmpeg".to_string()
        } else if !Path::new(&self.video_device).exists() {
            format!("Video device {} not found", self.video_device)
        } else {
            "ffmpeg capture is available".to_string()
        }
    }

    fn open(&mut self, constraints: &MediaConstraints) -> Result<(), RecorderError> {
        if !self.is_available() {
            return Err(RecorderError::DeviceUnavailable(self.availability_hint()));
        }
        self.constraints = Some(constraints.clone());
        Ok(())
    }

    fn start_recording(&mut self, mime_type: &str) -> Result<(), RecorderError> {
        let constraints = self
            .constraints
            .clone()
            .ok_or_else(|| RecorderError::DeviceUnavailable("camera not opened".to_string()))?;
        if self.session.is_some() {
            return Err(RecorderError::Capture("already recording".to_string()));
        }

        let dir = TempDir::new()?;
        let output = dir
            .path()
            .join(format!("recording.{}", extension_for(mime_type)));
        let log = dir.path().join("ffmpeg.log");
        let args = self.ffmpeg_args(&constraints, mime_type, &output);
        tracing::debug!("ffmpeg {}", args.join(" "));

        let child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::from(File::create(&log)?))
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    RecorderError::DeviceUnavailable("ffmpeg not found".to_string())
                }
                _ => RecorderError::Io(e),
            })?;

        self.session = Some(Session {
            child,
            output,
            log,
            _dir: dir,
        });
        Ok(())
    }

    fn stop_recording(&mut self) -> Result<Vec<Vec<u8>>, RecorderError> {
        let Some(mut session) = self.session.take() else {
            return Err(RecorderError::Capture("not recording".to_string()));
        };

        // ffmpeg finalises the container when it reads `q`.
        if let Some(mut stdin) = session.child.stdin.take() {
            let _ = stdin.write_all(b"q");
        }
        let status = session.child.wait()?;
        if !status.success() {
            return Err(capture_failure(&session.log));
        }

        let data = std::fs::read(&session.output)?;
        Ok(vec![data])
    }

    fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            let _ = session.child.kill();
            let _ = session.child.wait();
        }
        self.constraints = None;
    }
}

impl Drop for FfmpegCapture {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_with_audio() {
        let capture = FfmpegCapture::new(&RecorderConfig::default());
        let args = capture.ffmpeg_args(
            &MediaConstraints::default(),
            "video/webm;codecs=vp9,opus",
            Path::new("/tmp/out.webm"),
        );
        let joined = args.join(" ");
        assert!(joined.contains("-f v4l2 -video_size 1280x720 -i /dev/video0"));
        assert!(joined.contains("-f alsa -i default"));
        assert!(joined.contains("-c:v libvpx-vp9"));
        assert!(joined.contains("-c:a libopus"));
        assert_eq!(args.last().map(String::as_str), Some("/tmp/out.webm"));
    }

    #[test]
    fn test_args_video_only() {
        let config = RecorderConfig {
            audio_device: String::new(),
            ..RecorderConfig::default()
        };
        let capture = FfmpegCapture::new(&config);
        let args = capture.ffmpeg_args(
            &MediaConstraints::from_config(&config),
            "video/mp4",
            Path::new("out.mp4"),
        );
        assert!(!args.contains(&"alsa".to_string()));
        assert!(!args.contains(&"-c:a".to_string()));
        assert!(args.contains(&"libx264".to_string()));
    }

    #[test]
    fn test_codecs_and_extension() {
        assert_eq!(codecs_for("video/webm;codecs=vp8"), ("libvpx", "libopus"));
        assert_eq!(extension_for("video/webm;codecs=vp9,opus"), "webm");
        assert_eq!(extension_for("video/mp4"), "mp4");
    }

    #[test]
    fn test_capture_failure_reads_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("ffmpeg.log");
        std::fs::write(&log, "/dev/video0: Device or resource busy\n").unwrap();

        let err = capture_failure(&log);
        assert_eq!(
            err.to_string(),
            "Capture failed: ffmpeg failed: /dev/video0: Device or resource busy"
        );

        let missing = capture_failure(&dir.path().join("absent.log"));
        assert_eq!(missing.to_string(), "Capture failed: ffmpeg failed: ");
    }

    #[test]
    fn test_stop_without_start_fails() {
        let mut capture = FfmpegCapture::new(&RecorderConfig::default());
        assert!(capture.stop_recording().is_err());
        assert!(capture.start_recording("video/webm").is_err());
    }
}
