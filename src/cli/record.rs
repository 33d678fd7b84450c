//! Camera recording command.

use std::path::Path;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use resumescan::config::RecorderConfig;
use resumescan::recorder::{FfmpegCapture, MediaConstraints, Recorder};

use super::icons::success;

/// Record until the duration elapses or Ctrl-C, then save the download.
pub async fn cmd_record(
    config: &RecorderConfig,
    duration: Option<u64>,
    output_dir: &Path,
) -> anyhow::Result<()> {
    let mut recorder = Recorder::new(FfmpegCapture::new(config), config);

    recorder.request_camera(&MediaConstraints::from_config(config))?;
    eprintln!(
        "{} Camera ready: {} ({}x{})",
        success(),
        config.video_device,
        config.width,
        config.height
    );

    recorder.toggle_record()?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.red} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Recording {}", recorder.elapsed()));

    let mut interval = tokio::time::interval(Duration::from_secs(1));
    // The first tick fires immediately.
    interval.tick().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let elapsed = recorder.tick();
                pb.set_message(format!("Recording {}", elapsed));
                if duration.is_some_and(|limit| u64::from(elapsed.total_seconds()) >= limit) {
                    break;
                }
            }
            _ = &mut ctrl_c => break,
        }
    }

    pb.set_message("Finalising recording...");
    let stopped = recorder.toggle_record();
    pb.finish_and_clear();
    stopped?;

    let download = recorder.download()?;
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(&download.filename);
    std::fs::write(&path, &download.blob.data)?;
    recorder.close();

    eprintln!(
        "{} Recorded {} to {} ({} bytes, {})",
        success(),
        recorder.elapsed(),
        path.display(),
        download.blob.size(),
        style(&download.blob.mime_type).dim()
    );

    Ok(())
}
