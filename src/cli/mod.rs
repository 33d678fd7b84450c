//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod check;
mod config_cmd;
mod record;
mod scan;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use resumescan::config::{OcrFallback, Settings};

#[derive(Parser)]
#[command(name = "resumescan")]
#[command(about = "Resume contact extraction and camera recording")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Extract email, phone and LinkedIn profile from a resume
    Scan {
        /// Resume file (PDF or image)
        file: PathBuf,

        /// Reject file names containing special characters
        #[arg(long)]
        check_filename: bool,

        /// When PDF pages are re-read with OCR (overrides config)
        #[arg(long, value_enum)]
        fallback: Option<OcrFallback>,

        /// Resolve the device location alongside the scan
        #[arg(long)]
        locate: bool,

        /// Device latitude (implies --locate)
        #[arg(long, allow_hyphen_values = true, requires = "lon")]
        lat: Option<f64>,

        /// Device longitude (implies --locate)
        #[arg(long, allow_hyphen_values = true, requires = "lat")]
        lon: Option<f64>,

        /// Print the scan report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check external tool availability
    Check,

    /// Record a video from the camera
    Record {
        /// Stop after this many seconds (default: until Ctrl-C)
        #[arg(short, long)]
        duration: Option<u64>,

        /// Directory the recording is saved to
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Video device (overrides config)
        #[arg(long)]
        device: Option<String>,

        /// Record video only
        #[arg(long)]
        no_audio: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Print the config file in use
    Path,

    /// Write the default configuration to ./resumescan.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (settings, source) = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Scan {
            file,
            check_filename,
            fallback,
            locate,
            lat,
            lon,
            json,
        } => {
            let options = scan::ScanOptions {
                file,
                check_filename,
                fallback,
                locate: locate || lat.is_some(),
                position: lat.zip(lon),
                json,
            };
            scan::cmd_scan(&settings, options).await
        }
        Commands::Check => check::cmd_check(&settings).await,
        Commands::Record {
            duration,
            output_dir,
            device,
            no_audio,
        } => {
            let mut config = settings.recorder.clone();
            if let Some(device) = device {
                config.video_device = device;
            }
            if no_audio {
                config.audio_device.clear();
            }
            record::cmd_record(&config, duration, &output_dir).await
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => config_cmd::cmd_config_show(&settings, source.as_deref()),
            ConfigCommands::Path => config_cmd::cmd_config_path(source.as_deref()),
            ConfigCommands::Init { force } => config_cmd::cmd_config_init(force),
        },
    }
}

/// Status glyphs shared by the commands.
mod icons {
    use console::{style, StyledObject};

    pub fn success() -> StyledObject<&'static str> {
        style("✓").green()
    }

    pub fn error() -> StyledObject<&'static str> {
        style("✗").red()
    }

    pub fn pending() -> StyledObject<&'static str> {
        style("○").yellow()
    }
}
