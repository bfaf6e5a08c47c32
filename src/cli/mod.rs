use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::filter::FilterName;

#[derive(Parser)]
#[command(
    name = "clipsmith",
    about = "Clipsmith - Fetch videos, transcribe them, and cut vertical clips with burned-in captions",
    version,
    long_about = "A CLI tool for a short-clip workflow: download a source video, transcribe its audio in 10-second windows, cut a sub-range into a clip with optional 9:16 reframing and burned-in subtitles, and apply named visual filters."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a source video from a URL
    Fetch {
        /// Video URL (YouTube or direct media URL)
        #[arg(value_name = "URL")]
        url: String,

        /// Destination directory (defaults to the configured download dir)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Session identifier used in the output filename (random if omitted)
        #[arg(long, value_name = "ID")]
        session_id: Option<String>,
    },

    /// Transcribe a local media file into timestamped segments
    Transcribe {
        /// Local video or audio file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Language hint for the recognizer (auto-detect if not specified)
        #[arg(short, long, value_name = "LANG")]
        language: Option<String>,

        /// Report skipped windows alongside recognized ones
        #[arg(long)]
        show_skipped: bool,
    },

    /// Cut a clip out of a source video
    Clip {
        /// Source video file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Clip start time in seconds
        #[arg(short, long, value_name = "SECONDS")]
        start: f64,

        /// Clip end time in seconds
        #[arg(short, long, value_name = "SECONDS")]
        end: f64,

        /// Output clip path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Reframe to 9:16 by center-cropping
        #[arg(long)]
        vertical: bool,

        /// JSON subtitle file (as written by `transcribe --format json`)
        #[arg(long, value_name = "FILE")]
        subtitles: Option<PathBuf>,

        /// Transcribe the source and burn the result in as captions
        #[arg(long, conflicts_with = "subtitles")]
        auto_captions: bool,
    },

    /// Apply a named visual filter to a video
    Filter {
        /// Source video file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output path for the filtered copy
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Filter to apply
        #[arg(value_enum, value_name = "FILTER")]
        name: FilterName,
    },

    /// Configure recognizer endpoint and encoder settings
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// List supported video sources
    Sources,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON with timestamps
    Json,
    /// SRT subtitle format
    Srt,
    /// WebVTT format
    Vtt,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Srt => write!(f, "srt"),
            OutputFormat::Vtt => write!(f, "vtt"),
        }
    }
}
