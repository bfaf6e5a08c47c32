//! Clipsmith - A Rust CLI tool for a video-clipping workflow
//!
//! This library covers four independently invocable stages: fetching a source
//! video from a URL, transcribing its audio into timestamped segments in
//! fixed 10-second windows, composing clips with optional 9:16 reframing and
//! burned-in captions, and applying named visual filters.

pub mod acquire;
pub mod cli;
pub mod compose;
pub mod config;
pub mod filter;
pub mod media;
pub mod output;
pub mod transcribe;
pub mod utils;

pub use acquire::{AcquireError, MediaSource, SourceRegistry};
pub use cli::{Cli, Commands, OutputFormat};
pub use compose::{ClipRequest, Composer, CompositionError, CropRect};
pub use config::Config;
pub use filter::{FilterEngine, FilterError, FilterName};
pub use media::{EncoderProfile, MediaError, MediaToolkit, VideoInfo};
pub use transcribe::{ChunkOutcome, SpeechRecognizer, SubtitleSegment, Transcriber};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;
