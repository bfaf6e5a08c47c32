use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tempfile::TempDir;

use crate::media::MediaToolkit;

pub mod recognizer;

pub use recognizer::{HttpRecognizer, RecognitionError, SpeechRecognizer};

/// One timestamped piece of recognized speech, on the source timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleSegment {
    /// Start time in seconds
    pub start_time: f64,

    /// End time in seconds
    pub end_time: f64,

    /// Recognized text
    pub text: String,
}

/// Per-window transcription outcome.
///
/// A window that fails recognition is reported rather than silently dropped,
/// so callers can observe how degraded a transcript is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChunkOutcome {
    Recognized(SubtitleSegment),
    Skipped {
        window_index: usize,
        start_time: f64,
        end_time: f64,
        reason: String,
    },
}

/// Partition a duration into contiguous fixed-size windows.
///
/// The final window is shortened so its end lands exactly on the total
/// duration. Produces `ceil(total / window)` windows.
pub fn window_plan(total_duration: f64, window_secs: f64) -> Vec<(f64, f64)> {
    let mut windows = Vec::new();
    if window_secs <= 0.0 || total_duration <= 0.0 {
        return windows;
    }

    let mut index = 0usize;
    loop {
        let start = index as f64 * window_secs;
        if start >= total_duration {
            break;
        }
        windows.push((start, (start + window_secs).min(total_duration)));
        index += 1;
    }

    windows
}

/// Collect only the recognized segments from a run, in chronological order
pub fn segments(outcomes: &[ChunkOutcome]) -> Vec<SubtitleSegment> {
    outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            ChunkOutcome::Recognized(segment) => Some(segment.clone()),
            ChunkOutcome::Skipped { .. } => None,
        })
        .collect()
}

/// Windowed transcription pipeline over an explicit recognizer capability
pub struct Transcriber {
    toolkit: MediaToolkit,
    recognizer: Box<dyn SpeechRecognizer>,
    window_secs: f64,
}

impl Transcriber {
    pub fn new(toolkit: MediaToolkit, recognizer: Box<dyn SpeechRecognizer>, window_secs: f64) -> Self {
        Self {
            toolkit,
            recognizer,
            window_secs,
        }
    }

    /// Transcribe any decodable media file by extracting its audio track first
    pub async fn transcribe_media(&self, media: &Path) -> Result<Vec<ChunkOutcome>> {
        let workdir = TempDir::new().context("Failed to create temporary directory")?;
        let audio_path = workdir.path().join("audio.wav");

        tracing::info!("Extracting audio track from {}", media.display());
        self.toolkit
            .extract_audio(media, &audio_path)
            .await
            .context("Failed to extract audio track")?;

        self.transcribe_audio(&audio_path).await
    }

    /// Transcribe an audio file window by window.
    ///
    /// Windows are processed in chronological order; each window's temporary
    /// buffer is deleted before the next window starts, whether or not
    /// recognition succeeded.
    pub async fn transcribe_audio(&self, audio: &Path) -> Result<Vec<ChunkOutcome>> {
        let duration = self
            .toolkit
            .audio_duration(audio)
            .await
            .context("Failed to determine audio duration")?;

        let windows = window_plan(duration, self.window_secs);
        tracing::info!(
            "Transcribing {:.1}s of audio in {} windows of {:.1}s",
            duration,
            windows.len(),
            self.window_secs
        );

        let workdir = TempDir::new().context("Failed to create temporary directory")?;

        let progress = ProgressBar::new(windows.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} windows")
                .unwrap(),
        );

        let mut outcomes = Vec::with_capacity(windows.len());

        for (index, (start, end)) in windows.iter().copied().enumerate() {
            let chunk_path = workdir.path().join(format!("window_{index}.wav"));

            let outcome = match self
                .toolkit
                .cut_audio_window(audio, start, end - start, &chunk_path)
                .await
            {
                Ok(()) => match self.recognizer.recognize(&chunk_path).await {
                    Ok(text) if !text.trim().is_empty() => {
                        ChunkOutcome::Recognized(SubtitleSegment {
                            start_time: start,
                            end_time: end,
                            text: text.trim().to_string(),
                        })
                    }
                    Ok(_) => ChunkOutcome::Skipped {
                        window_index: index,
                        start_time: start,
                        end_time: end,
                        reason: "no speech recognized".to_string(),
                    },
                    Err(e) => ChunkOutcome::Skipped {
                        window_index: index,
                        start_time: start,
                        end_time: end,
                        reason: e.to_string(),
                    },
                },
                Err(e) => ChunkOutcome::Skipped {
                    window_index: index,
                    start_time: start,
                    end_time: end,
                    reason: format!("failed to cut window audio: {e}"),
                },
            };

            // Window buffers are scoped to one iteration
            if chunk_path.exists() {
                if let Err(e) = fs_err::remove_file(&chunk_path) {
                    tracing::warn!("Failed to remove window buffer: {e}");
                }
            }

            if let ChunkOutcome::Skipped { reason, .. } = &outcome {
                tracing::warn!("Window {index} [{start:.1}s-{end:.1}s] skipped: {reason}");
            }

            outcomes.push(outcome);
            progress.inc(1);
        }

        progress.finish_and_clear();

        let recognized = outcomes
            .iter()
            .filter(|o| matches!(o, ChunkOutcome::Recognized(_)))
            .count();
        tracing::info!(
            "Recognized {recognized}/{} windows",
            outcomes.len()
        );

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_plan_exact_multiple() {
        let windows = window_plan(30.0, 10.0);
        assert_eq!(windows, vec![(0.0, 10.0), (10.0, 20.0), (20.0, 30.0)]);
    }

    #[test]
    fn test_window_plan_partial_last_window() {
        let windows = window_plan(25.0, 10.0);
        assert_eq!(windows.len(), 3);
        // The final window ends exactly at the total duration
        assert_eq!(windows[2], (20.0, 25.0));
    }

    #[test]
    fn test_window_plan_count_is_ceiling() {
        for duration in [0.5, 9.9, 10.0, 10.1, 95.0, 100.0] {
            let expected = (duration / 10.0_f64).ceil() as usize;
            assert_eq!(
                window_plan(duration, 10.0).len(),
                expected,
                "duration {duration}"
            );
        }
    }

    #[test]
    fn test_window_plan_degenerate_inputs() {
        assert!(window_plan(0.0, 10.0).is_empty());
        assert!(window_plan(30.0, 0.0).is_empty());
        assert!(window_plan(-5.0, 10.0).is_empty());
    }

    #[test]
    fn test_windows_are_contiguous_and_ordered() {
        let windows = window_plan(47.3, 10.0);
        for pair in windows.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
            assert!(pair[0].0 < pair[1].0);
        }
        assert_eq!(windows.last().unwrap().1, 47.3);
    }

    #[test]
    fn test_segments_drops_skipped_windows() {
        let outcomes = vec![
            ChunkOutcome::Recognized(SubtitleSegment {
                start_time: 0.0,
                end_time: 10.0,
                text: "hello".to_string(),
            }),
            ChunkOutcome::Skipped {
                window_index: 1,
                start_time: 10.0,
                end_time: 20.0,
                reason: "no speech recognized".to_string(),
            },
            ChunkOutcome::Recognized(SubtitleSegment {
                start_time: 20.0,
                end_time: 25.0,
                text: "world".to_string(),
            }),
        ];

        let kept = segments(&outcomes);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].text, "hello");
        assert_eq!(kept[1].start_time, 20.0);
    }
}
