use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Errors from the external ffmpeg/ffprobe tools
#[derive(thiserror::Error, Debug)]
pub enum MediaError {
    #[error("failed to spawn {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} failed: {stderr}")]
    CommandFailed { tool: &'static str, stderr: String },

    #[error("could not inspect media {path}: {reason}")]
    Probe { path: String, reason: String },
}

/// Basic stream information for a decodable media file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Duration in seconds
    pub duration: f64,

    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,
}

/// Fixed encoding profile applied to every rendered output.
///
/// The video/audio codec pairing is a compatibility contract for downstream
/// players and does not vary with the vertical flag or filter choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderProfile {
    pub video_codec: String,
    pub audio_codec: String,
    pub crf: u8,
    pub preset: String,
    pub audio_bitrate: String,
}

impl Default for EncoderProfile {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            crf: 23,
            preset: "medium".to_string(),
            audio_bitrate: "192k".to_string(),
        }
    }
}

/// Explicitly constructed wrapper around the ffmpeg and ffprobe binaries.
///
/// All rendering and probing in the crate goes through this object rather
/// than ad-hoc process invocations.
#[derive(Debug, Clone)]
pub struct MediaToolkit {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl MediaToolkit {
    pub fn new() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
        }
    }

    /// Probe a media file for duration and video dimensions
    pub async fn probe(&self, input: &Path) -> Result<VideoInfo, MediaError> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(input)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| MediaError::Spawn {
                tool: "ffprobe",
                source,
            })?;

        if !output.status.success() {
            return Err(MediaError::CommandFailed {
                tool: "ffprobe",
                stderr: stderr_tail(&output.stderr),
            });
        }

        let json: serde_json::Value =
            serde_json::from_slice(&output.stdout).map_err(|e| MediaError::Probe {
                path: input.display().to_string(),
                reason: format!("invalid ffprobe output: {e}"),
            })?;

        let duration = json["format"]["duration"]
            .as_str()
            .and_then(|d| d.parse::<f64>().ok())
            .ok_or_else(|| MediaError::Probe {
                path: input.display().to_string(),
                reason: "missing duration".to_string(),
            })?;

        let stream = json["streams"]
            .as_array()
            .and_then(|s| s.first())
            .ok_or_else(|| MediaError::Probe {
                path: input.display().to_string(),
                reason: "no video stream found".to_string(),
            })?;

        let width = stream["width"].as_u64().unwrap_or(0) as u32;
        let height = stream["height"].as_u64().unwrap_or(0) as u32;

        if width == 0 || height == 0 {
            return Err(MediaError::Probe {
                path: input.display().to_string(),
                reason: "video stream has no dimensions".to_string(),
            });
        }

        Ok(VideoInfo {
            duration,
            width,
            height,
        })
    }

    /// Probe an audio file for its duration only
    pub async fn audio_duration(&self, input: &Path) -> Result<f64, MediaError> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
            ])
            .arg(input)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| MediaError::Spawn {
                tool: "ffprobe",
                source,
            })?;

        if !output.status.success() {
            return Err(MediaError::CommandFailed {
                tool: "ffprobe",
                stderr: stderr_tail(&output.stderr),
            });
        }

        let json: serde_json::Value =
            serde_json::from_slice(&output.stdout).map_err(|e| MediaError::Probe {
                path: input.display().to_string(),
                reason: format!("invalid ffprobe output: {e}"),
            })?;

        json["format"]["duration"]
            .as_str()
            .and_then(|d| d.parse::<f64>().ok())
            .ok_or_else(|| MediaError::Probe {
                path: input.display().to_string(),
                reason: "missing duration".to_string(),
            })
    }

    /// Extract the audio track as 16 kHz mono WAV, the layout the
    /// speech-recognition boundary expects
    pub async fn extract_audio(&self, input: &Path, output: &Path) -> Result<(), MediaError> {
        self.run_ffmpeg(|cmd| {
            cmd.arg("-i")
                .arg(input)
                .args(["-vn", "-ac", "1", "-ar", "16000", "-y"])
                .arg(output);
        })
        .await
    }

    /// Cut one fixed-size window out of a WAV file without re-encoding
    pub async fn cut_audio_window(
        &self,
        input: &Path,
        start: f64,
        length: f64,
        output: &Path,
    ) -> Result<(), MediaError> {
        self.run_ffmpeg(|cmd| {
            cmd.args(["-ss", &format_time(start)])
                .arg("-i")
                .arg(input)
                .args(["-t", &format_time(length), "-acodec", "copy", "-y"])
                .arg(output);
        })
        .await
    }

    /// Render a clip: optional time range, optional filtergraph, fixed
    /// encoding profile. A failed render never leaves a partial output
    /// file behind.
    pub async fn render(
        &self,
        input: &Path,
        range: Option<(f64, f64)>,
        filtergraph: Option<&str>,
        profile: &EncoderProfile,
        output: &Path,
    ) -> Result<(), MediaError> {
        let result = self
            .run_ffmpeg(|cmd| {
                if let Some((start, end)) = range {
                    cmd.args(["-ss", &format_time(start), "-to", &format_time(end)]);
                }
                cmd.arg("-i").arg(input);
                if let Some(graph) = filtergraph {
                    cmd.args(["-vf", graph]);
                }
                cmd.args([
                    "-c:v",
                    &profile.video_codec,
                    "-crf",
                    &profile.crf.to_string(),
                    "-preset",
                    &profile.preset,
                    "-c:a",
                    &profile.audio_codec,
                    "-b:a",
                    &profile.audio_bitrate,
                    "-y",
                ])
                .arg(output);
            })
            .await;

        if result.is_err() {
            let _ = fs_err::remove_file(output);
        }

        result
    }

    async fn run_ffmpeg<F>(&self, configure: F) -> Result<(), MediaError>
    where
        F: FnOnce(&mut Command),
    {
        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(["-hide_banner", "-loglevel", "error"]);
        configure(&mut cmd);

        tracing::debug!("running ffmpeg: {:?}", cmd.as_std());

        let output = cmd
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| MediaError::Spawn {
                tool: "ffmpeg",
                source,
            })?;

        if !output.status.success() {
            return Err(MediaError::CommandFailed {
                tool: "ffmpeg",
                stderr: stderr_tail(&output.stderr),
            });
        }

        Ok(())
    }
}

impl Default for MediaToolkit {
    fn default() -> Self {
        Self::new()
    }
}

/// Format seconds as HH:MM:SS.mmm for ffmpeg arguments
pub fn format_time(seconds: f64) -> String {
    let hours = (seconds / 3600.0) as u32;
    let minutes = ((seconds % 3600.0) / 60.0) as u32;
    let secs = seconds % 60.0;
    format!("{:02}:{:02}:{:06.3}", hours, minutes, secs)
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let trimmed = text.trim();
    // ffmpeg error output can be long; the last lines carry the cause
    let lines: Vec<&str> = trimmed.lines().collect();
    if lines.len() > 5 {
        lines[lines.len() - 5..].join("\n")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00:00.000");
        assert_eq!(format_time(10.0), "00:00:10.000");
        assert_eq!(format_time(75.5), "00:01:15.500");
        assert_eq!(format_time(3661.25), "01:01:01.250");
    }

    #[test]
    fn test_encoder_profile_defaults() {
        let profile = EncoderProfile::default();
        assert_eq!(profile.video_codec, "libx264");
        assert_eq!(profile.audio_codec, "aac");
    }

    #[test]
    fn test_stderr_tail_truncates() {
        let long = (0..20).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let tail = stderr_tail(long.as_bytes());
        assert_eq!(tail.lines().count(), 5);
        assert!(tail.ends_with("line 19"));
    }
}
