use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::media::{EncoderProfile, MediaError, MediaToolkit};
use crate::output::format_as_srt;
use crate::transcribe::SubtitleSegment;

/// Errors while composing a clip
#[derive(thiserror::Error, Debug)]
pub enum CompositionError {
    #[error("invalid clip range [{start}, {end}) for {duration:.2}s source")]
    InvalidRange {
        start: f64,
        end: f64,
        duration: f64,
    },

    #[error("failed to inspect source video: {0}")]
    Probe(#[source] MediaError),

    #[error("failed to write burn-in subtitles: {0}")]
    Subtitles(#[from] std::io::Error),

    #[error("failed to render clip: {0}")]
    Render(#[source] MediaError),
}

/// A request to cut one clip out of a source video
#[derive(Debug, Clone)]
pub struct ClipRequest {
    pub source: PathBuf,
    pub start_time: f64,
    pub end_time: f64,
    pub output_path: PathBuf,
    /// Subtitles on the full-video timeline; may be empty
    pub subtitles: Vec<SubtitleSegment>,
    /// Reframe to 9:16 by center-cropping
    pub vertical: bool,
}

/// A center-crop region inside the original frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

impl CropRect {
    /// Shrink odd dimensions by one pixel; H.264 4:2:0 output needs even
    /// frame dimensions
    pub fn even_aligned(self) -> Self {
        Self {
            width: self.width & !1,
            height: self.height & !1,
            ..self
        }
    }
}

/// Compute the symmetric center-crop that reframes `width`x`height` to 9:16.
///
/// Cropping only removes pixels on the oversized axis; a frame already at
/// 9:16 returns `None`. No scaling is involved.
pub fn vertical_crop(width: u32, height: u32) -> Option<CropRect> {
    // Compare width/height against 9/16 without floating point
    let lhs = width as u64 * 16;
    let rhs = height as u64 * 9;

    if lhs > rhs {
        // Too wide: crop the sides
        let new_width = (height as u64 * 9 / 16) as u32;
        Some(CropRect {
            width: new_width,
            height,
            x: (width - new_width) / 2,
            y: 0,
        })
    } else if lhs < rhs {
        // Too tall: crop top and bottom
        let new_height = (width as u64 * 16 / 9) as u32;
        Some(CropRect {
            width,
            height: new_height,
            x: 0,
            y: (height - new_height) / 2,
        })
    } else {
        None
    }
}

/// Select the subtitle segments overlapping `[start, end)` and re-time them
/// into clip-relative coordinates
pub fn select_and_retime(
    subtitles: &[SubtitleSegment],
    start: f64,
    end: f64,
) -> Vec<SubtitleSegment> {
    subtitles
        .iter()
        .filter(|segment| segment.end_time > start && segment.start_time < end)
        .map(|segment| SubtitleSegment {
            start_time: (segment.start_time - start).max(0.0),
            end_time: (segment.end_time - start).min(end - start),
            text: segment.text.clone(),
        })
        .collect()
}

/// Build the ffmpeg video filtergraph for a clip: crop first, then the
/// caption burn-in
pub fn build_filtergraph(crop: Option<CropRect>, subtitles: Option<&Path>) -> Option<String> {
    let mut filters = Vec::new();

    if let Some(rect) = crop {
        filters.push(format!(
            "crop={}:{}:{}:{}",
            rect.width, rect.height, rect.x, rect.y
        ));
    }

    if let Some(path) = subtitles {
        filters.push(format!("subtitles=filename={}", escape_filter_path(path)));
    }

    if filters.is_empty() {
        None
    } else {
        Some(filters.join(","))
    }
}

/// Escape a path for use inside an ffmpeg filtergraph argument
fn escape_filter_path(path: &Path) -> String {
    path.display()
        .to_string()
        .replace('\\', "\\\\")
        .replace(':', "\\:")
        .replace('\'', "\\'")
}

/// Renders clip requests against a fixed encoding profile
pub struct Composer {
    toolkit: MediaToolkit,
    profile: EncoderProfile,
}

impl Composer {
    pub fn new(toolkit: MediaToolkit, profile: EncoderProfile) -> Self {
        Self { toolkit, profile }
    }

    /// Cut, reframe, caption, and encode one clip.
    ///
    /// Any stage failure surfaces as a single `CompositionError` carrying the
    /// underlying cause; a failed render leaves no partial output file.
    pub async fn compose(&self, request: &ClipRequest) -> Result<PathBuf, CompositionError> {
        let info = self
            .toolkit
            .probe(&request.source)
            .await
            .map_err(CompositionError::Probe)?;

        let (start, end) = (request.start_time, request.end_time);
        if start < 0.0 || start >= end || end > info.duration {
            return Err(CompositionError::InvalidRange {
                start,
                end,
                duration: info.duration,
            });
        }

        let crop = if request.vertical {
            let rect = vertical_crop(info.width, info.height).map(CropRect::even_aligned);
            match rect {
                Some(rect) => {
                    tracing::info!(
                        "Reframing {}x{} to 9:16 crop {}x{} at ({}, {})",
                        info.width,
                        info.height,
                        rect.width,
                        rect.height,
                        rect.x,
                        rect.y
                    );
                }
                None => tracing::info!("Source already 9:16, no crop needed"),
            }
            rect
        } else {
            None
        };

        let selected = select_and_retime(&request.subtitles, start, end);

        // The temp file must outlive the render
        let subtitle_file = if selected.is_empty() {
            None
        } else {
            tracing::info!("Burning in {} caption(s)", selected.len());
            let mut file = tempfile::Builder::new().suffix(".srt").tempfile()?;
            file.write_all(format_as_srt(&selected).as_bytes())?;
            file.flush()?;
            Some(file)
        };

        let filtergraph = build_filtergraph(crop, subtitle_file.as_ref().map(|f| f.path()));

        self.toolkit
            .render(
                &request.source,
                Some((start, end)),
                filtergraph.as_deref(),
                &self.profile,
                &request.output_path,
            )
            .await
            .map_err(CompositionError::Render)?;

        Ok(request.output_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: f64, end: f64, text: &str) -> SubtitleSegment {
        SubtitleSegment {
            start_time: start,
            end_time: end,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_vertical_crop_wide_source() {
        let rect = vertical_crop(1920, 1080).unwrap();
        assert_eq!(rect.width, 607); // floor(1080 * 9/16)
        assert_eq!(rect.height, 1080);
        assert_eq!(rect.x, 656);
        assert_eq!(rect.y, 0);
    }

    #[test]
    fn test_vertical_crop_tall_source() {
        let rect = vertical_crop(1080, 2400).unwrap();
        assert_eq!(rect.width, 1080);
        assert_eq!(rect.height, 1920); // floor(1080 * 16/9)
        assert_eq!(rect.x, 0);
        assert_eq!(rect.y, 240);
    }

    #[test]
    fn test_vertical_crop_already_vertical() {
        assert_eq!(vertical_crop(1080, 1920), None);
        assert_eq!(vertical_crop(9, 16), None);
    }

    #[test]
    fn test_vertical_crop_hits_target_ratio_within_one_pixel() {
        for (w, h) in [(1920, 1080), (1280, 720), (640, 480), (1080, 2400), (720, 1600)] {
            let rect = vertical_crop(w, h).unwrap();
            let ratio = rect.width as f64 / rect.height as f64;
            let pixel_tolerance = 1.0 / rect.height as f64;
            assert!(
                (ratio - 9.0 / 16.0).abs() <= pixel_tolerance,
                "{w}x{h} cropped to {}x{}",
                rect.width,
                rect.height
            );
            assert!(rect.width <= w && rect.height <= h);
        }
    }

    #[test]
    fn test_vertical_crop_is_symmetric() {
        let rect = vertical_crop(1920, 1080).unwrap();
        let right_margin = 1920 - rect.x - rect.width;
        assert!((rect.x as i64 - right_margin as i64).abs() <= 1);
    }

    #[test]
    fn test_even_aligned_shrinks_odd_dimensions() {
        let rect = vertical_crop(1920, 1080).unwrap().even_aligned();
        assert_eq!(rect.width, 606);
        assert_eq!(rect.height, 1080);
        assert_eq!(rect.width % 2, 0);
    }

    #[test]
    fn test_retime_overlapping_segment() {
        let retimed = select_and_retime(&[segment(5.0, 12.0, "hi")], 8.0, 20.0);
        assert_eq!(retimed, vec![segment(0.0, 4.0, "hi")]);
    }

    #[test]
    fn test_retime_excludes_segments_outside_range() {
        let subs = vec![
            segment(0.0, 3.0, "before"),
            segment(9.0, 11.0, "inside"),
            segment(21.0, 25.0, "after"),
        ];
        let retimed = select_and_retime(&subs, 8.0, 20.0);
        assert_eq!(retimed, vec![segment(1.0, 3.0, "inside")]);
    }

    #[test]
    fn test_retime_clamps_to_clip_bounds() {
        // A segment spanning the whole clip range maps onto [0, clip length)
        let retimed = select_and_retime(&[segment(0.0, 60.0, "long")], 10.0, 25.0);
        assert_eq!(retimed, vec![segment(0.0, 15.0, "long")]);
    }

    #[test]
    fn test_retime_is_deterministic() {
        let subs = vec![segment(5.0, 12.0, "a"), segment(14.0, 19.0, "b")];
        assert_eq!(
            select_and_retime(&subs, 8.0, 20.0),
            select_and_retime(&subs, 8.0, 20.0)
        );
    }

    #[test]
    fn test_build_filtergraph_empty() {
        assert_eq!(build_filtergraph(None, None), None);
    }

    #[test]
    fn test_build_filtergraph_crop_only() {
        let rect = CropRect {
            width: 606,
            height: 1080,
            x: 656,
            y: 0,
        };
        assert_eq!(
            build_filtergraph(Some(rect), None).unwrap(),
            "crop=606:1080:656:0"
        );
    }

    #[test]
    fn test_build_filtergraph_crop_before_captions() {
        let rect = CropRect {
            width: 606,
            height: 1080,
            x: 656,
            y: 0,
        };
        let graph = build_filtergraph(Some(rect), Some(Path::new("/tmp/subs.srt"))).unwrap();
        assert_eq!(graph, "crop=606:1080:656:0,subtitles=filename=/tmp/subs.srt");
    }

    #[test]
    fn test_escape_filter_path() {
        assert_eq!(
            escape_filter_path(Path::new("/tmp/a:b's.srt")),
            "/tmp/a\\:b\\'s.srt"
        );
    }
}
