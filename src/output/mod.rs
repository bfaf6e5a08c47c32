use anyhow::Result;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::transcribe::SubtitleSegment;

/// Save subtitle segments to file in the requested format
pub async fn save_to_file(
    segments: &[SubtitleSegment],
    path: &Path,
    format: &OutputFormat,
) -> Result<()> {
    let content = render(segments, format)?;
    fs_err::write(path, content)?;
    Ok(())
}

/// Print subtitle segments to the console in the requested format
pub fn print_to_console(segments: &[SubtitleSegment], format: &OutputFormat) -> Result<()> {
    println!("{}", render(segments, format)?);
    Ok(())
}

fn render(segments: &[SubtitleSegment], format: &OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => format_as_text(segments),
        OutputFormat::Json => format_as_json(segments)?,
        OutputFormat::Srt => format_as_srt(segments),
        OutputFormat::Vtt => format_as_vtt(segments),
    })
}

/// Plain text, one timestamped line per segment
pub fn format_as_text(segments: &[SubtitleSegment]) -> String {
    segments
        .iter()
        .map(|s| format!("[{:.1}s - {:.1}s] {}", s.start_time, s.end_time, s.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// JSON array of segments
pub fn format_as_json(segments: &[SubtitleSegment]) -> Result<String> {
    Ok(serde_json::to_string_pretty(segments)?)
}

/// SRT subtitle format; also used to generate burn-in caption files
pub fn format_as_srt(segments: &[SubtitleSegment]) -> String {
    let mut output = String::new();

    for (index, segment) in segments.iter().enumerate() {
        output.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            srt_timestamp(segment.start_time),
            srt_timestamp(segment.end_time),
            segment.text
        ));
    }

    output
}

/// WebVTT format
pub fn format_as_vtt(segments: &[SubtitleSegment]) -> String {
    let mut output = String::from("WEBVTT\n\n");

    for segment in segments {
        output.push_str(&format!(
            "{} --> {}\n{}\n\n",
            vtt_timestamp(segment.start_time),
            vtt_timestamp(segment.end_time),
            segment.text
        ));
    }

    output
}

fn srt_timestamp(seconds: f64) -> String {
    let millis = (seconds * 1000.0).round() as u64;
    format!(
        "{:02}:{:02}:{:02},{:03}",
        millis / 3_600_000,
        (millis % 3_600_000) / 60_000,
        (millis % 60_000) / 1000,
        millis % 1000
    )
}

fn vtt_timestamp(seconds: f64) -> String {
    let millis = (seconds * 1000.0).round() as u64;
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        millis / 3_600_000,
        (millis % 3_600_000) / 60_000,
        (millis % 60_000) / 1000,
        millis % 1000
    )
}

/// Load subtitle segments from a JSON file written by `format_as_json`
pub fn load_segments(path: &Path) -> Result<Vec<SubtitleSegment>> {
    let content = fs_err::read_to_string(path)?;
    let segments: Vec<SubtitleSegment> = serde_json::from_str(&content)?;
    Ok(segments)
}
