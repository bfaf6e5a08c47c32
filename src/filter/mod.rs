use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::media::{EncoderProfile, MediaError, MediaToolkit};

/// Errors while rendering a filtered copy
#[derive(thiserror::Error, Debug)]
pub enum FilterError {
    #[error("unknown filter name: {0}")]
    Unknown(String),

    #[error("failed to render filtered clip: {0}")]
    Render(#[source] MediaError),
}

/// The fixed set of named visual filters.
///
/// Unknown names are rejected at the parsing boundary; there is no silent
/// passthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterName {
    Grayscale,
    Bright,
    Dark,
    Contrast,
    Sepia,
    Vignette,
    Blur,
}

impl FilterName {
    /// The deterministic ffmpeg transform for this filter
    pub fn ffmpeg_expr(&self) -> &'static str {
        match self {
            FilterName::Grayscale => "hue=s=0",
            // Multiplicative brightness, x1.5
            FilterName::Bright => "colorchannelmixer=rr=1.5:gg=1.5:bb=1.5",
            // Multiplicative darkness, x0.7
            FilterName::Dark => "colorchannelmixer=rr=0.7:gg=0.7:bb=0.7",
            FilterName::Contrast => "eq=contrast=1.5",
            FilterName::Sepia => {
                "colorchannelmixer=.393:.769:.189:0:.349:.686:.168:0:.272:.534:.131"
            }
            FilterName::Vignette => "vignette",
            FilterName::Blur => "gblur=sigma=1",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterName::Grayscale => "grayscale",
            FilterName::Bright => "bright",
            FilterName::Dark => "dark",
            FilterName::Contrast => "contrast",
            FilterName::Sepia => "sepia",
            FilterName::Vignette => "vignette",
            FilterName::Blur => "blur",
        }
    }

    pub fn all() -> &'static [FilterName] {
        &[
            FilterName::Grayscale,
            FilterName::Bright,
            FilterName::Dark,
            FilterName::Contrast,
            FilterName::Sepia,
            FilterName::Vignette,
            FilterName::Blur,
        ]
    }
}

impl fmt::Display for FilterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FilterName {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "grayscale" => Ok(FilterName::Grayscale),
            "bright" => Ok(FilterName::Bright),
            "dark" => Ok(FilterName::Dark),
            "contrast" => Ok(FilterName::Contrast),
            "sepia" => Ok(FilterName::Sepia),
            "vignette" => Ok(FilterName::Vignette),
            "blur" => Ok(FilterName::Blur),
            other => Err(FilterError::Unknown(other.to_string())),
        }
    }
}

/// Renders filtered copies with the same encoding profile as clip composition
pub struct FilterEngine {
    toolkit: MediaToolkit,
    profile: EncoderProfile,
}

impl FilterEngine {
    pub fn new(toolkit: MediaToolkit, profile: EncoderProfile) -> Self {
        Self { toolkit, profile }
    }

    /// Render a filtered copy of `input` at `output`.
    ///
    /// A failed render surfaces as a single `FilterError` and leaves no
    /// partial output file.
    pub async fn apply(
        &self,
        input: &Path,
        output: &Path,
        filter: FilterName,
    ) -> Result<PathBuf, FilterError> {
        tracing::info!("Applying {filter} filter ({})", filter.ffmpeg_expr());

        self.toolkit
            .render(input, None, Some(filter.ffmpeg_expr()), &self.profile, output)
            .await
            .map_err(FilterError::Render)?;

        Ok(output.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_is_total_and_unique() {
        let mut exprs: Vec<&str> = FilterName::all().iter().map(|f| f.ffmpeg_expr()).collect();
        assert_eq!(exprs.len(), 7);
        exprs.sort();
        exprs.dedup();
        assert_eq!(exprs.len(), 7);
    }

    #[test]
    fn test_dispatch_is_deterministic() {
        assert_eq!(FilterName::Dark.ffmpeg_expr(), FilterName::Dark.ffmpeg_expr());
        assert_eq!(
            FilterName::Blur.ffmpeg_expr(),
            "gblur=sigma=1"
        );
    }

    #[test]
    fn test_from_str_round_trips() {
        for filter in FilterName::all() {
            assert_eq!(filter.as_str().parse::<FilterName>().unwrap(), *filter);
        }
        assert_eq!("GRAYSCALE".parse::<FilterName>().unwrap(), FilterName::Grayscale);
    }

    #[test]
    fn test_unknown_filter_is_an_error() {
        let err = "solarize".parse::<FilterName>().unwrap_err();
        assert!(matches!(err, FilterError::Unknown(name) if name == "solarize"));
    }
}
