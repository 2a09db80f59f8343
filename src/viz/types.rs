//! Public types for the rendering module.

use crate::style::MarkerShape;
use anyhow::{Result, anyhow};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Output file formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Jpeg,
    Bmp,
    /// Standalone page embedding the SVG plus the figure as JSON.
    Html,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow!("output path {} has no extension", path.display()))?;
        ext.parse()
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Html => "html",
        }
    }

    /// Formats written by the raster backend.
    pub fn is_bitmap(self) -> bool {
        matches!(self, OutputFormat::Png | OutputFormat::Jpeg | OutputFormat::Bmp)
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "svg" => Ok(OutputFormat::Svg),
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "bmp" => Ok(OutputFormat::Bmp),
            "html" | "htm" => Ok(OutputFormat::Html),
            other => Err(anyhow!(
                "unsupported output format {other:?} (use svg, png, jpg, bmp or html)"
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Where the legend goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPlacement {
    /// Separate single-column panel right of the plot (vertical orientation).
    Right,
    /// Separate band below the plot (horizontal orientation).
    Bottom,
    /// Box over the plot at explicit paper coordinates.
    Floating,
}

/// Swatch drawn next to a legend label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Line,
    Marker(MarkerShape),
}
