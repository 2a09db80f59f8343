//! Chart options: defaults plus per-call overrides.
//!
//! Options behave like a flat name → value mapping. Overrides are a JSON object whose
//! keys replace the defaults one key at a time (a nested value such as `margin`
//! is replaced as a whole, not merged field by field).
//!
//! ```
//! use quickchart::config::ChartOptions;
//! use serde_json::json;
//!
//! let overrides = json!({ "decimal_places": 2, "barmode": "group" });
//! let merged = ChartOptions::default()
//!     .merged(overrides.as_object().unwrap())
//!     .unwrap();
//! assert_eq!(merged.decimal_places, 2);
//! assert_eq!(merged.font_family, "Cardo");
//! ```

use crate::format::NumberFormat;
use crate::style::Rgba;
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Caller-supplied overrides, keyed by option name.
pub type OptionOverrides = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[serde(rename = "v")]
    Vertical,
    #[serde(rename = "h")]
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarMode {
    Stack,
    Group,
    Overlay,
    Relative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XAnchor {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YAnchor {
    Top,
    Middle,
    Bottom,
}

/// How connected series are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceMode {
    #[serde(rename = "lines")]
    Lines,
    #[serde(rename = "markers")]
    Markers,
    #[serde(rename = "lines+markers")]
    LinesMarkers,
}

impl TraceMode {
    pub fn has_lines(self) -> bool {
        matches!(self, TraceMode::Lines | TraceMode::LinesMarkers)
    }

    pub fn has_markers(self) -> bool {
        matches!(self, TraceMode::Markers | TraceMode::LinesMarkers)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceOrder {
    Normal,
    Reversed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendBackground {
    pub bgcolor: Rgba,
    pub bordercolor: Rgba,
    pub borderwidth: u32,
    pub traceorder: TraceOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSizes {
    pub axes: u32,
    pub legend: u32,
    pub textfont: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxesTitles {
    pub x: Option<String>,
    pub y1: Option<String>,
    pub y2: Option<String>,
}

/// Per-axis literal text (tick prefixes and suffixes).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerAxis {
    pub y1: Option<String>,
    pub y2: Option<String>,
}

impl PerAxis {
    pub fn y1(&self) -> &str {
        self.y1.as_deref().unwrap_or("")
    }

    pub fn y2(&self) -> &str {
        self.y2.as_deref().unwrap_or("")
    }
}

/// Styling of reference lines drawn by `add_dashed_line`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashedLineStyle {
    pub color: Rgba,
    pub width: u32,
    pub dash: u32,
    pub gap: u32,
    /// Multiplier applied to the value at the line's date to get its height.
    pub factor: f64,
    pub font_size: u32,
}

/// Every recognized option, with its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    pub font_color: Rgba,
    pub font_family: String,
    pub font_size: FontSizes,
    pub legend_orientation: Orientation,
    pub legend_background: LegendBackground,
    pub legend_x: Option<f64>,
    pub legend_y: Option<f64>,
    pub xanchor: XAnchor,
    pub yanchor: YAnchor,
    pub show_legend: bool,
    pub barmode: BarMode,
    pub bgcolor: Rgba,
    pub margin: Margin,
    pub dimensions: Dimensions,
    pub axes_titles: AxesTitles,
    pub decimals: bool,
    pub decimal_places: usize,
    pub dt_format: String,
    pub auto_title: bool,
    pub auto_color: bool,
    pub line_width: u32,
    pub marker_size: u32,
    pub mode: TraceMode,
    pub hole_size: f64,
    pub annotations: bool,
    pub tickprefix: PerAxis,
    pub ticksuffix: PerAxis,
    pub save_directory: Option<PathBuf>,
    pub space_buffer: usize,
    pub descending: bool,
    pub dashed_line: DashedLineStyle,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            font_color: Rgba::BLACK,
            font_family: "Cardo".to_string(),
            font_size: FontSizes {
                axes: 16,
                legend: 12,
                textfont: 12,
            },
            legend_orientation: Orientation::Vertical,
            legend_background: LegendBackground {
                bgcolor: Rgba::WHITE,
                bordercolor: Rgba::BLACK,
                borderwidth: 1,
                traceorder: TraceOrder::Normal,
            },
            legend_x: None,
            legend_y: None,
            xanchor: XAnchor::Left,
            yanchor: YAnchor::Top,
            show_legend: false,
            barmode: BarMode::Stack,
            bgcolor: Rgba::TRANSPARENT,
            margin: Margin {
                l: 10,
                r: 10,
                t: 10,
                b: 10,
            },
            dimensions: Dimensions {
                width: 730,
                height: 400,
            },
            axes_titles: AxesTitles::default(),
            decimals: true,
            decimal_places: 1,
            dt_format: "%b. %d, %Y".to_string(),
            auto_title: false,
            auto_color: true,
            line_width: 4,
            marker_size: 10,
            mode: TraceMode::Lines,
            hole_size: 0.6,
            annotations: true,
            tickprefix: PerAxis::default(),
            ticksuffix: PerAxis::default(),
            save_directory: None,
            space_buffer: 5,
            descending: true,
            dashed_line: DashedLineStyle {
                color: Rgba::BLACK,
                width: 2,
                dash: 6,
                gap: 4,
                factor: 1.0,
                font_size: 12,
            },
        }
    }
}

impl ChartOptions {
    /// Apply `overrides` over `self`; an override wins for its key.
    ///
    /// Unknown keys are ignored (logged at debug level). A value of the wrong shape is
    /// an error naming the offending option set.
    pub fn merged(&self, overrides: &OptionOverrides) -> Result<ChartOptions> {
        let mut base = match serde_json::to_value(self)? {
            Value::Object(m) => m,
            _ => return Err(anyhow!("chart options did not serialize to an object")),
        };
        for (key, value) in overrides {
            if !base.contains_key(key) {
                log::debug!("ignoring unknown chart option {key:?}");
                continue;
            }
            base.insert(key.clone(), value.clone());
        }
        serde_json::from_value(Value::Object(base)).with_context(|| {
            let keys: Vec<&str> = overrides.keys().map(String::as_str).collect();
            format!("invalid chart option value among {keys:?}")
        })
    }

    /// Read an overrides object from a JSON file.
    pub fn load_overrides<P: AsRef<Path>>(path: P) -> Result<OptionOverrides> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading options file {}", path.display()))?;
        match serde_json::from_str::<Value>(&text)
            .with_context(|| format!("parsing options file {}", path.display()))?
        {
            Value::Object(m) => Ok(m),
            _ => Err(anyhow!("options file {} is not a JSON object", path.display())),
        }
    }

    pub fn number_format(&self) -> NumberFormat {
        NumberFormat::new(self.decimals, self.decimal_places)
    }

    /// Blank padding appended to legend labels.
    pub fn spacing(&self) -> String {
        " ".repeat(self.space_buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> OptionOverrides {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn override_wins_per_key() {
        let merged = ChartOptions::default()
            .merged(&obj(json!({"font_color": "#ff0000", "tickprefix": {"y1": "$"}})))
            .unwrap();
        assert_eq!(merged.font_color, Rgba::rgb(255, 0, 0));
        assert_eq!(merged.tickprefix.y1(), "$");
        assert_eq!(merged.tickprefix.y2(), "");
        assert_eq!(merged.dimensions.width, 730);
    }

    #[test]
    fn nested_values_replace_whole() {
        let err = ChartOptions::default().merged(&obj(json!({"margin": {"l": 5}})));
        assert!(err.is_err(), "partial margin must be rejected");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let merged = ChartOptions::default()
            .merged(&obj(json!({"connectgap": true})))
            .unwrap();
        assert_eq!(merged, ChartOptions::default());
    }

    #[test]
    fn malformed_value_is_an_error() {
        assert!(
            ChartOptions::default()
                .merged(&obj(json!({"decimal_places": "two"})))
                .is_err()
        );
        assert!(
            ChartOptions::default()
                .merged(&obj(json!({"barmode": "sideways"})))
                .is_err()
        );
    }
}
