//! Retained chart model.
//!
//! A [`Figure`] is what `ChartMaker::build` produces and what title, annotation and
//! reference-line operations mutate in place. It is plain data: rendering lives in
//! [`crate::viz`], and `serde` gives a JSON description for export.

use crate::config::{BarMode, Margin, Orientation, TraceMode, TraceOrder, XAnchor, YAnchor};
use crate::format::NumberFormat;
use crate::style::{LineDash, Rgba};
use crate::table::Key;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which vertical scale a trace or overlay is drawn against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Y1,
    Y2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Line,
    Area,
    Scatter,
    Bar,
    Candlestick,
    Pie,
}

impl TraceKind {
    /// Line, area and scatter are all drawn as connected point series.
    pub fn is_connected(self) -> bool {
        matches!(self, TraceKind::Line | TraceKind::Area | TraceKind::Scatter)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ohlc {
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
}

/// One renderable series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub name: String,
    pub kind: TraceKind,
    pub axis: Axis,
    pub x: Vec<Key>,
    /// Values; for candlesticks the close, for pies the slice sizes.
    pub y: Vec<f64>,
    pub ohlc: Option<Ohlc>,
    pub color: Rgba,
    /// Per-slice colors of a pie.
    pub slice_colors: Vec<Rgba>,
    pub line_width: u32,
    pub marker_size: u32,
    pub mode: TraceMode,
    /// Traces sharing a stack group are stacked cumulatively.
    pub stack_group: Option<String>,
    pub show_legend: bool,
    /// Donut hole as a fraction of the pie radius.
    pub hole: f64,
}

impl Trace {
    pub fn new(kind: TraceKind, name: impl Into<String>, x: Vec<Key>, y: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            kind,
            axis: Axis::Y1,
            x,
            y,
            ohlc: None,
            color: Rgba::BLACK,
            slice_colors: Vec::new(),
            line_width: 2,
            marker_size: 6,
            mode: TraceMode::Lines,
            stack_group: None,
            show_legend: false,
            hole: 0.0,
        }
    }

    pub fn on_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleLayout {
    pub text: String,
    pub subtitle: String,
    /// Paper coordinates of the title block's top-left corner.
    pub x: f64,
    pub y: f64,
    pub size: u32,
    pub subtitle_size: u32,
    pub color: Rgba,
    pub family: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontLayout {
    pub family: String,
    pub color: Rgba,
    pub axes_size: u32,
    pub legend_size: u32,
    pub text_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendLayout {
    pub show: bool,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub orientation: Orientation,
    pub x_anchor: XAnchor,
    pub y_anchor: YAnchor,
    pub bgcolor: Rgba,
    pub bordercolor: Rgba,
    pub borderwidth: u32,
    pub traceorder: TraceOrder,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YAxisLayout {
    pub title: Option<String>,
    pub color: Option<Rgba>,
    pub tick_prefix: String,
    pub tick_suffix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XAxisLayout {
    pub title: Option<String>,
    pub tick_color: Option<Rgba>,
    /// strftime pattern for time ticks.
    pub dt_format: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    White,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoverMode {
    XUnified,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: Option<TitleLayout>,
    pub x_axis: XAxisLayout,
    pub y1: YAxisLayout,
    pub y2: YAxisLayout,
    pub legend: LegendLayout,
    pub template: Template,
    pub hover_mode: HoverMode,
    pub width: u32,
    pub height: u32,
    pub margin: Margin,
    pub font: FontLayout,
    pub bar_mode: BarMode,
    pub plot_bgcolor: Rgba,
    pub number_format: NumberFormat,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            title: None,
            x_axis: XAxisLayout {
                dt_format: "%Y-%m-%d".to_string(),
                ..Default::default()
            },
            y1: YAxisLayout::default(),
            y2: YAxisLayout::default(),
            legend: LegendLayout {
                show: false,
                x: None,
                y: None,
                orientation: Orientation::Vertical,
                x_anchor: XAnchor::Left,
                y_anchor: YAnchor::Top,
                bgcolor: Rgba::WHITE,
                bordercolor: Rgba::BLACK,
                borderwidth: 1,
                traceorder: TraceOrder::Normal,
            },
            template: Template::White,
            hover_mode: HoverMode::XUnified,
            width: 730,
            height: 400,
            margin: Margin {
                l: 10,
                r: 10,
                t: 10,
                b: 10,
            },
            font: FontLayout {
                family: "sans-serif".to_string(),
                color: Rgba::BLACK,
                axes_size: 16,
                legend_size: 12,
                text_size: 12,
            },
            bar_mode: BarMode::Stack,
            plot_bgcolor: Rgba::TRANSPARENT,
            number_format: NumberFormat::default(),
        }
    }
}

/// Where an annotation is pinned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "ref", rename_all = "lowercase")]
pub enum Anchor {
    /// A data point on one of the axes.
    Data { x: Key, y: f64, axis: Axis },
    /// Fractions of the canvas, origin at the bottom-left.
    Paper { x: f64, y: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub anchor: Anchor,
    /// Lines separated by `\n`.
    pub text: String,
    /// Pixel offset from the anchor to the text; an arrow is drawn when set.
    pub arrow: Option<(i32, i32)>,
    pub font_size: u32,
    pub color: Rgba,
    pub bgcolor: Option<Rgba>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// Vertical segment at `x` from `y0` to `y1`.
    VLine {
        x: Key,
        y0: f64,
        y1: f64,
        axis: Axis,
        color: Rgba,
        width: u32,
        dash: LineDash,
    },
}

/// Traces, layout and overlays of one chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub traces: Vec<Trace>,
    pub layout: Layout,
    pub annotations: Vec<Annotation>,
    pub shapes: Vec<Shape>,
}

impl Figure {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            ..Default::default()
        }
    }

    pub fn add_trace(&mut self, trace: Trace) {
        self.traces.push(trace);
    }

    pub fn add_annotation(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn has_secondary(&self) -> bool {
        self.traces.iter().any(|t| t.axis == Axis::Y2)
    }

    /// A pie chart is drawn without axes; only the first trace decides.
    pub fn is_pie(&self) -> bool {
        self.traces
            .first()
            .is_some_and(|t| t.kind == TraceKind::Pie)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<Figure> {
        Ok(serde_json::from_str(s)?)
    }

    /// Render to a file; format is chosen by extension (see [`crate::viz::OutputFormat`]).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        crate::viz::save(self, path)
    }

    pub fn to_svg_string(&self) -> Result<String> {
        crate::viz::to_svg_string(self)
    }
}
