//! Conversions from the figure's color and stroke types to plotters styles, plus
//! the marker glyphs shared by plots and legends.
//!
//! ```ignore
//!     use plotters::prelude::*;
//!     use crate::viz_plotters_adapter::{line_style, fill_style};
//!
//!     chart.draw_series(LineSeries::new(points, line_style(&trace)))?;
//!     chart.draw_series(bars.iter().map(|b| Rectangle::new([(b.x0, b.y0), (b.x1, b.y1)], fill_style(trace.color, 1.0))))?;
//! ```

use anyhow::{Result, anyhow};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::figure::Trace;
use crate::style::{LineDash, MarkerShape, Rgba};

pub fn rgb_color(c: Rgba) -> RGBColor {
    RGBColor(c.r, c.g, c.b)
}

pub fn rgba_color(c: Rgba) -> RGBAColor {
    RGBAColor(c.r, c.g, c.b, c.alpha())
}

/// Stroke for a trace's line.
pub fn line_style(trace: &Trace) -> ShapeStyle {
    rgba_color(trace.color).stroke_width(trace.line_width.max(1))
}

/// Fill with extra opacity on top of the color's own alpha.
pub fn fill_style(c: Rgba, opacity: f64) -> ShapeStyle {
    rgb_color(c).mix(c.alpha() * opacity).filled()
}

/// `(dash, gap)` lengths, or `None` for a solid stroke.
pub fn dash_pattern(dash: LineDash) -> Option<(u32, u32)> {
    match dash {
        LineDash::Solid => None,
        LineDash::Dash { size, gap } => Some((size.max(1), gap.max(1))),
    }
}

/// Draw a filled marker centred on backend pixel `(x, y)`.
pub fn draw_marker<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    (x, y): (i32, i32),
    size: i32,
    color: RGBAColor,
    shape: MarkerShape,
) -> Result<()> {
    let res = match shape {
        MarkerShape::Circle => area.draw(&Circle::new((x, y), size, color.filled())),
        MarkerShape::Square => area.draw(&Rectangle::new(
            [(x - size, y - size), (x + size, y + size)],
            color.filled(),
        )),
        MarkerShape::Diamond => area.draw(&Polygon::new(
            vec![(x, y - size), (x - size, y), (x, y + size), (x + size, y)],
            color.filled(),
        )),
    };
    res.map_err(|e| anyhow!("{:?}", e))
}

/// Short horizontal stroke, as used for line swatches.
pub fn draw_line_sample<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    (x0, x1): (i32, i32),
    y: i32,
    color: RGBAColor,
    width: u32,
) -> Result<()> {
    area.draw(&PathElement::new(
        vec![(x0, y), (x1, y)],
        color.stroke_width(width.max(1)),
    ))
    .map_err(|e| anyhow!("{:?}", e))
}
