//! Rendering: draw a [`Figure`] to **SVG**, **PNG/JPEG/BMP**, a standalone **HTML**
//! page, or an in-memory RGB buffer for the viewer.
//!
//! - Primary and secondary y axes share one x scale (time, numeric or categorical)
//! - Lines, markers, stacked areas, bars in every bar mode, candlesticks and pies
//! - Arrow annotations, dashed reference lines, title block and legend placement

pub mod geometry;
pub mod legend;
pub mod text;
pub mod types;
pub mod util;

pub use types::{Glyph, LegendPlacement, OutputFormat};

use crate::config::{BarMode, Orientation};
use crate::figure::{Anchor, Annotation, Axis, Figure, Shape, TitleLayout, Trace, TraceKind};
use crate::style::Rgba;
use crate::viz_plotters_adapter::{dash_pattern, fill_style, line_style, rgb_color, rgba_color};
use anyhow::{Context, Result, anyhow};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::Path;
use std::sync::Mutex;

use geometry::Geometry;
use legend::{
    LegendStyle, draw_floating_legend, draw_legend_panel, estimate_bottom_band_height_px,
    legend_items, right_panel_width_px,
};
use text::{line_height, text_block_size};
use util::{PaperRect, XScale, y_label_area_px};

/// `ab_glyph` does not discover OS fonts, so one bundled face is registered under
/// every family name a figure asks for.
const BUNDLED_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");
static REGISTERED_FAMILIES: Mutex<Vec<String>> = Mutex::new(Vec::new());

const GRID: RGBColor = RGBColor(232, 232, 232);
const INCREASING: RGBColor = RGBColor(0x3D, 0x99, 0x70);
const DECREASING: RGBColor = RGBColor(0xFF, 0x41, 0x36);
const Y_TICKS: usize = 8;

fn ensure_fonts_registered(families: &[&str]) {
    let mut done = match REGISTERED_FAMILIES.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    for name in std::iter::once("sans-serif").chain(families.iter().copied()) {
        if name.is_empty() || done.iter().any(|f| f == name) {
            continue;
        }
        if plotters::style::register_font(name, FontStyle::Normal, BUNDLED_FONT).is_err() {
            log::warn!("bundled font could not be registered as {name:?}");
        }
        done.push(name.to_string());
    }
}

fn register_figure_fonts(fig: &Figure) {
    let title_family = fig.layout.title.as_ref().map(|t| t.family.as_str());
    let mut families = vec![fig.layout.font.family.as_str()];
    families.extend(title_family);
    ensure_fonts_registered(&families);
}

fn canvas_size(fig: &Figure) -> (u32, u32) {
    (fig.layout.width.max(1), fig.layout.height.max(1))
}

/// Render `fig` to `path`; the extension picks the format.
pub fn save<P: AsRef<Path>>(fig: &Figure, path: P) -> Result<()> {
    let path = path.as_ref();
    let format = OutputFormat::from_path(path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    register_figure_fonts(fig);
    let size = canvas_size(fig);

    match format {
        OutputFormat::Svg => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            draw_figure(root, fig)?;
        }
        OutputFormat::Html => {
            let page = to_html(fig)?;
            std::fs::write(path, page).with_context(|| format!("writing {}", path.display()))?;
        }
        OutputFormat::Png | OutputFormat::Jpeg | OutputFormat::Bmp => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            draw_figure(root, fig)?;
        }
    }
    log::debug!("rendered {} ({format})", path.display());
    Ok(())
}

pub fn to_svg_string(fig: &Figure) -> Result<String> {
    register_figure_fonts(fig);
    let mut out = String::new();
    {
        let root = SVGBackend::with_string(&mut out, canvas_size(fig)).into_drawing_area();
        draw_figure(root, fig)?;
    }
    Ok(out)
}

/// Rasterize to packed RGB8 rows; returns `(pixels, width, height)`.
pub fn render_rgb(fig: &Figure) -> Result<(Vec<u8>, u32, u32)> {
    register_figure_fonts(fig);
    let (w, h) = canvas_size(fig);
    let mut buf = vec![0u8; w as usize * h as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
        draw_figure(root, fig)?;
    }
    Ok((buf, w, h))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Standalone page: the SVG rendering plus the figure JSON in a data script tag.
pub fn to_html(fig: &Figure) -> Result<String> {
    let svg = to_svg_string(fig)?;
    let json = fig.to_json()?.replace("</", "<\\/");
    let title = fig
        .layout
        .title
        .as_ref()
        .map(|t| t.text.as_str())
        .filter(|t| !t.is_empty())
        .unwrap_or("chart");
    Ok(format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}\n<script type=\"application/json\" id=\"figure-data\">{}</script>\n</body>\n</html>\n",
        escape_html(title),
        svg,
        json
    ))
}

/// Draw on the primary or secondary coordinates of a dual-axis chart.
macro_rules! draw_on {
    ($chart:expr, $axis:expr, $series:expr) => {
        match $axis {
            Axis::Y1 => $chart.draw_series($series).map(|_| ()),
            Axis::Y2 => $chart.draw_secondary_series($series).map(|_| ()),
        }
        .map_err(|e| anyhow!("{:?}", e))?
    };
}

fn title_band_px(title: Option<&TitleLayout>) -> u32 {
    let Some(t) = title else { return 0 };
    let mut h = 0;
    if !t.text.is_empty() {
        h += line_height(t.size);
    }
    if !t.subtitle.is_empty() {
        h += line_height(t.subtitle_size);
    }
    if h > 0 { h + 6 } else { 0 }
}

fn draw_figure<DB: DrawingBackend>(root: DrawingArea<DB, Shift>, fig: &Figure) -> Result<()> {
    let layout = &fig.layout;
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let m = layout.margin;
    let body = root.margin(m.t, m.b, m.l, m.r);
    let (_, body) = body.split_vertically(title_band_px(layout.title.as_ref()));

    let items = if layout.legend.show {
        legend_items(fig)
    } else {
        Vec::new()
    };
    let placement = if layout.legend.x.is_some() || layout.legend.y.is_some() {
        LegendPlacement::Floating
    } else {
        match layout.legend.orientation {
            Orientation::Vertical => LegendPlacement::Right,
            Orientation::Horizontal => LegendPlacement::Bottom,
        }
    };
    let legend_style = LegendStyle {
        family: &layout.font.family,
        font_px: layout.font.legend_size,
        text_color: rgba_color(layout.font.color),
        bgcolor: rgba_color(layout.legend.bgcolor),
        bordercolor: rgba_color(layout.legend.bordercolor),
        borderwidth: layout.legend.borderwidth,
    };
    let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();

    let (bw, bh) = body.dim_in_pixel();
    let (plot_area, legend_area) = if items.is_empty() {
        (body, None)
    } else {
        match placement {
            LegendPlacement::Floating => (body, None),
            LegendPlacement::Right => {
                let w = right_panel_width_px(&labels, bw as i32, legend_style.font_px);
                let (plot, legend) = body.split_horizontally((bw as i32 - w).max(0));
                (plot, Some(legend))
            }
            LegendPlacement::Bottom => {
                let h = estimate_bottom_band_height_px(&labels, bw as i32, legend_style.font_px)
                    .min(bh as i32 / 2);
                let (plot, legend) = body.split_vertically((bh as i32 - h).max(0));
                (plot, Some(legend))
            }
        }
    };

    if !layout.plot_bgcolor.is_transparent() {
        plot_area
            .fill(&rgba_color(layout.plot_bgcolor))
            .map_err(|e| anyhow!("{:?}", e))?;
    }

    let paper = if fig.is_pie() {
        draw_pie(&root, &plot_area, fig)?
    } else {
        draw_cartesian(&root, &plot_area, fig)?
    };

    match &legend_area {
        Some(area) => draw_legend_panel(area, &items, &legend_style, placement)?,
        None if !items.is_empty() => {
            let anchor = paper.at(
                layout.legend.x.unwrap_or(1.02),
                layout.legend.y.unwrap_or(1.0),
            );
            draw_floating_legend(
                &root,
                &items,
                &legend_style,
                anchor,
                layout.legend.x_anchor,
                layout.legend.y_anchor,
                layout.legend.orientation == Orientation::Horizontal,
            )?;
        }
        None => {}
    }

    if let Some(title) = &layout.title {
        draw_title(&root, title, m.t)?;
    }

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn draw_title<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &TitleLayout,
    margin_top: u32,
) -> Result<()> {
    let (w, h) = root.dim_in_pixel();
    let x = (title.x.clamp(0.0, 1.0) * w as f64).round() as i32;
    let mut y = ((1.0 - title.y.clamp(0.0, 1.0)) * h as f64).round() as i32 + margin_top as i32;
    let color = rgba_color(title.color);
    let family = title.family.as_str();

    for (text, size) in [
        (title.text.as_str(), title.size),
        (title.subtitle.as_str(), title.subtitle_size),
    ] {
        if text.is_empty() {
            continue;
        }
        let style = TextStyle::from((family, size))
            .color(&color)
            .pos(Pos::new(HPos::Left, VPos::Top));
        root.draw(&Text::new(text, (x, y), style))
            .map_err(|e| anyhow!("{:?}", e))?;
        y += line_height(size) as i32;
    }
    Ok(())
}

/// Finite points of a connected trace, split wherever a value or key is missing.
fn segments(scale: &XScale, trace: &Trace) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut cur: Vec<(f64, f64)> = Vec::new();
    for (k, v) in trace.x.iter().zip(&trace.y) {
        match scale.pos(k) {
            Some(x) if v.is_finite() => cur.push((x, *v)),
            _ => {
                if !cur.is_empty() {
                    out.push(std::mem::take(&mut cur));
                }
            }
        }
    }
    if !cur.is_empty() {
        out.push(cur);
    }
    out
}

fn draw_cartesian<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    area: &DrawingArea<DB, Shift>,
    fig: &Figure,
) -> Result<PaperRect> {
    let layout = &fig.layout;
    let font = &layout.font;
    let family = font.family.as_str();
    let scale = XScale::from_figure(fig);
    let geo = Geometry::compute(fig, &scale);
    let has_candles = fig.traces.iter().any(|t| t.kind == TraceKind::Candlestick);
    let (x0, x1) = scale.range(geo.has_bars() || has_candles);
    let y1_range = geo.y_range(fig, Axis::Y1);
    let y2_range = geo.y_range(fig, Axis::Y2);
    let secondary = fig.has_secondary();
    let nf = layout.number_format;

    let y1_fmt = |v: &f64| nf.format_affixed(*v, &layout.y1.tick_prefix, &layout.y1.tick_suffix);
    let y2_fmt = |v: &f64| nf.format_affixed(*v, &layout.y2.tick_prefix, &layout.y2.tick_suffix);
    let x_fmt = |v: &f64| scale.label(*v);

    let tick_px = (font.axes_size * 3 / 4).max(8);
    let desc_px = |title: &Option<String>| {
        if title.is_some() {
            line_height(font.axes_size)
        } else {
            0
        }
    };
    let left_px = y_label_area_px(y1_range, Y_TICKS, &y1_fmt, tick_px) + desc_px(&layout.y1.title);
    let right_px = if secondary {
        y_label_area_px(y2_range, Y_TICKS, &y2_fmt, tick_px) + desc_px(&layout.y2.title)
    } else {
        0
    };
    let bottom_px = line_height(tick_px) + 10 + desc_px(&layout.x_axis.title);

    let mut chart = ChartBuilder::on(area)
        .margin(8)
        .set_label_area_size(LabelAreaPosition::Left, left_px)
        .set_label_area_size(LabelAreaPosition::Bottom, bottom_px)
        .set_label_area_size(LabelAreaPosition::Right, right_px)
        .build_cartesian_2d(x0..x1, y1_range.0..y1_range.1)
        .map_err(|e| anyhow!("{:?}", e))?
        .set_secondary_coord(x0..x1, y2_range.0..y2_range.1);

    let x_color = rgba_color(layout.x_axis.tick_color.unwrap_or(Rgba::BLACK));
    let y1_color = rgba_color(layout.y1.color.unwrap_or(Rgba::BLACK));
    let y2_color = rgba_color(layout.y2.color.unwrap_or(Rgba::BLACK));

    {
        let mut mesh = chart.configure_mesh();
        mesh.x_labels(scale.label_count())
            .y_labels(Y_TICKS)
            .x_label_formatter(&x_fmt)
            .y_label_formatter(&y1_fmt)
            .bold_line_style(GRID.stroke_width(1))
            .light_line_style(TRANSPARENT)
            .axis_style(BLACK.stroke_width(1))
            .x_label_style(TextStyle::from((family, tick_px)).color(&x_color))
            .y_label_style(TextStyle::from((family, tick_px)).color(&y1_color))
            .axis_desc_style(TextStyle::from((family, font.axes_size)).color(&y1_color));
        if let Some(t) = &layout.x_axis.title {
            mesh.x_desc(t.as_str());
        }
        if let Some(t) = &layout.y1.title {
            mesh.y_desc(t.as_str());
        }
        mesh.draw().map_err(|e| anyhow!("{:?}", e))?;
    }
    if secondary {
        let mut axes = chart.configure_secondary_axes();
        axes.y_labels(Y_TICKS)
            .y_label_formatter(&y2_fmt)
            .axis_style(BLACK.stroke_width(1))
            .label_style(TextStyle::from((family, tick_px)).color(&y2_color))
            .axis_desc_style(TextStyle::from((family, font.axes_size)).color(&y2_color));
        if let Some(t) = &layout.y2.title {
            axes.y_desc(t.as_str());
        }
        axes.draw().map_err(|e| anyhow!("{:?}", e))?;
    }

    let plot_w = chart.plotting_area().dim_in_pixel().0 as f64;
    let slot_px = plot_w * scale.slot() / (x1 - x0).max(f64::EPSILON);

    for (ti, trace) in fig.traces.iter().enumerate() {
        let axis = trace.axis;
        match trace.kind {
            TraceKind::Line | TraceKind::Scatter => {
                let segs = segments(&scale, trace);
                if trace.mode.has_lines() {
                    for seg in &segs {
                        draw_on!(chart, axis, LineSeries::new(seg.iter().copied(), line_style(trace)));
                    }
                }
                if trace.mode.has_markers() {
                    let r = (trace.marker_size / 2).max(2) as i32;
                    let style = rgba_color(trace.color).filled();
                    draw_on!(
                        chart,
                        axis,
                        segs.iter().flatten().map(|p| Circle::new(*p, r, style))
                    );
                }
            }
            TraceKind::Area => {
                for band in geo.bands.iter().filter(|b| b.trace == ti) {
                    let mut poly: Vec<(f64, f64)> =
                        band.points.iter().map(|(x, lo, _)| (*x, *lo)).collect();
                    poly.extend(band.points.iter().rev().map(|(x, _, hi)| (*x, *hi)));
                    draw_on!(
                        chart,
                        axis,
                        std::iter::once(Polygon::new(poly, fill_style(trace.color, 0.5)))
                    );
                    let upper: Vec<(f64, f64)> =
                        band.points.iter().map(|(x, _, hi)| (*x, *hi)).collect();
                    draw_on!(chart, axis, LineSeries::new(upper, line_style(trace)));
                }
            }
            TraceKind::Bar => {
                let opacity = if layout.bar_mode == BarMode::Overlay {
                    0.6
                } else {
                    1.0
                };
                let style = fill_style(trace.color, opacity);
                draw_on!(
                    chart,
                    axis,
                    geo.bars
                        .iter()
                        .filter(|b| b.trace == ti)
                        .map(|b| Rectangle::new([(b.x0, b.y0), (b.x1, b.y1)], style))
                );
            }
            TraceKind::Candlestick => {
                let Some(o) = &trace.ohlc else { continue };
                let width = ((slot_px * 0.6) as u32).max(1);
                let candles: Vec<CandleStick<f64, f64>> = trace
                    .x
                    .iter()
                    .enumerate()
                    .filter_map(|(i, k)| {
                        let x = scale.pos(k)?;
                        let v = [
                            *o.open.get(i)?,
                            *o.high.get(i)?,
                            *o.low.get(i)?,
                            *o.close.get(i)?,
                        ];
                        v.iter().all(|n| n.is_finite()).then(|| {
                            CandleStick::new(
                                x,
                                v[0],
                                v[1],
                                v[2],
                                v[3],
                                INCREASING.filled(),
                                DECREASING.filled(),
                                width,
                            )
                        })
                    })
                    .collect();
                draw_on!(chart, axis, candles);
            }
            TraceKind::Pie => {}
        }
    }

    for shape in &fig.shapes {
        let Shape::VLine {
            x,
            y0,
            y1,
            axis,
            color,
            width,
            dash,
        } = shape;
        let Some(xp) = scale.pos(x) else { continue };
        let style = rgba_color(*color).stroke_width(*width);
        let pts = vec![(xp, *y0), (xp, *y1)];
        match dash_pattern(*dash) {
            Some((d, g)) => draw_on!(chart, *axis, DashedLineSeries::new(pts, d, g, style)),
            None => draw_on!(chart, *axis, LineSeries::new(pts, style)),
        }
    }

    let paper = PaperRect::of(chart.plotting_area());
    for ann in &fig.annotations {
        let point = match &ann.anchor {
            Anchor::Data { x, y, axis } => {
                let Some(xp) = scale.pos(x) else { continue };
                if !y.is_finite() {
                    continue;
                }
                match axis {
                    Axis::Y1 => chart.backend_coord(&(xp, *y)),
                    Axis::Y2 => chart.borrow_secondary().backend_coord(&(xp, *y)),
                }
            }
            Anchor::Paper { x, y } => paper.at(*x, *y),
        };
        draw_annotation(root, ann, point, family)?;
    }
    Ok(paper)
}

fn draw_pie<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    area: &DrawingArea<DB, Shift>,
    fig: &Figure,
) -> Result<PaperRect> {
    let paper = PaperRect::of(area);
    let font = &fig.layout.font;
    let Some(trace) = fig.traces.first() else {
        return Ok(paper);
    };

    let mut sizes: Vec<f64> = Vec::new();
    let mut colors: Vec<RGBColor> = Vec::new();
    let mut labels: Vec<String> = Vec::new();
    for (i, (k, v)) in trace.x.iter().zip(&trace.y).enumerate() {
        if !v.is_finite() || *v <= 0.0 {
            continue;
        }
        sizes.push(*v);
        colors.push(rgb_color(
            trace.slice_colors.get(i).copied().unwrap_or(trace.color),
        ));
        labels.push(k.display_with(&fig.layout.x_axis.dt_format));
    }

    if sizes.is_empty() {
        log::warn!("pie {:?} has no positive values to draw", trace.name);
    } else {
        let center = (
            (paper.left + paper.right) / 2,
            (paper.top + paper.bottom) / 2,
        );
        let span = (paper.right - paper.left).min(paper.bottom - paper.top);
        let radius = (span as f64 / 2.0 * 0.8).max(1.0);
        let label_color = rgba_color(font.color);
        let inside_color = WHITE;
        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(-90.0);
        pie.donut_hole(radius * trace.hole);
        pie.label_style(TextStyle::from((font.family.as_str(), font.text_size)).color(&label_color));
        pie.percentages(TextStyle::from((font.family.as_str(), font.text_size)).color(&inside_color));
        root.draw(&pie).map_err(|e| anyhow!("{:?}", e))?;
    }

    for ann in &fig.annotations {
        if let Anchor::Paper { x, y } = ann.anchor {
            draw_annotation(root, ann, paper.at(x, y), &font.family)?;
        }
    }
    Ok(paper)
}

/// Text box for an annotation, with an arrow back to `anchor` when one is set.
fn draw_annotation<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    ann: &Annotation,
    anchor: (i32, i32),
    family: &str,
) -> Result<()> {
    let lines: Vec<&str> = ann.text.split('\n').collect();
    let (tw, th) = text_block_size(&lines, ann.font_size);
    let (bw, bh) = (tw as i32 + 8, th as i32 + 4);
    let color = rgba_color(ann.color);

    let center = match ann.arrow {
        Some((dx, dy)) => {
            let tail = (anchor.0 + dx, anchor.1 + dy);
            root.draw(&PathElement::new(vec![tail, anchor], color.stroke_width(1)))
                .map_err(|e| anyhow!("{:?}", e))?;
            root.draw(&Polygon::new(arrow_head(tail, anchor, 6.0), color.filled()))
                .map_err(|e| anyhow!("{:?}", e))?;
            let shift = if dy <= 0 { -bh / 2 } else { bh / 2 };
            (tail.0, tail.1 + shift)
        }
        None => (anchor.0, anchor.1 - bh / 2 - 4),
    };

    let (left, top) = (center.0 - bw / 2, center.1 - bh / 2);
    if let Some(bg) = ann.bgcolor {
        root.draw(&Rectangle::new(
            [(left, top), (left + bw, top + bh)],
            rgba_color(bg).filled(),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }
    let style = TextStyle::from((family, ann.font_size))
        .color(&color)
        .pos(Pos::new(HPos::Center, VPos::Center));
    let lh = line_height(ann.font_size) as i32;
    for (i, line) in lines.iter().enumerate() {
        let y = top + 2 + i as i32 * lh + lh / 2;
        root.draw(&Text::new(*line, (center.0, y), style.clone()))
            .map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}

/// Triangle with its point at `tip`, aligned with the `tail → tip` direction.
fn arrow_head(tail: (i32, i32), tip: (i32, i32), size: f64) -> Vec<(i32, i32)> {
    let (vx, vy) = ((tip.0 - tail.0) as f64, (tip.1 - tail.1) as f64);
    let len = (vx * vx + vy * vy).sqrt().max(1.0);
    let (ux, uy) = (vx / len, vy / len);
    let base = (tip.0 as f64 - ux * size, tip.1 as f64 - uy * size);
    let half = size / 2.0;
    vec![
        tip,
        ((base.0 - uy * half).round() as i32, (base.1 + ux * half).round() as i32),
        ((base.0 + uy * half).round() as i32, (base.1 - ux * half).round() as i32),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_head_points_at_tip() {
        let head = arrow_head((0, -40), (0, 0), 6.0);
        assert_eq!(head[0], (0, 0));
        assert!(head[1].1 < 0 && head[2].1 < 0);
    }

    #[test]
    fn title_band_is_empty_without_text() {
        assert_eq!(title_band_px(None), 0);
    }

    #[test]
    fn html_escapes_markup() {
        assert_eq!(escape_html("<a & b>"), "&lt;a &amp; b&gt;");
    }
}
