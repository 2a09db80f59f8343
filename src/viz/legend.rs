//! Legend layout and drawing: a right-hand panel, a bottom band, or a floating box.

use anyhow::{Result, anyhow};
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::text::{estimate_text_width_px, line_height, wrap_text_to_width};
use super::types::{Glyph, LegendPlacement};
use crate::config::{TraceOrder, XAnchor, YAnchor};
use crate::figure::{Figure, TraceKind};
use crate::style::MarkerShape;
use crate::viz_plotters_adapter::{draw_line_sample, draw_marker, rgba_color};

// Layout constants shared by the estimators and the drawing code.
const SWATCH_W: i32 = 18;
const SWATCH_GAP: i32 = 6;
const TRAILING_GAP: i32 = 14;
const PAD: i32 = 8;
const ROW_GAP: i32 = 4;
const MARKER_PX: i32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct LegendItem {
    pub label: String,
    pub color: RGBAColor,
    pub glyph: Glyph,
}

#[derive(Debug, Clone, Copy)]
pub struct LegendStyle<'a> {
    pub family: &'a str,
    pub font_px: u32,
    pub text_color: RGBAColor,
    pub bgcolor: RGBAColor,
    pub bordercolor: RGBAColor,
    pub borderwidth: u32,
}

/// Entries in drawing order: pie slices, or every trace that opted in.
pub fn legend_items(fig: &Figure) -> Vec<LegendItem> {
    let mut items = Vec::new();
    if fig.is_pie() {
        let t = &fig.traces[0];
        if t.show_legend {
            for (i, (k, v)) in t.x.iter().zip(&t.y).enumerate() {
                if !v.is_finite() || *v <= 0.0 {
                    continue;
                }
                items.push(LegendItem {
                    label: k.display_with(&fig.layout.x_axis.dt_format),
                    color: rgba_color(t.slice_colors.get(i).copied().unwrap_or(t.color)),
                    glyph: Glyph::Marker(MarkerShape::Square),
                });
            }
        }
    } else {
        for t in fig.traces.iter().filter(|t| t.show_legend) {
            let glyph = match t.kind {
                TraceKind::Line | TraceKind::Scatter if t.mode.has_lines() => Glyph::Line,
                TraceKind::Line | TraceKind::Scatter => Glyph::Marker(MarkerShape::Circle),
                TraceKind::Candlestick => Glyph::Marker(MarkerShape::Diamond),
                TraceKind::Area | TraceKind::Bar | TraceKind::Pie => {
                    Glyph::Marker(MarkerShape::Square)
                }
            };
            items.push(LegendItem {
                label: t.name.clone(),
                color: rgba_color(t.color),
                glyph,
            });
        }
    }
    if fig.layout.legend.traceorder == TraceOrder::Reversed {
        items.reverse();
    }
    items
}

fn block_width(lines: &[String], font_px: u32) -> i32 {
    let text_w = lines
        .iter()
        .map(|s| estimate_text_width_px(s, font_px) as i32)
        .max()
        .unwrap_or(0);
    SWATCH_W + SWATCH_GAP + text_w + TRAILING_GAP
}

/// Greedy flow of items into rows for a band `usable_w` wide. Each entry is the
/// item index plus its wrapped lines.
fn flow_rows(labels: &[&str], usable_w: i32, font_px: u32) -> Vec<Vec<(usize, Vec<String>)>> {
    let cap = (((usable_w as f32) * 0.35).max(140.0) as i32 - SWATCH_W - SWATCH_GAP - TRAILING_GAP)
        .max(40) as u32;
    let mut rows: Vec<Vec<(usize, Vec<String>)>> = Vec::new();
    let mut cur: Vec<(usize, Vec<String>)> = Vec::new();
    let mut x = PAD;
    for (i, label) in labels.iter().enumerate() {
        let lines = wrap_text_to_width(label, font_px, cap);
        let w = block_width(&lines, font_px);
        if x + w > usable_w && !cur.is_empty() {
            rows.push(std::mem::take(&mut cur));
            x = PAD;
        }
        x += w;
        cur.push((i, lines));
    }
    if !cur.is_empty() {
        rows.push(cur);
    }
    rows
}

fn rows_height(rows: &[Vec<(usize, Vec<String>)>], font_px: u32) -> i32 {
    let line_h = line_height(font_px) as i32;
    let body: i32 = rows
        .iter()
        .map(|r| r.iter().map(|(_, l)| l.len().max(1) as i32).max().unwrap_or(1) * line_h)
        .sum();
    body + ROW_GAP * (rows.len().saturating_sub(1) as i32)
}

/// Height the bottom band needs so no entry is clipped.
pub fn estimate_bottom_band_height_px(labels: &[&str], total_w: i32, font_px: u32) -> i32 {
    let rows = flow_rows(labels, total_w - PAD, font_px);
    rows_height(&rows, font_px) + 2 * PAD
}

/// Width of the right-hand panel: the widest entry, bounded by 40% of the canvas.
pub fn right_panel_width_px(labels: &[&str], total_w: i32, font_px: u32) -> i32 {
    let widest = labels
        .iter()
        .map(|l| block_width(&[l.to_string()], font_px))
        .max()
        .unwrap_or(0);
    let max_w = ((total_w as f32 * 0.4) as i32).max(80);
    (widest + 2 * PAD).clamp(80, max_w)
}

fn draw_item<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    x: i32,
    top: i32,
    item: &LegendItem,
    lines: &[String],
    style: &LegendStyle<'_>,
) -> Result<i32> {
    let line_h = line_height(style.font_px) as i32;
    let block_h = lines.len().max(1) as i32 * line_h;
    let center_y = top + block_h / 2;

    match item.glyph {
        Glyph::Line => draw_line_sample(area, (x, x + SWATCH_W), center_y, item.color, 3)?,
        Glyph::Marker(shape) => {
            draw_marker(area, (x + SWATCH_W / 2, center_y), MARKER_PX, item.color, shape)?
        }
    }

    let text_style = TextStyle::from((style.family, style.font_px))
        .color(&style.text_color)
        .pos(Pos::new(HPos::Left, VPos::Center));
    let text_x = x + SWATCH_W + SWATCH_GAP;
    for (i, line) in lines.iter().enumerate() {
        let y = top + i as i32 * line_h + line_h / 2;
        area.draw(&Text::new(line.as_str(), (text_x, y), text_style.clone()))
            .map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(block_h)
}

/// Draw the legend in its own area (right panel or bottom band).
pub fn draw_legend_panel<DB: DrawingBackend>(
    legend_area: &DrawingArea<DB, Shift>,
    items: &[LegendItem],
    style: &LegendStyle<'_>,
    placement: LegendPlacement,
) -> Result<()> {
    let (w_u32, _) = legend_area.dim_in_pixel();
    let w = w_u32 as i32;
    let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();

    match placement {
        LegendPlacement::Right => {
            let cap = (w - 2 * PAD - SWATCH_W - SWATCH_GAP).max(40) as u32;
            let mut y = PAD;
            for item in items {
                let lines = wrap_text_to_width(&item.label, style.font_px, cap);
                y += draw_item(legend_area, PAD, y, item, &lines, style)? + ROW_GAP;
            }
        }
        LegendPlacement::Bottom => {
            let line_h = line_height(style.font_px) as i32;
            let mut y = PAD;
            for row in flow_rows(&labels, w - PAD, style.font_px) {
                let mut x = PAD;
                let mut row_h = line_h;
                for (i, lines) in &row {
                    row_h = row_h.max(draw_item(legend_area, x, y, &items[*i], lines, style)?);
                    x += block_width(lines, style.font_px);
                }
                y += row_h + ROW_GAP;
            }
        }
        LegendPlacement::Floating => {}
    }
    Ok(())
}

/// Draw a bordered legend box anchored at backend pixel `anchor`.
#[allow(clippy::too_many_arguments)]
pub fn draw_floating_legend<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    items: &[LegendItem],
    style: &LegendStyle<'_>,
    anchor: (i32, i32),
    x_anchor: XAnchor,
    y_anchor: YAnchor,
    horizontal: bool,
) -> Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    let line_h = line_height(style.font_px) as i32;
    let blocks: Vec<Vec<String>> = items.iter().map(|i| vec![i.label.clone()]).collect();
    let widths: Vec<i32> = blocks.iter().map(|b| block_width(b, style.font_px)).collect();
    let (box_w, box_h) = if horizontal {
        (widths.iter().sum::<i32>() + PAD, line_h + 2 * PAD)
    } else {
        (
            widths.iter().copied().max().unwrap_or(0) + PAD,
            items.len() as i32 * (line_h + ROW_GAP) - ROW_GAP + 2 * PAD,
        )
    };
    let left = match x_anchor {
        XAnchor::Left => anchor.0,
        XAnchor::Center => anchor.0 - box_w / 2,
        XAnchor::Right => anchor.0 - box_w,
    };
    let top = match y_anchor {
        YAnchor::Top => anchor.1,
        YAnchor::Middle => anchor.1 - box_h / 2,
        YAnchor::Bottom => anchor.1 - box_h,
    };

    root.draw(&Rectangle::new(
        [(left, top), (left + box_w, top + box_h)],
        style.bgcolor.filled(),
    ))
    .map_err(|e| anyhow!("{:?}", e))?;
    if style.borderwidth > 0 {
        root.draw(&Rectangle::new(
            [(left, top), (left + box_w, top + box_h)],
            style.bordercolor.stroke_width(style.borderwidth),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }

    let mut x = left + PAD;
    let mut y = top + PAD;
    for ((item, lines), w) in items.iter().zip(&blocks).zip(&widths) {
        draw_item(root, x, y, item, lines, style)?;
        if horizontal {
            x += w;
        } else {
            y += line_h + ROW_GAP;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_grows_with_more_rows() {
        let few = ["A (1.0K)"];
        let many = ["ALPHA (1.0K)"; 12];
        let h_few = estimate_bottom_band_height_px(&few, 400, 12);
        let h_many = estimate_bottom_band_height_px(&many, 400, 12);
        assert!(h_many > h_few);
    }

    #[test]
    fn right_panel_is_bounded() {
        let long = ["X".repeat(200)];
        let labels: Vec<&str> = long.iter().map(String::as_str).collect();
        assert_eq!(right_panel_width_px(&labels, 500, 12), 200);
    }
}
