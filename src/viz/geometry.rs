//! Data-space geometry computed before drawing: bar rectangles, stacked area bands
//! and the y range each axis must cover.

use crate::config::BarMode;
use crate::figure::{Anchor, Axis, Figure, Shape, TraceKind};
use ahash::AHashMap;

use super::util::XScale;

/// Fraction of an x slot covered by bars.
const BAR_GROUP_WIDTH: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarRect {
    pub trace: usize,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

/// Filled band of one area trace: `(x, lower, upper)` sorted by x.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaBand {
    pub trace: usize,
    pub points: Vec<(f64, f64, f64)>,
}

#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub bars: Vec<BarRect>,
    pub bands: Vec<AreaBand>,
}

impl Geometry {
    pub fn compute(fig: &Figure, scale: &XScale) -> Self {
        Self {
            bars: bar_rects(fig, scale),
            bands: area_bands(fig, scale),
        }
    }

    pub fn has_bars(&self) -> bool {
        !self.bars.is_empty()
    }

    /// Padded `(min, max)` covering everything drawn against `axis`.
    pub fn y_range(&self, fig: &Figure, axis: Axis) -> (f64, f64) {
        let on_axis = |i: usize| fig.traces[i].axis == axis;
        let mut ys: Vec<f64> = Vec::new();
        let mut filled = false;

        for t in fig.traces.iter().filter(|t| t.axis == axis) {
            match t.kind {
                TraceKind::Line | TraceKind::Scatter => ys.extend(&t.y),
                TraceKind::Candlestick => match &t.ohlc {
                    Some(o) => ys.extend(o.low.iter().chain(o.high.iter())),
                    None => ys.extend(&t.y),
                },
                TraceKind::Area | TraceKind::Bar | TraceKind::Pie => {}
            }
        }
        for b in self.bars.iter().filter(|b| on_axis(b.trace)) {
            ys.extend([b.y0, b.y1]);
            filled = true;
        }
        for band in self.bands.iter().filter(|b| on_axis(b.trace)) {
            ys.extend(band.points.iter().flat_map(|(_, lo, hi)| [*lo, *hi]));
            filled = true;
        }
        for s in &fig.shapes {
            let Shape::VLine { y0, y1, axis: a, .. } = s;
            if *a == axis {
                ys.extend([*y0, *y1]);
            }
        }
        for a in &fig.annotations {
            if let Anchor::Data { y, axis: a, .. } = &a.anchor
                && *a == axis
            {
                ys.push(*y);
            }
        }

        let finite = ys.iter().copied().filter(|v| v.is_finite());
        let (mut lo, mut hi) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if !lo.is_finite() || !hi.is_finite() {
            return (0.0, 1.0);
        }
        if (hi - lo).abs() < f64::EPSILON {
            lo -= 1.0;
            hi += 1.0;
        }
        let pad = (hi - lo) * 0.05;
        let lo = if filled && lo >= 0.0 { 0.0 } else { lo - pad };
        (lo, hi + pad)
    }
}

fn bar_rects(fig: &Figure, scale: &XScale) -> Vec<BarRect> {
    let bar_traces: Vec<usize> = fig
        .traces
        .iter()
        .enumerate()
        .filter(|(_, t)| t.kind == TraceKind::Bar)
        .map(|(i, _)| i)
        .collect();
    if bar_traces.is_empty() {
        return Vec::new();
    }
    let group_w = scale.slot() * BAR_GROUP_WIDTH;
    let n = bar_traces.len() as f64;

    // Running totals per (axis, x position).
    let mut up: AHashMap<(Axis, u64), f64> = AHashMap::new();
    let mut down: AHashMap<(Axis, u64), f64> = AHashMap::new();
    let mut out = Vec::new();

    for (slot_idx, &ti) in bar_traces.iter().enumerate() {
        let t = &fig.traces[ti];
        for (k, v) in t.x.iter().zip(&t.y) {
            let (Some(x), true) = (scale.pos(k), v.is_finite()) else {
                continue;
            };
            let key = (t.axis, x.to_bits());
            let (x0, x1, y0, y1) = match fig.layout.bar_mode {
                BarMode::Group => {
                    let w = group_w / n;
                    let x0 = x - group_w / 2.0 + slot_idx as f64 * w;
                    (x0, x0 + w, 0.0, *v)
                }
                BarMode::Overlay => (x - group_w / 2.0, x + group_w / 2.0, 0.0, *v),
                BarMode::Stack => {
                    let base = up.entry(key).or_insert(0.0);
                    let y0 = *base;
                    *base += v;
                    (x - group_w / 2.0, x + group_w / 2.0, y0, *base)
                }
                BarMode::Relative => {
                    let base = if *v >= 0.0 {
                        up.entry(key).or_insert(0.0)
                    } else {
                        down.entry(key).or_insert(0.0)
                    };
                    let y0 = *base;
                    *base += v;
                    (x - group_w / 2.0, x + group_w / 2.0, y0, *base)
                }
            };
            out.push(BarRect {
                trace: ti,
                x0,
                x1,
                y0,
                y1,
            });
        }
    }
    out
}

fn area_bands(fig: &Figure, scale: &XScale) -> Vec<AreaBand> {
    let mut totals: AHashMap<(Axis, String, u64), f64> = AHashMap::new();
    let mut out = Vec::new();
    for (ti, t) in fig.traces.iter().enumerate() {
        if t.kind != TraceKind::Area {
            continue;
        }
        let mut points: Vec<(f64, f64, f64)> = Vec::with_capacity(t.x.len());
        for (k, v) in t.x.iter().zip(&t.y) {
            let Some(x) = scale.pos(k) else { continue };
            let v = if v.is_finite() { *v } else { 0.0 };
            match &t.stack_group {
                Some(group) => {
                    let base = totals.entry((t.axis, group.clone(), x.to_bits())).or_insert(0.0);
                    let lower = *base;
                    *base += v;
                    points.push((x, lower, *base));
                }
                None => points.push((x, 0.0, v)),
            }
        }
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        out.push(AreaBand { trace: ti, points });
    }
    out
}
