//! Shared layout helpers: the x scale, paper coordinates and label gutters.

use crate::figure::{Anchor, Figure, Shape};
use crate::table::Key;
use chrono::DateTime;
use plotters::coord::CoordTranslate;
use plotters::prelude::*;

use super::text::estimate_text_width_px;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// How x keys map onto the continuous axis.
#[derive(Debug, Clone, PartialEq)]
pub enum XKind {
    /// Seconds since the Unix epoch.
    Time,
    Number,
    /// One slot per distinct key, in first-seen order.
    Category(Vec<Key>),
}

/// Maps every x key of a figure to an `f64` position and back to a tick label.
#[derive(Debug, Clone)]
pub struct XScale {
    pub kind: XKind,
    /// Sorted distinct positions.
    positions: Vec<f64>,
    dt_format: String,
}

impl XScale {
    pub fn from_figure(fig: &Figure) -> Self {
        let mut keys: Vec<&Key> = fig.traces.iter().flat_map(|t| t.x.iter()).collect();
        keys.extend(fig.shapes.iter().map(|s| match s {
            Shape::VLine { x, .. } => x,
        }));
        keys.extend(fig.annotations.iter().filter_map(|a| match &a.anchor {
            Anchor::Data { x, .. } => Some(x),
            Anchor::Paper { .. } => None,
        }));

        let kind = if !keys.is_empty() && keys.iter().all(|k| k.is_time()) {
            XKind::Time
        } else if !keys.is_empty() && keys.iter().all(|k| matches!(k, Key::Number(_))) {
            XKind::Number
        } else {
            let mut cats: Vec<Key> = Vec::new();
            for k in keys.iter().copied() {
                if !cats.contains(k) {
                    cats.push(k.clone());
                }
            }
            XKind::Category(cats)
        };

        let mut scale = Self {
            kind,
            positions: Vec::new(),
            dt_format: fig.layout.x_axis.dt_format.clone(),
        };
        let mut positions: Vec<f64> = keys.iter().filter_map(|k| scale.pos(k)).collect();
        positions.sort_by(f64::total_cmp);
        positions.dedup();
        scale.positions = positions;
        scale
    }

    pub fn pos(&self, key: &Key) -> Option<f64> {
        match (&self.kind, key) {
            (XKind::Time, Key::Time(t)) => Some(t.and_utc().timestamp() as f64),
            (XKind::Number, Key::Number(n)) => n.is_finite().then_some(*n),
            (XKind::Category(cats), k) => cats.iter().position(|c| c == k).map(|i| i as f64),
            _ => None,
        }
    }

    /// Distance between neighbouring x values; bars and candles are sized from it.
    pub fn slot(&self) -> f64 {
        let fallback = match self.kind {
            XKind::Time => SECONDS_PER_DAY,
            _ => 1.0,
        };
        if matches!(self.kind, XKind::Category(_)) {
            return 1.0;
        }
        self.positions
            .windows(2)
            .map(|w| w[1] - w[0])
            .filter(|d| *d > 0.0)
            .min_by(f64::total_cmp)
            .unwrap_or(fallback)
    }

    /// Axis range; `pad` widens it by half a slot on both sides (bars, candles).
    pub fn range(&self, pad: bool) -> (f64, f64) {
        if let XKind::Category(cats) = &self.kind {
            return (-0.5, cats.len().max(1) as f64 - 0.5);
        }
        let (Some(lo), Some(hi)) = (self.positions.first(), self.positions.last()) else {
            return (0.0, 1.0);
        };
        let slot = self.slot();
        if lo == hi {
            return (lo - slot, hi + slot);
        }
        if pad {
            (lo - slot / 2.0, hi + slot / 2.0)
        } else {
            (*lo, *hi)
        }
    }

    pub fn label(&self, v: f64) -> String {
        match &self.kind {
            XKind::Time => DateTime::from_timestamp(v.round() as i64, 0)
                .map(|d| d.naive_utc().format(&self.dt_format).to_string())
                .unwrap_or_default(),
            XKind::Number => {
                if v.fract() == 0.0 {
                    format!("{v:.0}")
                } else {
                    format!("{v:.2}")
                }
            }
            XKind::Category(cats) => {
                let r = v.round();
                if r < 0.0 || (v - r).abs() > 1e-6 {
                    return String::new();
                }
                cats.get(r as usize)
                    .map(|k| k.display_with(&self.dt_format))
                    .unwrap_or_default()
            }
        }
    }

    pub fn label_count(&self) -> usize {
        match &self.kind {
            XKind::Category(cats) => cats.len().clamp(1, 12),
            _ => 8,
        }
    }
}

/// Pixel rectangle of the plotting area, for paper-referenced positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaperRect {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl PaperRect {
    pub fn of<DB: DrawingBackend, CT: CoordTranslate>(area: &DrawingArea<DB, CT>) -> Self {
        let (xr, yr) = area.get_pixel_range();
        Self {
            left: xr.start,
            right: xr.end,
            top: yr.start,
            bottom: yr.end,
        }
    }

    /// Paper `(x, y)` with the origin bottom-left to backend pixels.
    pub fn at(&self, x: f64, y: f64) -> (i32, i32) {
        let w = (self.right - self.left) as f64;
        let h = (self.bottom - self.top) as f64;
        (
            self.left + (x * w).round() as i32,
            self.bottom - (y * h).round() as i32,
        )
    }
}

/// Width for a y label gutter so the widest tick label fits.
pub fn y_label_area_px(
    range: (f64, f64),
    ticks: usize,
    fmt: &dyn Fn(&f64) -> String,
    font_px: u32,
) -> u32 {
    let mut max_px = 0u32;
    for i in 0..=ticks {
        let t = if ticks == 0 {
            0.0
        } else {
            i as f64 / ticks as f64
        };
        let v = range.0 + (range.1 - range.0) * t;
        max_px = max_px.max(estimate_text_width_px(&fmt(&v), font_px));
    }
    max_px.saturating_add(14).clamp(36, 160)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure::{Trace, TraceKind};
    use chrono::NaiveDate;

    fn fig_with(x: Vec<Key>) -> Figure {
        let mut fig = Figure::default();
        let n = x.len();
        fig.add_trace(Trace::new(TraceKind::Line, "a", x, vec![1.0; n]));
        fig
    }

    #[test]
    fn categories_keep_first_seen_order() {
        let s = XScale::from_figure(&fig_with(vec!["b".into(), "a".into(), "b".into()]));
        assert_eq!(s.pos(&"b".into()), Some(0.0));
        assert_eq!(s.pos(&"a".into()), Some(1.0));
        assert_eq!(s.range(false), (-0.5, 1.5));
        assert_eq!(s.label(1.0), "a");
        assert_eq!(s.label(0.5), "");
    }

    #[test]
    fn daily_times_use_day_slots() {
        let days: Vec<Key> = (1..=3)
            .map(|d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap().into())
            .collect();
        let mut fig = fig_with(days);
        fig.layout.x_axis.dt_format = "%Y-%m-%d".into();
        let s = XScale::from_figure(&fig);
        assert_eq!(s.kind, XKind::Time);
        assert_eq!(s.slot(), SECONDS_PER_DAY);
        let (lo, _) = s.range(false);
        assert_eq!(s.label(lo), "2024-03-01");
    }

    #[test]
    fn paper_origin_is_bottom_left() {
        let r = PaperRect {
            left: 10,
            right: 110,
            top: 20,
            bottom: 220,
        };
        assert_eq!(r.at(0.0, 0.0), (10, 220));
        assert_eq!(r.at(0.5, 1.0), (60, 20));
    }
}
