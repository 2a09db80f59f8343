//! Chart state accumulator.
//!
//! [`ChartMaker`] holds the data seen so far, a rotating color palette, the merged
//! options of the last build, the list of plotted series and the last [`Figure`].
//! `build` replaces the figure; `add_title`, `add_annotations` and `add_dashed_line`
//! decorate it in place; `save_figure`/`show_figure` hand it to the renderer.
//!
//! ```
//! use quickchart::{AxisSelection, ChartKind, ChartMaker, Key, OptionOverrides, Table};
//!
//! let table = Table::new(vec![Key::from("Q1"), Key::from("Q2"), Key::from("Q3")])
//!     .with_numeric("revenue", vec![1_200.0, 1_800.0, 2_500.0])
//!     .unwrap();
//! let mut maker = ChartMaker::new();
//! let fig = maker
//!     .build(
//!         &table,
//!         &AxisSelection::y1(&["revenue"]),
//!         "Revenue",
//!         ChartKind::Bar,
//!         &OptionOverrides::new(),
//!         None,
//!     )
//!     .unwrap();
//! assert_eq!(fig.traces[0].name, "REVENUE (2.5K)     ");
//! ```

use crate::config::{ChartOptions, OptionOverrides};
use crate::figure::{
    Anchor, Annotation, Axis, FontLayout, Figure, Layout, LegendLayout, Ohlc, Shape, Template,
    HoverMode, TitleLayout, Trace, TraceKind, XAxisLayout, YAxisLayout,
};
use crate::palette::Palette;
use crate::style::{LineDash, Rgba};
use crate::table::{Key, Table};
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Title block defaults, used until a caller sets a position explicitly.
const TITLE_X: f64 = 0.2;
const TITLE_Y: f64 = 1.0;
const TITLE_SIZE: u32 = 27;
const SUBTITLE_SIZE: u32 = 18;

/// Columns to plot on the primary and secondary y axes, plus an optional x column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisSelection {
    /// Column holding x values; the table index is used when unset or absent.
    pub x: Option<String>,
    pub y1: Vec<String>,
    pub y2: Vec<String>,
}

impl AxisSelection {
    pub fn y1(columns: &[&str]) -> Self {
        Self {
            x: None,
            y1: columns.iter().map(|c| c.to_string()).collect(),
            y2: Vec::new(),
        }
    }

    pub fn with_y2(mut self, columns: &[&str]) -> Self {
        self.y2 = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_x(mut self, column: &str) -> Self {
        self.x = Some(column.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Area,
    Scatter,
    Bar,
    Candlestick,
    Pie,
}

impl From<ChartKind> for TraceKind {
    fn from(k: ChartKind) -> Self {
        match k {
            ChartKind::Line => TraceKind::Line,
            ChartKind::Area => TraceKind::Area,
            ChartKind::Scatter => TraceKind::Scatter,
            ChartKind::Bar => TraceKind::Bar,
            ChartKind::Candlestick => TraceKind::Candlestick,
            ChartKind::Pie => TraceKind::Pie,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChartKind(pub String);

impl fmt::Display for UnknownChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown chart kind {:?} (expected line, area, scatter, bar, candlestick or pie)",
            self.0
        )
    }
}

impl std::error::Error for UnknownChartKind {}

impl FromStr for ChartKind {
    type Err = UnknownChartKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "line" => Ok(ChartKind::Line),
            "area" => Ok(ChartKind::Area),
            "scatter" => Ok(ChartKind::Scatter),
            "bar" => Ok(ChartKind::Bar),
            "candlestick" => Ok(ChartKind::Candlestick),
            "pie" => Ok(ChartKind::Pie),
            _ => Err(UnknownChartKind(s.to_string())),
        }
    }
}

/// One kind for both axes, or a kind per axis (unset → line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKindSpec {
    Uniform(ChartKind),
    PerAxis {
        y1: Option<ChartKind>,
        y2: Option<ChartKind>,
    },
}

impl Default for ChartKindSpec {
    fn default() -> Self {
        ChartKindSpec::Uniform(ChartKind::Line)
    }
}

impl From<ChartKind> for ChartKindSpec {
    fn from(k: ChartKind) -> Self {
        ChartKindSpec::Uniform(k)
    }
}

impl ChartKindSpec {
    /// `(y1 kind, y2 kind)`.
    pub fn resolve(&self) -> (ChartKind, ChartKind) {
        match *self {
            ChartKindSpec::Uniform(k) => (k, k),
            ChartKindSpec::PerAxis { y1, y2 } => (
                y1.unwrap_or(ChartKind::Line),
                y2.unwrap_or(ChartKind::Line),
            ),
        }
    }
}

/// Grouped mode: one line per distinct `group_column` value, ranked by the last
/// reading of `value_column`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grouping {
    pub group_column: String,
    pub value_column: String,
}

impl Grouping {
    pub fn new(group_column: impl Into<String>, value_column: impl Into<String>) -> Self {
        Self {
            group_column: group_column.into(),
            value_column: value_column.into(),
        }
    }
}

/// Bookkeeping for one plotted series; annotations and reference lines read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRecord {
    pub column: String,
    pub name: String,
    pub axis: Axis,
    pub group: Option<String>,
    pub keys: Vec<Key>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct TitlePosition {
    x: Option<f64>,
    y: Option<f64>,
}

/// `"gross_margin"` → `"GROSS MARGIN"`.
pub fn display_name(column: &str) -> String {
    column.replace('_', " ").to_uppercase()
}

/// Sort groups by their last reading; NaN always sorts last, ties keep input order.
fn rank_by_last<T>(groups: &mut [(T, f64)], descending: bool) {
    groups.sort_by(|(_, a), (_, b)| match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let o = a.partial_cmp(b).unwrap_or(Ordering::Equal);
            if descending { o.reverse() } else { o }
        }
    });
}

/// X coordinates of every row: a named column when it exists, else the index.
fn x_keys(table: &Table, axes: &AxisSelection) -> Vec<Key> {
    match axes.x.as_deref().and_then(|name| table.column(name)) {
        Some(col) => (0..table.len()).filter_map(|r| col.key_at(r)).collect(),
        None => table.keys().to_vec(),
    }
}

pub struct ChartMaker {
    palette: Palette,
    defaults: ChartOptions,
    options: ChartOptions,
    title: Option<String>,
    series: Vec<SeriesRecord>,
    table: Option<Table>,
    figure: Option<Figure>,
    title_position: TitlePosition,
    save_directory: Option<PathBuf>,
}

impl Default for ChartMaker {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartMaker {
    pub fn new() -> Self {
        Self::with_defaults(ChartOptions::default())
    }

    pub fn with_defaults(defaults: ChartOptions) -> Self {
        Self {
            palette: Palette::default(),
            options: defaults.clone(),
            defaults,
            title: None,
            series: Vec::new(),
            table: None,
            figure: None,
            title_position: TitlePosition::default(),
            save_directory: None,
        }
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Current palette color; advances the rotation.
    pub fn next_color(&mut self) -> Rgba {
        self.palette.next_color()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn defaults(&self) -> &ChartOptions {
        &self.defaults
    }

    /// Options in effect for the last build (the defaults before any build).
    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn series(&self) -> &[SeriesRecord] {
        &self.series
    }

    /// All rows passed to `build` so far, deduplicated.
    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn figure(&self) -> Option<&Figure> {
        self.figure.as_ref()
    }

    /// Forget data, series, colors and figure. Defaults and title position stay.
    pub fn clear(&mut self) {
        self.figure = None;
        self.series.clear();
        self.table = None;
        self.palette.reset();
    }

    /// Build a new figure from `table` and make it the held chart.
    ///
    /// With `grouping`, one line per group is drawn on the primary axis; otherwise
    /// each selected column becomes a trace of the kind resolved for its axis.
    /// Columns missing from `table` are skipped.
    pub fn build(
        &mut self,
        table: &Table,
        axes: &AxisSelection,
        title: &str,
        kind: impl Into<ChartKindSpec>,
        overrides: &OptionOverrides,
        grouping: Option<&Grouping>,
    ) -> Result<&Figure> {
        let mut opts = self.defaults.merged(overrides)?;

        match self.table.as_mut() {
            Some(held) => held.append_dedup(table),
            None => self.table = Some(table.clone()),
        }
        self.title = Some(title.to_string());
        self.save_directory = opts.save_directory.clone();

        let (y1_kind, y2_kind) = kind.into().resolve();
        let mut fig = Figure::new(base_layout(&opts));

        match grouping {
            Some(g) => self.add_grouped(&mut fig, table, axes, g, &opts),
            None => {
                self.add_columns(&mut fig, table, axes, Axis::Y1, y1_kind, &opts);
                self.add_columns(&mut fig, table, axes, Axis::Y2, y2_kind, &opts);
            }
        }
        self.style_axes(&mut fig, axes, &mut opts);

        log::debug!(
            "built {:?} with {} trace(s), {} series recorded",
            title,
            fig.traces.len(),
            self.series.len()
        );
        self.options = opts;
        Ok(&*self.figure.insert(fig))
    }

    fn add_grouped(
        &mut self,
        fig: &mut Figure,
        table: &Table,
        axes: &AxisSelection,
        grouping: &Grouping,
        opts: &ChartOptions,
    ) {
        if table.numeric(&grouping.value_column).is_none() {
            log::warn!(
                "value column {:?} is missing or not numeric; nothing to group",
                grouping.value_column
            );
            return;
        }
        let mut ranked: Vec<((String, Table), f64)> = table
            .group_values(&grouping.group_column)
            .into_iter()
            .map(|name| {
                let part = table.filter_eq(&grouping.group_column, &name);
                let last = part.last_value(&grouping.value_column).unwrap_or(f64::NAN);
                ((name, part), last)
            })
            .collect();
        rank_by_last(&mut ranked, opts.descending);

        let fmt = opts.number_format();
        for ((name, part), last) in ranked {
            let color = self.palette.next_color();
            let values = part
                .numeric(&grouping.value_column)
                .map(<[f64]>::to_vec)
                .unwrap_or_default();
            let keys = x_keys(&part, axes);
            let label = format!("{name}: {}", fmt.format(last));

            let mut trace = Trace::new(TraceKind::Line, label.clone(), keys.clone(), values.clone())
                .with_color(color);
            trace.line_width = opts.line_width;
            trace.marker_size = opts.marker_size;
            trace.mode = opts.mode;
            trace.show_legend = opts.show_legend;
            fig.add_trace(trace);

            self.series.push(SeriesRecord {
                column: grouping.value_column.clone(),
                name: label,
                axis: Axis::Y1,
                group: Some(name),
                keys,
                values,
            });
        }
    }

    fn add_columns(
        &mut self,
        fig: &mut Figure,
        table: &Table,
        axes: &AxisSelection,
        axis: Axis,
        kind: ChartKind,
        opts: &ChartOptions,
    ) {
        let columns = match axis {
            Axis::Y1 => &axes.y1,
            Axis::Y2 => &axes.y2,
        };
        let present: Vec<&str> = columns
            .iter()
            .map(String::as_str)
            .filter(|c| table.numeric(c).is_some())
            .collect();
        let keys = x_keys(table, axes);

        match kind {
            ChartKind::Candlestick => {
                if let Some(first) = present.first() {
                    self.add_candlestick(fig, table, keys, axis, first, opts);
                }
            }
            ChartKind::Pie => {
                if let Some(first) = present.first() {
                    self.add_pie(fig, table, keys, axis, first, opts);
                }
            }
            _ => {
                for col in present {
                    let values = table.numeric(col).map(<[f64]>::to_vec).unwrap_or_default();
                    let color = self.palette.next_color();
                    let label = series_label(col, &values, axis, opts);

                    let mut trace =
                        Trace::new(kind.into(), label.clone(), keys.clone(), values.clone())
                            .on_axis(axis)
                            .with_color(color);
                    trace.show_legend = opts.show_legend;
                    if trace.kind.is_connected() {
                        trace.line_width = opts.line_width;
                        trace.marker_size = opts.marker_size;
                        trace.mode = opts.mode;
                        if kind == ChartKind::Area {
                            trace.stack_group = Some("one".to_string());
                        }
                    }
                    fig.add_trace(trace);
                    self.record(col, label, axis, keys.clone(), values);
                }
            }
        }
    }

    /// OHLC trace from the table's open/high/low/close columns; `column` names it.
    fn add_candlestick(
        &mut self,
        fig: &mut Figure,
        table: &Table,
        keys: Vec<Key>,
        axis: Axis,
        column: &str,
        opts: &ChartOptions,
    ) {
        let ohlc = match (
            table.numeric_ci("open"),
            table.numeric_ci("high"),
            table.numeric_ci("low"),
            table.numeric_ci("close"),
        ) {
            (Some(o), Some(h), Some(l), Some(c)) => Ohlc {
                open: o.to_vec(),
                high: h.to_vec(),
                low: l.to_vec(),
                close: c.to_vec(),
            },
            _ => {
                log::warn!("candlestick needs open/high/low/close columns; skipping {column:?}");
                return;
            }
        };
        let color = self.palette.next_color();
        let close = ohlc.close.clone();
        let label = series_label(column, &close, axis, opts);
        let mut trace = Trace::new(TraceKind::Candlestick, label.clone(), keys.clone(), close.clone())
            .on_axis(axis)
            .with_color(color);
        trace.ohlc = Some(ohlc);
        trace.show_legend = opts.show_legend;
        fig.add_trace(trace);
        self.record(column, label, axis, keys, close);
    }

    /// Pie of one column; index keys label the slices.
    fn add_pie(
        &mut self,
        fig: &mut Figure,
        table: &Table,
        keys: Vec<Key>,
        axis: Axis,
        column: &str,
        opts: &ChartOptions,
    ) {
        let values = table.numeric(column).map(<[f64]>::to_vec).unwrap_or_default();
        let slice_colors: Vec<Rgba> = values.iter().map(|_| self.palette.next_color()).collect();
        let label = series_label(column, &values, axis, opts);
        let mut trace = Trace::new(TraceKind::Pie, label.clone(), keys.clone(), values.clone())
            .on_axis(axis)
            .with_color(slice_colors.first().copied().unwrap_or(Rgba::BLACK));
        trace.slice_colors = slice_colors;
        trace.hole = opts.hole_size.clamp(0.0, 0.95);
        trace.show_legend = opts.show_legend;
        fig.add_trace(trace);
        self.record(column, label, axis, keys, values);
    }

    fn record(&mut self, column: &str, name: String, axis: Axis, keys: Vec<Key>, values: Vec<f64>) {
        self.series.push(SeriesRecord {
            column: column.to_string(),
            name,
            axis,
            group: None,
            keys,
            values,
        });
    }

    /// Axis titles, colors and tick affixes.
    fn style_axes(&self, fig: &mut Figure, axes: &AxisSelection, opts: &mut ChartOptions) {
        let (y1_title, y2_title) = if opts.auto_title {
            (
                axes.y1.first().map(|c| display_name(c)),
                axes.y2.first().map(|c| display_name(c)),
            )
        } else {
            (opts.axes_titles.y1.clone(), opts.axes_titles.y2.clone())
        };

        if axes.y2.is_empty() {
            opts.auto_color = false;
        }
        let (y1_color, y2_color) = if opts.auto_color {
            (self.palette.get(0), self.palette.get(1))
        } else {
            (Rgba::BLACK, Rgba::BLACK)
        };

        fig.layout.y1 = YAxisLayout {
            title: y1_title,
            color: Some(y1_color),
            tick_prefix: opts.tickprefix.y1().to_string(),
            tick_suffix: opts.ticksuffix.y1().to_string(),
        };
        fig.layout.y2 = YAxisLayout {
            title: y2_title,
            color: Some(y2_color),
            tick_prefix: opts.tickprefix.y2().to_string(),
            tick_suffix: opts.ticksuffix.y2().to_string(),
        };
    }

    /// Set the held figure's title and subtitle.
    ///
    /// `x`/`y` are remembered across calls; unset coordinates fall back to the last
    /// explicit value, then to the defaults. Size and color are fixed.
    pub fn add_title(
        &mut self,
        title: Option<&str>,
        subtitle: Option<&str>,
        x: Option<f64>,
        y: Option<f64>,
    ) {
        if x.is_some() {
            self.title_position.x = x;
        }
        if y.is_some() {
            self.title_position.y = y;
        }
        let Some(fig) = self.figure.as_mut() else {
            log::warn!("add_title called before a chart was built");
            return;
        };
        fig.layout.title = Some(TitleLayout {
            text: title.unwrap_or_default().to_string(),
            subtitle: subtitle.unwrap_or_default().to_string(),
            x: self.title_position.x.unwrap_or(TITLE_X),
            y: self.title_position.y.unwrap_or(TITLE_Y),
            size: TITLE_SIZE,
            subtitle_size: SUBTITLE_SIZE,
            color: Rgba::BLACK,
            family: self.options.font_family.clone(),
        });
    }

    /// Label the ends (and optionally the maximum and custom keys) of a single-series
    /// chart. Does nothing unless exactly one series was plotted.
    pub fn add_annotations(&mut self, show_max: bool, custom: &[(Key, String)]) {
        if self.series.len() != 1 {
            return;
        }
        let Some(fig) = self.figure.as_mut() else {
            return;
        };
        let rec = &self.series[0];
        if rec.values.is_empty() {
            return;
        }
        let opts = &self.options;
        let fmt = opts.number_format();
        let (prefix, suffix) = affixes(opts, Axis::Y1);
        let label = |i: usize| {
            format!(
                "{}: {}",
                rec.keys[i].display_with(&opts.dt_format),
                fmt.format_affixed(rec.values[i], prefix, suffix)
            )
        };
        let end = rec.values.len() - 1;
        // Row 0 is "last", row -1 is "first".
        let last_text = label(0);
        let first_text = label(end);

        if fig.is_pie() {
            let total: f64 = rec.values.iter().filter(|v| v.is_finite()).sum();
            fig.add_annotation(Annotation {
                anchor: Anchor::Paper { x: 0.5, y: 0.5 },
                text: format!("Total: {}", fmt.format_affixed(total, prefix, suffix)),
                arrow: None,
                font_size: opts.font_size.textfont + 6,
                color: opts.font_color,
                bgcolor: None,
            });
            return;
        }
        if !opts.annotations {
            return;
        }

        let arrow = |i: usize, text: String, offset: (i32, i32)| Annotation {
            anchor: Anchor::Data {
                x: rec.keys[i].clone(),
                y: rec.values[i],
                axis: rec.axis,
            },
            text,
            arrow: Some(offset),
            font_size: opts.font_size.textfont,
            color: opts.font_color,
            bgcolor: Some(Rgba::WHITE),
        };

        fig.add_annotation(arrow(0, last_text, (40, -40)));
        if end > 0 {
            fig.add_annotation(arrow(end, first_text, (-40, -40)));
        }

        if show_max {
            let max_at = rec
                .values
                .iter()
                .enumerate()
                .filter(|(_, v)| v.is_finite())
                .max_by(|(_, a), (_, b)| a.total_cmp(b))
                .map(|(i, _)| i);
            if let Some(i) = max_at
                && i != 0
                && i != end
            {
                fig.add_annotation(arrow(i, label(i), (0, -50)));
            }
        }

        let held = self.table.as_ref();
        for (key, text) in custom {
            let in_table = held.is_some_and(|t| t.index().position(key).is_some());
            if !in_table {
                continue;
            }
            if let Some(i) = rec.keys.iter().position(|k| k == key) {
                fig.add_annotation(arrow(i, text.clone(), (0, -60)));
            }
        }
    }

    /// Vertical dashed reference line at `date`, up to the plotted value there.
    ///
    /// With several plotted columns the one with the largest value at `date` is used.
    /// Unknown dates and missing values are logged and leave the figure untouched.
    pub fn add_dashed_line(&mut self, date: &str, annotation_text: Option<&str>) {
        let (Some(table), Some(fig)) = (self.table.as_ref(), self.figure.as_mut()) else {
            log::warn!("add_dashed_line called before a chart was built");
            return;
        };
        let Some(key) = table.index().coerce(date) else {
            log::warn!("{date:?} is not a valid index value for this chart");
            return;
        };
        let Some(row) = table.index().position(&key) else {
            log::warn!("{date:?} not found in the chart data");
            return;
        };

        let mut plotted: Vec<(&str, Axis)> = Vec::new();
        for rec in &self.series {
            if !plotted.iter().any(|(c, _)| *c == rec.column) {
                plotted.push((rec.column.as_str(), rec.axis));
            }
        }
        let target = match plotted.as_slice() {
            [] => None,
            [only] => Some(*only),
            many => many
                .iter()
                .filter_map(|(c, a)| table.value(row, c).filter(|v| !v.is_nan()).map(|v| (*c, *a, v)))
                .max_by(|x, y| x.2.total_cmp(&y.2))
                .map(|(c, a, _)| (c, a)),
        };
        let Some((column, axis)) = target else {
            log::warn!("no plotted value at {date:?}");
            return;
        };
        let value = match table.value(row, column) {
            Some(v) if !v.is_nan() => v,
            _ => {
                log::warn!("value for {column:?} at {date:?} is missing");
                return;
            }
        };

        let opts = &self.options;
        let style = &opts.dashed_line;
        let top = value * style.factor;
        let (prefix, suffix) = affixes(opts, axis);

        let mut lines: Vec<String> = Vec::new();
        if let Some(t) = annotation_text.filter(|t| !t.is_empty()) {
            lines.push(t.to_string());
        }
        lines.push(opts.number_format().format_affixed(value, prefix, suffix));
        lines.push(key.display_with(&opts.dt_format));

        fig.add_shape(Shape::VLine {
            x: key.clone(),
            y0: 0.0,
            y1: top,
            axis,
            color: style.color,
            width: style.width,
            dash: LineDash::Dash {
                size: style.dash,
                gap: style.gap,
            },
        });
        fig.add_annotation(Annotation {
            anchor: Anchor::Data { x: key, y: top, axis },
            text: lines.join("\n"),
            arrow: None,
            font_size: style.font_size,
            color: style.color,
            bgcolor: Some(Rgba::WHITE),
        });
    }

    /// Write the held figure to `{directory}/{title}.{filetype}` and return the path.
    ///
    /// A directory passed here is remembered for later saves. Without one, the
    /// `save_directory` option is used, then the user's picture directory.
    pub fn save_figure(&mut self, directory: Option<&Path>, filetype: &str) -> Result<PathBuf> {
        if let Some(d) = directory {
            self.save_directory = Some(d.to_path_buf());
        }
        let fig = self
            .figure
            .as_ref()
            .ok_or_else(|| anyhow!("no chart has been built yet"))?;
        let dir = self
            .save_directory
            .clone()
            .or_else(dirs::picture_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        let file_stem = self
            .title
            .as_deref()
            .unwrap_or("chart")
            .replace(['/', '\\'], "-");
        let path = dir.join(format!("{file_stem}.{}", filetype.trim_start_matches('.')));
        log::info!("Saving figure to: {}", path.display());
        fig.save(&path)?;
        Ok(path)
    }

    /// Open the held figure in a viewer window (blocks until it is closed).
    pub fn show_figure(&self) -> Result<()> {
        let fig = self
            .figure
            .as_ref()
            .ok_or_else(|| anyhow!("no chart has been built yet"))?;
        crate::viewer::show(fig, self.title.as_deref().unwrap_or("chart"))
    }
}

fn affixes(opts: &ChartOptions, axis: Axis) -> (&str, &str) {
    match axis {
        Axis::Y1 => (opts.tickprefix.y1(), opts.ticksuffix.y1()),
        Axis::Y2 => (opts.tickprefix.y2(), opts.ticksuffix.y2()),
    }
}

/// `"NET_SALES (${last}M)     "`: display name, last value with the axis affixes,
/// then the configured spacing.
fn series_label(column: &str, values: &[f64], axis: Axis, opts: &ChartOptions) -> String {
    let (prefix, suffix) = affixes(opts, axis);
    let last = values.last().copied().unwrap_or(f64::NAN);
    format!(
        "{} ({}){}",
        display_name(column),
        opts.number_format().format_affixed(last, prefix, suffix),
        opts.spacing()
    )
}

fn base_layout(opts: &ChartOptions) -> Layout {
    Layout {
        title: None,
        x_axis: XAxisLayout {
            title: opts.axes_titles.x.clone(),
            tick_color: Some(opts.font_color),
            dt_format: opts.dt_format.clone(),
        },
        y1: YAxisLayout::default(),
        y2: YAxisLayout::default(),
        legend: LegendLayout {
            show: opts.show_legend,
            x: opts.legend_x,
            y: opts.legend_y,
            orientation: opts.legend_orientation,
            x_anchor: opts.xanchor,
            y_anchor: opts.yanchor,
            bgcolor: opts.legend_background.bgcolor,
            bordercolor: opts.legend_background.bordercolor,
            borderwidth: opts.legend_background.borderwidth,
            traceorder: opts.legend_background.traceorder,
        },
        template: Template::White,
        hover_mode: HoverMode::XUnified,
        width: opts.dimensions.width,
        height: opts.dimensions.height,
        margin: opts.margin,
        font: FontLayout {
            family: opts.font_family.clone(),
            color: opts.font_color,
            axes_size: opts.font_size.axes,
            legend_size: opts.font_size.legend,
            text_size: opts.font_size.textfont,
        },
        bar_mode: opts.barmode,
        plot_bgcolor: opts.bgcolor,
        number_format: opts.number_format(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_spec_defaults_to_line() {
        let spec = ChartKindSpec::PerAxis {
            y1: Some(ChartKind::Bar),
            y2: None,
        };
        assert_eq!(spec.resolve(), (ChartKind::Bar, ChartKind::Line));
        assert_eq!(
            ChartKindSpec::from(ChartKind::Area).resolve(),
            (ChartKind::Area, ChartKind::Area)
        );
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("Candlestick".parse::<ChartKind>().unwrap(), ChartKind::Candlestick);
        assert!("donut".parse::<ChartKind>().is_err());
    }

    #[test]
    fn ranking_puts_nan_last() {
        let mut g = vec![("a", 10.0), ("n", f64::NAN), ("b", 30.0), ("c", 20.0)];
        rank_by_last(&mut g, true);
        let order: Vec<_> = g.iter().map(|(n, _)| *n).collect();
        assert_eq!(order, ["b", "c", "a", "n"]);
        rank_by_last(&mut g, false);
        let order: Vec<_> = g.iter().map(|(n, _)| *n).collect();
        assert_eq!(order, ["a", "c", "b", "n"]);
    }

    #[test]
    fn display_name_uppercases() {
        assert_eq!(display_name("gross_margin"), "GROSS MARGIN");
    }
}
