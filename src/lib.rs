//! quickchart
//!
//! A small Rust library for building styled charts from tabular data, with a
//! companion `quickchart` CLI.
//!
//! ### Features
//! - Magnitude-compact number labels (`1.5K`, `2.3M`, `4B`, `1T`)
//! - Dual y axes with per-axis chart kinds, tick prefixes/suffixes and colors
//! - Line, area, scatter, bar, candlestick and pie/donut traces
//! - Grouped mode: one line per category, ranked by its latest value
//! - End-point, maximum and custom annotations; dashed reference lines
//! - Render to SVG, PNG, JPEG, BMP or HTML, or show in a desktop viewer
//!
//! ### Example
//! ```no_run
//! use quickchart::{AxisSelection, ChartKind, ChartMaker, OptionOverrides};
//!
//! let table = quickchart::storage::load_csv("prices.csv")?;
//! let mut maker = ChartMaker::new();
//! maker.build(
//!     &table,
//!     &AxisSelection::y1(&["close"]).with_y2(&["volume"]),
//!     "ACME Close",
//!     ChartKind::Line,
//!     &OptionOverrides::new(),
//!     None,
//! )?;
//! maker.add_title(Some("ACME"), Some("Daily close and volume"), None, None);
//! maker.add_annotations(true, &[]);
//! let path = maker.save_figure(Some("charts".as_ref()), "png")?;
//! println!("wrote {}", path.display());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod chart;
pub mod config;
pub mod figure;
pub mod format;
pub mod palette;
pub mod storage;
pub mod style;
pub mod table;
pub mod viewer;
pub mod viz;
pub mod viz_plotters_adapter;

pub use chart::{AxisSelection, ChartKind, ChartKindSpec, ChartMaker, Grouping, SeriesRecord};
pub use config::{ChartOptions, OptionOverrides};
pub use figure::Figure;
pub use format::{NumberFormat, clean_value, clean_values};
pub use palette::Palette;
pub use style::Rgba;
pub use table::{Column, Index, Key, Table, TableError};
pub use viz::OutputFormat;
