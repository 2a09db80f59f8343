use chrono::NaiveDate;
use quickchart::figure::Figure;
use quickchart::{AxisSelection, ChartKind, ChartKindSpec, ChartMaker, Key, OptionOverrides, Table};
use serde_json::json;
use std::fs;
use std::path::PathBuf;

fn day(d: u32) -> Key {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap().into()
}

fn prices() -> Table {
    let days: Vec<Key> = (1..=6).map(day).collect();
    Table::new(days)
        .with_numeric("open", vec![10.0, 11.0, 10.5, 12.0, 12.5, 12.2])
        .unwrap()
        .with_numeric("high", vec![11.5, 11.8, 12.4, 12.9, 13.0, 12.8])
        .unwrap()
        .with_numeric("low", vec![9.8, 10.4, 10.2, 11.7, 12.0, 11.6])
        .unwrap()
        .with_numeric("close", vec![11.0, 10.6, 12.1, 12.4, 12.3, 11.9])
        .unwrap()
        .with_numeric("volume", vec![1.2e6, 9.0e5, f64::NAN, 1.5e6, 1.1e6, 1.3e6])
        .unwrap()
}

fn figure_of(kind: impl Into<ChartKindSpec>, axes: AxisSelection, overrides: serde_json::Value) -> Figure {
    let mut maker = ChartMaker::new();
    maker
        .build(&prices(), &axes, "Prices", kind, overrides.as_object().unwrap(), None)
        .unwrap();
    maker.add_title(Some("ACME"), Some("March"), None, None);
    maker.add_annotations(true, &[]);
    maker.add_dashed_line("2024-03-04", Some("Earnings"));
    maker.figure().unwrap().clone()
}

fn write_and_check(fig: &Figure, name: &str) {
    let path: PathBuf = std::env::temp_dir().join(format!("quickchart_render_{name}"));
    fig.save(&path).unwrap();
    let meta = fs::metadata(&path).expect("file created");
    assert!(meta.len() > 0, "{name} has content");
    fs::remove_file(&path).ok();
}

#[test]
fn every_kind_renders_to_svg_and_png() {
    let kinds = [
        ChartKind::Line,
        ChartKind::Area,
        ChartKind::Scatter,
        ChartKind::Bar,
        ChartKind::Candlestick,
    ];
    for kind in kinds {
        let fig = figure_of(kind, AxisSelection::y1(&["close"]), json!({"show_legend": true}));
        assert!(!fig.traces.is_empty(), "{kind:?} produced traces");
        write_and_check(&fig, &format!("{kind:?}.svg"));
        write_and_check(&fig, &format!("{kind:?}.png"));
    }
}

#[test]
fn dual_axis_with_bar_modes() {
    for mode in ["stack", "group", "overlay", "relative"] {
        let fig = figure_of(
            ChartKindSpec::PerAxis {
                y1: Some(ChartKind::Bar),
                y2: Some(ChartKind::Line),
            },
            AxisSelection::y1(&["open", "close"]).with_y2(&["volume"]),
            json!({
                "barmode": mode,
                "show_legend": true,
                "legend_orientation": "h",
                "tickprefix": {"y1": "$", "y2": null}
            }),
        );
        assert!(fig.has_secondary());
        write_and_check(&fig, &format!("dual_{mode}.svg"));
    }
}

#[test]
fn floating_legend_and_html_export() {
    let fig = figure_of(
        ChartKind::Line,
        AxisSelection::y1(&["close"]),
        json!({"show_legend": true, "legend_x": 0.05, "legend_y": 0.95}),
    );
    let path = std::env::temp_dir().join("quickchart_render_page.html");
    fig.save(&path).unwrap();
    let html = fs::read_to_string(&path).unwrap();
    assert!(html.contains("<svg"));
    assert!(html.contains("id=\"figure-data\""));
    assert!(html.contains("<title>ACME</title>"));
    fs::remove_file(&path).ok();
}

#[test]
fn pie_renders_with_total() {
    let table = Table::new(vec!["north".into(), "south".into(), "east".into()])
        .with_numeric("share", vec![40.0, 35.0, 25.0])
        .unwrap();
    let mut maker = ChartMaker::new();
    maker
        .build(
            &table,
            &AxisSelection::y1(&["share"]),
            "Share",
            ChartKind::Pie,
            json!({"show_legend": true}).as_object().unwrap(),
            None,
        )
        .unwrap();
    maker.add_annotations(false, &[]);
    let svg = maker.figure().unwrap().to_svg_string().unwrap();
    assert!(svg.starts_with("<svg"));
    write_and_check(maker.figure().unwrap(), "pie.png");
}

#[test]
fn save_figure_uses_title_as_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let mut maker = ChartMaker::new();
    maker
        .build(
            &prices(),
            &AxisSelection::y1(&["close"]),
            "Close/Open",
            ChartKind::Line,
            &OptionOverrides::new(),
            None,
        )
        .unwrap();
    let path = maker.save_figure(Some(dir.path()), "svg").unwrap();
    assert_eq!(path, dir.path().join("Close-Open.svg"));
    assert!(fs::metadata(&path).unwrap().len() > 0);

    // The directory is remembered for the next save.
    let again = maker.save_figure(None, "jpg").unwrap();
    assert_eq!(again, dir.path().join("Close-Open.jpg"));
}

#[test]
fn unknown_extension_is_rejected() {
    let fig = figure_of(ChartKind::Line, AxisSelection::y1(&["close"]), json!({}));
    let path = std::env::temp_dir().join("quickchart_render_bad.tiff");
    assert!(fig.save(&path).is_err());
}

#[test]
fn figure_json_round_trips() {
    let fig = figure_of(ChartKind::Bar, AxisSelection::y1(&["close"]), json!({}));
    let back = Figure::from_json(&fig.to_json().unwrap()).unwrap();
    assert_eq!(back, fig);
}
