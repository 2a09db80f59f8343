use chrono::NaiveDate;
use quickchart::figure::{Axis, TraceKind};
use quickchart::{
    AxisSelection, ChartKind, ChartKindSpec, ChartMaker, Grouping, Key, OptionOverrides, Rgba,
    Table,
};
use serde_json::json;

fn day(d: u32) -> Key {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap().into()
}

fn sales() -> Table {
    Table::new(vec![day(1), day(2), day(3)])
        .with_index_name("date")
        .with_numeric("net_sales", vec![1_000.0, 1_400.0, 2_500.0])
        .unwrap()
        .with_numeric("units", vec![10.0, 12.0, 9.0])
        .unwrap()
}

fn grouped() -> Table {
    Table::new(vec![day(1), day(2), day(1), day(2), day(1), day(2)])
        .with_text(
            "region",
            ["A", "A", "B", "B", "C", "C"].map(String::from).to_vec(),
        )
        .unwrap()
        .with_numeric("revenue", vec![5.0, 10.0, 12.0, 30.0, 25.0, 20.0])
        .unwrap()
}

fn none() -> OptionOverrides {
    OptionOverrides::new()
}

#[test]
fn labels_carry_last_value_and_spacing() {
    let mut maker = ChartMaker::new();
    let fig = maker
        .build(
            &sales(),
            &AxisSelection::y1(&["net_sales"]),
            "Sales",
            ChartKind::Line,
            &none(),
            None,
        )
        .unwrap();
    assert_eq!(fig.traces.len(), 1);
    assert_eq!(fig.traces[0].name, "NET SALES (2.5K)     ");
    assert_eq!(fig.traces[0].line_width, 4);
}

#[test]
fn prefixes_and_decimal_overrides_apply_to_labels() {
    let mut maker = ChartMaker::new();
    let overrides = json!({
        "decimals": false,
        "tickprefix": {"y1": "$", "y2": ""},
        "space_buffer": 0
    });
    let table = Table::new(vec![day(1), day(2)])
        .with_numeric("net_sales", vec![900.0, 1_800.0])
        .unwrap();
    let fig = maker
        .build(
            &table,
            &AxisSelection::y1(&["net_sales"]),
            "Sales",
            ChartKind::Bar,
            overrides.as_object().unwrap(),
            None,
        )
        .unwrap();
    assert_eq!(fig.traces[0].name, "NET SALES ($2k)");
    assert_eq!(fig.layout.y1.tick_prefix, "$");
}

#[test]
fn grouped_mode_ranks_by_last_value() {
    let mut maker = ChartMaker::new();
    let fig = maker
        .build(
            &grouped(),
            &AxisSelection::default(),
            "Regions",
            ChartKind::Line,
            &none(),
            Some(&Grouping::new("region", "revenue")),
        )
        .unwrap();
    let names: Vec<&str> = fig.traces.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["B: 30.0", "C: 20.0", "A: 10.0"]);
    assert!(fig.traces.iter().all(|t| t.kind == TraceKind::Line));
    assert_eq!(maker.series().len(), 3);
}

#[test]
fn ascending_ranking_when_not_descending() {
    let mut maker = ChartMaker::new();
    let overrides = json!({"descending": false});
    let fig = maker
        .build(
            &grouped(),
            &AxisSelection::default(),
            "Regions",
            ChartKind::Line,
            overrides.as_object().unwrap(),
            Some(&Grouping::new("region", "revenue")),
        )
        .unwrap();
    let names: Vec<&str> = fig.traces.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["A: 10.0", "C: 20.0", "B: 30.0"]);
}

#[test]
fn clear_then_build_matches_fresh_build() {
    let axes = AxisSelection::y1(&["net_sales"]).with_y2(&["units"]);

    let mut reused = ChartMaker::new();
    reused
        .build(
            &grouped(),
            &AxisSelection::default(),
            "G",
            ChartKind::Line,
            &none(),
            Some(&Grouping::new("region", "revenue")),
        )
        .unwrap();
    reused.clear();
    let a = reused
        .build(&sales(), &axes, "Sales", ChartKind::Line, &none(), None)
        .unwrap()
        .clone();

    let mut fresh = ChartMaker::new();
    let b = fresh
        .build(&sales(), &axes, "Sales", ChartKind::Line, &none(), None)
        .unwrap()
        .clone();

    assert_eq!(a, b);
    assert_eq!(reused.table(), fresh.table());
}

#[test]
fn repeated_builds_deduplicate_rows() {
    let mut maker = ChartMaker::new();
    let axes = AxisSelection::y1(&["net_sales"]);
    maker.build(&sales(), &axes, "S", ChartKind::Line, &none(), None).unwrap();
    maker.build(&sales(), &axes, "S", ChartKind::Line, &none(), None).unwrap();
    assert_eq!(maker.table().unwrap().len(), 3);
}

#[test]
fn secondary_axis_gets_palette_colors_and_auto_titles() {
    let mut maker = ChartMaker::new();
    let overrides = json!({"auto_title": true});
    let fig = maker
        .build(
            &sales(),
            &AxisSelection::y1(&["net_sales"]).with_y2(&["units"]),
            "Sales",
            ChartKindSpec::PerAxis {
                y1: Some(ChartKind::Line),
                y2: Some(ChartKind::Bar),
            },
            overrides.as_object().unwrap(),
            None,
        )
        .unwrap()
        .clone();
    assert_eq!(fig.traces[1].axis, Axis::Y2);
    assert_eq!(fig.traces[1].kind, TraceKind::Bar);
    assert!(fig.has_secondary());
    assert_eq!(fig.layout.y1.title.as_deref(), Some("NET SALES"));
    assert_eq!(fig.layout.y2.title.as_deref(), Some("UNITS"));
    assert_eq!(fig.layout.y1.color, Some(maker.palette().get(0)));
    assert_eq!(fig.layout.y2.color, Some(maker.palette().get(1)));
}

#[test]
fn single_axis_turns_auto_color_off() {
    let mut maker = ChartMaker::new();
    let fig = maker
        .build(&sales(), &AxisSelection::y1(&["net_sales"]), "S", ChartKind::Line, &none(), None)
        .unwrap();
    assert_eq!(fig.layout.y1.color, Some(Rgba::BLACK));
    assert!(!maker.options().auto_color);
}

#[test]
fn missing_columns_are_skipped() {
    let mut maker = ChartMaker::new();
    let fig = maker
        .build(
            &sales(),
            &AxisSelection::y1(&["nope", "units"]),
            "S",
            ChartKind::Scatter,
            &none(),
            None,
        )
        .unwrap();
    assert_eq!(fig.traces.len(), 1);
    assert!(fig.traces[0].name.starts_with("UNITS"));
}

#[test]
fn candlestick_needs_ohlc_columns() {
    let mut maker = ChartMaker::new();
    let fig = maker
        .build(&sales(), &AxisSelection::y1(&["net_sales"]), "S", ChartKind::Candlestick, &none(), None)
        .unwrap();
    assert!(fig.traces.is_empty());

    let prices = Table::new(vec![day(1), day(2)])
        .with_numeric("Open", vec![1.0, 2.0])
        .unwrap()
        .with_numeric("High", vec![3.0, 4.0])
        .unwrap()
        .with_numeric("Low", vec![0.5, 1.5])
        .unwrap()
        .with_numeric("Close", vec![2.0, 1.8])
        .unwrap();
    let fig = maker
        .build(&prices, &AxisSelection::y1(&["Close"]), "P", ChartKind::Candlestick, &none(), None)
        .unwrap();
    assert_eq!(fig.traces.len(), 1);
    assert_eq!(fig.traces[0].ohlc.as_ref().unwrap().high, vec![3.0, 4.0]);
}

#[test]
fn pie_colors_each_slice_and_uses_hole() {
    let shares = Table::new(vec!["north".into(), "south".into(), "east".into()])
        .with_numeric("share", vec![1.0, 2.0, 3.0])
        .unwrap();
    let mut maker = ChartMaker::new();
    let fig = maker
        .build(&shares, &AxisSelection::y1(&["share"]), "Share", ChartKind::Pie, &none(), None)
        .unwrap();
    assert!(fig.is_pie());
    assert_eq!(fig.traces[0].slice_colors.len(), 3);
    assert_eq!(fig.traces[0].hole, 0.6);
}

#[test]
fn malformed_override_is_an_error() {
    let mut maker = ChartMaker::new();
    let overrides = json!({"line_width": "wide"});
    let res = maker.build(
        &sales(),
        &AxisSelection::y1(&["net_sales"]),
        "S",
        ChartKind::Line,
        overrides.as_object().unwrap(),
        None,
    );
    assert!(res.is_err());
    assert!(maker.figure().is_none());
}

#[test]
fn x_column_replaces_the_index() {
    let table = Table::new(vec![Key::Number(0.0), Key::Number(1.0)])
        .with_text("quarter", vec!["Q1".into(), "Q2".into()])
        .unwrap()
        .with_numeric("revenue", vec![3.0, 4.0])
        .unwrap();
    let mut maker = ChartMaker::new();
    let fig = maker
        .build(
            &table,
            &AxisSelection::y1(&["revenue"]).with_x("quarter"),
            "Q",
            ChartKind::Bar,
            &none(),
            None,
        )
        .unwrap();
    assert_eq!(fig.traces[0].x, vec![Key::from("Q1"), Key::from("Q2")]);
}
