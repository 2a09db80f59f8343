use chrono::NaiveDate;
use quickchart::figure::{Anchor, Axis, Shape};
use quickchart::{AxisSelection, ChartKind, ChartMaker, Key, OptionOverrides, Table};
use serde_json::json;

fn day(d: u32) -> Key {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap().into()
}

fn series() -> Table {
    Table::new(vec![day(1), day(2), day(3)])
        .with_numeric("visits", vec![1.0, 5.0, 2.0])
        .unwrap()
        .with_numeric("signups", vec![3.0, 1.0, 1.0])
        .unwrap()
}

fn built(columns: &[&str]) -> ChartMaker {
    let mut maker = ChartMaker::new();
    maker
        .build(
            &series(),
            &AxisSelection::y1(columns),
            "Traffic",
            ChartKind::Line,
            &OptionOverrides::new(),
            None,
        )
        .unwrap();
    maker
}

fn texts(maker: &ChartMaker) -> Vec<String> {
    maker
        .figure()
        .unwrap()
        .annotations
        .iter()
        .map(|a| a.text.clone())
        .collect()
}

#[test]
fn ends_and_maximum_are_labelled() {
    let mut maker = built(&["visits"]);
    maker.add_annotations(true, &[]);
    assert_eq!(
        texts(&maker),
        [
            "Jan. 01, 2024: 1.0",
            "Jan. 03, 2024: 2.0",
            "Jan. 02, 2024: 5.0"
        ]
    );
    let fig = maker.figure().unwrap();
    assert_eq!(fig.annotations[0].arrow, Some((40, -40)));
    assert!(matches!(
        fig.annotations[2].anchor,
        Anchor::Data { y, axis: Axis::Y1, .. } if y == 5.0
    ));
}

#[test]
fn maximum_at_an_end_is_not_repeated() {
    let mut maker = built(&["signups"]);
    maker.add_annotations(true, &[]);
    assert_eq!(texts(&maker).len(), 2);
}

#[test]
fn multi_series_charts_are_left_alone() {
    let mut maker = built(&["visits", "signups"]);
    maker.add_annotations(true, &[(day(2), "peak".into())]);
    assert!(texts(&maker).is_empty());
}

#[test]
fn custom_labels_need_a_known_key() {
    let mut maker = built(&["visits"]);
    maker.add_annotations(false, &[(day(2), "peak".into()), (day(9), "ghost".into())]);
    let t = texts(&maker);
    assert_eq!(t.len(), 3);
    assert_eq!(t[2], "peak");
}

#[test]
fn disabled_option_suppresses_arrows() {
    let mut maker = ChartMaker::new();
    let overrides = json!({"annotations": false});
    maker
        .build(
            &series(),
            &AxisSelection::y1(&["visits"]),
            "Traffic",
            ChartKind::Line,
            overrides.as_object().unwrap(),
            None,
        )
        .unwrap();
    maker.add_annotations(true, &[]);
    assert!(texts(&maker).is_empty());
}

#[test]
fn pie_gets_a_total_label() {
    let shares = Table::new(vec!["a".into(), "b".into(), "c".into()])
        .with_numeric("share", vec![1_000.0, 2_000.0, 3_000.0])
        .unwrap();
    let mut maker = ChartMaker::new();
    maker
        .build(
            &shares,
            &AxisSelection::y1(&["share"]),
            "Share",
            ChartKind::Pie,
            &OptionOverrides::new(),
            None,
        )
        .unwrap();
    maker.add_annotations(false, &[]);
    let fig = maker.figure().unwrap();
    assert_eq!(fig.annotations.len(), 1);
    assert_eq!(fig.annotations[0].text, "Total: 6.0K");
    assert_eq!(fig.annotations[0].anchor, Anchor::Paper { x: 0.5, y: 0.5 });
}

#[test]
fn dashed_line_at_known_date() {
    let mut maker = built(&["visits"]);
    maker.add_dashed_line("2024-01-02", Some("Launch"));
    let fig = maker.figure().unwrap();
    assert_eq!(fig.shapes.len(), 1);
    let Shape::VLine { x, y0, y1, .. } = &fig.shapes[0];
    assert_eq!((x, *y0, *y1), (&day(2), 0.0, 5.0));
    assert_eq!(
        fig.annotations.last().unwrap().text,
        "Launch\n5.0\nJan. 02, 2024"
    );
}

#[test]
fn dashed_line_follows_the_larger_column() {
    let mut maker = built(&["visits", "signups"]);
    maker.add_dashed_line("2024-01-01", None);
    let fig = maker.figure().unwrap();
    let Shape::VLine { y1, .. } = &fig.shapes[0];
    assert_eq!(*y1, 3.0);
}

#[test]
fn dashed_line_at_unknown_date_changes_nothing() {
    let mut maker = built(&["visits"]);
    let before = maker.figure().unwrap().clone();
    maker.add_dashed_line("2030-05-05", Some("never"));
    maker.add_dashed_line("not a date", None);
    assert_eq!(maker.figure().unwrap(), &before);
}

#[test]
fn title_position_is_remembered() {
    let mut maker = built(&["visits"]);
    maker.add_title(Some("Traffic"), Some("daily"), Some(0.5), None);
    maker.add_title(Some("Traffic, again"), None, None, Some(0.9));
    let title = maker.figure().unwrap().layout.title.clone().unwrap();
    assert_eq!(title.text, "Traffic, again");
    assert_eq!((title.x, title.y), (0.5, 0.9));
    assert_eq!((title.size, title.subtitle_size), (27, 18));
    assert_eq!(title.family, "Cardo");
}

#[test]
fn decorations_before_build_are_noops() {
    let mut maker = ChartMaker::new();
    maker.add_title(Some("t"), None, None, None);
    maker.add_annotations(true, &[]);
    maker.add_dashed_line("2024-01-01", None);
    assert!(maker.figure().is_none());
}
