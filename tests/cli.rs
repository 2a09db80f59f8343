use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("quickchart").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("quickchart"));
}

#[test]
fn format_prints_compact_values() {
    let mut cmd = Command::cargo_bin("quickchart").unwrap();
    cmd.args(["format", "1500", "2500000000", "-2500000000", "0.5"]);
    cmd.assert()
        .success()
        .stdout(predicate::eq("1.5K\n2.5B\n-2.5B\n0.50\n"));
}

#[test]
fn format_without_decimals_uses_lowercase() {
    let mut cmd = Command::cargo_bin("quickchart").unwrap();
    cmd.args(["format", "--no-decimals", "1500"]);
    cmd.assert().success().stdout(predicate::eq("2k\n"));
}

#[test]
fn plot_writes_chart_named_after_title() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("data.csv");
    std::fs::write(
        &csv,
        "date,visits,signups\n2024-01-01,10,1\n2024-01-02,30,4\n2024-01-03,20,2\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("quickchart").unwrap();
    cmd.args(["plot", "--input"])
        .arg(&csv)
        .args([
            "--y1",
            "visits",
            "--y2",
            "signups",
            "--y2-kind",
            "bar",
            "--title",
            "Traffic",
            "--annotate",
            "--dashed-line",
            "2024-01-02",
            "--set",
            "show_legend=true",
            "--format",
            "svg",
            "--out-dir",
        ])
        .arg(dir.path());
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Traffic.svg"));
    assert!(dir.path().join("Traffic.svg").exists());
}

#[test]
fn plot_without_columns_fails() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("data.csv");
    std::fs::write(&csv, "date,visits\n2024-01-01,10\n").unwrap();
    let mut cmd = Command::cargo_bin("quickchart").unwrap();
    cmd.args(["plot", "--input"]).arg(&csv);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("nothing to plot"));
}
