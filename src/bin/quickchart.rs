use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand};
use quickchart::chart::ChartKindSpec;
use quickchart::{
    AxisSelection, ChartKind, ChartMaker, ChartOptions, Grouping, OptionOverrides, clean_values,
    storage,
};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "quickchart",
    version,
    about = "Build styled charts from CSV data and format numbers K/M/B/T style"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plot columns of a CSV file (first column is the index).
    Plot(PlotArgs),
    /// Print values in compact magnitude notation (1.5K, 2.3M, ...).
    Format(FormatArgs),
}

#[derive(Args, Debug)]
struct PlotArgs {
    /// CSV input; the first column becomes the x index.
    #[arg(short, long)]
    input: PathBuf,
    /// Primary-axis columns, separated by comma or semicolon.
    #[arg(long, default_value = "")]
    y1: String,
    /// Secondary-axis columns, separated by comma or semicolon.
    #[arg(long)]
    y2: Option<String>,
    /// Column to use for x instead of the index.
    #[arg(long)]
    x: Option<String>,
    /// Chart kind for the primary axis (and the secondary one unless --y2-kind is set).
    #[arg(short, long, default_value = "line")]
    kind: ChartKind,
    /// Chart kind for the secondary axis.
    #[arg(long)]
    y2_kind: Option<ChartKind>,
    /// Draw one line per distinct value of this column (requires --value-col).
    #[arg(long, requires = "value_col")]
    group_by: Option<String>,
    /// Numeric column plotted per group.
    #[arg(long, requires = "group_by")]
    value_col: Option<String>,
    /// Chart title; also the output file name.
    #[arg(short, long, default_value = "chart")]
    title: String,
    /// Subtitle shown under the title.
    #[arg(long)]
    subtitle: Option<String>,
    /// JSON file with option overrides.
    #[arg(long)]
    options: Option<PathBuf>,
    /// Single option override as key=json (e.g. --set decimals=false).
    #[arg(long = "set", value_name = "KEY=JSON")]
    set: Vec<String>,
    /// Output directory (defaults to the save_directory option, then the picture folder).
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Output format: svg, png, jpg, bmp or html.
    #[arg(long, default_value = "png")]
    format: String,
    /// Label the first and last points (single-series charts).
    #[arg(long, default_value_t = false)]
    annotate: bool,
    /// With --annotate, also label the maximum.
    #[arg(long, default_value_t = false)]
    show_max: bool,
    /// Draw a dashed reference line at this index value.
    #[arg(long)]
    dashed_line: Option<String>,
    /// Text shown above the dashed line.
    #[arg(long, requires = "dashed_line")]
    dashed_text: Option<String>,
    /// Open the chart in a viewer window after saving.
    #[arg(long, default_value_t = false)]
    show: bool,
}

#[derive(Args, Debug)]
struct FormatArgs {
    /// Values to format.
    #[arg(required = true, allow_negative_numbers = true)]
    values: Vec<f64>,
    /// Digits after the decimal point for scaled values.
    #[arg(long, default_value_t = 1)]
    decimal_places: usize,
    /// Round to integers and use lowercase suffixes.
    #[arg(long, default_value_t = false)]
    no_decimals: bool,
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// `key=json`; a value that is not valid JSON is taken as a string.
fn parse_override(s: &str) -> Result<(String, Value)> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("invalid --set {s:?}, expected KEY=JSON"))?;
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.trim().to_string(), value))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Plot(args) => cmd_plot(args),
        Command::Format(args) => cmd_format(args),
    }
}

fn cmd_plot(args: PlotArgs) -> Result<()> {
    let table = storage::load_csv(&args.input)?;

    let mut overrides: OptionOverrides = match &args.options {
        Some(path) => ChartOptions::load_overrides(path)?,
        None => OptionOverrides::new(),
    };
    for item in &args.set {
        let (k, v) = parse_override(item)?;
        overrides.insert(k, v);
    }

    let axes = AxisSelection {
        x: args.x.clone(),
        y1: parse_list(&args.y1),
        y2: args.y2.as_deref().map(parse_list).unwrap_or_default(),
    };
    let grouping = match (&args.group_by, &args.value_col) {
        (Some(g), Some(v)) => Some(Grouping::new(g, v)),
        _ => None,
    };
    if axes.y1.is_empty() && axes.y2.is_empty() && grouping.is_none() {
        anyhow::bail!("nothing to plot: pass --y1/--y2 columns or --group-by with --value-col");
    }
    let kind = match args.y2_kind {
        Some(y2) => ChartKindSpec::PerAxis {
            y1: Some(args.kind),
            y2: Some(y2),
        },
        None => ChartKindSpec::Uniform(args.kind),
    };

    let mut maker = ChartMaker::new();
    maker.build(&table, &axes, &args.title, kind, &overrides, grouping.as_ref())?;
    if args.subtitle.is_some() || !args.title.is_empty() {
        maker.add_title(Some(&args.title), args.subtitle.as_deref(), None, None);
    }
    if args.annotate {
        maker.add_annotations(args.show_max, &[]);
    }
    if let Some(date) = &args.dashed_line {
        maker.add_dashed_line(date, args.dashed_text.as_deref());
    }

    let path = maker.save_figure(args.out_dir.as_deref(), &args.format)?;
    eprintln!("Wrote chart to {}", path.display());

    if args.show {
        maker.show_figure()?;
    }
    Ok(())
}

fn cmd_format(args: FormatArgs) -> Result<()> {
    for s in clean_values(&args.values, !args.no_decimals, args.decimal_places) {
        println!("{s}");
    }
    Ok(())
}
