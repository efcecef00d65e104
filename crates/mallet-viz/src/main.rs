//! CLI entry point for automatic chart reports.

use anyhow::{Result, anyhow};
use clap::Parser;
use mallet_tabular::{CorrelationMethod, Table};
use mallet_viz::{AutoPlot, AutoPlotConfig, Marginal, WriteMode};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    author = "Mallet Team",
    version,
    about = "Automatic chart reports for tabular data",
    long_about = "Inspects the column types of a CSV or Parquet file and draws every chart \
                  the data supports into a single HTML report.\n\n\
                  EXAMPLES:\n  \
                  # Default charts into autoplot.html\n  \
                  mallet-autoplot -i data.csv\n\n  \
                  # Add scatter and correlation charts, write sales.html\n  \
                  mallet-autoplot -i data.csv --scatter --correlation -o sales\n\n  \
                  # Only list the chart kinds the data supports\n  \
                  mallet-autoplot -i data.parquet --list"
)]
struct Args {
    /// Path to the CSV or Parquet file to plot
    #[arg(short, long)]
    input: String,

    /// Output file stem; `.html` is appended
    ///
    /// Overrides the filename from --config
    #[arg(short, long)]
    output: Option<String>,

    /// JSON file with an AutoPlotConfig; missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Column to use as the row index
    #[arg(long)]
    index: Option<String>,

    /// Include scatter plots of every numeric pair
    #[arg(long)]
    scatter: bool,

    /// Include the correlation heatmap
    #[arg(long)]
    correlation: bool,

    /// Correlation method (pearson, kendall, spearman)
    #[arg(long)]
    correlation_method: Option<CorrelationMethod>,

    /// Side distributions on scatter plots and histograms (histogram, box, violin)
    #[arg(long)]
    marginals: Option<Marginal>,

    /// Include density contours and heatmaps
    #[arg(long)]
    density: bool,

    #[arg(long)]
    no_box: bool,

    #[arg(long)]
    no_violin: bool,

    #[arg(long)]
    no_pie: bool,

    #[arg(long)]
    no_histogram: bool,

    #[arg(long)]
    no_treemap: bool,

    #[arg(long)]
    no_sunburst: bool,

    #[arg(long)]
    no_timeseries: bool,

    /// Append to the report file instead of overwriting it
    #[arg(long)]
    append: bool,

    /// Print the chart kinds the data supports and exit
    #[arg(long)]
    list: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet);

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    info!("Loading dataset from: {}", args.input);
    let df = load_frame(&args.input)?;
    info!("Dataset loaded successfully: {:?}", df.shape());

    let table = match args.index {
        Some(ref column) => Table::set_index(df, column)?,
        None => Table::new(df),
    };

    let config = build_config(&args)?;
    let autoplot = AutoPlot::new(table, config)?;

    if args.list {
        return print_chart_types(&autoplot);
    }

    let report = autoplot.show()?;
    if autoplot.config().create_html {
        info!(
            "Report with {} charts written to {}.html",
            report.len(),
            autoplot.config().filename
        );
    }
    Ok(())
}

/// Read a CSV or Parquet file, chosen by extension.
fn load_frame(path: &str) -> Result<DataFrame> {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("parquet") => {
            let file = File::open(path)?;
            ParquetReader::new(file)
                .finish()
                .map_err(|e| anyhow!("Failed to read parquet file: {}", e))
        }
        _ => CsvReadOptions::default()
            .with_has_header(true)
            .map_parse_options(|options| options.with_try_parse_dates(true))
            .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
            .finish()
            .map_err(|e| anyhow!("Failed to read csv file: {}", e)),
    }
}

/// Start from --config (or the defaults) and apply the command line flags on top.
fn build_config(args: &Args) -> Result<AutoPlotConfig> {
    let mut config = match args.config {
        Some(ref path) => {
            debug!("Reading configuration from {}", path.display());
            AutoPlotConfig::from_json(&std::fs::read_to_string(path)?)?
        }
        None => AutoPlotConfig::default(),
    };

    config.include_scatter |= args.scatter;
    config.include_correlation |= args.correlation;
    config.include_density |= args.density;
    config.include_box &= !args.no_box;
    config.include_violin &= !args.no_violin;
    config.include_pie &= !args.no_pie;
    config.include_histogram &= !args.no_histogram;
    config.include_treemap &= !args.no_treemap;
    config.include_sunburst &= !args.no_sunburst;
    config.include_timeseries &= !args.no_timeseries;

    if let Some(method) = args.correlation_method {
        config.correlation_method = method;
    }
    if let Some(marginal) = args.marginals {
        config.marginals = Some(marginal);
    }
    if let Some(ref output) = args.output {
        config.filename = output.clone();
    }
    if args.append {
        config.write_mode = WriteMode::Append;
    }
    if args.list {
        config.create_html = false;
    }

    config.validate()?;
    Ok(config)
}

/// Print eligible chart kinds and the column classification.
fn print_chart_types(autoplot: &AutoPlot) -> Result<()> {
    println!("\n{}", "=".repeat(60));
    println!("ELIGIBLE CHARTS");
    println!("{}", "=".repeat(60));

    let kinds = autoplot.chart_types();
    if kinds.is_empty() {
        println!("  No charts apply: the data has no numeric columns");
    }
    for kind in &kinds {
        println!("  - {}", kind);
    }

    println!();
    println!("  Column types: {}", serde_json::to_string(autoplot.column_types())?);
    println!("  Pie sector columns: {:?}", autoplot.pie_sectors());
    println!("{}", "=".repeat(60));
    Ok(())
}
