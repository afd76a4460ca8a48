//! SalesLens - retail sales analytics pipeline
//!
//! A CLI tool that cleans a raw retail transaction export, applies
//! categorical filters, and produces ranked aggregate views: the full
//! batch report of thirteen standard views, one standard view on its own,
//! or an ad-hoc group-by printed to the terminal.
//!
//! Exit codes:
//!   0 - Success (an empty result set is still success)
//!   1 - Runtime error (unreadable source, malformed data, write failure)
//!   2 - Invalid command-line usage

mod aggregate;
mod clean;
mod cli;
mod config;
mod error;
mod filter;
mod ingest;
mod models;
mod report;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use filter::Selection;
use indicatif::{ProgressBar, ProgressStyle};
use models::{Field, Measure, RunMetadata};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("SalesLens v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .saleslens.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".saleslens.toml");

    if path.exists() {
        eprintln!("⚠️  .saleslens.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .saleslens.toml")?;

    println!("✅ Created .saleslens.toml with default settings.");
    println!("   Edit it to set the source path, filters, and report options.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete pipeline. Returns the process exit code.
fn run(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let source = config.source_path().ok_or_else(|| {
        anyhow!("no sales data source; pass --source or set [source] path in .saleslens.toml")
    })?;
    let options = config.ingest_options()?;

    // Step 1: Ingest the raw export
    println!("📥 Loading sales data: {}", source.display());
    let raw = ingest::ingest(&source, &options)?;
    let raw_rows = raw.len();
    info!("Ingested {} raw rows", raw_rows);
    if raw.is_empty() {
        warn!("Source {} has a header but no data rows", source.display());
    }

    // Handle --dry-run: validate the source and exit
    if args.dry_run {
        return handle_dry_run(raw);
    }

    // Step 2: Clean
    let dataset = clean::clean(raw)?;
    println!(
        "🧹 Cleaned dataset: {} of {} rows retained",
        dataset.len(),
        raw_rows
    );

    // Step 3: Apply the filter selection
    let selection = build_selection(&config, &args)?;
    let working = filter::filter(&dataset, &selection);
    if !selection.is_empty() {
        debug!("Applying {} filter constraint(s)", selection.len());
        for (field, allowed) in selection.describe() {
            debug!("Filter: {} restricted to {} value(s)", field, allowed);
        }
        println!(
            "🔎 Filter retained {} of {} rows",
            working.len(),
            dataset.len()
        );
    }

    // Headline metrics over the working set
    let summary = aggregate::summarize(&working);
    println!("\n📊 Headline metrics:");
    println!(
        "   Total amount:     {}",
        report::group_digits(summary.total_amount)
    );
    println!(
        "   Total orders:     {}",
        report::group_digits(summary.total_orders)
    );
    println!(
        "   Unique customers: {}",
        report::group_digits(summary.unique_customers as u64)
    );

    // Single standard view: print and exit
    if let Some(ref name) = args.view {
        let view = report::find_view(name).ok_or_else(|| anyhow!("unknown view '{}'", name))?;
        let table = aggregate::aggregate(&working, view.group_by, view.measure, view.top_n);
        println!("\n{}", view.title);
        print!("{}", report::render_text_table(&table));
        return Ok(0);
    }

    // Ad-hoc view: print and exit
    if let Some(ref fields) = args.group_by {
        let measure = args.measure.unwrap_or(Measure::Count);
        let table = aggregate::aggregate(&working, fields, measure, args.top_n);
        let label: Vec<&str> = fields.iter().map(|f| f.name()).collect();
        println!("\n{} by {}", measure, label.join(", "));
        print!("{}", report::render_text_table(&table));
        return Ok(0);
    }

    // Step 4: Batch report
    let output_dir = config.output_dir();
    std::fs::create_dir_all(&output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            output_dir.display()
        )
    })?;

    println!(
        "\n📝 Generating {} standard views...",
        report::STANDARD_VIEWS.len()
    );

    let pb = ProgressBar::new(report::STANDARD_VIEWS.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut rendered = Vec::new();
    for view in &report::STANDARD_VIEWS {
        pb.set_message(view.name);
        let table = aggregate::aggregate(&working, view.group_by, view.measure, view.top_n);
        let artifact = match args.format {
            OutputFormat::Csv => report::write_csv_artifact(&output_dir, view.name, &table)?,
            OutputFormat::Json => report::write_json_artifact(&output_dir, view.name, &table)?,
        };
        debug!(
            "Wrote {} ({} groups, measure total {})",
            artifact.display(),
            table.len(),
            table.total()
        );
        rendered.push((view, table));
        pb.inc(1);
    }
    pb.finish_and_clear();

    // Step 5: Run summary
    if config.report.include_summary {
        let metadata = RunMetadata {
            source: source.display().to_string(),
            generated_at: Utc::now(),
            raw_rows,
            cleaned_rows: dataset.len(),
            filtered_rows: working.len(),
        };
        let markdown = report::generate_run_summary(
            &metadata,
            &summary,
            &rendered,
            config.report.summary_top_rows,
        );
        let path = report::write_run_summary(&output_dir, &markdown)?;
        debug!("Wrote {}", path.display());
    }

    let duration = start_time.elapsed().as_secs_f64();
    println!(
        "\n✅ Report complete in {:.1}s: {}",
        duration,
        output_dir.display()
    );
    if working.is_empty() {
        println!("   No rows matched the current selection; artifacts contain headers only.");
    }

    Ok(0)
}

/// Handle --dry-run: clean the ingested table, print row accounting, exit.
fn handle_dry_run(raw: ingest::RawTable) -> Result<i32> {
    println!("\n🔍 Dry run: validating the source (no artifacts written)...\n");

    let raw_rows = raw.len();
    let complete = raw.records.iter().filter(|r| r.is_complete()).count();

    println!("   Raw rows:      {}", raw_rows);
    println!("   Complete rows: {}", complete);
    println!("   Dropped rows:  {}", raw_rows - complete);

    match clean::clean(raw) {
        Ok(dataset) => {
            let summary = aggregate::summarize(&dataset);
            println!(
                "\n   Total amount:  {}",
                report::group_digits(summary.total_amount)
            );
            println!(
                "   Total orders:  {}",
                report::group_digits(summary.total_orders)
            );
            println!("\n✅ Dry run complete. Source is ready for reporting.");
            Ok(0)
        }
        Err(e) => {
            eprintln!("\n⛔ Source failed validation: {}", e);
            Ok(1)
        }
    }
}

/// Build the effective selection: config filters first, then CLI --filter
/// flags, which replace the config constraint for their field.
fn build_selection(config: &Config, args: &Args) -> Result<Selection> {
    let mut selection = config.selection()?;

    let mut cli_filters: BTreeMap<Field, Vec<String>> = BTreeMap::new();
    for filter in &args.filter {
        cli_filters
            .entry(filter.field)
            .or_default()
            .extend(filter.values.iter().cloned());
    }
    for (field, values) in cli_filters {
        selection.set(field, values);
    }

    Ok(selection)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .saleslens.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
