//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including the custom filter/measure value parsers and validation.

use crate::models::{Field, Measure, NumericField};
use crate::report::{find_view, view_names};
use clap::Parser;
use std::path::PathBuf;

/// SalesLens - retail sales analytics pipeline
///
/// Clean a raw retail transaction export, apply categorical filters, and
/// produce ranked aggregate views as csv/json artifacts plus a Markdown
/// run summary.
///
/// Examples:
///   saleslens --source diwali_sales.csv
///   saleslens --source sales.csv --filter "State=Maharashtra,Karnataka"
///   saleslens --source sales.csv --view state_amount
///   saleslens --source sales.csv --group-by Zone,Gender --measure sum:amount --top-n 5
///   saleslens --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the sales data csv
    ///
    /// Can also be set via SALESLENS_SOURCE env var or the [source]
    /// section of .saleslens.toml.
    #[arg(short, long, value_name = "FILE", env = "SALESLENS_SOURCE")]
    pub source: Option<PathBuf>,

    /// Directory for batch report artifacts
    ///
    /// Created if absent. Defaults to "reports" (or the config value).
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Artifact format for view tables (csv, json)
    #[arg(long, default_value = "csv", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Restrict a field to the given values (repeatable)
    ///
    /// Example: --filter "State=Maharashtra,Karnataka". An empty value
    /// list ("--filter State=") deliberately excludes every row.
    #[arg(long, value_name = "FIELD=V1,V2", value_parser = parse_filter)]
    pub filter: Vec<FilterArg>,

    /// Run a single standard view and print it instead of the batch report
    ///
    /// See the README for the view catalog, e.g. state_amount, top_products.
    #[arg(long, value_name = "NAME", conflicts_with = "group_by")]
    pub view: Option<String>,

    /// Ad-hoc view: fields to group by (comma-separated)
    ///
    /// Example: --group-by Zone,Gender
    #[arg(long, value_name = "FIELDS", value_delimiter = ',', value_parser = parse_field)]
    pub group_by: Option<Vec<Field>>,

    /// Ad-hoc view measure (count, sum:amount, sum:orders, sum:age)
    ///
    /// Defaults to count. Requires --group-by.
    #[arg(long, value_name = "MEASURE", value_parser = parse_measure)]
    pub measure: Option<Measure>,

    /// Keep only the N highest-ranked groups of the ad-hoc view
    #[arg(long, value_name = "N")]
    pub top_n: Option<usize>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .saleslens.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Dry run: ingest and clean only, print row accounting and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .saleslens.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Artifact format for view tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Comma-separated values (default)
    #[default]
    Csv,
    /// Pretty-printed JSON
    Json,
}

/// One parsed `--filter` flag: a field and its allowed values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterArg {
    pub field: Field,
    pub values: Vec<String>,
}

/// Parses "FIELD=V1,V2" into a `FilterArg`. "FIELD=" yields an empty
/// value list, i.e. an exclude-all constraint.
fn parse_filter(s: &str) -> Result<FilterArg, String> {
    let (field, values) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid filter '{s}'; expected FIELD=V1,V2"))?;
    let field = field.trim().parse::<Field>()?;
    let values = values
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect();
    Ok(FilterArg { field, values })
}

/// Parses a measure spec: "count" or "sum:<amount|orders|age>".
fn parse_measure(s: &str) -> Result<Measure, String> {
    let lower = s.trim().to_lowercase();
    if lower == "count" {
        return Ok(Measure::Count);
    }
    if let Some(field) = lower.strip_prefix("sum:") {
        return field.parse::<NumericField>().map(Measure::Sum);
    }
    Err(format!(
        "invalid measure '{s}'; expected 'count' or 'sum:<amount|orders|age>'"
    ))
}

/// Parses one group-by field name.
fn parse_field(s: &str) -> Result<Field, String> {
    s.parse::<Field>()
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Ad-hoc view options only make sense together
        if self.measure.is_some() && self.group_by.is_none() {
            return Err("--measure requires --group-by".to_string());
        }
        if self.top_n.is_some() && self.group_by.is_none() {
            return Err(
                "--top-n requires --group-by (standard views have fixed truncation)".to_string(),
            );
        }
        if self.top_n == Some(0) {
            return Err("Top N must be at least 1".to_string());
        }

        // Validate the standard view name if provided
        if let Some(ref name) = self.view {
            if find_view(name).is_none() {
                return Err(format!(
                    "Unknown view '{}'. Available views: {}",
                    name,
                    view_names().join(", ")
                ));
            }
        }

        // Validate the source file if provided on the command line
        if let Some(ref source) = self.source {
            if !source.exists() {
                return Err(format!("Source file does not exist: {}", source.display()));
            }
            if !source.is_file() {
                return Err(format!("Source path is not a file: {}", source.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
