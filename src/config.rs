//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.saleslens.toml` files.

use crate::filter::Selection;
use crate::ingest::IngestOptions;
use crate::models::Field;
use anyhow::{anyhow, bail, Context, Result};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Source ingestion settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Persisted filter selection: field name to allowed values. An empty
    /// list is an explicit exclude-all for that field.
    #[serde(default)]
    pub filters: BTreeMap<String, Vec<String>>,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory receiving batch report artifacts.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            verbose: false,
        }
    }
}

fn default_output_dir() -> String {
    "reports".to_string()
}

/// Source ingestion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path to the sales data csv.
    #[serde(default)]
    pub path: Option<String>,

    /// Field delimiter (single character).
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Encoding label used to decode field bytes, e.g. "windows-1252" or
    /// "utf-8". Bytes invalid in the encoding are substituted, never fatal.
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: None,
            delimiter: default_delimiter(),
            encoding: default_encoding(),
        }
    }
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_encoding() -> String {
    // The upstream export carries stray windows-1252 bytes.
    "windows-1252".to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Write summary.md alongside the view artifacts.
    #[serde(default = "default_true")]
    pub include_summary: bool,

    /// Rows of each view quoted in summary.md.
    #[serde(default = "default_summary_top_rows")]
    pub summary_top_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_summary: true,
            summary_top_rows: default_summary_top_rows(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_summary_top_rows() -> usize {
    5
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".saleslens.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings. CLI
    /// `--filter` flags are merged into the selection separately, because
    /// they replace config constraints per field rather than wholesale.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // Paths - only override if explicitly provided
        if let Some(ref source) = args.source {
            self.source.path = Some(source.display().to_string());
        }
        if let Some(ref output_dir) = args.output_dir {
            self.general.output_dir = output_dir.display().to_string();
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Path of the sales data source, if any is configured.
    pub fn source_path(&self) -> Option<PathBuf> {
        self.source.path.as_ref().map(PathBuf::from)
    }

    /// Directory receiving batch report artifacts.
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.general.output_dir)
    }

    /// Ingestion options from the `[source]` section.
    pub fn ingest_options(&self) -> Result<IngestOptions> {
        let delimiter = match self.source.delimiter.as_bytes() {
            [byte] => *byte,
            _ => bail!(
                "source delimiter must be a single character, got '{}'",
                self.source.delimiter
            ),
        };
        let encoding = Encoding::for_label(self.source.encoding.as_bytes())
            .ok_or_else(|| anyhow!("unknown source encoding label '{}'", self.source.encoding))?;
        Ok(IngestOptions {
            delimiter,
            encoding,
        })
    }

    /// Filter selection from the `[filters]` section.
    pub fn selection(&self) -> Result<Selection> {
        let mut selection = Selection::new();
        for (name, values) in &self.filters {
            let field = name
                .parse::<Field>()
                .map_err(|e| anyhow!("[filters] {e}"))?;
            selection.set(field, values.iter().cloned());
        }
        Ok(selection)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.output_dir, "reports");
        assert_eq!(config.source.delimiter, ",");
        assert_eq!(config.source.encoding, "windows-1252");
        assert!(config.report.include_summary);
        assert_eq!(config.report.summary_top_rows, 5);
        assert!(config.filters.is_empty());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output_dir = "out"
verbose = true

[source]
path = "data/sales.csv"
delimiter = ";"
encoding = "utf-8"

[report]
summary_top_rows = 3

[filters]
State = ["Maharashtra", "Karnataka"]
Gender = ["F"]
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output_dir, "out");
        assert!(config.general.verbose);
        assert_eq!(config.source.path.as_deref(), Some("data/sales.csv"));
        assert_eq!(config.report.summary_top_rows, 3);

        let selection = config.selection().unwrap();
        assert_eq!(selection.len(), 2);

        let options = config.ingest_options().unwrap();
        assert_eq!(options.delimiter, b';');
        assert_eq!(options.encoding, encoding_rs::UTF_8);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[source]"));
        assert!(toml_str.contains("[report]"));
    }

    #[test]
    fn test_selection_rejects_unknown_field() {
        let config: Config = toml::from_str(
            r#"
[filters]
Discount = ["10%"]
"#,
        )
        .unwrap();

        let err = config.selection().unwrap_err();
        assert!(err.to_string().contains("unknown field 'Discount'"));
    }

    #[test]
    fn test_ingest_options_rejects_bad_values() {
        let mut config = Config::default();
        config.source.delimiter = "ab".to_string();
        assert!(config.ingest_options().is_err());

        config.source.delimiter = ",".to_string();
        config.source.encoding = "martian-3000".to_string();
        assert!(config.ingest_options().is_err());
    }

    #[test]
    fn test_encoding_labels_resolve_to_aliases() {
        let mut config = Config::default();
        config.source.encoding = "latin1".to_string();
        // WHATWG maps latin1 onto windows-1252.
        let options = config.ingest_options().unwrap();
        assert_eq!(options.encoding, encoding_rs::WINDOWS_1252);
    }

    #[test]
    fn test_merge_with_args_prefers_cli_values() {
        let mut config: Config = toml::from_str(
            r#"
[general]
output_dir = "from_config"

[source]
path = "config.csv"
"#,
        )
        .unwrap();

        let args = Args::parse_from(["saleslens", "--source", "cli.csv", "--verbose"]);
        config.merge_with_args(&args);

        assert_eq!(config.source.path.as_deref(), Some("cli.csv"));
        assert_eq!(config.general.output_dir, "from_config");
        assert!(config.general.verbose);
    }
}
