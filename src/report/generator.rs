//! Report artifact generation.
//!
//! Renders ranked aggregate tables to csv/json artifacts, prints them as
//! aligned text tables, and assembles the Markdown run summary. Renderers
//! receive rows in final display order and never re-sort or re-filter; an
//! empty table is rendered as "no data", not treated as an error.

use crate::models::{AggregateTable, RunMetadata, SalesSummary};
use crate::report::views::ViewSpec;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes `table` as `<dir>/<name>.csv` and returns the artifact path.
///
/// The header holds the group-by field names followed by the measure
/// column; an empty table produces a header-only file.
pub fn write_csv_artifact(dir: &Path, name: &str, table: &AggregateTable) -> Result<PathBuf> {
    let path = dir.join(format!("{name}.csv"));
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create artifact {}", path.display()))?;

    let mut header: Vec<&str> = table.group_by().iter().map(|f| f.name()).collect();
    header.push(table.measure().column_name());
    writer.write_record(&header)?;

    for row in table.rows() {
        let mut record: Vec<String> = row.key.parts().to_vec();
        record.push(row.value.to_string());
        writer.write_record(&record)?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write artifact {}", path.display()))?;
    Ok(path)
}

/// Writes `table` as pretty-printed JSON at `<dir>/<name>.json`.
pub fn write_json_artifact(dir: &Path, name: &str, table: &AggregateTable) -> Result<PathBuf> {
    let path = dir.join(format!("{name}.json"));
    let content = serde_json::to_string_pretty(table)
        .with_context(|| format!("Failed to serialize view '{name}'"))?;
    fs::write(&path, content)
        .with_context(|| format!("Failed to write artifact {}", path.display()))?;
    Ok(path)
}

/// Renders `table` as an aligned plain-text table for terminal output.
pub fn render_text_table(table: &AggregateTable) -> String {
    if table.is_empty() {
        return "  (no data)\n".to_string();
    }

    let mut headers: Vec<String> = table
        .group_by()
        .iter()
        .map(|f| f.name().to_string())
        .collect();
    headers.push(table.measure().column_name().to_string());

    let rows: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| {
            let mut cells = row.key.parts().to_vec();
            cells.push(group_digits(row.value));
            cells
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(String::len).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let mut output = String::new();
    output.push_str(&format_line(&headers, &widths));
    let ruler: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    output.push_str(&format_line(&ruler, &widths));
    for row in &rows {
        output.push_str(&format_line(row, &widths));
    }
    output
}

/// One text-table line: key columns left-aligned, value column right-aligned.
fn format_line(cells: &[String], widths: &[usize]) -> String {
    let last = cells.len() - 1;
    let mut line = String::from("  ");
    for (i, cell) in cells.iter().enumerate() {
        if i == last {
            line.push_str(&format!("{:>width$}", cell, width = widths[i]));
        } else {
            line.push_str(&format!("{:<width$}  ", cell, width = widths[i]));
        }
    }
    line.push('\n');
    line
}

/// Formats a value with thousands separators ("106255131" -> "106,255,131").
pub fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let mut output = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            output.push(',');
        }
        output.push(ch);
    }
    output
}

/// Generates the complete Markdown run summary.
pub fn generate_run_summary(
    metadata: &RunMetadata,
    summary: &SalesSummary,
    views: &[(&ViewSpec, AggregateTable)],
    top_rows: usize,
) -> String {
    let mut output = String::new();

    output.push_str("# SalesLens Report\n\n");
    output.push_str(&generate_metadata_section(metadata));
    output.push_str(&generate_metrics_section(summary));
    output.push_str(&generate_views_section(views, top_rows));
    output.push_str("---\n\n*Report generated by SalesLens*\n");

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &RunMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Raw Rows:** {}\n", metadata.raw_rows));
    section.push_str(&format!(
        "- **Cleaned Rows:** {} ({} dropped)\n",
        metadata.cleaned_rows,
        metadata.raw_rows.saturating_sub(metadata.cleaned_rows)
    ));
    if metadata.filtered_rows != metadata.cleaned_rows {
        section.push_str(&format!(
            "- **Rows After Filter:** {}\n",
            metadata.filtered_rows
        ));
    }
    section.push('\n');

    section
}

/// Generate the headline metrics section.
fn generate_metrics_section(summary: &SalesSummary) -> String {
    let mut section = String::new();

    section.push_str("## Headline Metrics\n\n");
    section.push_str("| Total Amount | Total Orders | Unique Customers |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} |\n\n",
        group_digits(summary.total_amount),
        group_digits(summary.total_orders),
        group_digits(summary.unique_customers as u64)
    ));

    section
}

/// Generate one section per view, quoting at most `top_rows` rows each.
fn generate_views_section(views: &[(&ViewSpec, AggregateTable)], top_rows: usize) -> String {
    let mut section = String::new();

    section.push_str("## Views\n\n");
    for (view, table) in views {
        section.push_str(&format!("### {}\n\n", view.title));

        if table.is_empty() {
            section.push_str("No data for this view.\n\n");
            continue;
        }

        let mut header: Vec<&str> = table.group_by().iter().map(|f| f.name()).collect();
        header.push(table.measure().column_name());
        section.push_str(&format!("| {} |\n", header.join(" | ")));
        let mut alignment: Vec<&str> = table.group_by().iter().map(|_| ":---").collect();
        alignment.push("---:");
        section.push_str(&format!("|{}|\n", alignment.join("|")));

        for row in table.rows().iter().take(top_rows) {
            section.push_str(&format!(
                "| {} | {} |\n",
                row.key.parts().join(" | "),
                group_digits(row.value)
            ));
        }
        if table.len() > top_rows {
            section.push_str(&format!(
                "\n*Showing {} of {} groups; the full ranking is in `{}`.*\n",
                top_rows,
                table.len(),
                view.name
            ));
        }
        section.push('\n');
    }

    section
}

/// Writes the run summary as `<dir>/summary.md` and returns its path.
pub fn write_run_summary(dir: &Path, content: &str) -> Result<PathBuf> {
    let path = dir.join("summary.md");
    fs::write(&path, content)
        .with_context(|| format!("Failed to write run summary {}", path.display()))?;
    Ok(path)
}
