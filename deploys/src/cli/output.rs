//! Result rendering for the CLI

use serde::Serialize;

use crate::errors::ControlError;
use crate::models::Table;

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned text columns
    #[default]
    Table,
    Yaml,
    Json,
}

/// Render a result in the requested format
pub fn render<T>(value: &T, format: OutputFormat) -> Result<String, ControlError>
where
    T: Serialize + Table,
{
    match format {
        OutputFormat::Table => Ok(format_table(&value.table())),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(value)?;
            out.push('\n');
            Ok(out)
        }
    }
}

/// Left-aligned columns, each padded to its widest cell plus three spaces
pub fn format_table(table: &[Vec<String>]) -> String {
    let columns = table.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0; columns];
    for row in table {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count() + 3);
        }
    }

    let mut out = String::new();
    for row in table {
        let line: String = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
