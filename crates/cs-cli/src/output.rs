//! Output formatting utilities.

use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use crate::config::OutputFormat;

/// Prints a success message.
pub fn success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

/// Outputs rows in the specified format.
pub fn output<T: Tabled + serde::Serialize>(
    data: &[T],
    format: OutputFormat,
) -> crate::CliResult<()> {
    match format {
        OutputFormat::Table => {
            if data.is_empty() {
                info("No results found.");
            } else {
                println!("{}", render_table(data));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data)?;
            println!("{json}");
        }
        OutputFormat::Quiet => {}
    }
    Ok(())
}

/// Outputs a single value: the bare value for `table`/`quiet`, an object
/// for `json`.
pub fn output_value(field: &str, value: &str, format: OutputFormat) -> crate::CliResult<()> {
    match format {
        OutputFormat::Table | OutputFormat::Quiet => println!("{value}"),
        OutputFormat::Json => {
            let mut object = serde_json::Map::new();
            object.insert(field.to_string(), value.into());
            let json = serde_json::to_string_pretty(&object)?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Renders rows as a rounded table.
pub fn render_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Tabled, serde::Serialize)]
    struct Row {
        key: String,
        value: String,
    }

    #[test]
    fn table_contains_headers_and_cells() {
        let rendered = render_table(&[Row {
            key: ".redirect".to_string(),
            value: "/home".to_string(),
        }]);
        assert!(rendered.contains("key"));
        assert!(rendered.contains(".redirect"));
        assert!(rendered.contains("/home"));
    }
}
