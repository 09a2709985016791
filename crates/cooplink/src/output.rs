//! Output rendering: tables for humans, JSON and tab-separated text
//! for scripts.

use std::io::IsTerminal;

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Whether escape codes should be emitted for this invocation.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Render a homogeneous list in the requested format.
pub fn render_list<T: Tabled + Serialize>(
    items: &[T],
    format: OutputFormat,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                return Ok("(no results)".into());
            }
            let mut table = Table::new(items);
            table.with(Style::rounded());
            Ok(table.to_string())
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(items)?),
        OutputFormat::JsonCompact => Ok(serde_json::to_string(items)?),
        OutputFormat::Plain => {
            let mut out = String::new();
            for item in items {
                let fields: Vec<String> = Tabled::fields(item)
                    .iter()
                    .map(|f| f.to_string())
                    .collect();
                out.push_str(&fields.join("\t"));
                out.push('\n');
            }
            Ok(out.trim_end().to_owned())
        }
    }
}

/// Render a single object. Table and plain formats fall back to the
/// caller-supplied detail text; JSON formats serialize the value.
pub fn render_single<T: Serialize>(
    value: &T,
    detail: String,
    format: OutputFormat,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Table | OutputFormat::Plain => Ok(detail),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::JsonCompact => Ok(serde_json::to_string(value)?),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Tabled, Serialize)]
    struct Row {
        name: &'static str,
        state: &'static str,
    }

    #[test]
    fn empty_table_has_placeholder() {
        let rows: Vec<Row> = vec![];
        let out = render_list(&rows, OutputFormat::Table).unwrap();
        assert_eq!(out, "(no results)");
    }

    #[test]
    fn plain_is_tab_separated() {
        let rows = vec![
            Row {
                name: "coop",
                state: "closed",
            },
            Row {
                name: "run",
                state: "open",
            },
        ];
        let out = render_list(&rows, OutputFormat::Plain).unwrap();
        assert_eq!(out, "coop\tclosed\nrun\topen");
    }

    #[test]
    fn json_compact_is_single_line() {
        let rows = vec![Row {
            name: "coop",
            state: "closed",
        }];
        let out = render_list(&rows, OutputFormat::JsonCompact).unwrap();
        assert!(!out.contains('\n'));
        assert!(out.contains("\"state\":\"closed\""));
    }
}
