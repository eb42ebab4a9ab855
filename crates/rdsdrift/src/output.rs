//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Tables use `tabled`,
//! structured formats use serde, plain emits one line per item. Status
//! lines go to stderr so stdout stays machine-readable.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::builder::Builder;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Appended to formula-derived values in tables.
pub const FORMULA_MARK: &str = " ƒ";

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Print a status line to stderr, unless `--quiet`.
pub fn status(global: &GlobalOpts, tone: Tone, message: impl Display) {
    if global.quiet {
        return;
    }
    if should_color(global.color()) {
        match tone {
            Tone::Good => eprintln!("{}", message.green()),
            Tone::Warn => eprintln!("{}", message.yellow()),
            Tone::Hint => eprintln!("{}", message.dimmed()),
        }
    } else {
        eprintln!("{message}");
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Tone {
    Good,
    Warn,
    Hint,
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(Table::new(rows).with(Style::rounded()).to_string())
        }
        OutputFormat::Plain => Ok(data.iter().map(id_fn).collect::<Vec<_>>().join("\n")),
        structured => render_structured(structured, data),
    }
}

/// Render one serde-serializable value.
///
/// `table_fn` builds the table view, `plain_fn` the scripting view.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    table_fn: impl Fn(&T) -> String,
    plain_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(table_fn(data)),
        OutputFormat::Plain => Ok(plain_fn(data)),
        structured => render_structured(structured, data),
    }
}

/// A table whose columns are only known at runtime.
pub fn render_grid<H, R>(headers: H, rows: impl IntoIterator<Item = R>) -> String
where
    H: IntoIterator,
    H::Item: Into<String>,
    R: IntoIterator,
    R::Item: Into<String>,
{
    let mut builder = Builder::default();
    builder.push_record(headers.into_iter().map(Into::into));
    for row in rows {
        builder.push_record(row.into_iter().map(Into::into));
    }
    builder.build().with(Style::rounded()).to_string()
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_structured<T: serde::Serialize + ?Sized>(
    format: OutputFormat,
    data: &T,
) -> Result<String, CliError> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(data).map_err(|e| e.to_string()),
        OutputFormat::JsonCompact => serde_json::to_string(data).map_err(|e| e.to_string()),
        OutputFormat::Yaml => serde_yaml::to_string(data).map_err(|e| e.to_string()),
        OutputFormat::Table | OutputFormat::Plain => {
            return Err(CliError::Internal {
                message: format!("{format:?} is not a structured format"),
            });
        }
    };
    rendered.map_err(|reason| CliError::Internal {
        message: format!("failed to render {format:?} output: {reason}"),
    })
}

/// A value cell: `-` for absent, formula values marked.
pub fn value_cell(value: Option<&str>) -> String {
    match value {
        None => "-".into(),
        Some(v) if rdsdrift_core::model::is_formula(v) => format!("{v}{FORMULA_MARK}"),
        Some(v) => v.to_owned(),
    }
}
