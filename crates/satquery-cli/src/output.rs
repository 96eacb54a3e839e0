use std::path::Path;

use satquery_core::CatalogTable;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::commands::{CommandOutcome, TleSummary};
use crate::error::CliError;

pub async fn render(
    outcome: &CommandOutcome,
    format: OutputFormat,
    destination: Option<&Path>,
) -> Result<(), CliError> {
    let text = match outcome {
        CommandOutcome::Table(table) => render_catalog(table, format).await?,
        CommandOutcome::Tle(summary) => render_tle(summary, format)?,
    };

    match destination {
        Some(path) => {
            tokio::fs::write(path, text).await?;
            tracing::info!(path = %path.display(), "output written");
        }
        None => print!("{text}"),
    }
    Ok(())
}

async fn render_catalog(table: &CatalogTable, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Json => {
            let mut payload = serde_json::to_string_pretty(&table.to_json())?;
            payload.push('\n');
            Ok(payload)
        }
        OutputFormat::Csv => {
            let mut buffer = Vec::new();
            table.write_csv(&mut buffer).await?;
            String::from_utf8(buffer).map_err(|error| CliError::Command(error.to_string()))
        }
        OutputFormat::Table => Ok(render_table(table)),
    }
}

fn render_table(table: &CatalogTable) -> String {
    let header: Vec<String> = table
        .columns()
        .iter()
        .map(|column| column.as_str().to_owned())
        .collect();
    let rows: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| {
            table
                .columns()
                .iter()
                .map(|column| column.cell(row).to_string())
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|name| name.chars().count()).collect();
    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    push_line(&mut out, &rule, &widths);
    for row in &rows {
        push_line(&mut out, row, &widths);
    }
    out.push_str(&format!("({} rows, {})\n", table.len(), table.provenance()));
    out
}

fn push_line(out: &mut String, values: &[String], widths: &[usize]) {
    let line = values
        .iter()
        .zip(widths)
        .map(|(value, width)| format!("{value:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

fn render_tle(summary: &TleSummary, format: OutputFormat) -> Result<String, CliError> {
    let missed_ids = summary
        .files
        .missed_ids
        .as_ref()
        .map(|path| path.display().to_string());

    match format {
        OutputFormat::Json => {
            let payload = json!({
                "tle_file": summary.files.tle.display().to_string(),
                "missed_ids_file": missed_ids,
                "lines": summary.line_count,
                "missing": summary.missing,
            });
            let mut text = serde_json::to_string_pretty(&payload)?;
            text.push('\n');
            Ok(text)
        }
        OutputFormat::Csv => Ok(summary.missing.iter().fold(
            String::from("missing_norad_id\n"),
            |mut out, id| {
                out.push_str(&id.to_string());
                out.push('\n');
                out
            },
        )),
        OutputFormat::Table => {
            let mut out = format!("tle_file   : {}\n", summary.files.tle.display());
            out.push_str(&format!("lines      : {}\n", summary.line_count));
            out.push_str(&format!("missing    : {}\n", summary.missing.len()));
            if let Some(path) = missed_ids {
                out.push_str(&format!("missed_ids : {path}\n"));
            }
            Ok(out)
        }
    }
}
