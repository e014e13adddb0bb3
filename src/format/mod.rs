//! Output formatting for result tables (console table and CSV file).

use crate::table::{ResultTable, Row};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Message returned when a scrape produced no rows.
pub const NO_ITEMS: &str = "No items found";

/// Header line printed above the console table.
pub const FOUND_ITEMS: &str = "Found Items:";

/// Column headers of the console table.
pub const DISPLAY_COLUMNS: [&str; 4] = ["title", "current_bid", "hours_remaining", "search_term"];

const TITLE_WIDTH: usize = 60;

/// Renders the result table for the console and optionally saves it as CSV.
///
/// An empty table yields exactly [`NO_ITEMS`] and writes nothing, even when
/// `save_path` is set.
pub fn format_results(table: &ResultTable, save_path: Option<&Path>) -> Result<String> {
    if table.is_empty() {
        return Ok(NO_ITEMS.to_string());
    }

    let output = format!("\n{}\n{}", FOUND_ITEMS, table_rows(table.rows()));

    if let Some(path) = save_path {
        write_csv(table, path)?;
        info!("Results saved to '{}'", path.display());
    }

    Ok(output)
}

/// Writes every column of the table to `path`, header first, no index column.
pub fn write_csv(table: &ResultTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    for row in table.rows() {
        writer.serialize(row).context("Failed to write CSV row")?;
    }

    writer.flush().with_context(|| format!("Failed to flush CSV file: {}", path.display()))?;
    Ok(())
}

/// Plain-text table of the display columns, preceded by a row index.
fn table_rows(rows: &[Row]) -> String {
    let cells: Vec<[String; 4]> = rows
        .iter()
        .map(|row| {
            [
                truncate(&row.title, TITLE_WIDTH),
                row.current_bid.clone(),
                row.hours_remaining
                    .map(|h| format!("{:.2}", h))
                    .unwrap_or_else(|| "N/A".to_string()),
                row.search_term.clone(),
            ]
        })
        .collect();

    let index_width = rows.len().saturating_sub(1).to_string().len();
    let mut widths = DISPLAY_COLUMNS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let [title_w, bid_w, hours_w, term_w] = widths;

    let mut lines = Vec::with_capacity(rows.len() + 2);

    lines.push(format!(
        "{:<index_width$}  {:<title_w$}  {:>bid_w$}  {:>hours_w$}  {:<term_w$}",
        "", DISPLAY_COLUMNS[0], DISPLAY_COLUMNS[1], DISPLAY_COLUMNS[2], DISPLAY_COLUMNS[3]
    ));
    lines.push(format!(
        "{:-<index_width$}  {:-<title_w$}  {:->bid_w$}  {:->hours_w$}  {:-<term_w$}",
        "", "", "", "", ""
    ));

    for (index, [title, bid, hours, term]) in cells.iter().enumerate() {
        lines.push(format!(
            "{:<index_width$}  {:<title_w$}  {:>bid_w$}  {:>hours_w$}  {:<term_w$}",
            index, title, bid, hours, term
        ));
    }

    lines
        .into_iter()
        .map(|line| line.trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let kept: String = text.chars().take(max_chars - 3).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}
