//! Tabular (CSV) projection.
//!
//! Naive comma split with quote stripping. Embedded commas inside quoted
//! fields are not handled; malformed CSV renders as-is. This is a
//! documented limitation, not a full CSV grammar.

use serde::{Deserialize, Serialize};

use super::RenderWindow;

/// Marker cell text of a synthetic trailing row appended by upstream
/// truncation; such a row is dropped before row-counting.
const TRUNCATION_MARKER: &str = "Content truncated";

/// Row-windowed table projection of CSV text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableView {
    /// Header cells from the first row.
    pub header: Vec<String>,
    /// The visible data rows.
    pub rows: Vec<Vec<String>>,
    /// Total data rows in the payload.
    pub total_rows: usize,
    /// Rows currently visible.
    pub visible_rows: usize,
}

/// Parse CSV text into a windowed table.
pub fn parse(text: &str, window: &RenderWindow) -> TableView {
    let mut lines = text.lines();
    let header = lines.next().map(split_row).unwrap_or_default();

    let mut data: Vec<Vec<String>> = lines.map(split_row).collect();
    drop_truncation_marker(&mut data);

    let total_rows = data.len();
    let visible_rows = window.visible().min(total_rows);
    data.truncate(visible_rows);

    TableView {
        header,
        rows: data,
        total_rows,
        visible_rows,
    }
}

/// Number of data rows the table projection would hold, after dropping
/// any trailing truncation marker.
pub fn data_row_count(text: &str) -> usize {
    let mut data: Vec<Vec<String>> = text.lines().skip(1).map(split_row).collect();
    drop_truncation_marker(&mut data);
    data.len()
}

fn drop_truncation_marker(rows: &mut Vec<Vec<String>>) {
    let is_marker = rows
        .last()
        .map(|row| row.iter().any(|cell| cell.contains(TRUNCATION_MARKER)))
        .unwrap_or(false);
    if is_marker {
        rows.pop();
    }
}

fn split_row(line: &str) -> Vec<String> {
    line.split(',')
        .map(|cell| {
            let cell = cell.trim();
            cell.strip_prefix('"')
                .and_then(|c| c.strip_suffix('"'))
                .unwrap_or(cell)
                .to_string()
        })
        .collect()
}
