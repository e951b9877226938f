//! Copy and paste of the cell selection as TSV.
//!
//! Copy writes rows separated by `\n` and cells by `\t`. Cell text is
//! flattened first: tabs and newlines become spaces and carriage returns are
//! removed, so the output always splits back into the same rectangle.

use serde::{Deserialize, Serialize};

use super::ExecutionGrid;
use crate::editor::{apply_cell_input, CellEdit};
use crate::error::{GridError, Result};
use crate::types::CellPos;

/// Flatten cell text for TSV output.
pub fn sanitize_cell(value: &str) -> String {
    value
        .chars()
        .filter(|&c| c != '\r')
        .map(|c| if c == '\t' || c == '\n' { ' ' } else { c })
        .collect()
}

/// Join rows of cells into TSV text.
pub fn to_tsv(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|cells| {
            cells
                .iter()
                .map(|c| sanitize_cell(c))
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split clipboard text into trimmed cells.
///
/// Lines end in `\n` or `\r\n`. Only the empty line after a final line
/// break is dropped; blank lines inside the block are rows of empty cells.
pub fn parse_tsv(text: &str) -> Vec<Vec<String>> {
    let body = text
        .strip_suffix('\n')
        .map_or(text, |t| t.strip_suffix('\r').unwrap_or(t));
    if body.is_empty() {
        return Vec::new();
    }
    body.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .map(|line| line.split('\t').map(|c| c.trim().to_string()).collect())
        .collect()
}

/// Outcome of a paste
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PasteReport {
    /// Cells written
    pub applied: usize,
    /// Cells whose text did not parse for the column type
    pub rejected: usize,
    /// Cells targeting computed columns
    pub skipped_readonly: usize,
    /// Cells falling outside the grid
    pub skipped_out_of_bounds: usize,
}

impl PasteReport {
    pub fn total(&self) -> usize {
        self.applied + self.rejected + self.skipped_readonly + self.skipped_out_of_bounds
    }
}

impl ExecutionGrid {
    /// TSV text of the selected rectangle, `None` without a selection.
    pub fn copy_selection(&self) -> Option<String> {
        let bounds = self.selection?.bounds();
        let rows: Vec<Vec<String>> = (bounds.min_row..=bounds.max_row)
            .map(|row| {
                (bounds.min_col..=bounds.max_col)
                    .map(|col| self.cell_text(row, col).unwrap_or_default())
                    .collect()
            })
            .collect();
        tracing::debug!(
            rows = bounds.row_count(),
            cols = bounds.col_count(),
            "selection copied"
        );
        Some(to_tsv(&rows))
    }

    /// Paste TSV text starting at the focused cell.
    ///
    /// Does nothing without a focused cell. Filters are not re-applied, so
    /// edited rows stay in place even if they no longer match.
    pub fn paste_text(&mut self, text: &str) -> PasteReport {
        match self.focused {
            Some(origin) => self.paste_at(text, origin),
            None => PasteReport::default(),
        }
    }

    /// Paste TSV text with its top-left cell at `origin`.
    pub fn paste_at(&mut self, text: &str, origin: CellPos) -> PasteReport {
        let mut report = PasteReport::default();
        let row_count = self.filtered_len();
        for (dr, cells) in parse_tsv(text).iter().enumerate() {
            let row = origin.row + dr;
            for (dc, value) in cells.iter().enumerate() {
                let col = origin.col + dc;
                let Some(column) = self.layout.get(col).cloned() else {
                    report.skipped_out_of_bounds += 1;
                    continue;
                };
                if row >= row_count {
                    report.skipped_out_of_bounds += 1;
                    continue;
                }
                let Some(record) = self.filtered_row_mut(row) else {
                    report.skipped_out_of_bounds += 1;
                    continue;
                };
                match apply_cell_input(record, &column, value) {
                    CellEdit::Applied => report.applied += 1,
                    CellEdit::Rejected => report.rejected += 1,
                    CellEdit::ReadOnly => report.skipped_readonly += 1,
                }
            }
        }
        if report.applied > 0 {
            self.needs_render = true;
        }
        tracing::debug!(?report, "clipboard pasted");
        report
    }
}

/// Text clipboard
pub trait ClipboardBackend {
    fn write_text(&mut self, text: &str) -> Result<()>;
    fn read_text(&mut self) -> Result<String>;
}

/// In-process clipboard, for headless hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
    /// Make every write fail
    pub fail_writes: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl ClipboardBackend for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        if self.fail_writes {
            return Err(GridError::Clipboard("write rejected".to_string()));
        }
        self.contents = Some(text.to_string());
        Ok(())
    }

    fn read_text(&mut self) -> Result<String> {
        self.contents
            .clone()
            .ok_or_else(|| GridError::Clipboard("clipboard is empty".to_string()))
    }
}

/// Write through `primary`, falling back to `fallback`.
///
/// Returns whether either write succeeded; failures are logged.
pub fn write_with_fallback(
    primary: &mut dyn ClipboardBackend,
    fallback: &mut dyn ClipboardBackend,
    text: &str,
) -> bool {
    let Err(e) = primary.write_text(text) else {
        return true;
    };
    tracing::warn!(error = %e, "clipboard write failed, trying fallback");
    match fallback.write_text(text) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "fallback clipboard write failed");
            false
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::layout::ColumnLayout;
    use crate::types::{ColumnDescriptor, ColumnType, GridConfig, Row};
    use serde_json::json;

    fn grid() -> ExecutionGrid {
        let catalog = vec![
            ColumnDescriptor::text("ticker", "Ticker"),
            ColumnDescriptor::new("quantity", "Qty", Some(ColumnType::Number)),
            ColumnDescriptor::new("country", "Country", Some(ColumnType::Flag)),
        ];
        let mut g = ExecutionGrid::new(GridConfig::default(), ColumnLayout::all_visible(catalog));
        g.load_rows(vec![
            Row::new().with("ticker", "AAPL").with("quantity", 100),
            Row::new().with("ticker", "MSFT").with("quantity", 200),
        ]);
        g
    }

    #[test]
    fn test_sanitize_cell() {
        assert_eq!(sanitize_cell("a\tb\r\nc"), "a b c");
    }

    #[test]
    fn test_parse_tsv_keeps_interior_blank_lines() {
        let cells = parse_tsv("a\t b \r\n\n  \nc\n");
        assert_eq!(cells, vec![vec!["a", "b"], vec![""], vec![""], vec!["c"]]);
        assert_eq!(parse_tsv("x\t\r\n\t\r\n"), vec![vec!["x", ""], vec!["", ""]]);
        assert!(parse_tsv("").is_empty());
        assert!(parse_tsv("\n").is_empty());
    }

    #[test]
    fn test_blank_row_keeps_following_rows_in_place() {
        let mut g = grid();
        g.load_rows(vec![
            Row::new().with("ticker", "AAPL").with("quantity", 100),
            Row::new().with("ticker", "").with("quantity", 5),
            Row::new().with("ticker", "GOOG").with("quantity", 300),
        ]);
        g.click(0, 0, false);
        let report = g.paste_text("IBM\n\nORCL\n");
        assert_eq!(report.applied, 3);
        assert_eq!(g.cell_text(1, 0).as_deref(), Some(""));
        assert_eq!(g.cell_text(2, 0).as_deref(), Some("ORCL"));
    }

    #[test]
    fn test_copy_flattens_embedded_separators() {
        let mut g = grid();
        g.load_rows(vec![Row::new().with("ticker", "A\tB\r\nC")]);
        g.click(0, 0, false);
        assert_eq!(g.copy_selection().as_deref(), Some("A B C"));
    }

    #[test]
    fn test_paste_types_and_skips() {
        let mut g = grid();
        g.click(0, 0, false);
        let report = g.paste_text("IBM\t150\tus\textra\nORCL\tlots\n\nXOM\t1");
        assert_eq!(report.applied, 3);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.skipped_readonly, 1);
        // The blank line still takes a row
        assert_eq!(report.skipped_out_of_bounds, 4);
        assert_eq!(report.total(), 9);

        let first = g.filtered_row(0).unwrap();
        assert_eq!(first.get("ticker"), Some(&json!("IBM")));
        assert_eq!(first.get("quantity"), Some(&json!(150)));
        let second = g.filtered_row(1).unwrap();
        assert_eq!(second.get("ticker"), Some(&json!("ORCL")));
        assert_eq!(second.get("quantity"), Some(&json!(200)));
    }

    #[test]
    fn test_paste_without_focus_is_noop() {
        let mut g = grid();
        assert_eq!(g.paste_text("X"), PasteReport::default());
        assert_eq!(g.filtered_row(0).unwrap().get("ticker"), Some(&json!("AAPL")));
    }

    #[test]
    fn test_write_with_fallback() {
        let mut primary = MemoryClipboard {
            fail_writes: true,
            ..MemoryClipboard::default()
        };
        let mut fallback = MemoryClipboard::new();
        assert!(write_with_fallback(&mut primary, &mut fallback, "x"));
        assert_eq!(fallback.contents(), Some("x"));

        fallback.fail_writes = true;
        assert!(!write_with_fallback(&mut primary, &mut fallback, "y"));
        assert_eq!(fallback.read_text().unwrap(), "x");
    }
}
