//! Render data for the materialized row window.

use serde::Serialize;

use super::{ExecutionGrid, GridStatus};
use crate::mic_country::flag_path;
use crate::types::{CellBorders, ColumnType};

/// One cell as the host draws it
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CellRenderData {
    pub row: usize,
    pub col: usize,
    pub text: String,
    /// Flag image for flag columns with a resolved country
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
    pub selected: bool,
    pub focused: bool,
    pub borders: CellBorders,
}

/// One materialized row
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RowRenderData {
    /// Position in the filtered sequence
    pub index: usize,
    pub execution_id: Option<i64>,
    pub cells: Vec<CellRenderData>,
}

/// Everything needed to draw the grid body
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GridRenderData {
    pub status: GridStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub total_rows: usize,
    /// Scroll offset the container should be at, in pixels
    pub scroll_top: f64,
    pub start_index: usize,
    pub end_index: usize,
    pub top_spacer: f64,
    pub bottom_spacer: f64,
    pub rows: Vec<RowRenderData>,
}

impl ExecutionGrid {
    /// Render data for the current window.
    pub fn render_data(&self) -> GridRenderData {
        let window = self.visible_window();
        let rows = self
            .visible_rows()
            .map(|(index, record)| RowRenderData {
                index,
                execution_id: record.execution_id(),
                cells: self
                    .columns()
                    .iter()
                    .enumerate()
                    .map(|(col, column)| {
                        let text = self.cell_text(index, col).unwrap_or_default();
                        let flag = if column.kind == Some(ColumnType::Flag) {
                            flag_path(&text)
                        } else {
                            None
                        };
                        CellRenderData {
                            row: index,
                            col,
                            text,
                            flag,
                            selected: self.is_selected(index, col),
                            focused: self.is_focused(index, col),
                            borders: self.cell_borders(index, col),
                        }
                    })
                    .collect(),
            })
            .collect();
        GridRenderData {
            status: self.status(),
            message: self.empty_message(),
            total_rows: self.filtered_len(),
            scroll_top: self.viewport().scroll_offset,
            start_index: window.start_index,
            end_index: window.end_index,
            top_spacer: self.top_spacer(),
            bottom_spacer: self.bottom_spacer(),
            rows,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::layout::ColumnLayout;
    use crate::mic_country::MicCountryMap;
    use crate::types::{ColumnDescriptor, GridConfig, Row};

    #[test]
    fn test_render_data_with_flags_and_selection() {
        let catalog = vec![
            ColumnDescriptor::text("orderId", "Order"),
            ColumnDescriptor::new("country", "Country", Some(ColumnType::Flag)),
        ];
        let mut g = ExecutionGrid::new(GridConfig::default(), ColumnLayout::all_visible(catalog));
        g.load_rows(vec![
            Row::new().with("executionId", 1).with("orderId", "O1").with("mic", "XPAR"),
            Row::new().with("executionId", 2).with("orderId", "O2").with("mic", "XXXX"),
        ]);
        g.set_mic_map(MicCountryMap::parse("MIC,a,b,c,d,e,f,g,CC\nXPAR,,,,,,,,FR\n"));
        g.click(0, 1, false);

        let data = g.render_data();
        assert_eq!(data.status, GridStatus::Ready);
        assert_eq!(data.message, None);
        assert_eq!((data.start_index, data.end_index), (0, 2));
        assert_eq!(data.top_spacer, 0.0);
        assert_eq!(data.rows.len(), 2);

        let flag = &data.rows[0].cells[1];
        assert_eq!(flag.text, "fr");
        assert_eq!(flag.flag.as_deref(), Some("/assets/svgs/illustrations/flags/fr.svg"));
        assert!(flag.focused && flag.selected);
        assert!(flag.borders.top && flag.borders.left);

        assert_eq!(data.rows[1].execution_id, Some(2));
        assert_eq!(data.rows[1].cells[1].flag, None);
    }

    #[test]
    fn test_render_data_carries_scroll_reset() {
        let catalog = vec![ColumnDescriptor::text("side", "Side")];
        let mut g = ExecutionGrid::new(GridConfig::default(), ColumnLayout::all_visible(catalog));
        g.load_rows(
            (0..200)
                .map(|i| Row::new().with("side", if i % 2 == 0 { "BUY" } else { "SELL" }))
                .collect(),
        );
        g.on_scroll(4200.0, 500.0);
        let data = g.render_data();
        assert_eq!(data.scroll_top, 4200.0);
        assert_eq!(data.start_index, 90);

        g.toggle_value(0, "BUY").unwrap();
        let data = g.render_data();
        assert_eq!(data.scroll_top, 0.0);
        assert_eq!((data.start_index, data.end_index), (0, 22));
        assert_eq!(data.top_spacer, 0.0);
    }

    #[test]
    fn test_render_data_empty() {
        let mut g = ExecutionGrid::default();
        g.load_rows(Vec::new());
        let data = g.render_data();
        assert_eq!(data.status, GridStatus::Empty);
        assert_eq!(data.message, Some("No executions found"));
        assert!(data.rows.is_empty());
    }
}
