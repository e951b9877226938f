//! Tests for cell selection, keyboard navigation and clipboard exchange.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

mod common;

use common::{executions, loaded_grid, text_grid};
use execgrid::grid::Key;
use execgrid::{CellPos, ExecutionGrid, KeyInput, KeyOutcome, Row, Selection, SelectionPhase};

#[test]
fn test_normalization_is_symmetric() {
    for a_row in 0..4 {
        for a_col in 0..3 {
            for b_row in 0..4 {
                for b_col in 0..3 {
                    let forward = Selection::cell_range(a_row, a_col, b_row, b_col);
                    let backward = Selection::cell_range(b_row, b_col, a_row, a_col);
                    assert_eq!(forward.bounds(), backward.bounds());
                    for r in 0..4 {
                        for c in 0..3 {
                            assert_eq!(forward.contains(r, c), backward.contains(r, c));
                            assert_eq!(forward.borders(r, c), backward.borders(r, c));
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn test_drag_and_shift_click_select_same_cells() {
    let mut dragged = text_grid(5, 4);
    dragged.mouse_down(3, 2);
    dragged.mouse_enter(2, 1);
    dragged.mouse_enter(1, 0);
    dragged.mouse_up();

    let mut clicked = text_grid(5, 4);
    clicked.click(1, 0, false);
    clicked.click(3, 2, true);

    assert_eq!(dragged.selection_phase(), SelectionPhase::Selected);
    for r in 0..5 {
        for c in 0..4 {
            assert_eq!(dragged.is_selected(r, c), clicked.is_selected(r, c), "({r},{c})");
            assert_eq!(dragged.cell_borders(r, c), clicked.cell_borders(r, c));
        }
    }
    assert_eq!(dragged.copy_selection(), clicked.copy_selection());
}

#[test]
fn test_copy_rectangle() {
    let mut grid = loaded_grid();
    grid.click(0, 0, false);
    grid.click(2, 1, true);
    assert_eq!(
        grid.copy_selection().as_deref(),
        Some("AAPL\tBUY\nMSFT\tSELL\nGOOG\tBUY")
    );
    assert_eq!(
        grid.key_down(KeyInput::new(Key::Char('c')).ctrl()),
        KeyOutcome::Copy("AAPL\tBUY\nMSFT\tSELL\nGOOG\tBUY".to_string())
    );
}

#[test]
fn test_copy_uses_display_text() {
    let mut grid = loaded_grid();
    // Price is a decimal column, Country resolves from the MIC
    grid.click(3, 3, false);
    grid.click(4, 4, true);
    assert_eq!(grid.copy_selection().as_deref(), Some("168.02\tfr\n0.72\tgb"));
}

#[test]
fn test_copy_then_paste_elsewhere() {
    let mut grid = text_grid(4, 3);
    grid.click(0, 0, false);
    grid.click(1, 1, true);
    let text = grid.copy_selection().unwrap();
    assert_eq!(text, "r0c0\tr0c1\nr1c0\tr1c1");

    grid.click(2, 1, false);
    let report = grid.paste_text(&text);
    assert_eq!(report.applied, 4);
    assert_eq!(report.total(), 4);
    assert_eq!(grid.cell_text(2, 1).as_deref(), Some("r0c0"));
    assert_eq!(grid.cell_text(2, 2).as_deref(), Some("r0c1"));
    assert_eq!(grid.cell_text(3, 1).as_deref(), Some("r1c0"));
    assert_eq!(grid.cell_text(3, 2).as_deref(), Some("r1c1"));
    assert_eq!(grid.cell_text(2, 0).as_deref(), Some("r2c0"));
}

fn all_cells(grid: &ExecutionGrid) -> Vec<Vec<Option<String>>> {
    (0..grid.filtered_len())
        .map(|r| (0..grid.columns().len()).map(|c| grid.cell_text(r, c)).collect())
        .collect()
}

/// Shipped layout plus the quantity and execution time columns.
fn typed_grid(rows: Vec<Row>) -> ExecutionGrid {
    let mut grid = loaded_grid();
    grid.show_column("quantity", None).unwrap();
    grid.show_column("executionTime", None).unwrap();
    grid.load_rows(rows);
    grid
}

#[test]
fn test_copy_paste_same_origin_reproduces_typed_cells() {
    let source = typed_grid(executions());
    let mut copy_from = typed_grid(executions());
    let last_row = copy_from.filtered_len() - 1;
    let last_col = copy_from.columns().len() - 1;
    copy_from.click(0, 0, false);
    copy_from.click(last_row, last_col, true);
    let text = copy_from.copy_selection().unwrap();

    let mut target = typed_grid(executions());
    target.click(0, 0, false);
    let report = target.paste_text(&text);
    // The country column is computed and never written
    assert_eq!(report.skipped_readonly, 6);
    assert_eq!(report.rejected, 0);
    assert_eq!(report.skipped_out_of_bounds, 0);
    assert_eq!(all_cells(&target), all_cells(&source));
}

#[test]
fn test_copy_paste_with_blank_row_keeps_rows_aligned() {
    let mut rows = executions();
    for field in ["bloombergLongTicker", "side", "trader"] {
        rows[1].set(field, "".into());
    }
    let mut source = typed_grid(rows);
    source.click(0, 0, false);
    source.click(2, 2, true);
    let text = source.copy_selection().unwrap();
    assert_eq!(text, "AAPL\tBUY\talice\n\t\t\nGOOG\tBUY\talice");

    // Paste over the unmodified data set
    let mut target = typed_grid(executions());
    target.click(0, 0, false);
    let report = target.paste_text(&text);
    assert_eq!(report.applied, 9);
    for row in 0..3 {
        for col in 0..3 {
            assert_eq!(target.cell_text(row, col), source.cell_text(row, col), "({row},{col})");
        }
    }
    assert_eq!(target.cell_text(3, 0).as_deref(), Some("AIR"));
}

#[test]
fn test_paste_clips_at_grid_edge() {
    let mut grid = text_grid(2, 2);
    grid.click(1, 1, false);
    let report = grid.paste_text("a\tb\nc\td");
    assert_eq!(report.applied, 1);
    assert_eq!(report.skipped_out_of_bounds, 3);
    assert_eq!(grid.cell_text(1, 1).as_deref(), Some("a"));
}

#[test]
fn test_keyboard_navigation() {
    let mut grid = text_grid(100, 3);
    assert_eq!(grid.key_down(KeyInput::new(Key::ArrowDown)), KeyOutcome::Ignored);

    grid.click(0, 0, false);
    let press = |grid: &mut execgrid::ExecutionGrid, input: KeyInput| {
        assert_eq!(grid.key_down(input), KeyOutcome::Handled);
        grid.focused_cell().unwrap()
    };
    assert_eq!(press(&mut grid, KeyInput::new(Key::ArrowUp)), CellPos::new(0, 0));
    assert_eq!(press(&mut grid, KeyInput::new(Key::ArrowDown)), CellPos::new(1, 0));
    assert_eq!(press(&mut grid, KeyInput::new(Key::Tab)), CellPos::new(1, 1));
    assert_eq!(press(&mut grid, KeyInput::new(Key::Tab)), CellPos::new(1, 2));
    assert_eq!(press(&mut grid, KeyInput::new(Key::Tab)), CellPos::new(2, 0));
    assert_eq!(press(&mut grid, KeyInput::new(Key::Tab).shift()), CellPos::new(1, 2));
    assert_eq!(press(&mut grid, KeyInput::new(Key::Home)), CellPos::new(1, 0));
    assert_eq!(press(&mut grid, KeyInput::new(Key::End)), CellPos::new(1, 2));
    assert_eq!(press(&mut grid, KeyInput::new(Key::Enter)), CellPos::new(2, 2));
    assert_eq!(press(&mut grid, KeyInput::new(Key::ArrowRight)), CellPos::new(2, 2));
    assert_eq!(grid.selection(), Some(Selection::single(CellPos::new(2, 2))));
}

#[test]
fn test_shift_arrows_extend_from_anchor() {
    let mut grid = text_grid(10, 4);
    grid.click(2, 1, false);
    grid.key_down(KeyInput::new(Key::ArrowDown).shift());
    grid.key_down(KeyInput::new(Key::ArrowRight).shift());
    assert_eq!(grid.selection(), Some(Selection::cell_range(2, 1, 3, 2)));
    assert_eq!(grid.focused_cell(), Some(CellPos::new(2, 1)));
    assert_eq!(grid.selection_phase(), SelectionPhase::Selected);

    // A plain arrow collapses the selection
    grid.key_down(KeyInput::new(Key::ArrowLeft));
    assert_eq!(grid.selection(), Some(Selection::single(CellPos::new(2, 0))));
}

#[test]
fn test_navigation_scrolls_target_into_view() {
    let mut grid = text_grid(100, 2);
    grid.on_resize(420.0);
    assert_eq!(grid.visible_window().end_index, 20);
    grid.click(19, 0, false);
    grid.key_down(KeyInput::new(Key::ArrowDown));
    let w = grid.visible_window();
    assert!(w.contains(20), "{w:?}");
    assert_eq!((w.start_index, w.end_index), (10, 40));
}

#[test]
fn test_clipboard_shortcuts_need_state() {
    let mut grid = loaded_grid();
    assert_eq!(grid.key_down(KeyInput::new(Key::Char('c')).ctrl()), KeyOutcome::Ignored);
    assert_eq!(grid.key_down(KeyInput::new(Key::Char('v')).ctrl()), KeyOutcome::Ignored);
    grid.click(1, 1, false);
    assert_eq!(
        grid.key_down(KeyInput::new(Key::Char('v')).ctrl()),
        KeyOutcome::PasteRequested
    );
}

#[test]
fn test_escape_closes_filter_popup_only() {
    let mut grid = loaded_grid();
    grid.click(1, 1, false);
    grid.toggle_filter_popup(2).unwrap();
    assert_eq!(grid.key_down(KeyInput::new(Key::Escape)), KeyOutcome::Handled);
    assert_eq!(grid.active_filter(), None);
    assert_eq!(grid.focused_cell(), Some(CellPos::new(1, 1)));
    assert_eq!(grid.key_down(KeyInput::new(Key::Escape)), KeyOutcome::Ignored);
}

#[test]
fn test_out_of_range_cells_ignored() {
    let mut grid = text_grid(3, 2);
    assert!(!grid.click(3, 0, false));
    assert!(!grid.mouse_down(0, 2));
    assert!(!grid.focus_cell(9, 9));
    assert_eq!(grid.focused_cell(), None);
}
