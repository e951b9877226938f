//! Mouse and keyboard handling for cell selection.
//!
//! Coordinates are (filtered-row, visible-column) indices; the host resolves
//! DOM targets to indices before calling in. Events on cells outside the
//! current grid are ignored.

use super::ExecutionGrid;
use crate::types::{CellPos, Selection, SelectionPhase};

/// Keys the grid reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Tab,
    Enter,
    Home,
    End,
    Escape,
    Char(char),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Option<Self> {
        let key = match key {
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "Tab" => Self::Tab,
            "Enter" => Self::Enter,
            "Home" => Self::Home,
            "End" => Self::End,
            "Escape" => Self::Escape,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c.to_ascii_lowercase()),
                    _ => return None,
                }
            }
        };
        Some(key)
    }
}

/// A key press with its modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub shift: bool,
    /// Ctrl, or Cmd on macOS
    pub ctrl: bool,
}

impl KeyInput {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            shift: false,
            ctrl: false,
        }
    }

    #[must_use]
    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    #[must_use]
    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }
}

/// What the host should do after a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not for the grid; let the browser handle it
    Ignored,
    /// Consumed; prevent the default action
    Handled,
    /// Write this text to the clipboard
    Copy(String),
    /// Read the clipboard and pass the text to `paste_text`
    PasteRequested,
}

impl ExecutionGrid {
    /// Left button pressed on a cell: start a new selection there.
    pub fn mouse_down(&mut self, row: usize, col: usize) -> bool {
        let pos = CellPos::new(row, col);
        if !self.in_bounds(pos) {
            return false;
        }
        self.focused = Some(pos);
        self.selection = Some(Selection::single(pos));
        self.phase = SelectionPhase::Selecting;
        self.needs_render = true;
        true
    }

    /// Pointer entered a cell; extends the selection while dragging.
    pub fn mouse_enter(&mut self, row: usize, col: usize) -> bool {
        let pos = CellPos::new(row, col);
        if self.phase != SelectionPhase::Selecting || !self.in_bounds(pos) {
            return false;
        }
        let Some(selection) = self.selection.as_mut() else {
            return false;
        };
        if selection.end == pos {
            return false;
        }
        selection.end = pos;
        self.focused = Some(pos);
        self.needs_render = true;
        true
    }

    /// Button released anywhere in the document.
    pub fn mouse_up(&mut self) {
        if self.phase == SelectionPhase::Selecting {
            self.phase = match self.selection {
                Some(s) if !s.is_single_cell() => SelectionPhase::Selected,
                Some(_) => SelectionPhase::Focused,
                None => SelectionPhase::Idle,
            };
        }
    }

    /// Click on a cell; with shift, extends from the focused cell.
    pub fn click(&mut self, row: usize, col: usize, shift: bool) -> bool {
        let pos = CellPos::new(row, col);
        if !self.in_bounds(pos) {
            return false;
        }
        match (shift, self.focused) {
            (true, Some(anchor)) => {
                self.selection = Some(Selection { start: anchor, end: pos });
                self.phase = if anchor == pos {
                    SelectionPhase::Focused
                } else {
                    SelectionPhase::Selected
                };
            }
            _ => self.focus_cell_at(pos),
        }
        self.needs_render = true;
        true
    }

    /// A cell received keyboard focus.
    pub fn focus_cell(&mut self, row: usize, col: usize) -> bool {
        let pos = CellPos::new(row, col);
        if !self.in_bounds(pos) || self.focused == Some(pos) {
            return false;
        }
        match self.selection {
            Some(s) if s.contains(row, col) => self.focused = Some(pos),
            _ => self.focus_cell_at(pos),
        }
        self.needs_render = true;
        true
    }

    fn focus_cell_at(&mut self, pos: CellPos) {
        self.focused = Some(pos);
        self.selection = Some(Selection::single(pos));
        self.phase = SelectionPhase::Focused;
    }

    /// Document-level key press.
    pub fn key_down(&mut self, input: KeyInput) -> KeyOutcome {
        if input.ctrl {
            return match input.key {
                Key::Char('c') => self
                    .copy_selection()
                    .map_or(KeyOutcome::Ignored, KeyOutcome::Copy),
                Key::Char('v') if self.focused.is_some() => KeyOutcome::PasteRequested,
                _ => KeyOutcome::Ignored,
            };
        }
        if input.key == Key::Escape {
            return if self.close_filter_popup() {
                KeyOutcome::Handled
            } else {
                KeyOutcome::Ignored
            };
        }
        let Some(focused) = self.focused else {
            return KeyOutcome::Ignored;
        };
        let rows = self.filtered_len();
        let cols = self.layout.len();
        if rows == 0 || cols == 0 {
            return KeyOutcome::Ignored;
        }

        let extend = input.shift && input.key != Key::Tab;
        let from = match (extend, self.selection) {
            (true, Some(s)) => s.end,
            _ => focused,
        };
        let Some(target) = step(input, from, rows, cols) else {
            return KeyOutcome::Ignored;
        };

        if extend {
            let anchor = self.selection.map_or(focused, |s| s.start);
            self.selection = Some(Selection { start: anchor, end: target });
            self.focused = Some(anchor);
            self.phase = if anchor == target {
                SelectionPhase::Focused
            } else {
                SelectionPhase::Selected
            };
        } else {
            self.focus_cell_at(target);
        }
        self.viewport.ensure_visible(target.row, rows);
        self.needs_render = true;
        KeyOutcome::Handled
    }
}

/// Target cell of a navigation key, clamped to the grid.
fn step(input: KeyInput, from: CellPos, rows: usize, cols: usize) -> Option<CellPos> {
    let last_row = rows.saturating_sub(1);
    let last_col = cols.saturating_sub(1);
    let CellPos { row, col } = from;
    let target = match input.key {
        Key::ArrowUp => CellPos::new(row.saturating_sub(1), col),
        Key::ArrowDown | Key::Enter => CellPos::new((row + 1).min(last_row), col),
        Key::ArrowLeft => CellPos::new(row, col.saturating_sub(1)),
        Key::ArrowRight => CellPos::new(row, (col + 1).min(last_col)),
        Key::Tab if input.shift => {
            if col > 0 {
                CellPos::new(row, col - 1)
            } else if row > 0 {
                CellPos::new(row - 1, last_col)
            } else {
                from
            }
        }
        Key::Tab => {
            if col < last_col {
                CellPos::new(row, col + 1)
            } else if row < last_row {
                CellPos::new(row + 1, 0)
            } else {
                from
            }
        }
        Key::Home => CellPos::new(row, 0),
        Key::End => CellPos::new(row, last_col),
        Key::Escape | Key::Char(_) => return None,
    };
    Some(target)
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
    use crate::types::{ColumnDescriptor, GridConfig, Row};
    use test_case::test_case;

    fn grid(rows: usize, cols: usize) -> ExecutionGrid {
        let catalog: Vec<_> = (0..cols)
            .map(|c| ColumnDescriptor::text(&format!("f{c}"), &format!("F{c}")))
            .collect();
        let mut grid = ExecutionGrid::new(GridConfig::default(), ColumnLayout::all_visible(catalog));
        grid.load_rows(
            (0..rows)
                .map(|r| {
                    (0..cols).fold(Row::new(), |row, c| row.with(&format!("f{c}"), format!("r{r}c{c}")))
                })
                .collect(),
        );
        grid
    }

    fn key(k: Key) -> KeyInput {
        KeyInput::new(k)
    }

    #[test]
    fn test_from_dom() {
        assert_eq!(Key::from_dom("ArrowLeft"), Some(Key::ArrowLeft));
        assert_eq!(Key::from_dom("C"), Some(Key::Char('c')));
        assert_eq!(Key::from_dom("Shift"), None);
    }

    #[test]
    fn test_mouse_drag_selection() {
        let mut g = grid(5, 4);
        assert!(g.mouse_down(1, 1));
        assert_eq!(g.selection_phase(), SelectionPhase::Selecting);
        assert!(g.mouse_enter(3, 2));
        g.mouse_up();
        assert_eq!(g.selection_phase(), SelectionPhase::Selected);
        assert_eq!(g.selection(), Some(Selection::cell_range(1, 1, 3, 2)));
        assert!(g.is_selection_start(1, 1));
        assert!(g.is_selection_end(3, 2));
        assert!(g.is_focused(3, 2));

        // Hover after release does nothing
        assert!(!g.mouse_enter(4, 3));
    }

    #[test]
    fn test_click_and_shift_click() {
        let mut g = grid(5, 4);
        g.click(2, 2, false);
        assert_eq!(g.selection_phase(), SelectionPhase::Focused);
        g.click(0, 0, true);
        assert_eq!(g.selection(), Some(Selection::cell_range(2, 2, 0, 0)));
        assert!(g.is_focused(2, 2));
        assert!(g.is_selected(1, 1));
        assert!(!g.click(9, 0, false));
    }

    #[test_case(Key::ArrowUp, (1, 2) ; "up")]
    #[test_case(Key::ArrowDown, (3, 2) ; "down")]
    #[test_case(Key::ArrowLeft, (2, 1) ; "left")]
    #[test_case(Key::ArrowRight, (2, 3) ; "right")]
    #[test_case(Key::Enter, (3, 2) ; "enter moves down")]
    #[test_case(Key::Home, (2, 0) ; "home")]
    #[test_case(Key::End, (2, 3) ; "end")]
    #[test_case(Key::Tab, (2, 3) ; "tab")]
    fn test_navigation(k: Key, expected: (usize, usize)) {
        let mut g = grid(5, 4);
        g.click(2, 2, false);
        assert_eq!(g.key_down(key(k)), KeyOutcome::Handled);
        assert_eq!(g.focused_cell(), Some(CellPos::new(expected.0, expected.1)));
        assert!(g.selection().unwrap().is_single_cell());
    }

    #[test]
    fn test_navigation_clamped_at_edges() {
        let mut g = grid(2, 2);
        g.click(0, 0, false);
        g.key_down(key(Key::ArrowUp));
        g.key_down(key(Key::ArrowLeft));
        assert_eq!(g.focused_cell(), Some(CellPos::new(0, 0)));
        g.click(1, 1, false);
        g.key_down(key(Key::ArrowDown));
        g.key_down(key(Key::ArrowRight));
        assert_eq!(g.focused_cell(), Some(CellPos::new(1, 1)));
    }

    #[test]
    fn test_tab_wraps_rows() {
        let mut g = grid(3, 3);
        g.click(0, 2, false);
        g.key_down(key(Key::Tab));
        assert_eq!(g.focused_cell(), Some(CellPos::new(1, 0)));
        g.key_down(key(Key::Tab).shift());
        assert_eq!(g.focused_cell(), Some(CellPos::new(0, 2)));
        assert!(g.selection().unwrap().is_single_cell());

        g.click(2, 2, false);
        g.key_down(key(Key::Tab));
        assert_eq!(g.focused_cell(), Some(CellPos::new(2, 2)));
    }

    #[test]
    fn test_shift_arrows_keep_extending() {
        let mut g = grid(5, 5);
        g.click(1, 1, false);
        g.key_down(key(Key::ArrowDown).shift());
        g.key_down(key(Key::ArrowDown).shift());
        g.key_down(key(Key::ArrowRight).shift());
        assert_eq!(g.selection(), Some(Selection::cell_range(1, 1, 3, 2)));
        assert!(g.is_focused(1, 1));
        assert_eq!(g.selection_phase(), SelectionPhase::Selected);

        // A plain arrow collapses back to a single cell
        g.key_down(key(Key::ArrowUp));
        assert_eq!(g.selection(), Some(Selection::cell_range(0, 1, 0, 1)));
    }

    #[test]
    fn test_keys_without_focus_ignored() {
        let mut g = grid(3, 3);
        assert_eq!(g.key_down(key(Key::ArrowDown)), KeyOutcome::Ignored);
        assert_eq!(g.key_down(key(Key::Char('v')).ctrl()), KeyOutcome::Ignored);
        assert_eq!(g.key_down(key(Key::Char('c')).ctrl()), KeyOutcome::Ignored);
    }

    #[test]
    fn test_escape_only_closes_popup() {
        let mut g = grid(3, 3);
        g.click(1, 1, false);
        assert_eq!(g.key_down(key(Key::Escape)), KeyOutcome::Ignored);
        assert!(g.is_focused(1, 1));
        g.toggle_filter_popup(0).unwrap();
        assert_eq!(g.key_down(key(Key::Escape)), KeyOutcome::Handled);
        assert_eq!(g.active_filter(), None);
        assert!(g.is_focused(1, 1));
    }

    #[test]
    fn test_ctrl_keys() {
        let mut g = grid(3, 3);
        g.click(0, 0, false);
        g.click(1, 1, true);
        assert_eq!(
            g.key_down(key(Key::Char('c')).ctrl()),
            KeyOutcome::Copy("r0c0\tr0c1\nr1c0\tr1c1".to_string())
        );
        assert_eq!(g.key_down(key(Key::Char('v')).ctrl()), KeyOutcome::PasteRequested);
    }

    #[test]
    fn test_moving_past_window_scrolls() {
        let mut g = grid(200, 2);
        g.on_scroll(0.0, 420.0);
        let end = g.visible_window().end_index;
        g.click(end - 1, 0, false);
        g.key_down(key(Key::ArrowDown));
        assert!(g.visible_window().contains(end));
    }
}
