use serde::{Deserialize, Serialize};

/// A cell in (filtered-row, visible-column) index space
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Normalized bounds of a selection (inclusive on both ends)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionBounds {
    pub min_row: usize,
    pub min_col: usize,
    pub max_row: usize,
    pub max_col: usize,
}

impl SelectionBounds {
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.min_row && row <= self.max_row && col >= self.min_col && col <= self.max_col
    }

    pub fn row_count(&self) -> usize {
        self.max_row - self.min_row + 1
    }

    pub fn col_count(&self) -> usize {
        self.max_col - self.min_col + 1
    }
}

/// Rectangular cell selection; `start` is the anchor, `end` the moving corner
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: CellPos,
    pub end: CellPos,
}

impl Selection {
    /// Create a new cell range selection
    pub fn cell_range(start_row: usize, start_col: usize, end_row: usize, end_col: usize) -> Self {
        Self {
            start: CellPos::new(start_row, start_col),
            end: CellPos::new(end_row, end_col),
        }
    }

    /// Single-cell selection
    pub fn single(pos: CellPos) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Get normalized bounds (min/max)
    pub fn bounds(&self) -> SelectionBounds {
        SelectionBounds {
            min_row: self.start.row.min(self.end.row),
            min_col: self.start.col.min(self.end.col),
            max_row: self.start.row.max(self.end.row),
            max_col: self.start.col.max(self.end.col),
        }
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.bounds().contains(row, col)
    }

    pub fn is_single_cell(&self) -> bool {
        self.start == self.end
    }

    /// Outline flags for a cell so a contiguous rectangle draws as one block.
    pub fn borders(&self, row: usize, col: usize) -> CellBorders {
        let b = self.bounds();
        if !b.contains(row, col) {
            return CellBorders::default();
        }
        CellBorders {
            top: row == b.min_row,
            bottom: row == b.max_row,
            left: col == b.min_col,
            right: col == b.max_col,
        }
    }
}

/// Which edges of a cell lie on the selection outline
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellBorders {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl CellBorders {
    pub fn any(&self) -> bool {
        self.top || self.bottom || self.left || self.right
    }
}

/// Interaction phase of the cell selection
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SelectionPhase {
    /// No focused cell
    #[default]
    Idle,
    /// A single cell has focus
    Focused,
    /// Mouse button held, drag in progress
    Selecting,
    /// Drag released, rectangle frozen
    Selected,
}
