//! Drag-and-drop interaction for column management.
//!
//! ```text
//!            start_column(i)                 start_hidden_field(f)
//!   Idle ───────────────────▶ DraggingColumn   Idle ─────────────▶ DraggingHiddenField
//!     ▲                          │ drop / end                          │ drop / end
//!     └──────────────────────────┴─────────────────────────────────────┘
//! ```
//!
//! Drop semantics:
//! - column on column: reorder
//! - column on the hidden pool: hide
//! - hidden field on a column: show at that position
//! - hidden field on the end zone: show at the end
//!
//! Any other combination leaves the layout untouched.

use super::ColumnLayout;

/// Where a drag is currently hovering or being dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// A visible column header (its boundary for inserts)
    Column(usize),
    /// The hidden-fields panel
    HiddenPool,
    /// The drop zone after the last column
    EndZone,
}

/// Drag state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    DraggingColumn {
        from: usize,
        over: Option<DropTarget>,
    },
    DraggingHiddenField {
        field: String,
        over: Option<DropTarget>,
    },
}

/// Layout mutation performed by a drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutChange {
    Reordered { from: usize, to: usize },
    Hidden { field: String },
    Shown { field: String, index: usize },
}

impl DragState {
    /// Begin dragging a visible column header.
    pub fn start_column(&mut self, from: usize) {
        *self = Self::DraggingColumn { from, over: None };
    }

    /// Begin dragging a tag from the hidden-fields panel.
    pub fn start_hidden_field(&mut self, field: &str) {
        *self = Self::DraggingHiddenField {
            field: field.to_string(),
            over: None,
        };
    }

    pub fn is_dragging(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Whether the current drag can be dropped on `target`.
    pub fn accepts(&self, target: DropTarget) -> bool {
        match (self, target) {
            (Self::Idle, _) => false,
            (Self::DraggingColumn { .. }, DropTarget::EndZone) => false,
            (Self::DraggingHiddenField { .. }, DropTarget::HiddenPool) => false,
            _ => true,
        }
    }

    /// Record the hovered target; returns whether it is a valid drop target.
    pub fn drag_over(&mut self, target: DropTarget) -> bool {
        let accepted = self.accepts(target);
        match self {
            Self::DraggingColumn { over, .. } | Self::DraggingHiddenField { over, .. } => {
                *over = accepted.then_some(target);
            }
            Self::Idle => {}
        }
        accepted
    }

    pub fn drag_leave(&mut self) {
        match self {
            Self::DraggingColumn { over, .. } | Self::DraggingHiddenField { over, .. } => {
                *over = None;
            }
            Self::Idle => {}
        }
    }

    /// Currently highlighted target
    pub fn hovered(&self) -> Option<DropTarget> {
        match self {
            Self::DraggingColumn { over, .. } | Self::DraggingHiddenField { over, .. } => *over,
            Self::Idle => None,
        }
    }

    /// Complete the drag on `target`, applying the layout change if any.
    ///
    /// Always returns to `Idle`. Invalid drops are logged and ignored.
    pub fn drop_on(&mut self, target: DropTarget, layout: &mut ColumnLayout) -> Option<LayoutChange> {
        let state = std::mem::take(self);
        let change = match (state, target) {
            (Self::DraggingColumn { from, .. }, DropTarget::Column(to)) => {
                if from == to {
                    return None;
                }
                layout
                    .reorder(from, to)
                    .map(|()| LayoutChange::Reordered { from, to })
            }
            (Self::DraggingColumn { from, .. }, DropTarget::HiddenPool) => layout
                .hide(from)
                .map(|col| LayoutChange::Hidden { field: col.field }),
            (Self::DraggingHiddenField { field, .. }, DropTarget::Column(at)) => layout
                .show(&field, Some(at))
                .map(|index| LayoutChange::Shown { field, index }),
            (Self::DraggingHiddenField { field, .. }, DropTarget::EndZone) => layout
                .show(&field, None)
                .map(|index| LayoutChange::Shown { field, index }),
            _ => return None,
        };
        match change {
            Ok(change) => Some(change),
            Err(e) => {
                tracing::warn!(error = %e, "drop ignored");
                None
            }
        }
    }

    /// Drag cancelled or finished outside any target.
    pub fn end(&mut self) {
        *self = Self::Idle;
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
    use crate::types::ColumnDescriptor;

    fn layout() -> ColumnLayout {
        let catalog: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|f| ColumnDescriptor::text(f, f))
            .collect();
        let visible = catalog.iter().take(3).cloned().collect();
        ColumnLayout::new(catalog, visible)
    }

    fn visible(l: &ColumnLayout) -> Vec<&str> {
        l.columns().iter().map(|c| c.field.as_str()).collect()
    }

    #[test]
    fn test_column_onto_column_reorders() {
        let mut l = layout();
        let mut drag = DragState::default();
        drag.start_column(0);
        assert!(drag.drag_over(DropTarget::Column(2)));
        assert_eq!(drag.hovered(), Some(DropTarget::Column(2)));
        let change = drag.drop_on(DropTarget::Column(2), &mut l);
        assert_eq!(change, Some(LayoutChange::Reordered { from: 0, to: 2 }));
        assert_eq!(visible(&l), vec!["b", "c", "a"]);
        assert_eq!(drag, DragState::Idle);
    }

    #[test]
    fn test_column_onto_hidden_pool_hides() {
        let mut l = layout();
        let mut drag = DragState::default();
        drag.start_column(1);
        let change = drag.drop_on(DropTarget::HiddenPool, &mut l);
        assert_eq!(change, Some(LayoutChange::Hidden { field: "b".into() }));
        assert_eq!(visible(&l), vec!["a", "c"]);
    }

    #[test]
    fn test_hidden_field_onto_column_and_end_zone() {
        let mut l = layout();
        let mut drag = DragState::default();
        drag.start_hidden_field("d");
        assert!(!drag.drag_over(DropTarget::HiddenPool));
        assert_eq!(drag.hovered(), None);
        let change = drag.drop_on(DropTarget::Column(1), &mut l);
        assert_eq!(
            change,
            Some(LayoutChange::Shown {
                field: "d".into(),
                index: 1
            })
        );
        assert_eq!(visible(&l), vec!["a", "d", "b", "c"]);

        l.hide(0).unwrap();
        drag.start_hidden_field("a");
        drag.drop_on(DropTarget::EndZone, &mut l);
        assert_eq!(visible(&l), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn test_invalid_drops_leave_layout_untouched() {
        let mut l = layout();
        let mut drag = DragState::default();
        drag.start_column(0);
        assert!(!drag.drag_over(DropTarget::EndZone));
        assert_eq!(drag.drop_on(DropTarget::EndZone, &mut l), None);
        assert_eq!(drag.drop_on(DropTarget::Column(1), &mut l), None);
        assert_eq!(visible(&l), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_end_resets() {
        let mut drag = DragState::default();
        drag.start_hidden_field("d");
        drag.drag_over(DropTarget::EndZone);
        drag.drag_leave();
        assert_eq!(drag.hovered(), None);
        drag.end();
        assert!(!drag.is_dragging());
    }
}
