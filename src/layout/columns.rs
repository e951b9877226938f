//! Visible column order and the hidden field pool.
//!
//! The table layout is an ordered subset of the field catalog; the hidden
//! pool is always recomputed as catalog minus layout, in catalog order. After
//! every mutation both lists are disjoint and together cover the catalog.

use std::collections::HashSet;

use crate::error::{GridError, Result};
use crate::types::{ColumnDescriptor, FieldCatalog, TableConfig};

/// Table layout plus hidden field pool over a fixed field catalog
#[derive(Debug, Clone, Default)]
pub struct ColumnLayout {
    catalog: Vec<ColumnDescriptor>,
    table: Vec<ColumnDescriptor>,
    hidden: Vec<ColumnDescriptor>,
}

impl ColumnLayout {
    /// Build a layout from the initial visible columns and the full catalog.
    ///
    /// Visible entries that are not in the catalog, or that repeat a field,
    /// are discarded.
    pub fn new(catalog: Vec<ColumnDescriptor>, visible: Vec<ColumnDescriptor>) -> Self {
        let mut seen = HashSet::new();
        let catalog: Vec<ColumnDescriptor> = catalog
            .into_iter()
            .filter(|c| seen.insert(c.field.clone()))
            .collect();

        let mut placed = HashSet::new();
        let mut table = Vec::with_capacity(visible.len());
        for column in visible {
            let Some(entry) = catalog.iter().find(|c| c.field == column.field) else {
                tracing::warn!(field = %column.field, "visible column missing from field catalog, dropped");
                continue;
            };
            if placed.insert(entry.field.clone()) {
                table.push(entry.clone());
            } else {
                tracing::warn!(field = %column.field, "duplicate visible column, dropped");
            }
        }

        let mut layout = Self {
            catalog,
            table,
            hidden: Vec::new(),
        };
        layout.update_hidden();
        layout
    }

    /// Layout showing every catalog field in catalog order.
    pub fn all_visible(catalog: Vec<ColumnDescriptor>) -> Self {
        let visible = catalog.clone();
        Self::new(catalog, visible)
    }

    /// Layout from the `table-columns.json` and `all-fields.json` assets.
    ///
    /// Without a catalog the table columns stand in for it, so the grid keeps
    /// its columns and only the hidden pool is empty.
    pub fn from_config(table: TableConfig, catalog: FieldCatalog) -> Self {
        if catalog.fields.is_empty() {
            tracing::warn!(
                columns = table.columns.len(),
                "empty field catalog, using table columns"
            );
            return Self::all_visible(table.columns);
        }
        Self::new(catalog.fields, table.columns)
    }

    /// Ordered visible columns
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.table
    }

    /// Catalog fields not currently visible, in catalog order
    pub fn hidden(&self) -> &[ColumnDescriptor] {
        &self.hidden
    }

    pub fn catalog(&self) -> &[ColumnDescriptor] {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn hidden_is_empty(&self) -> bool {
        self.hidden.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ColumnDescriptor> {
        self.table.get(index)
    }

    /// Current position of a visible field.
    pub fn index_of(&self, field: &str) -> Option<usize> {
        self.table.iter().position(|c| c.field == field)
    }

    /// Move the column at `from` so that it ends up at `to`.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.table.len();
        if from >= len {
            return Err(GridError::ColumnOutOfRange { index: from, len });
        }
        if to >= len {
            return Err(GridError::ColumnOutOfRange { index: to, len });
        }
        if from == to {
            return Ok(());
        }
        let column = self.table.remove(from);
        tracing::debug!(field = %column.field, from, to, "column reordered");
        self.table.insert(to, column);
        Ok(())
    }

    /// Remove the column at `index` from the table; returns it.
    pub fn hide(&mut self, index: usize) -> Result<ColumnDescriptor> {
        let len = self.table.len();
        if index >= len {
            return Err(GridError::ColumnOutOfRange { index, len });
        }
        let column = self.table.remove(index);
        tracing::debug!(field = %column.field, index, "column hidden");
        self.update_hidden();
        Ok(column)
    }

    /// Show a hidden field at `at` (clamped to the end), or append it.
    ///
    /// Returns the position the column was inserted at.
    pub fn show(&mut self, field: &str, at: Option<usize>) -> Result<usize> {
        let Some(pos) = self.hidden.iter().position(|c| c.field == field) else {
            return Err(GridError::UnknownField(field.to_string()));
        };
        let column = self.hidden.remove(pos);
        let index = at.map_or(self.table.len(), |i| i.min(self.table.len()));
        tracing::debug!(field = %column.field, index, "column shown");
        self.table.insert(index, column);
        self.update_hidden();
        Ok(index)
    }

    fn update_hidden(&mut self) {
        let displayed: HashSet<&str> = self.table.iter().map(|c| c.field.as_str()).collect();
        self.hidden = self
            .catalog
            .iter()
            .filter(|c| !displayed.contains(c.field.as_str()))
            .cloned()
            .collect();
        debug_assert!(self.is_consistent());
    }

    /// Layout and pool are disjoint and together cover the catalog.
    pub fn is_consistent(&self) -> bool {
        let table: HashSet<&str> = self.table.iter().map(|c| c.field.as_str()).collect();
        let hidden: HashSet<&str> = self.hidden.iter().map(|c| c.field.as_str()).collect();
        table.len() == self.table.len()
            && hidden.len() == self.hidden.len()
            && table.is_disjoint(&hidden)
            && self.table.len() + self.hidden.len() == self.catalog.len()
            && self
                .catalog
                .iter()
                .all(|c| table.contains(c.field.as_str()) || hidden.contains(c.field.as_str()))
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

    fn col(field: &str) -> ColumnDescriptor {
        ColumnDescriptor::text(field, &field.to_uppercase())
    }

    fn fields(cols: &[ColumnDescriptor]) -> Vec<&str> {
        cols.iter().map(|c| c.field.as_str()).collect()
    }

    fn layout() -> ColumnLayout {
        ColumnLayout::new(
            vec![col("orderId"), col("trader"), col("book"), col("price"), col("mic")],
            vec![col("orderId"), col("trader"), col("price")],
        )
    }

    #[test]
    fn test_hidden_is_catalog_minus_table() {
        let l = layout();
        assert_eq!(fields(l.hidden()), vec!["book", "mic"]);
        assert!(l.is_consistent());
    }

    #[test]
    fn test_unknown_and_duplicate_visible_dropped() {
        let l = ColumnLayout::new(
            vec![col("a"), col("b")],
            vec![col("a"), col("zzz"), col("a")],
        );
        assert_eq!(fields(l.columns()), vec!["a"]);
        assert_eq!(fields(l.hidden()), vec!["b"]);
        assert!(l.is_consistent());
    }

    #[test]
    fn test_reorder() {
        let mut l = layout();
        l.reorder(0, 2).unwrap();
        assert_eq!(fields(l.columns()), vec!["trader", "price", "orderId"]);
        l.reorder(1, 1).unwrap();
        assert_eq!(fields(l.columns()), vec!["trader", "price", "orderId"]);
        assert!(matches!(
            l.reorder(5, 0),
            Err(GridError::ColumnOutOfRange { index: 5, len: 3 })
        ));
    }

    #[test]
    fn test_hide_then_show() {
        let mut l = layout();
        let hidden = l.hide(1).unwrap();
        assert_eq!(hidden.field, "trader");
        assert_eq!(fields(l.hidden()), vec!["trader", "book", "mic"]);

        assert_eq!(l.show("trader", Some(0)).unwrap(), 0);
        assert_eq!(fields(l.columns()), vec!["trader", "orderId", "price"]);
        assert_eq!(fields(l.hidden()), vec!["book", "mic"]);
    }

    #[test]
    fn test_show_appends_and_clamps() {
        let mut l = layout();
        assert_eq!(l.show("mic", None).unwrap(), 3);
        assert_eq!(l.show("book", Some(99)).unwrap(), 4);
        assert!(l.hidden_is_empty());
        assert!(matches!(l.show("book", None), Err(GridError::UnknownField(_))));
    }

    #[test]
    fn test_from_config_without_catalog_keeps_table() {
        let table = TableConfig {
            columns: vec![col("trader"), col("price")],
        };
        let l = ColumnLayout::from_config(table.clone(), FieldCatalog::default());
        assert_eq!(fields(l.columns()), vec!["trader", "price"]);
        assert!(l.hidden_is_empty());

        let catalog = FieldCatalog {
            fields: vec![col("orderId"), col("trader"), col("price")],
        };
        let l = ColumnLayout::from_config(table, catalog);
        assert_eq!(fields(l.columns()), vec!["trader", "price"]);
        assert_eq!(fields(l.hidden()), vec!["orderId"]);
    }
}
