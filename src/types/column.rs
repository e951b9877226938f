use serde::{Deserialize, Serialize};

/// Field name of the derived country column, resolved from the MIC code.
pub const COUNTRY_FIELD: &str = "country";

/// Value type of a column, driving formatting and paste parsing.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Plain number, shown in its shortest form
    Number,
    /// Fixed two-decimal number
    Decimal,
    /// Timestamp
    Datetime,
    /// Country flag resolved from the MIC code
    Flag,
}

/// Metadata for a displayable field
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    /// Field name in the row record
    pub field: String,
    /// Header text
    pub header: String,
    /// Value type; `None` means plain text
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ColumnType>,
}

impl ColumnDescriptor {
    pub fn new(field: &str, header: &str, kind: Option<ColumnType>) -> Self {
        Self {
            field: field.to_string(),
            header: header.to_string(),
            kind,
        }
    }

    /// Plain text column.
    pub fn text(field: &str, header: &str) -> Self {
        Self::new(field, header, None)
    }

    /// Whether paste may write into this column.
    ///
    /// Computed columns (the country flag) are derived from other fields.
    pub fn is_editable(&self) -> bool {
        self.field != COUNTRY_FIELD && self.kind != Some(ColumnType::Flag)
    }

    /// Whether values are numeric (number or decimal).
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, Some(ColumnType::Number | ColumnType::Decimal))
    }
}

/// `/assets/config/table-columns.json`: initial visible layout
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TableConfig {
    pub columns: Vec<ColumnDescriptor>,
}

/// `/assets/config/all-fields.json`: full field catalog
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct FieldCatalog {
    pub fields: Vec<ColumnDescriptor>,
}
