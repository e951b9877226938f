use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the stable unique identifier of an execution.
pub const EXECUTION_ID_FIELD: &str = "executionId";

/// Field used as the key of the country-code lookup table.
pub const ORDER_ID_FIELD: &str = "orderId";

/// Field holding the market identifier code of the execution venue.
pub const MIC_FIELD: &str = "mic";

/// One execution record.
///
/// Fields are kept as an ordered JSON map so any column from the field
/// catalog can be addressed by name, whatever the backend sends.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct Row {
    fields: Map<String, Value>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion.
    #[must_use]
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    /// Raw value of a field, `None` when the field is missing.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Overwrite a field in place.
    pub fn set(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_string(), value);
    }

    /// String value of a field, if it is a non-empty string.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// The execution identifier, when present and integral.
    pub fn execution_id(&self) -> Option<i64> {
        self.fields.get(EXECUTION_ID_FIELD).and_then(Value::as_i64)
    }

    /// The order identifier, used to key auxiliary lookups.
    pub fn order_id(&self) -> Option<&str> {
        self.str_field(ORDER_ID_FIELD)
    }

    /// The market identifier code.
    pub fn mic(&self) -> Option<&str> {
        self.str_field(MIC_FIELD)
    }

    /// Iterate over `(field, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }
}

impl From<Map<String, Value>> for Row {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}
