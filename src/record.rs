//! Catalog records
//!
//! A `Record` is an open field mapping: clients may send any keys, and they are
//! kept in memory as received. Only the canonical fields survive persistence,
//! and they are always written in `CANONICAL_FIELDS` order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields emitted on persistence, in output order.
pub const CANONICAL_FIELDS: [&str; 10] = [
    "id",
    "name",
    "description",
    "price",
    "currency",
    "category",
    "brand",
    "sku",
    "stock",
    "rating",
];

/// Fields a create or update payload must carry, checked in this order.
pub const REQUIRED_FIELDS: [&str; 3] = ["name", "price", "currency"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First required field that is absent or `null`.
    pub fn missing_required_field(&self) -> Option<&'static str> {
        REQUIRED_FIELDS
            .iter()
            .copied()
            .find(|field| self.get(field).is_none_or(Value::is_null))
    }

    /// Numeric value of the id, `0` when the id is missing or not an integer.
    pub fn numeric_id(&self) -> i64 {
        match self.get("id") {
            Some(Value::String(id)) => id.trim().parse().unwrap_or(0),
            Some(Value::Number(id)) => id.as_i64().unwrap_or(0),
            _ => 0,
        }
    }

    /// Whether this record is addressed by `id`.
    ///
    /// Numeric ids written by hand into the data file match their decimal text.
    pub fn has_id(&self, id: &str) -> bool {
        match self.get("id") {
            Some(Value::String(own)) => own == id,
            Some(Value::Number(own)) => own.to_string() == id,
            _ => false,
        }
    }

    /// Returns the record with `id` placed first, replacing any id it carried.
    pub fn with_id(self, id: impl Into<String>) -> Self {
        let mut fields = Map::with_capacity(self.0.len() + 1);
        fields.insert("id".to_string(), Value::String(id.into()));
        fields.extend(self.0.into_iter().filter(|(key, _)| key != "id"));
        Self(fields)
    }

    /// Canonical fields only, in canonical order.
    pub fn to_canonical(&self) -> Map<String, Value> {
        let mut ordered = Map::new();
        for field in CANONICAL_FIELDS {
            if let Some(value) = self.0.get(field) {
                ordered.insert(field.to_string(), value.clone());
            }
        }
        ordered
    }
}
