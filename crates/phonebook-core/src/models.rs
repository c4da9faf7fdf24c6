//! Data models for the phone book
//!
//! Defines the record stored in the table ([`Document`]) and its identifier
//! ([`DocId`]).

use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::TableError;

/// Field names written by the CLI
pub mod fields {
    pub const FIRST_NAME: &str = "first_name";
    pub const LAST_NAME: &str = "last_name";
    pub const PATRONYMIC: &str = "patronymic";
    pub const PERSONAL_NUMBER: &str = "personal_number";
    pub const OFFICE_NUMBER: &str = "office_number";
    pub const COMPANY_NAME: &str = "company_name";
}

/// Identifier of a document in the table
///
/// Always positive. Assigned once at insert and never reused. On the wire it
/// is a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocId(NonZeroU64);

impl DocId {
    /// The id handed to the first document of an empty table
    pub const FIRST: DocId = DocId(NonZeroU64::MIN);

    /// Create an id, returning `None` for zero
    pub fn new(value: u64) -> Option<Self> {
        NonZeroU64::new(value).map(DocId)
    }

    /// Numeric value of the id
    pub fn get(self) -> u64 {
        self.0.get()
    }

    /// The id following this one, or `None` past `u64::MAX`
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(DocId)
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error parsing a [`DocId`] from its string form
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid document id '{0}': expected a positive integer")]
pub struct ParseDocIdError(String);

impl FromStr for DocId {
    type Err = ParseDocIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Reject signs and whitespace that u64::from_str would accept or tolerate
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseDocIdError(s.to_string()));
        }
        s.parse::<NonZeroU64>()
            .map(DocId)
            .map_err(|_| ParseDocIdError(s.to_string()))
    }
}

impl Serialize for DocId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DocId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A single phone book record: field name to string value
///
/// No schema is enforced beyond "a mapping of strings". The indexed fields
/// (`first_name`, `last_name`) must be present when the document is inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: BTreeMap<String, String>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Get the value of a field
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Set a field, returning the previous value
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.fields.insert(field.into(), value.into())
    }

    /// Iterate over fields in name order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Overwrite this document's fields with those of `other`
    ///
    /// Existing values are replaced and previously absent fields are added.
    pub fn merge(&mut self, other: &Document) {
        for (field, value) in &other.fields {
            self.fields.insert(field.clone(), value.clone());
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl TryFrom<Value> for Document {
    type Error = TableError;

    /// Validate an untyped payload
    ///
    /// The payload must be a JSON object whose values are all strings.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(TableError::NotAMapping {
                    found: json_type_name(&other),
                })
            }
        };

        let mut doc = Document::new();
        for (field, value) in map {
            match value {
                Value::String(s) => {
                    doc.fields.insert(field, s);
                }
                _ => return Err(TableError::InvalidFieldValue { field }),
            }
        }
        Ok(doc)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
