//! Inverted index over the searchable fields
//!
//! For every indexed field the index maps a field value to the ids of the
//! documents currently holding that value (a "bucket").
//!
//! Invariants maintained by every mutation:
//! - a document's id appears in exactly one bucket per indexed field, the
//!   one keyed by the document's current value;
//! - an id appears at most once inside a bucket;
//! - no bucket is empty. A bucket is dropped when its last id is removed.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::models::{fields, DocId, Document};

/// Fields that have an inverted index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexedField {
    FirstName,
    LastName,
}

impl IndexedField {
    pub const ALL: [IndexedField; 2] = [IndexedField::FirstName, IndexedField::LastName];

    /// Document field name backing this index
    pub fn as_str(self) -> &'static str {
        match self {
            IndexedField::FirstName => fields::FIRST_NAME,
            IndexedField::LastName => fields::LAST_NAME,
        }
    }
}

impl fmt::Display for IndexedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexedField {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IndexedField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| TableError::UnknownIndexField(s.to_string()))
    }
}

/// Value -> ids of the documents holding that value
pub type Buckets = BTreeMap<String, Vec<DocId>>;

/// The two inverted indexes of the table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Index {
    first_name: Buckets,
    last_name: Buckets,
}

impl Index {
    /// Create an index with no buckets
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from scratch over a set of documents
    ///
    /// Documents missing an indexed field are skipped for that field.
    pub fn rebuild<'a>(documents: impl IntoIterator<Item = (DocId, &'a Document)>) -> Self {
        let mut index = Self::new();
        for (id, doc) in documents {
            for field in IndexedField::ALL {
                if let Some(value) = doc.get(field.as_str()) {
                    index.add(field, value, id);
                }
            }
        }
        index
    }

    /// All buckets of one field
    pub fn buckets(&self, field: IndexedField) -> &Buckets {
        match field {
            IndexedField::FirstName => &self.first_name,
            IndexedField::LastName => &self.last_name,
        }
    }

    fn buckets_mut(&mut self, field: IndexedField) -> &mut Buckets {
        match field {
            IndexedField::FirstName => &mut self.first_name,
            IndexedField::LastName => &mut self.last_name,
        }
    }

    /// Ids of the documents whose `field` equals `value`
    pub fn bucket(&self, field: IndexedField, value: &str) -> Option<&[DocId]> {
        self.buckets(field).get(value).map(Vec::as_slice)
    }

    /// Distinct values currently present for `field`
    pub fn values(&self, field: IndexedField) -> impl Iterator<Item = &str> {
        self.buckets(field).keys().map(String::as_str)
    }

    /// Add `id` to the bucket of `value`, creating the bucket if needed
    pub fn add(&mut self, field: IndexedField, value: &str, id: DocId) {
        let bucket = self
            .buckets_mut(field)
            .entry(value.to_string())
            .or_default();
        if !bucket.contains(&id) {
            bucket.push(id);
        }
    }

    /// Remove `id` from the bucket of `value`
    ///
    /// The id is located by value, not by position. The bucket is deleted
    /// once it becomes empty; other ids in it are left in place. Returns
    /// whether the id was present.
    pub fn remove(&mut self, field: IndexedField, value: &str, id: DocId) -> bool {
        let buckets = self.buckets_mut(field);
        let Some(bucket) = buckets.get_mut(value) else {
            return false;
        };
        let Some(pos) = bucket.iter().position(|&existing| existing == id) else {
            return false;
        };

        bucket.remove(pos);
        if bucket.is_empty() {
            buckets.remove(value);
        }
        true
    }

    /// Index a newly inserted document under every indexed field
    ///
    /// Fails without touching the index if any indexed field is missing.
    pub fn add_document(&mut self, id: DocId, doc: &Document) -> Result<(), TableError> {
        let mut values = Vec::with_capacity(IndexedField::ALL.len());
        for field in IndexedField::ALL {
            let value = doc
                .get(field.as_str())
                .ok_or(TableError::MissingField(field.as_str()))?;
            values.push((field, value));
        }

        for (field, value) in values {
            self.add(field, value, id);
        }
        Ok(())
    }

    /// Drop a document from every bucket it occupies
    pub fn remove_document(&mut self, id: DocId, doc: &Document) {
        for field in IndexedField::ALL {
            if let Some(value) = doc.get(field.as_str()) {
                self.remove(field, value, id);
            }
        }
    }

    /// Move `id` from the bucket of `old` to the bucket of `new`
    ///
    /// No-op when the value does not change.
    pub fn reassign(&mut self, field: IndexedField, old: Option<&str>, new: &str, id: DocId) {
        if old == Some(new) {
            return;
        }
        self.add(field, new, id);
        if let Some(old) = old {
            self.remove(field, old, id);
        }
    }

    /// Total number of buckets across both fields
    pub fn bucket_count(&self) -> usize {
        self.first_name.len() + self.last_name.len()
    }
}
