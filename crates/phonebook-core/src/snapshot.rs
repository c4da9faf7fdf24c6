//! Table snapshot
//!
//! The complete persisted state of a table, read and written in one backend
//! operation. In memory the documents and the index are two separate fields.
//! On disk they share one flat JSON object:
//!
//! ```text
//! {
//!   "1": {"first_name": "Ann", "last_name": "Lee"},
//!   "2": {"first_name": "Bo", "last_name": "Lee"},
//!   "index": {
//!     "first_name": {"Ann": ["1"], "Bo": ["2"]},
//!     "last_name": {"Lee": ["1", "2"]}
//!   }
//! }
//! ```
//!
//! Document keys must parse as positive integers, so no id can collide with
//! the `"index"` key.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{TableError, TableResult};
use crate::index::{Index, IndexedField};
use crate::models::{DocId, Document};

/// Key holding the index in the on-disk object
pub const INDEX_KEY: &str = "index";

/// In-memory table state: documents keyed by id, plus the inverted index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub documents: BTreeMap<DocId, Document>,
    pub index: Index,
}

impl Snapshot {
    /// State of a table whose backend is empty
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the table holds no documents
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Highest id in use
    pub fn max_id(&self) -> Option<DocId> {
        self.documents.keys().next_back().copied()
    }

    /// Id the next inserted document receives
    ///
    /// Fails once the highest id in use is `u64::MAX`; ids are never reused.
    pub fn next_id(&self) -> TableResult<DocId> {
        match self.max_id() {
            None => Ok(DocId::FIRST),
            Some(max) => max.next().ok_or(TableError::IdsExhausted),
        }
    }

    /// Whether the index is exactly what the documents imply
    ///
    /// Covers every bucket invariant: each document sits in the bucket of its
    /// current value only, and no bucket is empty or holds unknown ids.
    pub fn is_index_consistent(&self) -> bool {
        // Rebuilt buckets list ids in ascending order since documents are
        // iterated by id
        let expected = Index::rebuild(self.documents.iter().map(|(id, doc)| (*id, doc)));

        IndexedField::ALL.into_iter().all(|field| {
            let actual = self.index.buckets(field);
            let expected = expected.buckets(field);
            actual.len() == expected.len()
                && actual.iter().all(|(value, ids)| {
                    let mut ids = ids.clone();
                    ids.sort();
                    expected.get(value) == Some(&ids)
                })
        })
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.documents.len() + 1))?;
        for (id, doc) in &self.documents {
            map.serialize_entry(&id.to_string(), doc)?;
        }
        map.serialize_entry(INDEX_KEY, &self.index)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SnapshotVisitor)
    }
}

struct SnapshotVisitor;

impl<'de> Visitor<'de> for SnapshotVisitor {
    type Value = Snapshot;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object of document ids plus an \"index\" entry")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Snapshot, A::Error> {
        let mut documents = BTreeMap::new();
        let mut index = None;

        while let Some(key) = map.next_key::<String>()? {
            if key == INDEX_KEY {
                if index.is_some() {
                    return Err(de::Error::duplicate_field(INDEX_KEY));
                }
                index = Some(map.next_value::<Index>()?);
                continue;
            }

            let id: DocId = key.parse().map_err(de::Error::custom)?;
            let doc = map.next_value::<Document>()?;
            if documents.insert(id, doc).is_some() {
                return Err(de::Error::custom(format!("duplicate document id {id}")));
            }
        }

        let index = index.ok_or_else(|| de::Error::missing_field(INDEX_KEY))?;
        Ok(Snapshot { documents, index })
    }
}
