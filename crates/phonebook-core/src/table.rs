//! Document table
//!
//! The `Table` owns a storage backend and exposes the phone book operations
//! on top of it:
//! - insert: allocate the next id, store the document, index it
//! - search: conjunctive equality match on the indexed fields
//! - update: overwrite fields of every matching document, moving index
//!   entries when an indexed value changes
//! - all: forward-only pagination over every document, by ascending id
//!
//! Every call re-reads the whole snapshot. Writers go through
//! [`run_transaction`], so a failed operation leaves the stored table as it
//! was.
//!
//! ## Usage
//!
//! ```ignore
//! let mut table = Table::open("phone_book", "phonebook.json", AccessMode::ReadWrite)?;
//!
//! let doc = Document::new()
//!     .with("first_name", "Ann")
//!     .with("last_name", "Lee");
//! table.insert(doc)?;
//!
//! let query = Query::new().with(IndexedField::LastName, "Lee");
//! if let Lookup::Found(docs) = table.search(&query)? {
//!     // ...
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::iter::FusedIterator;
use std::path::PathBuf;

use serde_json::Value;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{TableError, TableResult};
use crate::index::{Index, IndexedField};
use crate::models::{DocId, Document};
use crate::snapshot::Snapshot;
use crate::storage::{AccessMode, JsonFileBackend, StorageBackend};
use crate::transaction::{read_snapshot, run_transaction};

/// Conjunction of equality conditions on indexed fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    fields: BTreeMap<IndexedField, String>,
}

impl Query {
    /// Create a query with no conditions
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a query from field names, rejecting fields without an index
    pub fn from_fields<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> TableResult<Self>
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = Self::new();
        for (name, value) in fields {
            query.set(name.as_ref().parse()?, value);
        }
        Ok(query)
    }

    /// Builder-style condition
    pub fn with(mut self, field: IndexedField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Require `field` to equal `value`, replacing any earlier condition
    pub fn set(&mut self, field: IndexedField, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IndexedField, &str)> {
        self.fields.iter().map(|(field, value)| (*field, value.as_str()))
    }

    /// Ids matching every condition, in ascending order
    fn resolve(&self, index: &Index) -> Lookup<Vec<DocId>> {
        let mut matched: Option<BTreeSet<DocId>> = None;

        for (field, value) in self.iter() {
            // One condition with no bucket rules out the whole query
            let Some(bucket) = index.bucket(field, value) else {
                return Lookup::NoMatches;
            };
            let ids: BTreeSet<DocId> = bucket.iter().copied().collect();
            matched = Some(match matched {
                None => ids,
                Some(acc) => acc.intersection(&ids).copied().collect(),
            });
        }

        match matched {
            None => Lookup::NoQuery,
            Some(ids) if ids.is_empty() => Lookup::NoMatches,
            Some(ids) => Lookup::Found(ids.into_iter().collect()),
        }
    }
}

/// Outcome of a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The query had no conditions
    NoQuery,
    /// No document satisfies every condition
    NoMatches,
    Found(T),
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// The found value, if any
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::NoQuery => Lookup::NoQuery,
            Lookup::NoMatches => Lookup::NoMatches,
            Lookup::Found(value) => Lookup::Found(f(value)),
        }
    }
}

/// Outcome of an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The query matched nothing (or had no conditions); nothing was written
    NotFound,
    /// `count` documents were rewritten
    Updated { count: usize },
}

/// Summary of a table's contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStats {
    pub documents: usize,
    pub first_name_values: usize,
    pub last_name_values: usize,
    /// `None` once the id space is used up
    pub next_id: Option<DocId>,
}

/// Forward-only pages of documents, in ascending id order
///
/// Built from one snapshot and consumed as it is iterated. Once exhausted it
/// cannot be replayed; call [`Table::all`] again to re-read the table.
#[derive(Debug)]
pub struct Pages {
    documents: std::vec::IntoIter<Document>,
    page_size: usize,
}

impl Pages {
    fn new(documents: Vec<Document>, page_size: usize) -> Self {
        Self {
            documents: documents.into_iter(),
            page_size,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Documents not yet handed out
    pub fn remaining(&self) -> usize {
        self.documents.len()
    }
}

impl Iterator for Pages {
    type Item = Vec<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        let page: Vec<Document> = self.documents.by_ref().take(self.page_size).collect();
        if page.is_empty() {
            None
        } else {
            Some(page)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let pages = self.remaining().div_ceil(self.page_size);
        (pages, Some(pages))
    }
}

impl ExactSizeIterator for Pages {}

impl FusedIterator for Pages {}

/// A phone book table over a whole-state storage backend
///
/// Assumes it is the only writer of its backend. Mutating calls take
/// `&mut self`, so one `Table` value never interleaves two transactions, but
/// separate processes (or separate `Table`s over the same file) are not
/// coordinated.
pub struct Table<B: StorageBackend = JsonFileBackend> {
    name: String,
    backend: B,
}

impl Table<JsonFileBackend> {
    /// Open a table stored in a JSON file
    pub fn open(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        mode: AccessMode,
    ) -> TableResult<Self> {
        let backend = JsonFileBackend::open(path, mode)?;
        Ok(Self::with_backend(name, backend))
    }

    /// Open the table described by the configuration
    pub fn open_with_config(config: &Config, mode: AccessMode) -> TableResult<Self> {
        Self::open(config.table_name.clone(), config.table_path(), mode)
    }
}

impl<B: StorageBackend> Table<B> {
    /// Create a table over an already opened backend
    pub fn with_backend(name: impl Into<String>, backend: B) -> Self {
        Self {
            name: name.into(),
            backend,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Id the next inserted document will receive
    ///
    /// One more than the highest id in use, or 1 for an empty table.
    pub fn next_id(&mut self) -> TableResult<DocId> {
        read_snapshot(&mut self.backend)?.next_id()
    }

    /// Insert a document, returning its new id
    ///
    /// Fails with [`TableError::MissingField`] if the document has no
    /// `first_name` or `last_name`; the table is left unchanged.
    pub fn insert(&mut self, document: Document) -> TableResult<DocId> {
        let id = self.next_id()?;

        run_transaction(&mut self.backend, |snapshot| {
            snapshot.index.add_document(id, &document)?;
            snapshot.documents.insert(id, document);
            Ok(())
        })?;

        info!("Inserted document {} into table '{}'", id, self.name);
        Ok(id)
    }

    /// Insert an untyped payload
    ///
    /// The payload must be a JSON object of strings.
    pub fn insert_value(&mut self, document: Value) -> TableResult<DocId> {
        self.insert(Document::try_from(document)?)
    }

    /// Ids of the documents matching every condition of `query`
    pub fn search_ids(&mut self, query: &Query) -> TableResult<Lookup<Vec<DocId>>> {
        if query.is_empty() {
            return Ok(Lookup::NoQuery);
        }
        let snapshot = read_snapshot(&mut self.backend)?;
        Ok(query.resolve(&snapshot.index))
    }

    /// Documents matching every condition of `query`, in ascending id order
    pub fn search(&mut self, query: &Query) -> TableResult<Lookup<Vec<Document>>> {
        if query.is_empty() {
            return Ok(Lookup::NoQuery);
        }
        let mut snapshot = read_snapshot(&mut self.backend)?;

        Ok(query.resolve(&snapshot.index).map(|ids| {
            ids.into_iter()
                .filter_map(|id| {
                    let doc = snapshot.documents.remove(&id);
                    if doc.is_none() {
                        warn!("Index of table '{}' references missing document {}", self.name, id);
                    }
                    doc
                })
                .collect()
        }))
    }

    /// Overwrite fields of every document matching `query`
    ///
    /// Fields present in `update` replace existing values or are added.
    /// Returns [`UpdateOutcome::NotFound`] without writing when nothing
    /// matches.
    pub fn update(&mut self, query: &Query, update: Document) -> TableResult<UpdateOutcome> {
        let ids = match self.search_ids(query)? {
            Lookup::Found(ids) => ids,
            Lookup::NoQuery | Lookup::NoMatches => return Ok(UpdateOutcome::NotFound),
        };

        let count = run_transaction(&mut self.backend, |snapshot| {
            Ok(ids
                .iter()
                .filter(|&&id| apply_update(snapshot, id, &update))
                .count())
        })?;

        info!("Updated {} document(s) in table '{}'", count, self.name);
        Ok(UpdateOutcome::Updated { count })
    }

    /// Update with an untyped payload
    ///
    /// The payload must be a JSON object of strings.
    pub fn update_value(&mut self, query: &Query, update: Value) -> TableResult<UpdateOutcome> {
        self.update(query, Document::try_from(update)?)
    }

    /// Fetch one document by id
    pub fn get(&mut self, id: DocId) -> TableResult<Option<Document>> {
        Ok(read_snapshot(&mut self.backend)?.documents.remove(&id))
    }

    /// Every document, split into pages of `page_size`
    ///
    /// Returns `None` if the table holds no documents.
    pub fn all(&mut self, page_size: usize) -> TableResult<Option<Pages>> {
        if page_size == 0 {
            return Err(TableError::InvalidPageSize);
        }

        let snapshot = read_snapshot(&mut self.backend)?;
        if snapshot.is_empty() {
            return Ok(None);
        }

        let documents = snapshot.documents.into_values().collect();
        Ok(Some(Pages::new(documents, page_size)))
    }

    /// Document and index counts
    pub fn stats(&mut self) -> TableResult<TableStats> {
        let snapshot = read_snapshot(&mut self.backend)?;
        Ok(TableStats {
            documents: snapshot.documents.len(),
            first_name_values: snapshot.index.buckets(IndexedField::FirstName).len(),
            last_name_values: snapshot.index.buckets(IndexedField::LastName).len(),
            next_id: snapshot.next_id().ok(),
        })
    }

    /// Full snapshot as currently stored
    pub fn snapshot(&mut self) -> TableResult<Snapshot> {
        read_snapshot(&mut self.backend)
    }
}

/// Apply `update` to document `id`, keeping the index in step
///
/// Returns whether the document exists.
fn apply_update(snapshot: &mut Snapshot, id: DocId, update: &Document) -> bool {
    let Some(doc) = snapshot.documents.get_mut(&id) else {
        warn!("Skipping update of missing document {}", id);
        return false;
    };

    for field in IndexedField::ALL {
        if let Some(new_value) = update.get(field.as_str()) {
            snapshot
                .index
                .reassign(field, doc.get(field.as_str()), new_value, id);
        }
    }

    doc.merge(update);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fields;
    use crate::storage::{MemoryBackend, StorageError};
    use serde_json::json;
    use tempfile::TempDir;

    fn memory_table() -> Table<MemoryBackend> {
        Table::with_backend("phone_book", MemoryBackend::new())
    }

    fn person(first: &str, last: &str) -> Document {
        Document::new()
            .with(fields::FIRST_NAME, first)
            .with(fields::LAST_NAME, last)
    }

    fn id(n: u64) -> DocId {
        DocId::new(n).unwrap()
    }

    fn last_name(value: &str) -> Query {
        Query::new().with(IndexedField::LastName, value)
    }

    #[test]
    fn test_scenario() {
        let mut table = memory_table();

        assert_eq!(table.insert(person("Ann", "Lee")).unwrap(), id(1));
        assert_eq!(table.insert(person("Bo", "Lee")).unwrap(), id(2));

        let both = table.search(&last_name("Lee")).unwrap().found().unwrap();
        assert_eq!(both, vec![person("Ann", "Lee"), person("Bo", "Lee")]);

        let ann = Query::new()
            .with(IndexedField::FirstName, "Ann")
            .with(IndexedField::LastName, "Lee");
        assert_eq!(
            table.search(&ann).unwrap(),
            Lookup::Found(vec![person("Ann", "Lee")])
        );

        let outcome = table
            .update(&last_name("Lee"), Document::new().with(fields::LAST_NAME, "Park"))
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::Updated { count: 2 });

        let snapshot = table.snapshot().unwrap();
        assert!(snapshot
            .documents
            .values()
            .all(|doc| doc.get(fields::LAST_NAME) == Some("Park")));
        assert!(snapshot.index.bucket(IndexedField::LastName, "Lee").is_none());
        assert_eq!(
            snapshot.index.bucket(IndexedField::LastName, "Park"),
            Some(&[id(1), id(2)][..])
        );
        assert!(snapshot.is_index_consistent());
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut table = memory_table();
        assert_eq!(table.next_id().unwrap(), id(1));

        let ids: Vec<DocId> = (0..25)
            .map(|n| table.insert(person(&format!("P{}", n), "Lee")).unwrap())
            .collect();

        let expected: Vec<DocId> = (1..=25).map(id).collect();
        assert_eq!(ids, expected);
        assert_eq!(table.next_id().unwrap(), id(26));
    }

    #[test]
    fn test_insert_then_search_finds_document() {
        let mut table = memory_table();
        let doc = person("Ann", "Lee")
            .with(fields::PATRONYMIC, "Ivanovna")
            .with(fields::OFFICE_NUMBER, "101");
        table.insert(doc.clone()).unwrap();

        let query = Query::new()
            .with(IndexedField::FirstName, "Ann")
            .with(IndexedField::LastName, "Lee");
        let found = table.search(&query).unwrap().found().unwrap();
        assert!(found.contains(&doc));
    }

    #[test]
    fn test_insert_missing_field_leaves_table_unchanged() {
        let mut table = memory_table();
        table.insert(person("Ann", "Lee")).unwrap();
        let before = table.backend().contents().to_string();

        let err = table
            .insert(Document::new().with(fields::FIRST_NAME, "Bo"))
            .unwrap_err();

        assert!(matches!(err, TableError::MissingField("last_name")));
        assert_eq!(table.backend().contents(), before);
        assert_eq!(table.next_id().unwrap(), id(2));
    }

    #[test]
    fn test_insert_past_max_id_fails_without_writing() {
        let stored = json!({
            "18446744073709551615": {"first_name": "Max", "last_name": "Lee"},
            "index": {
                "first_name": {"Max": ["18446744073709551615"]},
                "last_name": {"Lee": ["18446744073709551615"]},
            },
        });
        let backend = MemoryBackend::from_json(stored.to_string(), AccessMode::ReadWrite);
        let mut table = Table::with_backend("phone_book", backend);
        let before = table.backend().contents().to_string();

        let err = table.insert(person("Ann", "Park")).unwrap_err();

        assert!(matches!(err, TableError::IdsExhausted));
        assert_eq!(table.backend().contents(), before);
        assert_eq!(table.stats().unwrap().next_id, None);

        let snapshot = table.snapshot().unwrap();
        assert_eq!(snapshot.documents[&id(u64::MAX)], person("Max", "Lee"));
        assert!(snapshot.is_index_consistent());
    }

    #[test]
    fn test_insert_value_validates_payload() {
        let mut table = memory_table();

        let err = table.insert_value(json!(["Ann", "Lee"])).unwrap_err();
        assert!(matches!(err, TableError::NotAMapping { .. }));

        let inserted = table
            .insert_value(json!({"first_name": "Ann", "last_name": "Lee"}))
            .unwrap();
        assert_eq!(inserted, id(1));
    }

    #[test]
    fn test_empty_query() {
        let mut table = memory_table();
        table.insert(person("Ann", "Lee")).unwrap();

        assert_eq!(table.search_ids(&Query::new()).unwrap(), Lookup::NoQuery);
        assert_eq!(table.search(&Query::new()).unwrap(), Lookup::NoQuery);
        assert_eq!(
            table
                .update(&Query::new(), Document::new().with("company_name", "Acme"))
                .unwrap(),
            UpdateOutcome::NotFound
        );
    }

    #[test]
    fn test_search_is_conjunctive() {
        let mut table = memory_table();
        table.insert(person("Ann", "Lee")).unwrap();
        table.insert(person("Bo", "Lee")).unwrap();
        table.insert(person("Ann", "Park")).unwrap();

        let ann = Query::new().with(IndexedField::FirstName, "Ann");
        assert_eq!(table.search_ids(&ann).unwrap(), Lookup::Found(vec![id(1), id(3)]));

        let ann_park = ann.clone().with(IndexedField::LastName, "Park");
        assert_eq!(table.search_ids(&ann_park).unwrap(), Lookup::Found(vec![id(3)]));

        // Both buckets exist but do not overlap
        let bo_park = Query::new()
            .with(IndexedField::FirstName, "Bo")
            .with(IndexedField::LastName, "Park");
        assert_eq!(table.search_ids(&bo_park).unwrap(), Lookup::NoMatches);

        // An unknown value rules out the query even if the other field matches
        let cy_lee = Query::new()
            .with(IndexedField::FirstName, "Cy")
            .with(IndexedField::LastName, "Lee");
        assert_eq!(table.search_ids(&cy_lee).unwrap(), Lookup::NoMatches);
        assert_eq!(table.search(&cy_lee).unwrap(), Lookup::NoMatches);
    }

    #[test]
    fn test_update_not_found_writes_nothing() {
        let mut table = memory_table();
        table.insert(person("Ann", "Lee")).unwrap();
        let before = table.backend().contents().to_string();

        let outcome = table
            .update(&last_name("Park"), Document::new().with(fields::LAST_NAME, "Kim"))
            .unwrap();

        assert_eq!(outcome, UpdateOutcome::NotFound);
        assert_eq!(table.backend().contents(), before);
    }

    #[test]
    fn test_update_keeps_other_ids_in_old_bucket() {
        let mut table = memory_table();
        table.insert(person("Ann", "Lee")).unwrap();
        table.insert(person("Bo", "Lee")).unwrap();
        table.insert(person("Cy", "Lee")).unwrap();

        let bo = Query::new().with(IndexedField::FirstName, "Bo");
        table
            .update(&bo, Document::new().with(fields::LAST_NAME, "Park"))
            .unwrap();

        let snapshot = table.snapshot().unwrap();
        assert_eq!(
            snapshot.index.bucket(IndexedField::LastName, "Lee"),
            Some(&[id(1), id(3)][..])
        );
        assert_eq!(
            snapshot.index.bucket(IndexedField::LastName, "Park"),
            Some(&[id(2)][..])
        );
        assert!(snapshot.is_index_consistent());
    }

    #[test]
    fn test_update_non_indexed_fields() {
        let mut table = memory_table();
        table.insert(person("Ann", "Lee")).unwrap();
        let index_before = table.snapshot().unwrap().index;

        let patch = Document::new()
            .with(fields::COMPANY_NAME, "Acme")
            .with(fields::PERSONAL_NUMBER, "555-0101");
        assert_eq!(
            table.update(&last_name("Lee"), patch).unwrap(),
            UpdateOutcome::Updated { count: 1 }
        );

        let doc = table.get(id(1)).unwrap().unwrap();
        assert_eq!(doc.get(fields::COMPANY_NAME), Some("Acme"));
        assert_eq!(doc.get(fields::PERSONAL_NUMBER), Some("555-0101"));
        assert_eq!(doc.get(fields::FIRST_NAME), Some("Ann"));
        assert_eq!(table.snapshot().unwrap().index, index_before);
    }

    #[test]
    fn test_update_to_same_value() {
        let mut table = memory_table();
        table.insert(person("Ann", "Lee")).unwrap();
        let index_before = table.snapshot().unwrap().index;

        table
            .update(&last_name("Lee"), Document::new().with(fields::LAST_NAME, "Lee"))
            .unwrap();

        assert_eq!(table.snapshot().unwrap().index, index_before);
    }

    #[test]
    fn test_update_value_validates_payload() {
        let mut table = memory_table();
        table.insert(person("Ann", "Lee")).unwrap();

        let err = table
            .update_value(&last_name("Lee"), json!("Park"))
            .unwrap_err();
        assert!(matches!(err, TableError::NotAMapping { found: "string" }));
    }

    #[test]
    fn test_index_stays_consistent() {
        let mut table = memory_table();
        let firsts = ["Ann", "Bo", "Cy"];
        let lasts = ["Lee", "Park", "Kim", "Ng"];

        for n in 0..12 {
            table
                .insert(person(firsts[n % firsts.len()], lasts[n % lasts.len()]))
                .unwrap();
        }

        for (n, last) in lasts.iter().enumerate() {
            let query = Query::new().with(IndexedField::LastName, *last);
            let patch = Document::new()
                .with(fields::LAST_NAME, lasts[(n + 1) % lasts.len()])
                .with(fields::FIRST_NAME, firsts[n % firsts.len()]);
            table.update(&query, patch).unwrap();
            assert!(table.snapshot().unwrap().is_index_consistent());
        }

        let snapshot = table.snapshot().unwrap();
        for field in IndexedField::ALL {
            assert!(snapshot.index.buckets(field).values().all(|ids| !ids.is_empty()));
        }
    }

    #[test]
    fn test_all_paginates_by_ascending_id() {
        let mut table = memory_table();
        for n in 1..=12 {
            table.insert(person(&format!("P{:02}", n), "Lee")).unwrap();
        }
        // Order stays by id after a value changes
        table
            .update(
                &Query::new().with(IndexedField::FirstName, "P01"),
                Document::new().with(fields::FIRST_NAME, "Z01"),
            )
            .unwrap();

        let pages = table.all(5).unwrap().unwrap();
        assert_eq!(pages.len(), 3);

        let pages: Vec<Vec<Document>> = pages.collect();
        let sizes: Vec<usize> = pages.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![5, 5, 2]);

        let names: Vec<&str> = pages
            .iter()
            .flatten()
            .map(|doc| doc.get(fields::FIRST_NAME).unwrap())
            .collect();
        let mut expected = vec!["Z01".to_string()];
        expected.extend((2..=12).map(|n| format!("P{:02}", n)));
        assert_eq!(names, expected);
    }

    #[test]
    fn test_pages_are_not_restartable() {
        let mut table = memory_table();
        for n in 0..3 {
            table.insert(person(&format!("P{}", n), "Lee")).unwrap();
        }

        let mut pages = table.all(2).unwrap().unwrap();
        assert_eq!(pages.next().map(|p| p.len()), Some(2));
        assert_eq!(pages.next().map(|p| p.len()), Some(1));
        assert!(pages.next().is_none());
        assert!(pages.next().is_none());
        assert_eq!(pages.remaining(), 0);
    }

    #[test]
    fn test_all_empty_and_invalid_page_size() {
        let mut table = memory_table();
        assert!(table.all(5).unwrap().is_none());
        assert!(matches!(table.all(0), Err(TableError::InvalidPageSize)));

        // An initialized but empty table is still "empty"
        run_transaction(&mut table.backend, |_| Ok(())).unwrap();
        assert!(table.all(5).unwrap().is_none());
    }

    #[test]
    fn test_stats() {
        let mut table = memory_table();
        table.insert(person("Ann", "Lee")).unwrap();
        table.insert(person("Bo", "Lee")).unwrap();

        let stats = table.stats().unwrap();
        assert_eq!(stats.documents, 2);
        assert_eq!(stats.first_name_values, 2);
        assert_eq!(stats.last_name_values, 1);
        assert_eq!(stats.next_id, Some(id(3)));
    }

    #[test]
    fn test_query_from_fields() {
        let query = Query::from_fields([("first_name", "Ann"), ("last_name", "Lee")]).unwrap();
        assert_eq!(query.len(), 2);

        let err = Query::from_fields([("company_name", "Acme")]).unwrap_err();
        assert!(matches!(err, TableError::UnknownIndexField(_)));
    }

    #[test]
    fn test_file_table_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("phonebook.json");

        {
            let mut table = Table::open("phone_book", &path, AccessMode::ReadWrite).unwrap();
            table.insert(person("Ann", "Lee")).unwrap();
            table.insert(person("Bo", "Lee")).unwrap();
        }

        let stored: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            stored,
            json!({
                "1": {"first_name": "Ann", "last_name": "Lee"},
                "2": {"first_name": "Bo", "last_name": "Lee"},
                "index": {
                    "first_name": {"Ann": ["1"], "Bo": ["2"]},
                    "last_name": {"Lee": ["1", "2"]},
                },
            })
        );

        let mut table = Table::open("phone_book", &path, AccessMode::ReadWrite).unwrap();
        assert_eq!(table.insert(person("Cy", "Kim")).unwrap(), id(3));
    }

    #[test]
    fn test_read_only_table() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("phonebook.json");
        Table::open("phone_book", &path, AccessMode::ReadWrite)
            .unwrap()
            .insert(person("Ann", "Lee"))
            .unwrap();

        let mut table = Table::open("phone_book", &path, AccessMode::ReadOnly).unwrap();
        assert!(table.search(&last_name("Lee")).unwrap().is_found());

        let err = table.insert(person("Bo", "Lee")).unwrap_err();
        assert!(matches!(
            err,
            TableError::Storage(StorageError::ReadOnly { .. })
        ));
        assert!(err.to_string().contains("Access mode is \"r\""));
    }

    #[test]
    fn test_open_with_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };

        let mut table = Table::open_with_config(&config, AccessMode::ReadWrite).unwrap();
        assert_eq!(table.name(), config.table_name);
        table.insert(person("Ann", "Lee")).unwrap();
        assert!(config.table_path().exists());
    }
}
