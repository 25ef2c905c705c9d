//! Record stores: fetch a record by ID from one or more sources.

mod cache;

pub use cache::CachingStore;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{GraphError, Result};
use crate::record::{decode_record, uri, Record};

/// Source of records addressed by ID.
///
/// Implementations must be safe for concurrent reads; the walker calls
/// `fetch` from many workers at once.
pub trait RecordStore: Send + Sync {
    /// Fetch and decode the record with the given ID.
    fn fetch(&self, id: i64) -> Result<Record>;
}

/// Split a `--source` value into its filesystem root.
///
/// Accepts `fs://<path>` or a bare path. Any other `scheme://` is rejected.
pub fn parse_source(source: &str) -> Result<PathBuf> {
    if let Some(path) = source.strip_prefix("fs://") {
        if path.is_empty() {
            return Err(GraphError::Config(format!("Empty path in source: {}", source)));
        }
        return Ok(PathBuf::from(path));
    }

    if let Some((scheme, _)) = source.split_once("://") {
        return Err(GraphError::Config(format!(
            "Unsupported source scheme '{}' in {} (only fs:// is supported)",
            scheme, source
        )));
    }

    Ok(PathBuf::from(source))
}

/// Store backed by a directory laid out as `<root>/<id path>.geojson`.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Build a store from a `--source` value, checking the directory exists.
    pub fn from_source(source: &str) -> Result<Self> {
        let root = parse_source(source)?;
        if !root.is_dir() {
            return Err(GraphError::Config(format!(
                "Source is not a directory: {}",
                root.display()
            )));
        }
        Ok(Self::new(root))
    }
}

impl RecordStore for FsStore {
    fn fetch(&self, id: i64) -> Result<Record> {
        let rel_path = uri::id_to_rel_path(id)?;
        let path = self.root.join(&rel_path);

        let bytes = std::fs::read(&path).map_err(|e| GraphError::Fetch {
            id,
            reason: format!("{}: {}", path.display(), e),
        })?;

        let decoded = decode_record(&bytes, &rel_path)?;
        for warning in &decoded.warnings {
            log::debug!("{}: {}", rel_path, warning);
        }
        Ok(decoded.record)
    }
}

/// Tries each inner store in order; the first success wins.
pub struct MultiStore {
    stores: Vec<Box<dyn RecordStore>>,
}

impl MultiStore {
    pub fn new(stores: Vec<Box<dyn RecordStore>>) -> Self {
        Self { stores }
    }

    /// Build a multi-store over filesystem sources.
    pub fn from_sources(sources: &[String]) -> Result<Self> {
        let mut stores: Vec<Box<dyn RecordStore>> = Vec::with_capacity(sources.len());
        for source in sources {
            stores.push(Box::new(FsStore::from_source(source)?));
        }
        Ok(Self::new(stores))
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

impl RecordStore for MultiStore {
    fn fetch(&self, id: i64) -> Result<Record> {
        let mut last_err = None;

        for store in &self.stores {
            match store.fetch(id) {
                Ok(record) => return Ok(record),
                Err(e) => last_err = Some(e),
            }
        }

        Err(last_err.unwrap_or_else(|| GraphError::Fetch {
            id,
            reason: "no sources configured".to_string(),
        }))
    }
}

/// In-memory store, mostly useful for tests and small fixtures.
#[derive(Default)]
pub struct MemoryStore {
    records: HashMap<i64, Record>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: Record) {
        self.records.insert(record.id, record);
    }
}

impl FromIterator<Record> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut store = Self::new();
        for record in iter {
            store.insert(record);
        }
        store
    }
}

impl RecordStore for MemoryStore {
    fn fetch(&self, id: i64) -> Result<Record> {
        self.records.get(&id).cloned().ok_or_else(|| GraphError::Fetch {
            id,
            reason: "not found".to_string(),
        })
    }
}
