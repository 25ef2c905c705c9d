//! Per-record entry point called by the corpus walker.
//!
//! Orchestrates the full pipeline for one file:
//! classify → decode → filter → label → resolve → apply.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::filter::FilterPolicy;
use crate::graph::{Contribution, GraphAccumulator};
use crate::label::Labeler;
use crate::record::decode_record;
use crate::record::uri::{classify_path, FileKind};
use crate::resolve::{resolve, RelationOptions};
use crate::store::RecordStore;

/// What happened to a single ingested file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Not a principal record (alternate file, or not a record at all).
    Skipped,
    /// Rejected by the filter policy.
    Filtered,
    /// Added to the graph along with its relationships.
    Added,
}

/// Builds the relationship graph one record at a time.
///
/// `ingest` is synchronous and may be called from any number of threads at
/// once; the only shared mutable state is the [`GraphAccumulator`].
pub struct Assembler {
    store: Arc<dyn RecordStore>,
    policy: FilterPolicy,
    labeler: Labeler,
    relations: RelationOptions,
    graph: Arc<GraphAccumulator>,
}

impl Assembler {
    pub fn new(
        store: Arc<dyn RecordStore>,
        policy: FilterPolicy,
        labeler: Labeler,
        relations: RelationOptions,
        graph: Arc<GraphAccumulator>,
    ) -> Self {
        Self {
            store,
            policy,
            labeler,
            relations,
            graph,
        }
    }

    pub fn graph(&self) -> &Arc<GraphAccumulator> {
        &self.graph
    }

    /// Ingest one record's raw bytes. `path` identifies the file in the corpus.
    ///
    /// Decode warnings are logged and tolerated; any other decode failure is
    /// returned as an error for this path. Fetch failures while resolving
    /// relationships never fail the record.
    pub fn ingest(&self, bytes: &[u8], path: &Path) -> Result<IngestOutcome> {
        match classify_path(path) {
            Some(FileKind::Principal(_)) => {}
            Some(FileKind::Alternate(_)) | None => {
                log::debug!("Skipping non-principal file {}", path.display());
                return Ok(IngestOutcome::Skipped);
            }
        }

        let path_str = path.to_string_lossy();
        let decoded = decode_record(bytes, &path_str)?;
        for warning in &decoded.warnings {
            log::warn!("{}: {}", path_str, warning);
        }
        let record = decoded.record;

        if !self.policy.admit(&record) {
            log::debug!("Filtered {} ({})", record.id, record.placetype);
            return Ok(IngestOutcome::Filtered);
        }

        let (label, attrs) = self.labeler.label(&record);

        // All store fetches happen here, before the graph lock is taken.
        let mut visited = HashSet::new();
        let resolved = resolve(
            &record,
            &label,
            self.store.as_ref(),
            &self.relations,
            &self.labeler,
            &mut visited,
        );

        let mut contribution = Contribution::new();
        contribution.add_node(label, attrs);
        contribution.merge(resolved);

        self.graph.apply(&contribution);
        Ok(IngestOutcome::Added)
    }

    /// Read a file from disk and ingest it.
    pub fn ingest_file(&self, path: &Path) -> Result<IngestOutcome> {
        if classify_path(path).is_none() {
            return Ok(IngestOutcome::Skipped);
        }

        let bytes = std::fs::read(path)?;
        self.ingest(&bytes, path)
    }
}
