//! Which records get their own node in the graph.

use std::collections::{BTreeSet, HashSet};

use crate::record::Record;

/// Per-record admission policy. Pure: depends only on the record and itself.
#[derive(Debug, Clone, Default)]
pub struct FilterPolicy {
    exclude_placetypes: HashSet<String>,
    /// Admit only records belonging to at least one of these (empty = no check).
    belongs_to: BTreeSet<i64>,
    exclude_ceased: bool,
}

impl FilterPolicy {
    pub fn new<I, J>(exclude_placetypes: I, belongs_to: J, exclude_ceased: bool) -> Self
    where
        I: IntoIterator<Item = String>,
        J: IntoIterator<Item = i64>,
    {
        Self {
            exclude_placetypes: exclude_placetypes.into_iter().collect(),
            belongs_to: belongs_to.into_iter().collect(),
            exclude_ceased,
        }
    }

    /// Returns true if the record should be added to the graph.
    pub fn admit(&self, record: &Record) -> bool {
        if self.exclude_placetypes.contains(&record.placetype) {
            return false;
        }

        // Unknown deprecation status is admitted.
        if record.deprecated.is_true() {
            return false;
        }

        if self.exclude_ceased && record.ceased.is_true() {
            return false;
        }

        if !self.belongs_to.is_empty()
            && !self.belongs_to.iter().any(|id| record.belongs_to.contains(id))
        {
            return false;
        }

        true
    }
}
