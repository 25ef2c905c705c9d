//! Relationship resolution: parent and supersession edges for one record.
//!
//! Resolution only reads from the store and builds a [`Contribution`]; nothing
//! here touches the shared graph.

use std::collections::{HashSet, VecDeque};

use crate::graph::{Attributes, Contribution};
use crate::label::Labeler;
use crate::record::Record;
use crate::store::RecordStore;

/// Which supersession relationships to follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelationOptions {
    /// Draw `other -> self` for every ID in `supersedes`.
    pub supersedes: bool,
    /// Draw `self -> other` for every ID in `superseded_by`.
    pub superseded_by: bool,
    /// Also resolve the supersession lists of every related record, transitively.
    pub recursive: bool,
}

impl RelationOptions {
    fn any(&self) -> bool {
        self.supersedes || self.superseded_by
    }
}

/// Resolve a record's relationships into nodes and edges.
///
/// `label` is the record's own label (its node is added by the caller).
/// `visited` holds IDs already expanded in this resolution; the record's own
/// ID is added to it. Fetch failures are logged and the relationship is
/// dropped, except for the parent, which falls back to a placeholder node.
pub fn resolve(
    record: &Record,
    label: &str,
    store: &dyn RecordStore,
    options: &RelationOptions,
    labeler: &Labeler,
    visited: &mut HashSet<i64>,
) -> Contribution {
    let mut contribution = Contribution::new();
    visited.insert(record.id);

    if options.any() {
        let mut queue = VecDeque::new();

        let first = supersession_step(record, label, store, options, labeler, &mut contribution);
        for related in first {
            if options.recursive && visited.insert(related.0.id) {
                queue.push_back(related);
            }
        }

        while let Some((current, current_label)) = queue.pop_front() {
            let next = supersession_step(
                &current,
                &current_label,
                store,
                options,
                labeler,
                &mut contribution,
            );
            for related in next {
                if visited.insert(related.0.id) {
                    queue.push_back(related);
                }
            }
        }
    }

    if record.has_parent() {
        resolve_parent(record, label, store, labeler, &mut contribution);
    }

    contribution
}

/// Single hop to the parent; ancestors further up are not chased.
fn resolve_parent(
    record: &Record,
    label: &str,
    store: &dyn RecordStore,
    labeler: &Labeler,
    contribution: &mut Contribution,
) {
    let (parent_label, parent_attrs) = match store.fetch(record.parent_id) {
        Ok(parent) => labeler.label(&parent),
        Err(e) => {
            log::warn!("failed to load parent {} of {}: {}", record.parent_id, record.id, e);
            (record.parent_id.to_string(), Attributes::new())
        }
    };

    contribution.add_node(parent_label.clone(), parent_attrs);
    contribution.add_edge(label, parent_label);
}

/// Resolve one record's supersedes / superseded-by lists. Returns the related
/// records that were fetched, for further expansion.
fn supersession_step(
    record: &Record,
    label: &str,
    store: &dyn RecordStore,
    options: &RelationOptions,
    labeler: &Labeler,
    contribution: &mut Contribution,
) -> Vec<(Record, String)> {
    let mut related = Vec::new();

    if options.supersedes {
        for &other_id in &record.supersedes {
            let fetched = fetch_related(other_id, store, labeler, contribution);
            if let Some((other, other_label)) = fetched {
                contribution.add_edge(other_label.clone(), label);
                related.push((other, other_label));
            }
        }
    }

    if options.superseded_by {
        for &other_id in &record.superseded_by {
            let fetched = fetch_related(other_id, store, labeler, contribution);
            if let Some((other, other_label)) = fetched {
                contribution.add_edge(label, other_label.clone());
                related.push((other, other_label));
            }
        }
    }

    related
}

fn fetch_related(
    id: i64,
    store: &dyn RecordStore,
    labeler: &Labeler,
    contribution: &mut Contribution,
) -> Option<(Record, String)> {
    match store.fetch(id) {
        Ok(other) => {
            let (other_label, other_attrs) = labeler.label(&other);
            contribution.add_node(other_label.clone(), other_attrs);
            Some((other, other_label))
        }
        Err(e) => {
            log::warn!("failed to load record for {}, {}", id, e);
            None
        }
    }
}
