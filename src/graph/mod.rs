//! Relationship graph: nodes keyed by label, directed edges between labels.
//!
//! [`Graph`] is the plain data structure. [`GraphAccumulator`] is the shared,
//! lock-guarded owner that concurrent ingestion writes into, and [`dot`]
//! serializes the final result.

mod accumulator;
pub mod dot;

pub use accumulator::GraphAccumulator;

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

/// Node style attributes (`shape`, `fillcolor`, ...).
pub type Attributes = BTreeMap<String, String>;

/// Directed graph with set semantics for both nodes and edges.
///
/// Sorted containers keep iteration (and therefore export) independent of
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    nodes: BTreeMap<String, Attributes>,
    edges: BTreeSet<(String, String)>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. Returns true if the label was not present before.
    ///
    /// An existing node keeps its attributes, except that a bare placeholder
    /// picks up attributes the first time they are offered.
    pub fn add_node(&mut self, label: &str, attrs: &Attributes) -> bool {
        match self.nodes.entry(label.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(attrs.clone());
                true
            }
            Entry::Occupied(mut slot) => {
                if slot.get().is_empty() && !attrs.is_empty() {
                    slot.insert(attrs.clone());
                }
                false
            }
        }
    }

    /// Insert a directed edge. Returns true if the pair was not present before.
    pub fn add_edge(&mut self, from: &str, to: &str) -> bool {
        self.edges.insert((from.to_string(), to.to_string()))
    }

    /// Apply one record's contribution: all nodes first, then all edges.
    pub fn apply(&mut self, contribution: &Contribution) {
        for (label, attrs) in &contribution.nodes {
            self.add_node(label, attrs);
        }
        for (from, to) in &contribution.edges {
            self.add_edge(from, to);
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains_node(&self, label: &str) -> bool {
        self.nodes.contains_key(label)
    }

    pub fn contains_edge(&self, from: &str, to: &str) -> bool {
        self.edges.contains(&(from.to_string(), to.to_string()))
    }

    pub fn attributes(&self, label: &str) -> Option<&Attributes> {
        self.nodes.get(label)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, &Attributes)> {
        self.nodes.iter().map(|(label, attrs)| (label.as_str(), attrs))
    }

    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges.iter().map(|(from, to)| (from.as_str(), to.as_str()))
    }
}

/// Nodes and edges resolved for one record, built without holding the graph
/// lock and applied in one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contribution {
    pub nodes: Vec<(String, Attributes)>,
    pub edges: Vec<(String, String)>,
}

impl Contribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, label: impl Into<String>, attrs: Attributes) {
        self.nodes.push((label.into(), attrs));
    }

    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.edges.push((from.into(), to.into()));
    }

    /// Append another contribution's nodes and edges.
    pub fn merge(&mut self, other: Contribution) {
        self.nodes.extend(other.nodes);
        self.edges.extend(other.edges);
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}
