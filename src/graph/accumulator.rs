use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{dot, Attributes, Contribution, Graph};

/// Shared graph written to by concurrent ingestion workers.
///
/// Every mutation takes the same lock, so a record's whole contribution lands
/// at once and no reader ever sees an edge without both of its nodes.
#[derive(Debug, Default)]
pub struct GraphAccumulator {
    graph: Mutex<Graph>,
}

impl GraphAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Graph> {
        // Inserts are idempotent; a poisoned graph is still consistent.
        self.graph.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_node(&self, label: &str, attrs: &Attributes) -> bool {
        self.lock().add_node(label, attrs)
    }

    pub fn add_edge(&self, from: &str, to: &str) -> bool {
        self.lock().add_edge(from, to)
    }

    /// Apply one record's nodes and edges under a single lock acquisition.
    pub fn apply(&self, contribution: &Contribution) {
        self.lock().apply(contribution);
    }

    pub fn node_count(&self) -> usize {
        self.lock().node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.lock().edge_count()
    }

    pub fn contains_node(&self, label: &str) -> bool {
        self.lock().contains_node(label)
    }

    pub fn contains_edge(&self, from: &str, to: &str) -> bool {
        self.lock().contains_edge(from, to)
    }

    /// Copy of the current graph.
    pub fn snapshot(&self) -> Graph {
        self.lock().clone()
    }

    /// Render the current graph as DOT.
    pub fn to_dot(&self) -> String {
        dot::render(&self.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_concurrent_contributions() {
        let acc = Arc::new(GraphAccumulator::new());

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let acc = Arc::clone(&acc);
                thread::spawn(move || {
                    for i in 0..50 {
                        let mut c = Contribution::new();
                        let child = format!("child {}", i);
                        c.add_node(child.clone(), Attributes::new());
                        c.add_node("root", Attributes::new());
                        c.add_edge(child, "root");
                        if worker % 2 == 0 {
                            acc.apply(&c);
                        } else {
                            for (label, attrs) in &c.nodes {
                                acc.add_node(label, attrs);
                            }
                            for (from, to) in &c.edges {
                                acc.add_edge(from, to);
                            }
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(acc.node_count(), 51);
        assert_eq!(acc.edge_count(), 50);
        assert!(acc.contains_edge("child 7", "root"));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let acc = GraphAccumulator::new();
        acc.add_node("a", &Attributes::new());
        acc.add_node("b", &Attributes::new());
        acc.add_edge("a", "b");

        let snapshot = acc.snapshot();
        acc.add_node("c", &Attributes::new());
        assert_eq!(snapshot.node_count(), 2);
        assert!(snapshot.contains_edge("a", "b"));
        assert_eq!(acc.node_count(), 3);
    }

    #[test]
    fn test_to_dot_contains_edge() {
        let acc = GraphAccumulator::new();
        acc.add_node("a", &Attributes::new());
        acc.add_node("b", &Attributes::new());
        acc.add_edge("a", "b");
        assert!(acc.to_dot().contains("\"a\" -> \"b\";"));
    }
}
