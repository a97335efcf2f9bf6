//! Dependency graph management using `petgraph`.
//!
//! The graph is rooted at the unit being resolved. Edges point from a
//! dependent to its dependencies, so a depth-first postorder walk from
//! the root visits every reachable unit dependencies-first and exactly
//! once, even when several paths share a dependency.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{DfsPostOrder, Walker};

use crate::unit::{Unit, UnitKey};

/// A rooted dependency graph of resolved units.
///
/// Each unit appears once, keyed by kind and name. The graph is built
/// by the resolver and read-only afterwards.
#[derive(Debug)]
pub struct DependencyGraph {
    /// Internal petgraph representation.
    graph: DiGraph<Unit, ()>,
    /// Lookup from unit key to its node, used to deduplicate inserts.
    index: HashMap<UnitKey, NodeIndex>,
    /// The unit the graph was resolved for.
    root: NodeIndex,
}

impl DependencyGraph {
    /// Creates a graph containing only its root unit.
    pub(crate) fn with_root(unit: Unit) -> Self {
        let key = unit.key();
        let mut graph = DiGraph::new();
        let root = graph.add_node(unit);
        let mut index = HashMap::new();
        let _ = index.insert(key, root);
        Self { graph, index, root }
    }

    /// Inserts a unit, returning the existing node when the key is
    /// already present.
    ///
    /// A hidden image already in the graph becomes visible when the
    /// same image is inserted again as visible; the reverse insertion
    /// never demotes it.
    pub(crate) fn insert_unit(&mut self, unit: Unit) -> NodeIndex {
        let key = unit.key();
        if let Some(&idx) = self.index.get(&key) {
            if unit.visible() && !self.graph[idx].visible() {
                if let Unit::Image(image) = &mut self.graph[idx] {
                    image.visible = true;
                }
            }
            return idx;
        }
        let idx = self.graph.add_node(unit);
        let _ = self.index.insert(key, idx);
        idx
    }

    /// Adds a dependency edge from `dependent` to `dependency`.
    ///
    /// Re-adding an existing edge is a no-op, so a unit that names the
    /// same dependency twice still depends on it once.
    pub(crate) fn insert_dependency(&mut self, dependent: NodeIndex, dependency: NodeIndex) {
        let _ = self.graph.update_edge(dependent, dependency, ());
    }

    /// Returns the unit the graph was resolved for.
    #[must_use]
    pub fn root(&self) -> &Unit {
        &self.graph[self.root]
    }

    /// Returns the root node index.
    #[must_use]
    pub const fn root_index(&self) -> NodeIndex {
        self.root
    }

    /// Returns the unit stored at `idx`.
    #[must_use]
    pub fn unit(&self, idx: NodeIndex) -> &Unit {
        &self.graph[idx]
    }

    /// Returns the number of units in the graph.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Looks up the node holding the unit with `key`.
    #[must_use]
    pub fn node(&self, key: &UnitKey) -> Option<NodeIndex> {
        self.index.get(key).copied()
    }

    /// Walks the graph depth-first from the root, yielding each unit
    /// exactly once with its dependencies before it. The root comes
    /// last.
    pub fn postorder(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        DfsPostOrder::new(&self.graph, self.root).iter(&self.graph)
    }

    /// Returns the direct dependencies of `idx` in declaration order.
    #[must_use]
    pub fn dependencies(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        // petgraph iterates neighbors newest-edge-first.
        let mut deps: Vec<NodeIndex> = self.graph.neighbors(idx).collect();
        deps.reverse();
        deps
    }

    /// Returns how many units depend directly on `idx`.
    #[must_use]
    pub fn dependent_count(&self, idx: NodeIndex) -> usize {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .count()
    }
}
