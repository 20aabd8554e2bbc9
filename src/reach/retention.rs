//
//  retention.rs
//  Retain
//
//  Created by hak (tharun)
//

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;

use crate::model::Entity;

/// First-reach edges recorded during a pass.
///
/// Every entity is reached once, so each node has at most one incoming edge
/// and roots have none. Following incoming edges back always ends at a root.
#[derive(Debug, Clone, Default)]
pub struct Retention {
    graph: DiGraph<Entity, ()>,
    index: HashMap<Entity, NodeIndex>,
}

impl Retention {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, entity: Entity) -> NodeIndex {
        if let Some(&idx) = self.index.get(&entity) {
            return idx;
        }
        let idx = self.graph.add_node(entity);
        self.index.insert(entity, idx);
        idx
    }

    /// Record that `entity` was first reached from `from` (`None` for roots).
    pub fn record(&mut self, from: Option<Entity>, entity: Entity) {
        let to = self.node(entity);
        if let Some(from) = from {
            let from = self.node(from);
            self.graph.add_edge(from, to, ());
        }
    }

    /// Chain from a root down to `entity`, or `None` if it was never reached.
    pub fn explain(&self, entity: Entity) -> Option<Vec<Entity>> {
        let mut idx = *self.index.get(&entity)?;
        let mut chain = vec![entity];
        while let Some(parent) = self.graph.neighbors_directed(idx, Direction::Incoming).next() {
            // Parents are always recorded before children; a repeat means a corrupt graph.
            if chain.len() > self.graph.node_count() {
                break;
            }
            chain.push(self.graph[parent]);
            idx = parent;
        }
        chain.reverse();
        Some(chain)
    }

    /// Entities reached without a predecessor.
    pub fn roots(&self) -> Vec<Entity> {
        self.graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|idx| self.graph[idx])
            .collect()
    }

    /// Entities first reached directly from `entity`.
    pub fn retained_by(&self, entity: Entity) -> Vec<Entity> {
        let Some(&idx) = self.index.get(&entity) else {
            return Vec::new();
        };
        let mut children: Vec<Entity> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|child| self.graph[child])
            .collect();
        // petgraph walks edges newest first
        children.reverse();
        children
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
