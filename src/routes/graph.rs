//! Modulation graph
//!
//! Nodes are (catalog entry id, tonic note name) pairs stored arena-style:
//! adjacency by index, with a map interning composite keys. The graph is
//! built on demand from repeated classifier calls for one route query and
//! discarded afterwards; caching across queries is a caller concern.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::lattice::Lattice;
use crate::models::{DegreeCategory, Maqam, ModulationMode, ModulationTargets};
use crate::modulation::modulations;
use crate::transposition::maqam_transpositions;

/// Composite node key: catalog entry at a concrete tonic
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeKey {
    pub entry_id: String,
    pub tonic: String,
}

/// Directed edge labeled with the anchoring degree category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub to: usize,
    pub category: DegreeCategory,
}

/// One graph node: its key, and the realization it stands for (with its
/// modulation results attached)
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub key: NodeKey,
    pub realization: Maqam,
    pub edges: Vec<Edge>,
}

/// Arena-indexed adjacency structure over maqam realizations
#[derive(Debug, Clone, Default)]
pub struct ModulationGraph {
    nodes: Vec<GraphNode>,
    index: HashMap<NodeKey, usize>,
}

impl ModulationGraph {
    /// Build the full modulation graph for a lattice: one node per
    /// (entry, tonic) realization, one labeled edge per bucket membership
    pub fn build(lattice: &Lattice, catalog: &Catalog, tolerance: f64) -> Self {
        let mut graph = ModulationGraph::default();
        if lattice.is_empty() {
            return graph;
        }

        for template in catalog.maqamat_for(lattice) {
            for realization in
                maqam_transpositions(lattice, catalog.ajnas, template, true, tolerance)
            {
                graph.intern(realization);
            }
        }

        for from in 0..graph.nodes.len() {
            let targets = modulations(
                lattice,
                catalog,
                &graph.nodes[from].realization,
                ModulationMode::Maqamat,
                tolerance,
            );
            if let ModulationTargets::Maqamat(buckets) = &targets {
                for category in DegreeCategory::all() {
                    for target in buckets.bucket(category) {
                        let key = NodeKey {
                            entry_id: target.template_id.clone(),
                            tonic: target.tonic().unwrap_or_default().to_string(),
                        };
                        if let Some(&to) = graph.index.get(&key) {
                            graph.add_edge(from, to, category);
                        }
                    }
                }
            }
            graph.nodes[from].realization.attach_modulations(targets);
        }

        debug!(
            "modulation graph: {} node(s), {} edge(s)",
            graph.nodes.len(),
            graph.nodes.iter().map(|n| n.edges.len()).sum::<usize>()
        );
        graph
    }

    /// Intern a realization under its (entry, tonic) key. Octave duplicates
    /// collapse onto one node; the identity realization wins the slot.
    fn intern(&mut self, realization: Maqam) {
        let key = NodeKey {
            entry_id: realization.template_id.clone(),
            tonic: realization.tonic().unwrap_or_default().to_string(),
        };
        match self.index.get(&key) {
            Some(&i) => {
                if !realization.transposition && self.nodes[i].realization.transposition {
                    self.nodes[i].realization = realization;
                }
            }
            None => {
                let i = self.nodes.len();
                self.nodes.push(GraphNode {
                    key: key.clone(),
                    realization,
                    edges: Vec::new(),
                });
                self.index.insert(key, i);
            }
        }
    }

    fn add_edge(&mut self, from: usize, to: usize, category: DegreeCategory) {
        if from == to {
            return;
        }
        let edge = Edge { to, category };
        let edges = &mut self.nodes[from].edges;
        if !edges.contains(&edge) {
            edges.push(edge);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> &GraphNode {
        &self.nodes[index]
    }

    pub fn node_index(&self, key: &NodeKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Tonic of an entry's identity realization, if it exists on this lattice
    pub fn identity_tonic(&self, entry_id: &str) -> Option<&str> {
        self.nodes
            .iter()
            .find(|n| n.key.entry_id == entry_id && !n.realization.transposition)
            .map(|n| n.key.tonic.as_str())
    }
}
