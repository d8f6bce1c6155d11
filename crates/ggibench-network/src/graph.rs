//! Undirected gene-gene interaction graph.

use std::collections::HashMap;

use ggibench_common::{ExpressionMatrix, GgiBenchError, Result};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

/// A GGI network whose nodes carry unique gene identifiers.
///
/// Node indices are always the dense range `0..node_count()`: networks are
/// only ever grown by appending nodes, and every filter builds a fresh graph.
/// Self loops are dropped and parallel edges collapsed on insertion.
#[derive(Debug, Clone, Default)]
pub struct GgiNetwork {
    graph: UnGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
}

impl GgiNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a gene list (node `i` is `genes[i]`) and index pairs.
    pub fn from_edges<I, S, E>(genes: I, edges: E) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        E: IntoIterator<Item = (usize, usize)>,
    {
        let mut network = Self::new();
        for gene in genes {
            network.add_gene(gene)?;
        }
        let n = network.node_count();
        for (a, b) in edges {
            if a >= n || b >= n {
                return Err(GgiBenchError::InvalidNetwork(format!(
                    "edge ({a}, {b}) refers to a node outside 0..{n}"
                )));
            }
            network.add_interaction(NodeIndex::new(a), NodeIndex::new(b));
        }
        Ok(network)
    }

    /// Build from gene-name pairs, adding genes in order of first appearance.
    pub fn from_gene_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut network = Self::new();
        for (a, b) in pairs {
            let a = network.ensure_gene(a);
            let b = network.ensure_gene(b);
            network.add_interaction(a, b);
        }
        network
    }

    /// Append a node; duplicate gene identifiers are rejected.
    pub fn add_gene(&mut self, gene: impl Into<String>) -> Result<NodeIndex> {
        let gene = gene.into();
        if self.index.contains_key(&gene) {
            return Err(GgiBenchError::InvalidNetwork(format!("duplicate gene identifier '{gene}'")));
        }
        let node = self.graph.add_node(gene.clone());
        self.index.insert(gene, node);
        Ok(node)
    }

    fn ensure_gene(&mut self, gene: &str) -> NodeIndex {
        match self.index.get(gene) {
            Some(&node) => node,
            None => {
                let node = self.graph.add_node(gene.to_string());
                self.index.insert(gene.to_string(), node);
                node
            }
        }
    }

    /// Connect two nodes. Returns `false` for self loops and existing edges.
    pub fn add_interaction(&mut self, a: NodeIndex, b: NodeIndex) -> bool {
        if a == b || self.graph.contains_edge(a, b) {
            return false;
        }
        self.graph.add_edge(a, b, ());
        true
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, gene: &str) -> Option<NodeIndex> {
        self.index.get(gene).copied()
    }

    pub fn contains_gene(&self, gene: &str) -> bool {
        self.index.contains_key(gene)
    }

    /// Gene identifier of a node.
    pub fn gene(&self, node: NodeIndex) -> &str {
        &self.graph[node]
    }

    /// Gene identifiers in node index order.
    pub fn genes(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(String::as_str)
    }

    /// Edges as `(source, target)` index pairs.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
        self.graph.edge_references().map(|e| (e.source(), e.target()))
    }

    pub fn neighbors(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(node)
    }

    pub fn degree(&self, node: NodeIndex) -> usize {
        self.graph.neighbors(node).count()
    }

    pub fn has_interaction(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.graph.contains_edge(a, b)
    }

    pub fn graph(&self) -> &UnGraph<String, ()> {
        &self.graph
    }

    /// Subnetwork induced by the genes satisfying `keep`, relabelled densely
    /// while preserving the relative node order.
    pub fn filter_genes<F>(&self, keep: F) -> Self
    where
        F: Fn(&str) -> bool,
    {
        let mut filtered = Self::new();
        let mut remap: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        for node in self.graph.node_indices() {
            let gene = &self.graph[node];
            if keep(gene) {
                remap.insert(node, filtered.ensure_gene(gene));
            }
        }
        for (a, b) in self.edges() {
            if let (Some(&a), Some(&b)) = (remap.get(&a), remap.get(&b)) {
                filtered.add_interaction(a, b);
            }
        }
        filtered
    }

    /// Restrict the network to the genes measured in `matrix`.
    pub fn restrict_to(&self, matrix: &ExpressionMatrix) -> Self {
        let filtered = self.filter_genes(|gene| matrix.contains_gene(gene));
        tracing::debug!(
            nodes_before = self.node_count(),
            nodes_after = filtered.node_count(),
            edges_after = filtered.edge_count(),
            "network restricted to expression genes"
        );
        filtered
    }
}
