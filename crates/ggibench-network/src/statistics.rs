//! Topology statistics of seed genes and result modules on a GGI network.

use std::collections::{HashMap, HashSet, VecDeque};

use ggibench_common::{SeedGeneSet, Statistic, UndefinedReason};
use petgraph::graph::NodeIndex;
use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::GgiNetwork;

/// Seed topology measured on a network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedStatistics {
    /// Largest connected component of the seed-induced subgraph over the
    /// number of seeds present in the network
    pub lcc_ratio: Statistic,
    /// Mean shortest path length over connected seed pairs
    pub mean_shortest_distance: Statistic,
    pub seeds_in_network: usize,
    pub seeds_missing: usize,
    pub reachable_pairs: usize,
    pub unreachable_pairs: usize,
}

/// Shortest path lengths between every unordered pair of a node set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairwiseDistances {
    pub total: usize,
    pub reachable: usize,
    pub unreachable: usize,
}

impl PairwiseDistances {
    pub fn mean(&self) -> Result<f64, UndefinedReason> {
        if self.reachable == 0 {
            return Err(UndefinedReason::NoReachablePairs { pairs: self.unreachable });
        }
        Ok(self.total as f64 / self.reachable as f64)
    }
}

/// Network nodes of the given genes, unknown genes skipped, duplicates kept once.
pub fn map_genes<'a, I>(network: &GgiNetwork, genes: I) -> (Vec<NodeIndex>, usize)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut nodes = Vec::new();
    let mut seen = HashSet::new();
    let mut missing = 0;
    for gene in genes {
        match network.node(gene) {
            Some(node) if seen.insert(node) => nodes.push(node),
            Some(_) => {}
            None => missing += 1,
        }
    }
    (nodes, missing)
}

/// Membership flags indexed by node.
fn node_mask(network: &GgiNetwork, nodes: &[NodeIndex]) -> Vec<bool> {
    let mut mask = vec![false; network.node_count()];
    for node in nodes {
        mask[node.index()] = true;
    }
    mask
}

/// Size of the largest connected component of the subgraph induced by
/// `nodes`, divided by `nodes.len()`.
pub fn lcc_ratio(network: &GgiNetwork, nodes: &[NodeIndex]) -> Result<f64, UndefinedReason> {
    if nodes.is_empty() {
        return Err(UndefinedReason::EmptyInducedSubgraph);
    }
    let position: HashMap<NodeIndex, usize> = nodes.iter().enumerate().map(|(i, &n)| (n, i)).collect();

    let mut components = UnionFind::<usize>::new(nodes.len());
    for (i, &node) in nodes.iter().enumerate() {
        for neighbor in network.neighbors(node) {
            if let Some(&j) = position.get(&neighbor) {
                components.union(i, j);
            }
        }
    }

    let mut sizes: HashMap<usize, usize> = HashMap::new();
    for label in components.into_labeling() {
        *sizes.entry(label).or_default() += 1;
    }
    let largest = sizes.values().copied().max().unwrap_or(0);
    Ok(largest as f64 / nodes.len() as f64)
}

/// Breadth-first shortest path lengths in the full network between every
/// unordered pair of `nodes`. Paths may run through any node.
pub fn pairwise_distances(network: &GgiNetwork, nodes: &[NodeIndex]) -> PairwiseDistances {
    let mut result = PairwiseDistances::default();
    let mut dist = vec![usize::MAX; network.node_count()];
    // nodes after the current source
    let mut is_target = node_mask(network, nodes);
    let mut touched: Vec<usize> = Vec::new();
    let mut queue = VecDeque::new();

    for (i, &source) in nodes.iter().enumerate() {
        is_target[source.index()] = false;
        let targets = &nodes[i + 1..];
        if targets.is_empty() {
            break;
        }

        dist[source.index()] = 0;
        touched.push(source.index());
        queue.push_back(source);
        let mut remaining = targets.len();
        while let Some(node) = queue.pop_front() {
            if remaining == 0 {
                break;
            }
            let d = dist[node.index()];
            for neighbor in network.neighbors(node) {
                if dist[neighbor.index()] != usize::MAX {
                    continue;
                }
                dist[neighbor.index()] = d + 1;
                touched.push(neighbor.index());
                if is_target[neighbor.index()] {
                    remaining -= 1;
                }
                queue.push_back(neighbor);
            }
        }

        for target in targets {
            match dist[target.index()] {
                usize::MAX => result.unreachable += 1,
                d => {
                    result.total += d;
                    result.reachable += 1;
                }
            }
        }

        queue.clear();
        for idx in touched.drain(..) {
            dist[idx] = usize::MAX;
        }
    }
    result
}

/// Mean shortest distance between seed pairs; disconnected pairs are left
/// out of the mean. Fewer than two seeds is undefined.
pub fn mean_shortest_distance(network: &GgiNetwork, nodes: &[NodeIndex]) -> Result<f64, UndefinedReason> {
    if nodes.len() < 2 {
        return Err(UndefinedReason::TooFewSeeds { count: nodes.len() });
    }
    pairwise_distances(network, nodes).mean()
}

/// LCC ratio and mean shortest distance of the seeds on `network`.
pub fn compute_seed_statistics(network: &GgiNetwork, seeds: &SeedGeneSet) -> SeedStatistics {
    let (nodes, missing) = map_genes(network, seeds.iter());

    let (mean_shortest_distance, reachable, unreachable) = if nodes.len() < 2 {
        (Err(UndefinedReason::TooFewSeeds { count: nodes.len() }), 0, 0)
    } else {
        let pairs = pairwise_distances(network, &nodes);
        (pairs.mean(), pairs.reachable, pairs.unreachable)
    };

    let stats = SeedStatistics {
        lcc_ratio: lcc_ratio(network, &nodes).into(),
        mean_shortest_distance: mean_shortest_distance.into(),
        seeds_in_network: nodes.len(),
        seeds_missing: missing,
        reachable_pairs: reachable,
        unreachable_pairs: unreachable,
    };
    debug!(
        seeds = nodes.len(),
        missing,
        unreachable_pairs = unreachable,
        "seed statistics computed"
    );
    stats
}

/// Mean degree `2|E| / |V|` of the subgraph induced by `genes`.
pub fn induced_mean_degree(network: &GgiNetwork, genes: &[String]) -> Statistic {
    let (nodes, _) = map_genes(network, genes.iter().map(String::as_str));
    if nodes.is_empty() {
        return Statistic::undefined(UndefinedReason::EmptyInducedSubgraph);
    }
    let in_module = node_mask(network, &nodes);
    // every induced edge is seen from both ends
    let endpoints: usize = nodes
        .iter()
        .map(|&n| network.neighbors(n).filter(|m| in_module[m.index()]).count())
        .sum();
    Statistic::defined(endpoints as f64 / nodes.len() as f64)
}
