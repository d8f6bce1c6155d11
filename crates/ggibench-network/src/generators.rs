//! Null-model network generators.
//!
//! Every generator keeps the gene set and node count of its input. All
//! randomness comes from the caller's RNG so a run is reproducible from its
//! seed.

use std::collections::HashSet;
use std::sync::Arc;

use ggibench_common::{NetworkGeneratorSelector, Result};
use petgraph::graph::NodeIndex;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::graph::GgiNetwork;

/// Attempts per requested swap before the rewiring gives up.
const MAX_ATTEMPTS_PER_SWAP: usize = 100;

/// Produce the network a run executes on.
///
/// `Original` hands back the input itself; every other generator builds a
/// new network.
pub fn regenerate<R>(
    network: &Arc<GgiNetwork>,
    generator: NetworkGeneratorSelector,
    rng: &mut R,
) -> Result<Arc<GgiNetwork>>
where
    R: Rng + ?Sized,
{
    let generated = match generator {
        NetworkGeneratorSelector::Original => return Ok(Arc::clone(network)),
        NetworkGeneratorSelector::Rewired => rewired(network, rng)?,
        NetworkGeneratorSelector::Shuffled => shuffled(network, rng)?,
        NetworkGeneratorSelector::ScaleFree => scale_free(network, rng)?,
        NetworkGeneratorSelector::Uniform => uniform(network, rng)?,
    };
    debug!(
        generator = %generator,
        nodes = generated.node_count(),
        edges = generated.edge_count(),
        "network regenerated"
    );
    Ok(Arc::new(generated))
}

fn edge_list(network: &GgiNetwork) -> Vec<(usize, usize)> {
    network.edges().map(|(a, b)| (a.index(), b.index())).collect()
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

/// Degree-preserving double edge swaps: `(a, b), (c, d)` becomes
/// `(a, d), (c, b)` when neither new edge exists and no self loop appears.
fn rewired<R: Rng + ?Sized>(network: &GgiNetwork, rng: &mut R) -> Result<GgiNetwork> {
    let mut edges = edge_list(network);
    let requested = edges.len();
    if edges.len() < 2 {
        return GgiNetwork::from_edges(network.genes(), edges);
    }

    let mut present: HashSet<(usize, usize)> = edges.iter().map(|&(a, b)| ordered(a, b)).collect();
    let max_attempts = requested * MAX_ATTEMPTS_PER_SWAP;
    let mut swaps = 0;
    let mut attempts = 0;
    while swaps < requested && attempts < max_attempts {
        attempts += 1;
        let i = rng.gen_range(0..edges.len());
        let j = rng.gen_range(0..edges.len());
        if i == j {
            continue;
        }
        let (a, b) = edges[i];
        let (mut c, mut d) = edges[j];
        if rng.gen_bool(0.5) {
            std::mem::swap(&mut c, &mut d);
        }
        if a == d || c == b || a == c || b == d {
            continue;
        }
        let (e1, e2) = (ordered(a, d), ordered(c, b));
        if present.contains(&e1) || present.contains(&e2) {
            continue;
        }

        present.remove(&ordered(a, b));
        present.remove(&ordered(c, d));
        present.insert(e1);
        present.insert(e2);
        edges[i] = (a, d);
        edges[j] = (c, b);
        swaps += 1;
    }
    if swaps < requested {
        debug!(swaps, requested, attempts, "rewiring stopped before all swaps");
    }
    GgiNetwork::from_edges(network.genes(), edges)
}

/// Same topology, gene identifiers permuted over the nodes.
fn shuffled<R: Rng + ?Sized>(network: &GgiNetwork, rng: &mut R) -> Result<GgiNetwork> {
    let mut genes: Vec<&str> = network.genes().collect();
    genes.shuffle(rng);
    GgiNetwork::from_edges(genes, edge_list(network))
}

/// Barabási–Albert preferential attachment with `m = max(1, round(E / N))`
/// edges per new node.
fn scale_free<R: Rng + ?Sized>(network: &GgiNetwork, rng: &mut R) -> Result<GgiNetwork> {
    let n = network.node_count();
    let mut genes: Vec<&str> = network.genes().collect();
    genes.shuffle(rng);
    if n < 2 {
        return GgiNetwork::from_edges(genes, []);
    }

    let m = ((network.edge_count() as f64 / n as f64).round() as usize).clamp(1, n - 1);
    let mut edges = Vec::with_capacity((n - m) * m);
    let mut targets: Vec<usize> = (0..m).collect();
    // one entry per edge endpoint, so sampling from it is degree-proportional
    let mut repeated: Vec<usize> = Vec::with_capacity(2 * (n - m) * m);
    for source in m..n {
        for &target in &targets {
            edges.push((source, target));
        }
        repeated.extend_from_slice(&targets);
        repeated.extend(std::iter::repeat(source).take(m));

        let mut chosen: HashSet<usize> = HashSet::with_capacity(m);
        while chosen.len() < m {
            if let Some(&node) = repeated.choose(rng) {
                chosen.insert(node);
            }
        }
        targets = chosen.into_iter().collect();
        targets.sort_unstable();
    }
    GgiNetwork::from_edges(genes, edges)
}

/// Erdős–Rényi `G(n, m)` with the input's node and edge counts.
fn uniform<R: Rng + ?Sized>(network: &GgiNetwork, rng: &mut R) -> Result<GgiNetwork> {
    let n = network.node_count();
    let mut genes: Vec<&str> = network.genes().collect();
    genes.shuffle(rng);
    let max_edges = n * n.saturating_sub(1) / 2;
    let m = network.edge_count().min(max_edges);

    let mut generated = GgiNetwork::from_edges(genes, [])?;
    while generated.edge_count() < m {
        let a = rng.gen_range(0..n);
        let b = rng.gen_range(0..n);
        generated.add_interaction(NodeIndex::new(a), NodeIndex::new(b));
    }
    Ok(generated)
}
