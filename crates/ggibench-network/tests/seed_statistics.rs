//! Seed topology statistics on the shared fixture networks.

use std::sync::Arc;

use ggibench_common::{NetworkGeneratorSelector, SeedGeneSet, Statistic, UndefinedReason};
use ggibench_network::statistics::map_genes;
use ggibench_network::{compute_seed_statistics, induced_mean_degree, regenerate};
use ggibench_test_utils::{path_network, triangle_network};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_triangle_seeds() {
    let stats = compute_seed_statistics(&triangle_network(), &SeedGeneSet::new(["A", "B", "C"]));
    assert_eq!(stats.lcc_ratio, Statistic::defined(1.0));
    assert_eq!(stats.mean_shortest_distance, Statistic::defined(1.0));
    assert_eq!(stats.reachable_pairs, 3);
    assert_eq!(stats.unreachable_pairs, 0);
}

#[test]
fn test_single_seed() {
    let stats = compute_seed_statistics(&triangle_network(), &SeedGeneSet::new(["A"]));
    assert_eq!(stats.lcc_ratio, Statistic::defined(1.0));
    assert_eq!(
        stats.mean_shortest_distance,
        Statistic::undefined(UndefinedReason::TooFewSeeds { count: 1 })
    );
}

#[test]
fn test_no_seed_in_network() {
    let stats = compute_seed_statistics(&triangle_network(), &SeedGeneSet::new(["X", "Y"]));
    assert_eq!(stats.lcc_ratio, Statistic::undefined(UndefinedReason::EmptyInducedSubgraph));
    assert!(!stats.mean_shortest_distance.is_defined());
    assert_eq!(stats.seeds_missing, 2);
}

#[test]
fn test_duplicate_genes_mapped_once() {
    let (nodes, missing) = map_genes(&triangle_network(), ["A", "A", "Q"]);
    assert_eq!(nodes.len(), 1);
    assert_eq!(missing, 1);
}

#[test]
fn test_many_spread_seeds_on_long_path() {
    // seeds P0, P10, ..., P190: d(Pi, Pj) = |i - j| and the mean over all
    // 190 pairs of 20 evenly spaced seeds is 10 * 21 / 3
    let network = path_network(200);
    let genes: Vec<String> = (0..200).step_by(10).map(|i| format!("P{i}")).collect();
    let stats = compute_seed_statistics(&network, &SeedGeneSet::new(genes));

    assert_eq!(stats.seeds_in_network, 20);
    assert_eq!(stats.reachable_pairs, 190);
    assert_eq!(stats.unreachable_pairs, 0);
    assert_eq!(stats.mean_shortest_distance, Statistic::defined(70.0));
    // no two seeds are adjacent
    assert_eq!(stats.lcc_ratio, Statistic::defined(1.0 / 20.0));
}

#[test]
fn test_induced_mean_degree_of_path_segment() {
    let network = path_network(50);
    let segment: Vec<String> = (0..10).map(|i| format!("P{i}")).collect();
    // 9 edges over 10 genes
    assert_eq!(induced_mean_degree(&network, &segment), Statistic::defined(1.8));

    let scattered: Vec<String> = ["P0", "P2", "P4", "missing"].iter().map(|s| s.to_string()).collect();
    assert_eq!(induced_mean_degree(&network, &scattered), Statistic::defined(0.0));
}

#[test]
fn test_rewired_path_keeps_degrees() {
    let network = Arc::new(path_network(30));
    let mut rng = StdRng::seed_from_u64(3);
    let rewired = regenerate(&network, NetworkGeneratorSelector::Rewired, &mut rng).unwrap();

    assert_eq!(rewired.node_count(), 30);
    assert_eq!(rewired.edge_count(), 29);
    for gene in network.genes() {
        let before = network.degree(network.node(gene).unwrap());
        let after = rewired.degree(rewired.node(gene).unwrap());
        assert_eq!(before, after, "degree of {gene}");
    }
}
