//! ggibench-network: Gene-gene interaction networks and the topology
//! statistics computed on them.

pub mod graph;
pub mod statistics;
pub mod generators;
pub mod graphml;

pub use graph::GgiNetwork;
pub use statistics::{compute_seed_statistics, induced_mean_degree, SeedStatistics};
pub use generators::regenerate;
pub use graphml::parse_graphml;
