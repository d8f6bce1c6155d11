//! Run descriptors and the records written for each run.

use std::fmt;

use chrono::{DateTime, Utc};
use ggibench_common::config::SelectionConfig;
use ggibench_common::{
    AlgorithmSelector, ConditionSelector, GeneScoreMap, GgiNetworkSelector, NetworkGeneratorSelector, ResultModule,
    SeedGeneSet, Statistic,
};
use ggibench_network::SeedStatistics;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One point of the configuration cross-product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BenchmarkRun {
    pub algorithm: AlgorithmSelector,
    pub network: GgiNetworkSelector,
    pub condition: ConditionSelector,
    pub generator: NetworkGeneratorSelector,
}

impl BenchmarkRun {
    /// Every combination of the selected values, algorithms varying slowest.
    pub fn cross_product(selection: &SelectionConfig) -> Vec<Self> {
        let mut runs = Vec::new();
        for &algorithm in &selection.algorithms {
            for &network in &selection.networks {
                for &condition in &selection.conditions {
                    for &generator in &selection.generators {
                        runs.push(Self { algorithm, network, condition, generator });
                    }
                }
            }
        }
        runs
    }
}

impl fmt::Display for BenchmarkRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}/{}", self.algorithm, self.network, self.condition, self.generator)
    }
}

/// Everything measured in one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub run: BenchmarkRun,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// KEGG pathways associated with the condition
    pub pathways: Vec<String>,
    pub n_samples: usize,
    pub n_genes: usize,
    /// Node and edge count of the network the algorithm ran on
    pub network_nodes: usize,
    pub network_edges: usize,
    pub seeds: SeedGeneSet,
    /// Measured on the original (not regenerated) network
    pub seed_statistics: SeedStatistics,
    pub result: ResultModule,
    /// Mean phenotype/expression mutual information of the result module, in
    /// nats. Undefined when no module gene is measured, e.g. after an empty
    /// seed set.
    pub mean_mutual_information: Statistic,
}

/// Seed extraction without an algorithm run.
#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub condition: ConditionSelector,
    pub network: GgiNetworkSelector,
    pub gene_p_values: GeneScoreMap,
    pub seeds: SeedGeneSet,
    pub seed_statistics: SeedStatistics,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cross_product_size_and_order() {
        let selection = SelectionConfig {
            algorithms: vec![AlgorithmSelector::Diamond, AlgorithmSelector::Gxna],
            networks: vec![GgiNetworkSelector::Hprd],
            conditions: vec![ConditionSelector::Lc, ConditionSelector::Hd],
            generators: vec![NetworkGeneratorSelector::Original, NetworkGeneratorSelector::Rewired],
        };
        let runs = BenchmarkRun::cross_product(&selection);
        assert_eq!(runs.len(), 8);
        assert_eq!(runs[0].to_string(), "DIAMOND/HPRD/GSE30219/ORIGINAL");
        assert_eq!(runs[7].to_string(), "GXNA/HPRD/GSE3790/REWIRED");
    }

    #[test]
    fn test_run_serializes_selector_names() {
        let run = BenchmarkRun {
            algorithm: AlgorithmSelector::Clustex2,
            network: GgiNetworkSelector::String,
            condition: ConditionSelector::Uc,
            generator: NetworkGeneratorSelector::ScaleFree,
        };
        let json = serde_json::to_value(run).unwrap();
        assert_eq!(json["algorithm"], "CLUSTEX2");
        assert_eq!(json["generator"], "SCALE_FREE");
    }
}
