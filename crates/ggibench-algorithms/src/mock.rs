//! In-process stand-in for an external algorithm.

use std::collections::BTreeSet;

use async_trait::async_trait;
use ggibench_common::{
    AlgorithmSelector, ExpressionMatrix, GgiBenchError, PhenotypeVector, Result, ResultModule, SeedGeneSet,
};
use ggibench_network::{induced_mean_degree, GgiNetwork};

use crate::wrapper::AlgorithmWrapper;

/// Returns the seeds found in the network plus their direct neighbours,
/// or a configured failure. Deterministic; no process is spawned.
#[derive(Debug, Clone)]
pub struct MockAlgorithmWrapper {
    algorithm: AlgorithmSelector,
    failure: Option<String>,
}

impl MockAlgorithmWrapper {
    pub fn new(algorithm: AlgorithmSelector) -> Self {
        Self { algorithm, failure: None }
    }

    /// A wrapper whose every run fails with `message`.
    pub fn failing(algorithm: AlgorithmSelector, message: impl Into<String>) -> Self {
        Self { algorithm, failure: Some(message.into()) }
    }
}

#[async_trait]
impl AlgorithmWrapper for MockAlgorithmWrapper {
    fn algorithm(&self) -> AlgorithmSelector {
        self.algorithm
    }

    async fn run(
        &self,
        network: &GgiNetwork,
        _matrix: &ExpressionMatrix,
        _phenotypes: &PhenotypeVector,
        seeds: &SeedGeneSet,
    ) -> Result<ResultModule> {
        if let Some(message) = &self.failure {
            return Err(GgiBenchError::execution_failed(self.algorithm, anyhow::anyhow!(message.clone())));
        }

        let seed_nodes: Vec<_> = seeds.iter().filter_map(|s| network.node(s)).collect();
        let neighbours: BTreeSet<_> = seed_nodes
            .iter()
            .flat_map(|&n| network.neighbors(n))
            .filter(|n| !seed_nodes.contains(n))
            .collect();

        let genes: Vec<String> = seed_nodes
            .iter()
            .chain(neighbours.iter())
            .map(|&n| network.gene(n).to_string())
            .collect();
        let mean_degree = induced_mean_degree(network, &genes);
        Ok(ResultModule { genes, mean_degree })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ggibench_common::Statistic;
    use ggibench_test_utils::toy_cohort;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_seed_neighbourhood() {
        let (matrix, phenotypes) = toy_cohort();
        let network = GgiNetwork::from_gene_pairs([("A", "B"), ("B", "C"), ("C", "D")]);
        let seeds = SeedGeneSet::new(["B", "Z"]);

        let module = MockAlgorithmWrapper::new(AlgorithmSelector::Gxna)
            .run(&network, &matrix, &phenotypes, &seeds)
            .await
            .unwrap();
        assert_eq!(module.genes, vec!["B", "A", "C"]);
        // star around B: 2 edges over 3 nodes
        assert_eq!(module.mean_degree, Statistic::defined(4.0 / 3.0));
    }

    #[tokio::test]
    async fn test_failing_mock() {
        let (matrix, phenotypes) = toy_cohort();
        let network = GgiNetwork::from_gene_pairs([("A", "B")]);
        let err = MockAlgorithmWrapper::failing(AlgorithmSelector::Hotnet, "boom")
            .run(&network, &matrix, &phenotypes, &SeedGeneSet::new(["A"]))
            .await
            .unwrap_err();
        assert!(matches!(err, GgiBenchError::ExecutionFailed { algorithm: AlgorithmSelector::Hotnet, .. }));
        assert!(err.to_string().contains("boom"));
    }
}
