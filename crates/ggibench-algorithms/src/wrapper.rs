use async_trait::async_trait;
use ggibench_common::{AlgorithmSelector, ExpressionMatrix, PhenotypeVector, Result, ResultModule, SeedGeneSet};
use ggibench_network::GgiNetwork;

/// A network enrichment algorithm callable from the benchmark pipeline.
///
/// # Contract
/// - `network` is the network the run executes on (possibly regenerated).
/// - `phenotypes` are aligned to the rows of `matrix`.
/// - The returned module's `mean_degree` is measured in `network`.
/// - Failures of the underlying tool surface as
///   [`GgiBenchError::ExecutionFailed`](ggibench_common::GgiBenchError::ExecutionFailed).
#[async_trait]
pub trait AlgorithmWrapper: Send + Sync {
    /// Which algorithm this wrapper runs.
    fn algorithm(&self) -> AlgorithmSelector;

    async fn run(
        &self,
        network: &GgiNetwork,
        matrix: &ExpressionMatrix,
        phenotypes: &PhenotypeVector,
        seeds: &SeedGeneSet,
    ) -> Result<ResultModule>;
}
