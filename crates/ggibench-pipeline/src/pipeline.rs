//! Benchmark orchestration.
//!
//! A run walks the stages in a fixed order:
//!   1. resolve the algorithm wrapper (fail fast)
//!   2. load expression, phenotypes and network; align phenotypes
//!   3. score genes and extract seeds
//!   4. seed statistics on the original network
//!   5. regenerate the network
//!   6. invoke the algorithm
//!   7. meaningfulness of the result module

use std::sync::Arc;

use chrono::Utc;
use ggibench_algorithms::AlgorithmRegistry;
use ggibench_common::{
    BenchmarkConfig, ConditionSelector, ExpressionMatrix, GgiBenchError, GgiNetworkSelector, PhenotypeVector,
    Result, Statistic, UndefinedReason,
};
use ggibench_network::{compute_seed_statistics, regenerate, GgiNetwork};
use ggibench_stats::{
    sample_gene_p_values, DifferentialExpressionScorer, MannWhitneyScorer, MeaningfulnessScorer,
    MutualInformationScorer, SeedExtractor, ThresholdExtractor,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::providers::DataProvider;
use crate::report::{BenchmarkRun, RunReport, SeedReport};

/// Data of one condition and network, loaded and aligned.
struct LoadedData {
    matrix: ExpressionMatrix,
    phenotypes: PhenotypeVector,
    network: Arc<GgiNetwork>,
}

/// Runs benchmark combinations against a data provider and an algorithm
/// registry. Cheap to clone; every component is shared.
#[derive(Clone)]
pub struct Pipeline {
    provider: Arc<dyn DataProvider>,
    registry: Arc<AlgorithmRegistry>,
    scorer: Arc<dyn DifferentialExpressionScorer>,
    extractor: Arc<dyn SeedExtractor>,
    meaningfulness: Arc<dyn MeaningfulnessScorer>,
    rng_seed: u64,
    parallel_workers: usize,
}

impl Pipeline {
    /// Pipeline with the default scorer, extractor and meaningfulness score.
    pub fn new(provider: Arc<dyn DataProvider>, registry: Arc<AlgorithmRegistry>) -> Self {
        let defaults = BenchmarkConfig::default();
        Self {
            provider,
            registry,
            scorer: Arc::new(MannWhitneyScorer::default()),
            extractor: Arc::new(ThresholdExtractor::default()),
            meaningfulness: Arc::new(MutualInformationScorer::default()),
            rng_seed: defaults.execution.rng_seed,
            parallel_workers: defaults.execution.parallel_workers,
        }
    }

    pub fn from_config(
        config: &BenchmarkConfig,
        provider: Arc<dyn DataProvider>,
        registry: Arc<AlgorithmRegistry>,
    ) -> Self {
        Self::new(provider, registry)
            .with_scorer(MannWhitneyScorer::new(config.scoring.mann_whitney_method))
            .with_extractor(ThresholdExtractor::from(&config.seeds))
            .with_meaningfulness(MutualInformationScorer::new(config.scoring.mi_bins))
            .with_rng_seed(config.execution.rng_seed)
            .with_parallel_workers(config.execution.parallel_workers)
    }

    pub fn with_scorer(mut self, scorer: impl DifferentialExpressionScorer + 'static) -> Self {
        self.scorer = Arc::new(scorer);
        self
    }

    pub fn with_extractor(mut self, extractor: impl SeedExtractor + 'static) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    pub fn with_meaningfulness(mut self, meaningfulness: impl MeaningfulnessScorer + 'static) -> Self {
        self.meaningfulness = Arc::new(meaningfulness);
        self
    }

    /// Every run seeds its own RNG with this value, so the same generator
    /// produces the same network for every algorithm.
    pub fn with_rng_seed(mut self, rng_seed: u64) -> Self {
        self.rng_seed = rng_seed;
        self
    }

    pub fn with_parallel_workers(mut self, workers: usize) -> Self {
        self.parallel_workers = workers.max(1);
        self
    }

    pub fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    async fn load(&self, condition: ConditionSelector, network: GgiNetworkSelector) -> Result<LoadedData> {
        let (matrix, phenotypes) = tokio::try_join!(
            self.provider.load_expression(condition),
            self.provider.load_phenotypes(condition),
        )?;
        let phenotypes = phenotypes.align(&matrix)?;
        let network = self.provider.load_network(network, &matrix).await?;
        Ok(LoadedData { matrix, phenotypes, network: Arc::new(network) })
    }

    /// Gene p-values, seeds and seed statistics, without an algorithm run.
    pub async fn seeds(&self, condition: ConditionSelector, network: GgiNetworkSelector) -> Result<SeedReport> {
        let data = self.load(condition, network).await?;
        let gene_p_values = self.scorer.score(&data.matrix, &data.phenotypes)?;
        let seeds = self.extractor.extract(&gene_p_values);
        let seed_statistics = compute_seed_statistics(&data.network, &seeds);
        Ok(SeedReport { condition, network, gene_p_values, seeds, seed_statistics })
    }

    /// Per-sample two-sided normal p-values of the condition's expression
    /// values, for tools that score genes sample by sample.
    pub async fn sample_p_values(&self, condition: ConditionSelector) -> Result<ExpressionMatrix> {
        let matrix = self.provider.load_expression(condition).await?;
        let p_values = sample_gene_p_values(&matrix)?;
        debug!(%condition, samples = p_values.n_samples(), genes = p_values.n_genes(), "sample p-values computed");
        Ok(p_values)
    }

    /// Execute one benchmark combination.
    pub async fn run(&self, run: BenchmarkRun) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let wrapper = self.registry.resolve(run.algorithm)?;
        info!(%run_id, %run, "run started");

        let data = self.load(run.condition, run.network).await?;

        let scores = self.scorer.score(&data.matrix, &data.phenotypes)?;
        let seeds = self.extractor.extract(&scores);
        info!(
            %run_id,
            n_genes = scores.len(),
            n_seeds = seeds.len(),
            scorer = self.scorer.name(),
            extractor = self.extractor.name(),
            "seed genes extracted"
        );
        if seeds.is_empty() {
            warn!(%run_id, extractor = self.extractor.name(), "no gene passed the seed threshold");
        }

        let seed_statistics = compute_seed_statistics(&data.network, &seeds);
        if seed_statistics.seeds_missing > 0 {
            warn!(%run_id, missing = seed_statistics.seeds_missing, "seed genes absent from the network");
        }
        if seed_statistics.unreachable_pairs > 0 {
            warn!(
                %run_id,
                unreachable = seed_statistics.unreachable_pairs,
                "seed pairs without a connecting path excluded from the mean distance"
            );
        }

        let mut rng = StdRng::seed_from_u64(self.rng_seed);
        let network = regenerate(&data.network, run.generator, &mut rng)?;

        let result = wrapper.run(&network, &data.matrix, &data.phenotypes, &seeds).await?;
        let mean_mutual_information = match self.meaningfulness.score(&data.matrix, &data.phenotypes, &result.genes) {
            Ok(value) => Statistic::defined(value),
            Err(GgiBenchError::EmptyModule) => {
                Statistic::undefined(UndefinedReason::NoMeasuredModuleGenes { genes: result.genes.len() })
            }
            Err(e) => return Err(e),
        };

        let report = RunReport {
            run_id,
            run,
            started_at,
            finished_at: Utc::now(),
            pathways: run.condition.pathways().iter().map(|p| p.to_string()).collect(),
            n_samples: data.matrix.n_samples(),
            n_genes: data.matrix.n_genes(),
            network_nodes: network.node_count(),
            network_edges: network.edge_count(),
            seeds,
            seed_statistics,
            result,
            mean_mutual_information,
        };
        info!(
            %run_id,
            %run,
            module_size = report.result.genes.len(),
            mean_mi = ?report.mean_mutual_information.value(),
            "run finished"
        );
        Ok(report)
    }

    /// Execute `runs` concurrently, at most `parallel_workers` at a time.
    /// Results come back in input order.
    pub async fn run_all(&self, runs: Vec<BenchmarkRun>) -> Vec<Result<RunReport>> {
        let permits = Arc::new(Semaphore::new(self.parallel_workers));
        let handles: Vec<_> = runs
            .into_iter()
            .map(|run| {
                let pipeline = self.clone();
                let permits = Arc::clone(&permits);
                tokio::spawn(async move {
                    let _permit = permits
                        .acquire_owned()
                        .await
                        .map_err(|e| GgiBenchError::Other(anyhow::anyhow!("worker pool closed: {e}")))?;
                    pipeline.run(run).await
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            let result = handle
                .await
                .unwrap_or_else(|e| Err(GgiBenchError::Other(anyhow::anyhow!("run task failed: {e}"))));
            if let Err(e) = &result {
                warn!(error = %e, "run failed");
            }
            results.push(result);
        }
        results
    }
}
