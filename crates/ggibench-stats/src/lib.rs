//! ggibench-stats: Differential expression scoring, seed gene extraction
//! and meaningfulness scoring.
//!
//! Every stage sits behind a trait so stronger statistical strategies can
//! replace the defaults without touching the pipeline.

pub mod ranks;
pub mod mann_whitney;
pub mod scorer;
pub mod seeds;
pub mod meaningfulness;

pub use mann_whitney::{mann_whitney_u, MannWhitneyResult};
pub use scorer::{sample_gene_p_values, DifferentialExpressionScorer, MannWhitneyScorer};
pub use seeds::{SeedExtractor, ThresholdExtractor};
pub use meaningfulness::{MeaningfulnessScorer, MutualInformationScorer};
