//! ggibench-common: Shared types, errors, selectors and configuration used
//! across all ggibench crates.

pub mod error;
pub mod entities;
pub mod selectors;
pub mod config;

// Re-export commonly used types
pub use error::{GgiBenchError, Result, UndefinedReason};
pub use entities::{
    ExpressionMatrix, GeneScore, GeneScoreMap, Phenotype, PhenotypeVector, ResultModule,
    SeedGeneSet, Statistic,
};
pub use selectors::{
    AlgorithmSelector, ConditionSelector, GgiNetworkSelector, NetworkGeneratorSelector, Selector,
};
pub use config::BenchmarkConfig;
