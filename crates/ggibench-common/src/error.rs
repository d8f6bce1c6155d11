use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::selectors::AlgorithmSelector;

/// Why a statistic could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum UndefinedReason {
    /// No seed gene could be mapped onto the network.
    EmptyInducedSubgraph,
    /// Pairwise statistics need at least two mapped seeds.
    TooFewSeeds { count: usize },
    /// Every seed pair lies in a different component of the network.
    NoReachablePairs { pairs: usize },
    /// None of the result module's genes is measured in the expression data.
    NoMeasuredModuleGenes { genes: usize },
}

impl std::fmt::Display for UndefinedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInducedSubgraph => write!(f, "induced subgraph has no nodes"),
            Self::TooFewSeeds { count } => {
                write!(f, "need at least two seed genes in the network, found {count}")
            }
            Self::NoReachablePairs { pairs } => {
                write!(f, "none of the {pairs} seed pairs is connected in the network")
            }
            Self::NoMeasuredModuleGenes { genes } => {
                write!(f, "none of the {genes} module genes is measured in the expression data")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum GgiBenchError {
    #[error("Data misalignment: {0}")]
    DataMisalignment(String),

    #[error("Invalid expression data: {0}")]
    InvalidExpression(String),

    #[error("Invalid GGI network: {0}")]
    InvalidNetwork(String),

    #[error("Undefined statistic: {0}")]
    UndefinedStatistic(UndefinedReason),

    #[error("Result module contains no gene of the expression matrix")]
    EmptyModule,

    #[error("Unsupported algorithm: {0} has no registered implementation")]
    UnsupportedAlgorithm(AlgorithmSelector),

    #[error("Execution of {algorithm} failed: {source}")]
    ExecutionFailed {
        algorithm: AlgorithmSelector,
        #[source]
        source: anyhow::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GgiBenchError {
    /// Wrap an arbitrary failure of an external algorithm run.
    pub fn execution_failed(algorithm: AlgorithmSelector, source: impl Into<anyhow::Error>) -> Self {
        Self::ExecutionFailed { algorithm, source: source.into() }
    }
}

pub type Result<T> = std::result::Result<T, GgiBenchError>;
