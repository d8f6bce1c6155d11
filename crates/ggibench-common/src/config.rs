//! Benchmark configuration.
//!
//! Read from `ggibench.toml` in the current directory, or from the path in the
//! `GGIBENCH_CONFIG` env var. YAML and JSON files are accepted too. Every
//! section has defaults, so an empty file is a valid configuration that runs
//! DIAMOnD on HPRD for lung cancer with the original network.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GgiBenchError, Result};
use crate::selectors::{
    AlgorithmSelector, ConditionSelector, GgiNetworkSelector, NetworkGeneratorSelector,
};

/// Complete benchmark configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Where the input data lives
    #[serde(default)]
    pub data: DataConfig,

    /// Selectors whose cross-product defines the runs
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Seed gene extraction
    #[serde(default)]
    pub seeds: SeedConfig,

    /// Differential expression and meaningfulness scoring
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Execution options
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// External tool per algorithm. Algorithms without an entry are unsupported.
    #[serde(default, deserialize_with = "deserialize_tools")]
    pub tools: BTreeMap<AlgorithmSelector, ToolConfig>,
}

/// Tool tables are keyed by algorithm name; keys go through `FromStr` so
/// every format rejects unknown algorithms the same way.
fn deserialize_tools<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<AlgorithmSelector, ToolConfig>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = BTreeMap::<String, ToolConfig>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(name, tool)| {
            name.parse::<AlgorithmSelector>()
                .map(|algorithm| (algorithm, tool))
                .map_err(serde::de::Error::custom)
        })
        .collect()
}

// ── Data ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root holding `networks/` and `conditions/`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf { PathBuf::from("../data") }

impl Default for DataConfig {
    fn default() -> Self {
        Self { data_dir: default_data_dir() }
    }
}

// ── Selection ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default = "default_algorithms")]
    pub algorithms: Vec<AlgorithmSelector>,

    #[serde(default = "default_networks")]
    pub networks: Vec<GgiNetworkSelector>,

    #[serde(default = "default_conditions")]
    pub conditions: Vec<ConditionSelector>,

    #[serde(default = "default_generators")]
    pub generators: Vec<NetworkGeneratorSelector>,
}

fn default_algorithms() -> Vec<AlgorithmSelector> { vec![AlgorithmSelector::Diamond] }
fn default_networks() -> Vec<GgiNetworkSelector> { vec![GgiNetworkSelector::Hprd] }
fn default_conditions() -> Vec<ConditionSelector> { vec![ConditionSelector::Lc] }
fn default_generators() -> Vec<NetworkGeneratorSelector> { vec![NetworkGeneratorSelector::Original] }

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            algorithms: default_algorithms(),
            networks: default_networks(),
            conditions: default_conditions(),
            generators: default_generators(),
        }
    }
}

// ── Seeds ────────────────────────────────────────────────────────────────────

/// Multiple-testing correction applied to the nominal threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultipleTesting {
    /// Divide by the number of genes tested, defined or not.
    #[default]
    Bonferroni,
    /// Divide by the number of genes whose test was defined.
    BonferroniDefinedOnly,
    /// Use the nominal threshold as is.
    Uncorrected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Nominal family-wise significance level
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    #[serde(default)]
    pub correction: MultipleTesting,
}

fn default_alpha() -> f64 { 0.001 }

impl Default for SeedConfig {
    fn default() -> Self {
        Self { alpha: default_alpha(), correction: MultipleTesting::default() }
    }
}

// ── Scoring ──────────────────────────────────────────────────────────────────

/// How Mann-Whitney U p-values are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MannWhitneyMethod {
    /// Exact for small tie-free samples, normal approximation otherwise.
    #[default]
    Auto,
    /// Exact null distribution (falls back to asymptotic when ties are present).
    Exact,
    /// Normal approximation with tie and continuity correction.
    Asymptotic,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub mann_whitney_method: MannWhitneyMethod,

    /// Bins used to discretise expression for mutual information.
    /// Defaults to `ceil(sqrt(n_samples))`.
    #[serde(default)]
    pub mi_bins: Option<usize>,
}

// ── Execution ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Benchmark runs executed concurrently
    #[serde(default = "default_workers")]
    pub parallel_workers: usize,

    /// Seed for network regeneration
    #[serde(default = "default_rng_seed")]
    pub rng_seed: u64,

    /// JSON-lines report destination; stdout when absent
    #[serde(default)]
    pub output: Option<PathBuf>,
}

fn default_workers() -> usize { 4 }
fn default_rng_seed() -> u64 { 42 }

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            parallel_workers: default_workers(),
            rng_seed: default_rng_seed(),
            output: None,
        }
    }
}

// ── External tools ───────────────────────────────────────────────────────────

/// How to launch the external implementation of one algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Executable (or interpreter) to run
    pub executable: PathBuf,

    /// Arguments placed before the generated ones (e.g. a script path)
    #[serde(default)]
    pub args: Vec<String>,

    /// Number of genes DIAMOnD adds to the seeds
    #[serde(default = "default_added_nodes")]
    pub added_nodes: usize,

    /// Kill the tool after this many seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_added_nodes() -> usize { 200 }

impl ToolConfig {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            args: vec![],
            added_nodes: default_added_nodes(),
            timeout_secs: None,
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────────────────

impl BenchmarkConfig {
    /// Load from `GGIBENCH_CONFIG`, else `ggibench.toml`.
    ///
    /// A missing default file yields the default configuration; a missing
    /// file named by the env var is an error.
    pub fn load() -> Result<Self> {
        match std::env::var("GGIBENCH_CONFIG") {
            Ok(path) => Self::from_path(&path),
            Err(_) if Path::new("ggibench.toml").exists() => Self::from_path("ggibench.toml"),
            Err(_) => {
                tracing::info!("ggibench.toml not found, using default configuration");
                Ok(Self::default())
            }
        }
    }

    /// Load a TOML, YAML or JSON file, chosen by extension (TOML otherwise).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(GgiBenchError::Config(format!("config file not found: {}", path.display())));
        }
        let content = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content)?,
            Some("json") => Self::from_json_str(&content)?,
            _ => Self::from_toml_str(&content)?,
        };
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| GgiBenchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| GgiBenchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| GgiBenchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no run could use.
    pub fn validate(&self) -> Result<()> {
        if !(self.seeds.alpha > 0.0 && self.seeds.alpha <= 1.0) {
            return Err(GgiBenchError::Config(format!(
                "seeds.alpha must be in (0, 1], got {}",
                self.seeds.alpha
            )));
        }
        if self.execution.parallel_workers == 0 {
            return Err(GgiBenchError::Config("execution.parallel_workers must be at least 1".into()));
        }
        if self.scoring.mi_bins.is_some_and(|b| b < 2) {
            return Err(GgiBenchError::Config("scoring.mi_bins must be at least 2".into()));
        }
        let s = &self.selection;
        if s.algorithms.is_empty() || s.networks.is_empty() || s.conditions.is_empty() || s.generators.is_empty() {
            return Err(GgiBenchError::Config(
                "selection lists (algorithms, networks, conditions, generators) must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Number of runs in the selection cross-product.
    pub fn run_count(&self) -> usize {
        let s = &self.selection;
        s.algorithms.len() * s.networks.len() * s.conditions.len() * s.generators.len()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        let config = BenchmarkConfig::from_toml_str("").unwrap();
        assert_eq!(config.selection.algorithms, vec![AlgorithmSelector::Diamond]);
        assert_eq!(config.selection.generators, vec![NetworkGeneratorSelector::Original]);
        assert!((config.seeds.alpha - 0.001).abs() < 1e-12);
        assert_eq!(config.seeds.correction, MultipleTesting::Bonferroni);
        assert!(config.tools.is_empty());
        assert_eq!(config.run_count(), 1);
    }

    #[test]
    fn test_full_toml() {
        let toml = r#"
            [data]
            data_dir = "/srv/data"

            [selection]
            algorithms = ["DIAMOND", "HOTNET"]
            networks = ["HPRD", "STRING"]
            conditions = ["LC", "GSE3790"]
            generators = ["ORIGINAL", "SCALE_FREE"]

            [seeds]
            alpha = 0.01
            correction = "bonferroni_defined_only"

            [scoring]
            mann_whitney_method = "asymptotic"
            mi_bins = 5

            [tools.DIAMOND]
            executable = "python3"
            args = ["DIAMOnD.py"]
            added_nodes = 50
        "#;
        let config = BenchmarkConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.data.data_dir, PathBuf::from("/srv/data"));
        assert_eq!(config.selection.conditions, vec![ConditionSelector::Lc, ConditionSelector::Hd]);
        assert_eq!(config.seeds.correction, MultipleTesting::BonferroniDefinedOnly);
        assert_eq!(config.scoring.mann_whitney_method, MannWhitneyMethod::Asymptotic);
        assert_eq!(config.run_count(), 16);

        let diamond = &config.tools[&AlgorithmSelector::Diamond];
        assert_eq!(diamond.added_nodes, 50);
        assert_eq!(diamond.args, vec!["DIAMOnD.py".to_string()]);
    }

    #[test]
    fn test_unknown_selector_rejected_at_parse_time() {
        let err = BenchmarkConfig::from_toml_str("[selection]\nalgorithms = [\"MAGIC\"]\n").unwrap_err();
        assert!(matches!(err, GgiBenchError::Config(_)));
    }

    #[test]
    fn test_selection_and_tool_keys_share_spelling_rules() {
        let toml = r#"
            [selection]
            algorithms = ["diamond", "Gxna"]
            conditions = ["gse30219"]

            [tools.diamond]
            executable = "python3"
        "#;
        let config = BenchmarkConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.selection.algorithms, vec![AlgorithmSelector::Diamond, AlgorithmSelector::Gxna]);
        assert_eq!(config.selection.conditions, vec![ConditionSelector::Lc]);
        assert!(config.tools.contains_key(&AlgorithmSelector::Diamond));
    }

    #[test]
    fn test_validation() {
        assert!(BenchmarkConfig::from_toml_str("[seeds]\nalpha = 0.0\n").is_err());
        assert!(BenchmarkConfig::from_toml_str("[execution]\nparallel_workers = 0\n").is_err());
        assert!(BenchmarkConfig::from_toml_str("[selection]\nnetworks = []\n").is_err());
        assert!(BenchmarkConfig::from_toml_str("[scoring]\nmi_bins = 1\n").is_err());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = BenchmarkConfig::default();
        config.tools.insert(AlgorithmSelector::Gxna, ToolConfig::new("/opt/gxna/gxna"));
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed = BenchmarkConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed.tools[&AlgorithmSelector::Gxna].executable, PathBuf::from("/opt/gxna/gxna"));
    }
}
