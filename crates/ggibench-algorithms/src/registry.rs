//! Dispatch table from algorithm selectors to wrappers.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use ggibench_common::config::{ScoringConfig, ToolConfig};
use ggibench_common::{AlgorithmSelector, GgiBenchError, Result};
use ggibench_stats::MannWhitneyScorer;

use crate::external::ExternalToolWrapper;
use crate::tools::{ClustEx2, Diamond, Gxna, HotNet};
use crate::wrapper::AlgorithmWrapper;

/// Maps each [`AlgorithmSelector`] to the wrapper that runs it.
/// Build once at startup, then share via `Arc`.
pub struct AlgorithmRegistry {
    wrappers: HashMap<AlgorithmSelector, Arc<dyn AlgorithmWrapper>>,
}

impl AlgorithmRegistry {
    pub fn new() -> Self {
        Self { wrappers: HashMap::new() }
    }

    /// Register a wrapper under its own selector.
    ///
    /// # Panics
    /// If the algorithm is already registered.
    pub fn register<W: AlgorithmWrapper + 'static>(&mut self, wrapper: W) {
        self.register_arc(Arc::new(wrapper));
    }

    /// Register an already shared wrapper.
    ///
    /// # Panics
    /// If the algorithm is already registered.
    pub fn register_arc(&mut self, wrapper: Arc<dyn AlgorithmWrapper>) {
        let algorithm = wrapper.algorithm();
        assert!(
            !self.wrappers.contains_key(&algorithm),
            "Duplicate algorithm registration: {algorithm}"
        );
        self.wrappers.insert(algorithm, wrapper);
    }

    /// Wrapper for `algorithm`, or [`GgiBenchError::UnsupportedAlgorithm`].
    pub fn resolve(&self, algorithm: AlgorithmSelector) -> Result<Arc<dyn AlgorithmWrapper>> {
        self.wrappers
            .get(&algorithm)
            .cloned()
            .ok_or(GgiBenchError::UnsupportedAlgorithm(algorithm))
    }

    pub fn contains(&self, algorithm: AlgorithmSelector) -> bool {
        self.wrappers.contains_key(&algorithm)
    }

    /// Registered algorithms in selector order.
    pub fn algorithms(&self) -> Vec<AlgorithmSelector> {
        let mut algorithms: Vec<_> = self.wrappers.keys().copied().collect();
        algorithms.sort();
        algorithms
    }

    pub fn len(&self) -> usize { self.wrappers.len() }

    pub fn is_empty(&self) -> bool { self.wrappers.is_empty() }

    /// Registry of external wrappers for every algorithm with a configured tool.
    pub fn from_config(tools: &BTreeMap<AlgorithmSelector, ToolConfig>, scoring: &ScoringConfig) -> Self {
        let scorer = MannWhitneyScorer::new(scoring.mann_whitney_method);
        let mut registry = Self::new();
        for (&algorithm, config) in tools {
            let config = config.clone();
            match algorithm {
                AlgorithmSelector::Diamond => registry.register(ExternalToolWrapper::new(Diamond, config)),
                AlgorithmSelector::Gxna => registry.register(ExternalToolWrapper::new(Gxna, config)),
                AlgorithmSelector::Clustex2 => {
                    registry.register(ExternalToolWrapper::new(ClustEx2::new(scorer), config))
                }
                AlgorithmSelector::Hotnet => {
                    registry.register(ExternalToolWrapper::new(HotNet::new(scorer), config))
                }
            }
        }
        tracing::info!(algorithms = ?registry.algorithms(), "algorithm registry ready");
        registry
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockAlgorithmWrapper;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolve_registered() {
        let mut registry = AlgorithmRegistry::new();
        registry.register(MockAlgorithmWrapper::new(AlgorithmSelector::Diamond));
        assert_eq!(registry.len(), 1);
        let wrapper = registry.resolve(AlgorithmSelector::Diamond).unwrap();
        assert_eq!(wrapper.algorithm(), AlgorithmSelector::Diamond);
    }

    #[test]
    fn test_unregistered_algorithm_is_unsupported() {
        let mut registry = AlgorithmRegistry::new();
        registry.register(MockAlgorithmWrapper::new(AlgorithmSelector::Diamond));
        let err = registry.resolve(AlgorithmSelector::Hotnet).err().unwrap();
        assert!(matches!(err, GgiBenchError::UnsupportedAlgorithm(AlgorithmSelector::Hotnet)));
        assert!(err.to_string().contains("HOTNET"));
    }

    #[test]
    #[should_panic(expected = "Duplicate algorithm registration")]
    fn test_duplicate_registration_panics() {
        let mut registry = AlgorithmRegistry::new();
        registry.register(MockAlgorithmWrapper::new(AlgorithmSelector::Gxna));
        registry.register(MockAlgorithmWrapper::new(AlgorithmSelector::Gxna));
    }

    #[test]
    fn test_from_config_registers_configured_tools_only() {
        let mut tools = BTreeMap::new();
        tools.insert(AlgorithmSelector::Hotnet, ToolConfig::new("hotnet"));
        tools.insert(AlgorithmSelector::Diamond, ToolConfig::new("diamond"));
        let registry = AlgorithmRegistry::from_config(&tools, &ScoringConfig::default());

        assert_eq!(registry.algorithms(), vec![AlgorithmSelector::Diamond, AlgorithmSelector::Hotnet]);
        assert!(!registry.contains(AlgorithmSelector::Gxna));
        assert!(registry.resolve(AlgorithmSelector::Clustex2).is_err());
    }
}
