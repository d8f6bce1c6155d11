//! Seed gene extraction by thresholding gene p-values.

use ggibench_common::config::{MultipleTesting, SeedConfig};
use ggibench_common::{GeneScoreMap, SeedGeneSet};
use tracing::{debug, warn};

/// Strategy selecting the seed genes from a score map.
pub trait SeedExtractor: Send + Sync {
    fn name(&self) -> &str;

    fn extract(&self, scores: &GeneScoreMap) -> SeedGeneSet;
}

/// Selects every gene with `p < alpha / m`, `m` given by the correction.
///
/// Undefined scores are never selected. The result keeps the score map's
/// (expression column) order.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdExtractor {
    pub alpha: f64,
    pub correction: MultipleTesting,
}

impl Default for ThresholdExtractor {
    fn default() -> Self {
        Self::from(&SeedConfig::default())
    }
}

impl From<&SeedConfig> for ThresholdExtractor {
    fn from(config: &SeedConfig) -> Self {
        Self { alpha: config.alpha, correction: config.correction }
    }
}

impl ThresholdExtractor {
    pub fn new(alpha: f64, correction: MultipleTesting) -> Self {
        Self { alpha, correction }
    }

    /// The corrected threshold applied to `scores`.
    pub fn threshold(&self, scores: &GeneScoreMap) -> f64 {
        let tests = match self.correction {
            MultipleTesting::Bonferroni => scores.len(),
            MultipleTesting::BonferroniDefinedOnly => scores.defined_count(),
            MultipleTesting::Uncorrected => 1,
        };
        self.alpha / tests.max(1) as f64
    }
}

impl SeedExtractor for ThresholdExtractor {
    fn name(&self) -> &str {
        match self.correction {
            MultipleTesting::Bonferroni => "bonferroni",
            MultipleTesting::BonferroniDefinedOnly => "bonferroni_defined_only",
            MultipleTesting::Uncorrected => "uncorrected",
        }
    }

    fn extract(&self, scores: &GeneScoreMap) -> SeedGeneSet {
        let threshold = self.threshold(scores);
        let seeds = SeedGeneSet::new(
            scores
                .iter()
                .filter(|s| s.p_value.is_some_and(|p| p < threshold))
                .map(|s| s.gene_id.clone()),
        );

        if seeds.is_empty() {
            warn!(threshold, genes = scores.len(), "no gene passes the seed threshold");
        } else {
            debug!(threshold, seeds = seeds.len(), genes = scores.len(), "seed genes extracted");
        }
        seeds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::{DifferentialExpressionScorer, MannWhitneyScorer};
    use ggibench_common::GeneScore;
    use ggibench_test_utils::{separated_cohort, toy_cohort};
    use pretty_assertions::assert_eq;

    fn scores(entries: &[(&str, Option<f64>)]) -> GeneScoreMap {
        GeneScoreMap::from_scores(
            entries
                .iter()
                .map(|(g, p)| GeneScore { gene_id: g.to_string(), p_value: *p })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_bonferroni_uses_total_gene_count() {
        let map = scores(&[("A", Some(1e-4)), ("B", Some(3e-4)), ("C", None), ("D", Some(0.5))]);
        let extractor = ThresholdExtractor::default();
        assert!((extractor.threshold(&map) - 0.001 / 4.0).abs() < 1e-15);
        assert_eq!(extractor.extract(&map).genes(), &["A".to_string()]);
    }

    #[test]
    fn test_defined_only_denominator() {
        let map = scores(&[("A", Some(1e-4)), ("B", Some(3e-4)), ("C", None), ("D", Some(0.5))]);
        let extractor = ThresholdExtractor::new(0.001, MultipleTesting::BonferroniDefinedOnly);
        assert!((extractor.threshold(&map) - 0.001 / 3.0).abs() < 1e-15);
        assert_eq!(extractor.extract(&map).genes(), &["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_threshold_is_strict() {
        let map = scores(&[("A", Some(0.001)), ("B", Some(0.000_999))]);
        let seeds = ThresholdExtractor::new(0.001, MultipleTesting::Uncorrected).extract(&map);
        assert_eq!(seeds.genes(), &["B".to_string()]);
    }

    #[test]
    fn test_undefined_never_selected() {
        let map = scores(&[("A", None), ("B", None)]);
        let seeds = ThresholdExtractor::new(1.0, MultipleTesting::Uncorrected).extract(&map);
        assert!(seeds.is_empty());
    }

    #[test]
    fn test_empty_map_gives_empty_seeds() {
        let seeds = ThresholdExtractor::default().extract(&GeneScoreMap::default());
        assert!(seeds.is_empty());
    }

    #[test]
    fn test_monotonic_in_threshold() {
        let map = scores(&[
            ("A", Some(1e-6)),
            ("B", Some(2e-4)),
            ("C", Some(0.003)),
            ("D", Some(0.02)),
            ("E", Some(0.4)),
            ("F", None),
        ]);
        let mut previous = usize::MAX;
        for alpha in [1.0, 0.5, 0.1, 0.05, 0.01, 0.001, 1e-5, 1e-9] {
            let n = ThresholdExtractor::new(alpha, MultipleTesting::Bonferroni).extract(&map).len();
            assert!(n <= previous, "alpha {alpha} selected {n} > {previous}");
            previous = n;
        }
    }

    #[test]
    fn test_separating_gene_has_smallest_p_value() {
        let (matrix, phenotypes) = toy_cohort();
        let map = MannWhitneyScorer::default().score(&matrix, &phenotypes).unwrap();
        assert_eq!(map.len(), 5);

        let g1 = map.get("G1").unwrap().p_value.unwrap();
        assert!((g1 - 2.0 / 252.0).abs() < 1e-12);
        for score in map.iter().filter(|s| s.gene_id != "G1") {
            assert!(g1 < score.p_value.unwrap(), "{} has p <= G1", score.gene_id);
        }
    }

    #[test]
    fn test_identical_distribution_gene_excluded() {
        let (matrix, phenotypes) = toy_cohort();
        let map = MannWhitneyScorer::default().score(&matrix, &phenotypes).unwrap();
        assert_eq!(map.get("G2").unwrap().p_value, Some(1.0));

        // 2/252 is the smallest two-sided p-value five against five samples
        // can reach, so 0.001/5 selects nothing while 0.05/5 selects G1 only.
        assert!(ThresholdExtractor::default().extract(&map).is_empty());
        let seeds = ThresholdExtractor::new(0.05, MultipleTesting::Bonferroni).extract(&map);
        assert_eq!(seeds.genes(), &["G1".to_string()]);
    }

    #[test]
    fn test_separating_gene_selected_at_default_threshold_with_larger_cohort() {
        let (matrix, phenotypes) = separated_cohort(20);

        let map = MannWhitneyScorer::default().score(&matrix, &phenotypes).unwrap();
        let seeds = ThresholdExtractor::default().extract(&map);
        assert_eq!(seeds.genes(), &["G1".to_string()]);
    }
}
