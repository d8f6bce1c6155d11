//! Per-gene differential expression scoring.

use ggibench_common::config::MannWhitneyMethod;
use ggibench_common::{ExpressionMatrix, GeneScore, GeneScoreMap, Phenotype, PhenotypeVector, Result};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, warn};

use crate::mann_whitney::mann_whitney_u;

/// Strategy turning expression + phenotypes into one p-value per gene.
///
/// Implementations must return exactly one entry per expression column, in
/// column order, and mark genes whose test is undefined with `None`.
pub trait DifferentialExpressionScorer: Send + Sync {
    fn name(&self) -> &str;

    /// `phenotypes` must already be aligned to the matrix rows.
    fn score(&self, matrix: &ExpressionMatrix, phenotypes: &PhenotypeVector) -> Result<GeneScoreMap>;
}

/// Two-sided Mann-Whitney U test, cases against controls.
#[derive(Debug, Clone, Copy, Default)]
pub struct MannWhitneyScorer {
    pub method: MannWhitneyMethod,
}

impl MannWhitneyScorer {
    pub fn new(method: MannWhitneyMethod) -> Self {
        Self { method }
    }
}

impl DifferentialExpressionScorer for MannWhitneyScorer {
    fn name(&self) -> &str {
        "mann_whitney_u"
    }

    fn score(&self, matrix: &ExpressionMatrix, phenotypes: &PhenotypeVector) -> Result<GeneScoreMap> {
        phenotypes.ensure_aligned(matrix)?;

        let (cases, controls): (Vec<usize>, Vec<usize>) = (0..matrix.n_samples())
            .partition(|&s| phenotypes.labels()[s] == Phenotype::Case);
        if cases.is_empty() || controls.is_empty() {
            warn!(
                cases = cases.len(),
                controls = controls.len(),
                "only one phenotype group present, every gene score is undefined"
            );
        }

        let mut case_values = Vec::with_capacity(cases.len());
        let mut control_values = Vec::with_capacity(controls.len());
        let mut scores = Vec::with_capacity(matrix.n_genes());
        for (g, gene_id) in matrix.gene_ids().iter().enumerate() {
            case_values.clear();
            control_values.clear();
            for (s, value) in matrix.column(g).enumerate() {
                match phenotypes.labels()[s] {
                    Phenotype::Case => case_values.push(value),
                    Phenotype::Control => control_values.push(value),
                }
            }
            let p_value = mann_whitney_u(&case_values, &control_values, self.method).map(|r| r.p_value);
            scores.push(GeneScore { gene_id: gene_id.clone(), p_value });
        }

        let map = GeneScoreMap::from_scores(scores)?;
        debug!(
            genes = map.len(),
            undefined = map.len() - map.defined_count(),
            cases = cases.len(),
            controls = controls.len(),
            "gene p-values computed"
        );
        Ok(map)
    }
}

/// Transform expression values to two-sided standard-normal p-values,
/// `2 · sf(|x|)`, keeping the matrix shape and identifiers.
pub fn sample_gene_p_values(matrix: &ExpressionMatrix) -> Result<ExpressionMatrix> {
    let normal = Normal::new(0.0, 1.0).map_err(|e| anyhow::anyhow!("standard normal: {e}"))?;
    let values = (0..matrix.n_samples())
        .flat_map(|s| matrix.row(s).iter().map(|&x| 2.0 * normal.sf(x.abs())).collect::<Vec<_>>())
        .collect();
    ExpressionMatrix::new(matrix.sample_ids().to_vec(), matrix.gene_ids().to_vec(), values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ggibench_common::GgiBenchError;
    use pretty_assertions::assert_eq;

    /// 6 samples (3 case, 3 control) × 3 genes: G1 separates, G2 mixed, G3 constant.
    fn fixture() -> (ExpressionMatrix, PhenotypeVector) {
        let samples: Vec<String> = (1..=6).map(|i| format!("S{i}")).collect();
        let genes = vec!["G1".to_string(), "G2".to_string(), "G3".to_string()];
        let rows = vec![
            vec![9.0, 1.0, 4.0],
            vec![8.0, 5.0, 4.0],
            vec![7.0, 3.0, 4.0],
            vec![1.0, 2.0, 4.0],
            vec![2.0, 6.0, 4.0],
            vec![3.0, 4.0, 4.0],
        ];
        let matrix = ExpressionMatrix::from_rows(samples, genes, rows).unwrap();
        let labels = [1u8, 1, 1, 0, 0, 0].map(|l| Phenotype::try_from(l).unwrap()).to_vec();
        (matrix, PhenotypeVector::positional(labels))
    }

    #[test]
    fn test_one_score_per_gene_in_column_order() {
        let (matrix, phenotypes) = fixture();
        let phenotypes = phenotypes.align(&matrix).unwrap();
        let map = MannWhitneyScorer::default().score(&matrix, &phenotypes).unwrap();

        let genes: Vec<&str> = map.iter().map(|s| s.gene_id.as_str()).collect();
        assert_eq!(genes, vec!["G1", "G2", "G3"]);
        assert!((map.get("G1").unwrap().p_value.unwrap() - 0.1).abs() < 1e-12);
        assert!(map.get("G2").unwrap().p_value.unwrap() > 0.1);
    }

    #[test]
    fn test_constant_gene_is_undefined() {
        let (matrix, phenotypes) = fixture();
        let phenotypes = phenotypes.align(&matrix).unwrap();
        let map = MannWhitneyScorer::default().score(&matrix, &phenotypes).unwrap();
        assert_eq!(map.get("G3").unwrap().p_value, None);
        assert_eq!(map.defined_count(), 2);
    }

    #[test]
    fn test_single_group_gives_all_undefined() {
        let (matrix, _) = fixture();
        let phenotypes = PhenotypeVector::positional(vec![Phenotype::Case; 6]).align(&matrix).unwrap();
        let map = MannWhitneyScorer::default().score(&matrix, &phenotypes).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map.defined_count(), 0);
    }

    #[test]
    fn test_unaligned_phenotypes_rejected() {
        let (matrix, _) = fixture();
        let short = PhenotypeVector::positional(vec![Phenotype::Case; 2]);
        let err = MannWhitneyScorer::default().score(&matrix, &short).unwrap_err();
        assert!(matches!(err, GgiBenchError::DataMisalignment(_)));
    }

    #[test]
    fn test_sample_gene_p_values() {
        let matrix = ExpressionMatrix::new(
            vec!["S1".into()],
            vec!["A".into(), "B".into(), "C".into()],
            vec![0.0, 1.959963984540054, -1.959963984540054],
        )
        .unwrap();
        let p = sample_gene_p_values(&matrix).unwrap();
        assert!((p.row(0)[0] - 1.0).abs() < 1e-12);
        assert!((p.row(0)[1] - 0.05).abs() < 1e-9);
        assert!((p.row(0)[2] - 0.05).abs() < 1e-9);
        assert_eq!(p.gene_ids(), matrix.gene_ids());
    }
}
