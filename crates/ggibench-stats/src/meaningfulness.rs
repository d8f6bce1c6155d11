//! Biological meaningfulness of a result module.

use ggibench_common::{ExpressionMatrix, GgiBenchError, Phenotype, PhenotypeVector, Result};
use tracing::warn;

/// Strategy summarising how well a gene module relates to the phenotype.
///
/// Returns one non-negative real number.
pub trait MeaningfulnessScorer: Send + Sync {
    fn name(&self) -> &str;

    fn score(&self, matrix: &ExpressionMatrix, phenotypes: &PhenotypeVector, genes: &[String]) -> Result<f64>;
}

/// Mean mutual information (nats) between the phenotype and the discretised
/// expression of each module gene.
///
/// Expression is cut into equal-width bins; `bins` defaults to
/// `ceil(sqrt(n_samples))`, and never goes below 2. Module genes missing from
/// the matrix are skipped; a module with none left is [`GgiBenchError::EmptyModule`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MutualInformationScorer {
    pub bins: Option<usize>,
}

impl MutualInformationScorer {
    pub fn new(bins: Option<usize>) -> Self {
        Self { bins }
    }

    fn bin_count(&self, n_samples: usize) -> usize {
        self.bins
            .unwrap_or_else(|| (n_samples as f64).sqrt().ceil() as usize)
            .max(2)
    }
}

impl MeaningfulnessScorer for MutualInformationScorer {
    fn name(&self) -> &str {
        "mean_mutual_information"
    }

    fn score(&self, matrix: &ExpressionMatrix, phenotypes: &PhenotypeVector, genes: &[String]) -> Result<f64> {
        phenotypes.ensure_aligned(matrix)?;
        let bins = self.bin_count(matrix.n_samples());

        let mut values = Vec::with_capacity(matrix.n_samples());
        let mut total = 0.0;
        let mut scored = 0usize;
        for gene in genes {
            let Some(g) = matrix.gene_index(gene) else {
                continue;
            };
            values.clear();
            values.extend(matrix.column(g));
            total += mutual_information(&discretise(&values, bins), bins, phenotypes.labels());
            scored += 1;
        }

        if scored == 0 {
            return Err(GgiBenchError::EmptyModule);
        }
        if scored < genes.len() {
            warn!(skipped = genes.len() - scored, "module genes missing from expression matrix");
        }
        Ok(total / scored as f64)
    }
}

/// Equal-width bin index of every value.
fn discretise(values: &[f64], bins: usize) -> Vec<usize> {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let width = max - min;
    if !(width > 0.0) {
        return vec![0; values.len()];
    }
    values
        .iter()
        .map(|&v| (((v - min) / width * bins as f64) as usize).min(bins - 1))
        .collect()
}

/// I(X; Y) in nats from paired observations.
fn mutual_information(bins_of: &[usize], bins: usize, labels: &[Phenotype]) -> f64 {
    let n = bins_of.len();
    if n == 0 {
        return 0.0;
    }

    // joint[bin][label]
    let mut joint = vec![[0usize; 2]; bins];
    for (&b, &label) in bins_of.iter().zip(labels) {
        joint[b][u8::from(label) as usize] += 1;
    }
    let label_totals = [
        joint.iter().map(|row| row[0]).sum::<usize>() as f64,
        joint.iter().map(|row| row[1]).sum::<usize>() as f64,
    ];

    let n = n as f64;
    let mut mi = 0.0;
    for row in &joint {
        let bin_total = (row[0] + row[1]) as f64;
        for (label, &count) in row.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let c = count as f64;
            mi += c / n * (c * n / (bin_total * label_totals[label])).ln();
        }
    }
    // rounding can leave tiny negatives for independent variables
    mi.max(0.0)
}
