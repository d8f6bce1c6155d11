//! Core data model shared by every pipeline stage.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{GgiBenchError, Result, UndefinedReason};

// ── Expression matrix ────────────────────────────────────────────────────────

/// Samples × genes expression intensities, stored row-major.
///
/// Sample and gene identifiers are unique; every value is finite. The gene
/// columns define the gene universe considered downstream.
#[derive(Debug, Clone)]
pub struct ExpressionMatrix {
    sample_ids: Vec<String>,
    gene_ids: Vec<String>,
    values: Vec<f64>,
    gene_index: HashMap<String, usize>,
}

impl ExpressionMatrix {
    /// Build a matrix from row-major `values` (`sample_ids.len() * gene_ids.len()`).
    pub fn new(sample_ids: Vec<String>, gene_ids: Vec<String>, values: Vec<f64>) -> Result<Self> {
        let expected = sample_ids.len() * gene_ids.len();
        if values.len() != expected {
            return Err(GgiBenchError::InvalidExpression(format!(
                "expected {} values for {} samples x {} genes, got {}",
                expected,
                sample_ids.len(),
                gene_ids.len(),
                values.len()
            )));
        }
        ensure_unique("sample", &sample_ids)?;
        ensure_unique("gene", &gene_ids)?;
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            let n_genes = gene_ids.len();
            return Err(GgiBenchError::InvalidExpression(format!(
                "non-finite value for sample '{}', gene '{}'",
                sample_ids[pos / n_genes],
                gene_ids[pos % n_genes]
            )));
        }

        let gene_index = gene_ids
            .iter()
            .enumerate()
            .map(|(i, g)| (g.clone(), i))
            .collect();

        Ok(Self { sample_ids, gene_ids, values, gene_index })
    }

    /// Build a matrix from one row of values per sample.
    pub fn from_rows(sample_ids: Vec<String>, gene_ids: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != gene_ids.len()) {
            return Err(GgiBenchError::InvalidExpression(format!(
                "row {} has {} values, expected {}",
                i,
                row.len(),
                gene_ids.len()
            )));
        }
        Self::new(sample_ids, gene_ids, rows.into_iter().flatten().collect())
    }

    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    pub fn n_genes(&self) -> usize {
        self.gene_ids.len()
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    pub fn gene_ids(&self) -> &[String] {
        &self.gene_ids
    }

    /// Column position of a gene.
    pub fn gene_index(&self, gene: &str) -> Option<usize> {
        self.gene_index.get(gene).copied()
    }

    pub fn contains_gene(&self, gene: &str) -> bool {
        self.gene_index.contains_key(gene)
    }

    /// Values of one sample (a row).
    pub fn row(&self, sample: usize) -> &[f64] {
        let n = self.n_genes();
        &self.values[sample * n..(sample + 1) * n]
    }

    /// Values of one gene across samples (a column).
    pub fn column(&self, gene: usize) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().skip(gene).step_by(self.n_genes().max(1)).copied()
    }
}

fn ensure_unique(kind: &str, ids: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id.as_str()) {
            return Err(GgiBenchError::InvalidExpression(format!("duplicate {kind} identifier '{id}'")));
        }
    }
    Ok(())
}

// ── Phenotypes ───────────────────────────────────────────────────────────────

/// Binary phenotype label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Phenotype {
    Control,
    Case,
}

impl TryFrom<u8> for Phenotype {
    type Error = GgiBenchError;

    fn try_from(label: u8) -> Result<Self> {
        match label {
            0 => Ok(Self::Control),
            1 => Ok(Self::Case),
            other => Err(GgiBenchError::InvalidExpression(format!(
                "phenotype label must be 0 or 1, got {other}"
            ))),
        }
    }
}

impl From<Phenotype> for u8 {
    fn from(p: Phenotype) -> u8 {
        match p {
            Phenotype::Control => 0,
            Phenotype::Case => 1,
        }
    }
}

/// One phenotype label per sample.
///
/// Either keyed by sample identifier, or positional (implicitly in matrix
/// row order). [`PhenotypeVector::align`] turns both into a vector keyed by
/// the matrix's own sample order.
#[derive(Debug, Clone, PartialEq)]
pub struct PhenotypeVector {
    sample_ids: Option<Vec<String>>,
    labels: Vec<Phenotype>,
}

impl PhenotypeVector {
    /// Labels keyed by sample identifier. Duplicate identifiers are rejected.
    pub fn by_sample(entries: Vec<(String, Phenotype)>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(entries.len());
        for (id, _) in &entries {
            if !seen.insert(id.as_str()) {
                return Err(GgiBenchError::DataMisalignment(format!(
                    "sample '{id}' has more than one phenotype label"
                )));
            }
        }
        let (sample_ids, labels) = entries.into_iter().unzip();
        Ok(Self { sample_ids: Some(sample_ids), labels })
    }

    /// Labels in matrix row order, without identifiers.
    pub fn positional(labels: Vec<Phenotype>) -> Self {
        Self { sample_ids: None, labels }
    }

    /// Reorder the labels to match the matrix rows.
    ///
    /// Fails with [`GgiBenchError::DataMisalignment`] when the sample sets
    /// differ (or, for positional labels, when the lengths differ).
    pub fn align(&self, matrix: &ExpressionMatrix) -> Result<Self> {
        let Some(ids) = &self.sample_ids else {
            if self.labels.len() != matrix.n_samples() {
                return Err(GgiBenchError::DataMisalignment(format!(
                    "{} phenotype labels for {} expression samples",
                    self.labels.len(),
                    matrix.n_samples()
                )));
            }
            return Ok(Self {
                sample_ids: Some(matrix.sample_ids().to_vec()),
                labels: self.labels.clone(),
            });
        };

        let by_id: HashMap<&str, Phenotype> = ids
            .iter()
            .map(String::as_str)
            .zip(self.labels.iter().copied())
            .collect();

        let mut labels = Vec::with_capacity(matrix.n_samples());
        let mut missing = Vec::new();
        for sample in matrix.sample_ids() {
            match by_id.get(sample.as_str()) {
                Some(&p) => labels.push(p),
                None => missing.push(sample.as_str()),
            }
        }
        if !missing.is_empty() {
            return Err(GgiBenchError::DataMisalignment(format!(
                "{} expression samples have no phenotype label (first: '{}')",
                missing.len(),
                missing[0]
            )));
        }
        if ids.len() != matrix.n_samples() {
            return Err(GgiBenchError::DataMisalignment(format!(
                "{} phenotype labels refer to samples absent from the expression matrix",
                ids.len() - matrix.n_samples()
            )));
        }

        Ok(Self { sample_ids: Some(matrix.sample_ids().to_vec()), labels })
    }

    /// Check that this vector is already in the matrix's row order.
    pub fn ensure_aligned(&self, matrix: &ExpressionMatrix) -> Result<()> {
        let same_ids = self
            .sample_ids
            .as_deref()
            .map_or(true, |ids| ids == matrix.sample_ids());
        if self.labels.len() != matrix.n_samples() || !same_ids {
            return Err(GgiBenchError::DataMisalignment(
                "phenotype vector is not aligned to the expression matrix rows".to_string(),
            ));
        }
        Ok(())
    }

    pub fn labels(&self) -> &[Phenotype] {
        &self.labels
    }

    pub fn sample_ids(&self) -> Option<&[String]> {
        self.sample_ids.as_deref()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn case_count(&self) -> usize {
        self.labels.iter().filter(|&&p| p == Phenotype::Case).count()
    }

    pub fn control_count(&self) -> usize {
        self.labels.len() - self.case_count()
    }
}

// ── Gene scores ──────────────────────────────────────────────────────────────

/// Significance of one gene; `p_value` is `None` when the test is undefined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneScore {
    pub gene_id: String,
    pub p_value: Option<f64>,
}

/// Gene identifier → p-value, in expression column order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct GeneScoreMap {
    scores: Vec<GeneScore>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl GeneScoreMap {
    pub fn from_scores(scores: Vec<GeneScore>) -> Result<Self> {
        let mut index = HashMap::with_capacity(scores.len());
        for (i, s) in scores.iter().enumerate() {
            if index.insert(s.gene_id.clone(), i).is_some() {
                return Err(GgiBenchError::InvalidExpression(format!(
                    "gene '{}' scored more than once",
                    s.gene_id
                )));
            }
        }
        Ok(Self { scores, index })
    }

    pub fn get(&self, gene: &str) -> Option<&GeneScore> {
        self.index.get(gene).map(|&i| &self.scores[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneScore> {
        self.scores.iter()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Number of genes whose test was defined.
    pub fn defined_count(&self) -> usize {
        self.scores.iter().filter(|s| s.p_value.is_some()).count()
    }
}

// ── Seeds ────────────────────────────────────────────────────────────────────

/// Ordered, duplicate-free list of seed gene identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeedGeneSet {
    genes: Vec<String>,
}

impl SeedGeneSet {
    /// Keeps the first occurrence of every gene.
    pub fn new<I, S>(genes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let genes = genes
            .into_iter()
            .map(Into::into)
            .filter(|g: &String| seen.insert(g.clone()))
            .collect();
        Self { genes }
    }

    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.genes.iter().map(String::as_str)
    }

    pub fn contains(&self, gene: &str) -> bool {
        self.genes.iter().any(|g| g == gene)
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

// ── Statistics and results ───────────────────────────────────────────────────

/// A scalar that is either defined or carries the reason it is not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Statistic {
    Defined { value: f64 },
    Undefined { reason: UndefinedReason },
}

impl Statistic {
    pub fn defined(value: f64) -> Self {
        Self::Defined { value }
    }

    pub fn undefined(reason: UndefinedReason) -> Self {
        Self::Undefined { reason }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Defined { value } => Some(*value),
            Self::Undefined { .. } => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Self::Defined { .. })
    }

    /// Convert into a `Result`, mapping undefined to [`GgiBenchError::UndefinedStatistic`].
    pub fn into_result(self) -> Result<f64> {
        match self {
            Self::Defined { value } => Ok(value),
            Self::Undefined { reason } => Err(GgiBenchError::UndefinedStatistic(reason)),
        }
    }
}

impl From<std::result::Result<f64, UndefinedReason>> for Statistic {
    fn from(r: std::result::Result<f64, UndefinedReason>) -> Self {
        match r {
            Ok(value) => Self::Defined { value },
            Err(reason) => Self::Undefined { reason },
        }
    }
}

/// Output of one algorithm invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultModule {
    /// Genes of the enriched module.
    pub genes: Vec<String>,
    /// Mean degree of the subgraph induced by `genes`.
    pub mean_degree: Statistic,
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(prefix: &str, n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("{prefix}{i}")).collect()
    }

    #[test]
    fn test_matrix_columns_and_rows() {
        let m = ExpressionMatrix::from_rows(
            ids("S", 3),
            ids("G", 2),
            vec![vec![1.0, 10.0], vec![2.0, 20.0], vec![3.0, 30.0]],
        )
        .unwrap();
        assert_eq!(m.column(1).collect::<Vec<_>>(), vec![10.0, 20.0, 30.0]);
        assert_eq!(m.row(2), &[3.0, 30.0]);
        assert_eq!(m.gene_index("G2"), Some(1));
        assert!(!m.contains_gene("G3"));
    }

    #[test]
    fn test_matrix_rejects_duplicates_and_nan() {
        let dup = ExpressionMatrix::new(ids("S", 1), vec!["G".into(), "G".into()], vec![1.0, 2.0]);
        assert!(matches!(dup, Err(GgiBenchError::InvalidExpression(_))));

        let nan = ExpressionMatrix::new(ids("S", 1), ids("G", 2), vec![1.0, f64::NAN]);
        let msg = nan.unwrap_err().to_string();
        assert!(msg.contains("'G2'"), "{msg}");
    }

    #[test]
    fn test_align_reorders_by_sample_id() {
        let m = ExpressionMatrix::new(ids("S", 3), ids("G", 1), vec![0.0, 0.0, 0.0]).unwrap();
        let p = PhenotypeVector::by_sample(vec![
            ("S3".to_string(), Phenotype::Case),
            ("S1".to_string(), Phenotype::Control),
            ("S2".to_string(), Phenotype::Case),
        ])
        .unwrap();
        let aligned = p.align(&m).unwrap();
        assert_eq!(aligned.labels(), &[Phenotype::Control, Phenotype::Case, Phenotype::Case]);
        assert!(aligned.ensure_aligned(&m).is_ok());
        assert!(p.ensure_aligned(&m).is_err());
    }

    #[test]
    fn test_align_detects_missing_and_extra_samples() {
        let m = ExpressionMatrix::new(ids("S", 2), ids("G", 1), vec![0.0, 0.0]).unwrap();
        let missing = PhenotypeVector::by_sample(vec![("S1".to_string(), Phenotype::Case)]).unwrap();
        assert!(matches!(missing.align(&m), Err(GgiBenchError::DataMisalignment(_))));

        let extra = PhenotypeVector::by_sample(vec![
            ("S1".to_string(), Phenotype::Case),
            ("S2".to_string(), Phenotype::Case),
            ("S9".to_string(), Phenotype::Control),
        ])
        .unwrap();
        assert!(matches!(extra.align(&m), Err(GgiBenchError::DataMisalignment(_))));

        let short = PhenotypeVector::positional(vec![Phenotype::Case]);
        assert!(matches!(short.align(&m), Err(GgiBenchError::DataMisalignment(_))));
    }

    #[test]
    fn test_duplicate_phenotype_label_rejected() {
        let dup = PhenotypeVector::by_sample(vec![
            ("S1".to_string(), Phenotype::Case),
            ("S1".to_string(), Phenotype::Control),
        ]);
        assert!(matches!(dup, Err(GgiBenchError::DataMisalignment(_))));
    }

    #[test]
    fn test_phenotype_label_conversion() {
        assert_eq!(Phenotype::try_from(1u8).unwrap(), Phenotype::Case);
        assert!(Phenotype::try_from(2u8).is_err());
        assert_eq!(u8::from(Phenotype::Control), 0);
    }

    #[test]
    fn test_seed_set_dedups_preserving_order() {
        let seeds = SeedGeneSet::new(["B", "A", "B", "C"]);
        assert_eq!(seeds.genes(), &["B".to_string(), "A".to_string(), "C".to_string()]);
    }

    #[test]
    fn test_statistic_serialises_with_reason() {
        let s = Statistic::from(Err(UndefinedReason::TooFewSeeds { count: 1 }));
        let json = serde_json::to_value(s).unwrap();
        assert_eq!(json["status"], "undefined");
        assert_eq!(json["reason"]["kind"], "too_few_seeds");
        assert!(s.into_result().is_err());
        assert_eq!(Statistic::Defined { value: 2.0 }.value(), Some(2.0));
    }
}
