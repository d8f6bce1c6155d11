//! Sources of expression data, phenotypes and GGI networks.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ggibench_common::{
    ConditionSelector, ExpressionMatrix, GgiBenchError, GgiNetworkSelector, Phenotype, PhenotypeVector, Result,
};
use ggibench_network::{parse_graphml, GgiNetwork};
use tracing::{debug, info};

/// Data access for one benchmark run.
///
/// Implementations can use:
/// - the on-disk data directory ([`FileDataProvider`])
/// - in-memory fixtures ([`MemoryDataProvider`])
#[async_trait]
pub trait DataProvider: Send + Sync {
    async fn load_expression(&self, condition: ConditionSelector) -> Result<ExpressionMatrix>;

    /// Labels as stored; callers align them to the matrix.
    async fn load_phenotypes(&self, condition: ConditionSelector) -> Result<PhenotypeVector>;

    /// The network restricted to the genes of `matrix`, relabelled densely.
    async fn load_network(&self, network: GgiNetworkSelector, matrix: &ExpressionMatrix) -> Result<GgiNetwork>;
}

// ── File provider ────────────────────────────────────────────────────────────

/// Reads the data directory layout:
///
/// ```text
/// {data_dir}/conditions/{accession}/expression_data.csv
/// {data_dir}/conditions/{accession}/phenotypes.csv
/// {data_dir}/networks/{NETWORK}.graphml
/// ```
#[derive(Debug, Clone)]
pub struct FileDataProvider {
    data_dir: PathBuf,
}

impl FileDataProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn condition_dir(&self, condition: ConditionSelector) -> PathBuf {
        self.data_dir.join("conditions").join(condition.accession())
    }

    pub fn expression_path(&self, condition: ConditionSelector) -> PathBuf {
        self.condition_dir(condition).join("expression_data.csv")
    }

    pub fn phenotypes_path(&self, condition: ConditionSelector) -> PathBuf {
        self.condition_dir(condition).join("phenotypes.csv")
    }

    pub fn network_path(&self, network: GgiNetworkSelector) -> PathBuf {
        self.data_dir.join("networks").join(format!("{network}.graphml"))
    }
}

async fn read_file(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        GgiBenchError::Io(std::io::Error::new(e.kind(), format!("{}: {e}", path.display())))
    })
}

/// Header `sample,<gene>...`, one row per sample.
pub fn parse_expression_csv(text: &str) -> Result<ExpressionMatrix> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();
    if headers.len() < 2 {
        return Err(GgiBenchError::InvalidExpression(
            "header needs a sample column and at least one gene".to_string(),
        ));
    }
    let gene_ids: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut sample_ids = Vec::new();
    let mut values = Vec::new();
    for record in reader.records() {
        let record = record?;
        let sample = record.get(0).unwrap_or_default().to_string();
        for (gene, field) in gene_ids.iter().zip(record.iter().skip(1)) {
            let value: f64 = field.parse().map_err(|_| {
                GgiBenchError::InvalidExpression(format!("sample '{sample}', gene '{gene}': '{field}' is not a number"))
            })?;
            values.push(value);
        }
        sample_ids.push(sample);
    }
    ExpressionMatrix::new(sample_ids, gene_ids, values)
}

/// Write `matrix` in the layout [`parse_expression_csv`] reads.
pub fn write_expression_csv<W: std::io::Write>(matrix: &ExpressionMatrix, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(std::iter::once("sample").chain(matrix.gene_ids().iter().map(String::as_str)))?;
    for (s, sample) in matrix.sample_ids().iter().enumerate() {
        let values = matrix.row(s).iter().map(f64::to_string);
        writer.write_record(std::iter::once(sample.clone()).chain(values))?;
    }
    writer.flush()?;
    Ok(())
}

fn parse_label(field: &str) -> Result<Phenotype> {
    let invalid = || GgiBenchError::DataMisalignment(format!("phenotype label '{field}' is not 0 or 1"));
    let value: f64 = field.parse().map_err(|_| invalid())?;
    if value == 0.0 {
        Ok(Phenotype::Control)
    } else if value == 1.0 {
        Ok(Phenotype::Case)
    } else {
        Err(invalid())
    }
}

/// Either `sample,phenotype` rows or a single positional `phenotype` column.
pub fn parse_phenotypes_csv(text: &str) -> Result<PhenotypeVector> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(text.as_bytes());
    let columns = reader.headers()?.len();
    match columns {
        1 => {
            let mut labels = Vec::new();
            for record in reader.records() {
                labels.push(parse_label(record?.get(0).unwrap_or_default())?);
            }
            Ok(PhenotypeVector::positional(labels))
        }
        2 => {
            let mut entries = Vec::new();
            for record in reader.records() {
                let record = record?;
                let sample = record.get(0).unwrap_or_default().to_string();
                entries.push((sample, parse_label(record.get(1).unwrap_or_default())?));
            }
            PhenotypeVector::by_sample(entries)
        }
        n => Err(GgiBenchError::DataMisalignment(format!(
            "phenotype file must have 1 or 2 columns, found {n}"
        ))),
    }
}

#[async_trait]
impl DataProvider for FileDataProvider {
    async fn load_expression(&self, condition: ConditionSelector) -> Result<ExpressionMatrix> {
        let path = self.expression_path(condition);
        let matrix = parse_expression_csv(&read_file(&path).await?)?;
        info!(
            %condition,
            samples = matrix.n_samples(),
            genes = matrix.n_genes(),
            "expression data loaded"
        );
        Ok(matrix)
    }

    async fn load_phenotypes(&self, condition: ConditionSelector) -> Result<PhenotypeVector> {
        let path = self.phenotypes_path(condition);
        let phenotypes = parse_phenotypes_csv(&read_file(&path).await?)?;
        debug!(%condition, labels = phenotypes.len(), "phenotypes loaded");
        Ok(phenotypes)
    }

    async fn load_network(&self, network: GgiNetworkSelector, matrix: &ExpressionMatrix) -> Result<GgiNetwork> {
        let path = self.network_path(network);
        let full = parse_graphml(&read_file(&path).await?)?;
        let restricted = full.restrict_to(matrix);
        info!(
            %network,
            nodes = restricted.node_count(),
            edges = restricted.edge_count(),
            dropped_nodes = full.node_count() - restricted.node_count(),
            "GGI network loaded"
        );
        Ok(restricted)
    }
}

// ── In-memory provider ───────────────────────────────────────────────────────

/// Provider over fixtures held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDataProvider {
    conditions: HashMap<ConditionSelector, (ExpressionMatrix, PhenotypeVector)>,
    networks: HashMap<GgiNetworkSelector, GgiNetwork>,
}

impl MemoryDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_condition(
        mut self,
        condition: ConditionSelector,
        matrix: ExpressionMatrix,
        phenotypes: PhenotypeVector,
    ) -> Self {
        self.conditions.insert(condition, (matrix, phenotypes));
        self
    }

    pub fn with_network(mut self, selector: GgiNetworkSelector, network: GgiNetwork) -> Self {
        self.networks.insert(selector, network);
        self
    }

    fn condition(&self, condition: ConditionSelector) -> Result<&(ExpressionMatrix, PhenotypeVector)> {
        self.conditions
            .get(&condition)
            .ok_or_else(|| GgiBenchError::Other(anyhow::anyhow!("no data for condition {condition}")))
    }
}

#[async_trait]
impl DataProvider for MemoryDataProvider {
    async fn load_expression(&self, condition: ConditionSelector) -> Result<ExpressionMatrix> {
        Ok(self.condition(condition)?.0.clone())
    }

    async fn load_phenotypes(&self, condition: ConditionSelector) -> Result<PhenotypeVector> {
        Ok(self.condition(condition)?.1.clone())
    }

    async fn load_network(&self, network: GgiNetworkSelector, matrix: &ExpressionMatrix) -> Result<GgiNetwork> {
        self.networks
            .get(&network)
            .map(|n| n.restrict_to(matrix))
            .ok_or_else(|| GgiBenchError::Other(anyhow::anyhow!("no network {network}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ggibench_test_utils::{temp_data_dir, toy_cohort};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_expression_csv() {
        let matrix = parse_expression_csv("sample,A,B\nS1,1.5,2\nS2, 3 ,4e-1\n").unwrap();
        assert_eq!(matrix.sample_ids(), &["S1".to_string(), "S2".to_string()]);
        assert_eq!(matrix.gene_ids(), &["A".to_string(), "B".to_string()]);
        assert_eq!(matrix.row(1), &[3.0, 0.4]);
    }

    #[test]
    fn test_parse_expression_rejects_non_numeric() {
        let err = parse_expression_csv("sample,A\nS1,high\n").unwrap_err();
        assert!(matches!(err, GgiBenchError::InvalidExpression(ref m) if m.contains("high")));
    }

    #[test]
    fn test_write_expression_csv_reads_back() {
        let (matrix, _) = toy_cohort();
        let mut out = Vec::new();
        write_expression_csv(&matrix, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("sample,G1,G2,G3,G4,G5\nS1,10,1,3,2,7.5\n"));
        let parsed = parse_expression_csv(&text).unwrap();
        assert_eq!(parsed.sample_ids(), matrix.sample_ids());
        assert_eq!(parsed.row(9), matrix.row(9));
    }

    #[test]
    fn test_parse_expression_rejects_ragged_rows() {
        assert!(parse_expression_csv("sample,A,B\nS1,1\n").is_err());
    }

    #[test]
    fn test_parse_phenotypes_by_sample_and_positional() {
        let by_sample = parse_phenotypes_csv("sample,phenotype\nS2,0\nS1,1\n").unwrap();
        assert_eq!(by_sample.sample_ids().unwrap(), &["S2".to_string(), "S1".to_string()]);
        assert_eq!(by_sample.labels(), &[Phenotype::Control, Phenotype::Case]);

        let positional = parse_phenotypes_csv("phenotype\n1\n0\n1\n").unwrap();
        assert!(positional.sample_ids().is_none());
        assert_eq!(positional.case_count(), 2);
    }

    #[test]
    fn test_parse_phenotypes_rejects_bad_labels() {
        assert!(parse_phenotypes_csv("phenotype\n2\n").is_err());
        assert!(parse_phenotypes_csv("sample,phenotype\nS1,case\n").is_err());
        assert!(parse_phenotypes_csv("sample,phenotype\nS1,1\nS1,0\n").is_err());
    }

    #[tokio::test]
    async fn test_file_provider_reads_fixture_directory() {
        let dir = temp_data_dir(ConditionSelector::Lc, GgiNetworkSelector::Hprd);
        let provider = FileDataProvider::new(dir.path());

        let matrix = provider.load_expression(ConditionSelector::Lc).await.unwrap();
        assert_eq!((matrix.n_samples(), matrix.n_genes()), (10, 5));

        let phenotypes = provider.load_phenotypes(ConditionSelector::Lc).await.unwrap();
        let aligned = phenotypes.align(&matrix).unwrap();
        let (_, expected) = toy_cohort();
        assert_eq!(aligned.labels(), expected.labels());

        let network = provider.load_network(GgiNetworkSelector::Hprd, &matrix).await.unwrap();
        assert_eq!(network.node_count(), 5);
        assert!(!network.contains_gene("X1"));
        assert_eq!(network.edge_count(), 5);
    }

    #[tokio::test]
    async fn test_file_provider_missing_files() {
        let dir = temp_data_dir(ConditionSelector::Lc, GgiNetworkSelector::Hprd);
        let provider = FileDataProvider::new(dir.path());
        let err = provider.load_expression(ConditionSelector::Als).await.unwrap_err();
        assert!(matches!(err, GgiBenchError::Io(_)));
        assert!(err.to_string().contains("GSE112680"));
    }

    #[tokio::test]
    async fn test_memory_provider() {
        let (matrix, phenotypes) = toy_cohort();
        let provider = MemoryDataProvider::new()
            .with_condition(ConditionSelector::Hd, matrix.clone(), phenotypes)
            .with_network(GgiNetworkSelector::Iid, ggibench_test_utils::fixture_network());

        assert!(provider.load_expression(ConditionSelector::Hd).await.is_ok());
        assert!(provider.load_expression(ConditionSelector::Uc).await.is_err());
        let network = provider.load_network(GgiNetworkSelector::Iid, &matrix).await.unwrap();
        assert_eq!(network.node_count(), 5);
    }
}
