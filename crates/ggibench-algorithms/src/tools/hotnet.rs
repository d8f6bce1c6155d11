//! Hierarchical HotNet: heat diffusion over an indexed network.
//!
//! Inputs are an index-to-gene table (1-based), an index edge list and a
//! `gene<TAB>score` heat file with `score = -log10(p)`.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::Path;

use ggibench_common::AlgorithmSelector;
use ggibench_stats::{DifferentialExpressionScorer, MannWhitneyScorer};

use super::OUTPUT_FILE;
use crate::external::{delimited, parse_gene_list, ExternalTool, InputFiles, ToolInputs};

const INDEX_GENE_FILE: &str = "index_gene.tsv";
const EDGE_FILE: &str = "edge_list.tsv";
const SCORE_FILE: &str = "gene_score.tsv";

/// Heat of genes without a defined p-value.
const NO_HEAT: f64 = 0.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct HotNet {
    scorer: MannWhitneyScorer,
}

impl HotNet {
    pub fn new(scorer: MannWhitneyScorer) -> Self {
        Self { scorer }
    }
}

fn heat(p_value: Option<f64>) -> f64 {
    match p_value {
        Some(p) if p > 0.0 => -p.log10(),
        // p underflowed to zero
        Some(_) => f64::MAX.log10(),
        None => NO_HEAT,
    }
}

impl ExternalTool for HotNet {
    fn algorithm(&self) -> AlgorithmSelector {
        AlgorithmSelector::Hotnet
    }

    fn input_files(&self, inputs: &ToolInputs<'_>) -> anyhow::Result<InputFiles> {
        let network = inputs.network;

        let index = network.genes().enumerate().map(|(i, gene)| [(i + 1).to_string(), gene.to_string()]);
        let edges = network
            .edges()
            .map(|(a, b)| [(a.index() + 1).to_string(), (b.index() + 1).to_string()]);

        let scores = self.scorer.score(inputs.matrix, inputs.phenotypes)?;
        let p_values: HashMap<&str, Option<f64>> =
            scores.iter().map(|s| (s.gene_id.as_str(), s.p_value)).collect();
        let heats = network
            .genes()
            .map(|gene| [gene.to_string(), heat(p_values.get(gene).copied().flatten()).to_string()]);

        Ok(InputFiles::new()
            .with(INDEX_GENE_FILE, delimited(b'\t', index)?)
            .with(EDGE_FILE, delimited(b'\t', edges)?)
            .with(SCORE_FILE, delimited(b'\t', heats)?))
    }

    fn arguments(&self, dir: &Path, _inputs: &ToolInputs<'_>) -> Vec<OsString> {
        [INDEX_GENE_FILE, EDGE_FILE, SCORE_FILE, OUTPUT_FILE]
            .iter()
            .map(|f| dir.join(f).into_os_string())
            .collect()
    }

    fn parse_result(&self, output: &str, _inputs: &ToolInputs<'_>) -> anyhow::Result<Vec<String>> {
        Ok(parse_gene_list(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ggibench_common::config::ToolConfig;
    use ggibench_common::SeedGeneSet;
    use ggibench_test_utils::{fixture_network, toy_cohort};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_heat() {
        assert!((heat(Some(0.001)) - 3.0).abs() < 1e-12);
        assert_eq!(heat(Some(1.0)), 0.0);
        assert_eq!(heat(None), NO_HEAT);
        assert!(heat(Some(0.0)).is_finite());
    }

    #[test]
    fn test_indexed_inputs() {
        let (matrix, phenotypes) = toy_cohort();
        let network = fixture_network();
        let seeds = SeedGeneSet::default();
        let config = ToolConfig::new("hotnet");
        let inputs = ToolInputs { network: &network, matrix: &matrix, phenotypes: &phenotypes, seeds: &seeds, config: &config };

        let files = HotNet::default().input_files(&inputs).unwrap();
        let text = |name| std::str::from_utf8(files.get(name).unwrap()).unwrap();

        let index = text(INDEX_GENE_FILE);
        let first: Vec<&str> = index.lines().next().unwrap().split('\t').collect();
        assert_eq!(first, vec!["1", network.genes().next().unwrap()]);
        let edges = text(EDGE_FILE);
        assert_eq!(edges.lines().count(), network.edge_count());
        let scores = text(SCORE_FILE);
        assert_eq!(scores.lines().count(), network.node_count());
    }
}
