//! ClustEx2: module discovery from per-gene p-values.

use std::ffi::OsString;
use std::path::Path;

use ggibench_common::AlgorithmSelector;
use ggibench_stats::{DifferentialExpressionScorer, MannWhitneyScorer};

use super::OUTPUT_FILE;
use crate::external::{delimited, gene_edge_list, parse_gene_list, ExternalTool, InputFiles, ToolInputs};

const EDGE_FILE: &str = "edges.tsv";
const SCORE_FILE: &str = "gene_scores.tsv";

/// Genes with an undefined test are left out of the score file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClustEx2 {
    scorer: MannWhitneyScorer,
}

impl ClustEx2 {
    pub fn new(scorer: MannWhitneyScorer) -> Self {
        Self { scorer }
    }
}

impl ExternalTool for ClustEx2 {
    fn algorithm(&self) -> AlgorithmSelector {
        AlgorithmSelector::Clustex2
    }

    fn input_files(&self, inputs: &ToolInputs<'_>) -> anyhow::Result<InputFiles> {
        let scores = self.scorer.score(inputs.matrix, inputs.phenotypes)?;
        let rows = scores
            .iter()
            .filter_map(|s| s.p_value.map(|p| [s.gene_id.clone(), p.to_string()]));
        Ok(InputFiles::new()
            .with(EDGE_FILE, gene_edge_list(inputs.network, b'\t')?)
            .with(SCORE_FILE, delimited(b'\t', rows)?))
    }

    fn arguments(&self, dir: &Path, _inputs: &ToolInputs<'_>) -> Vec<OsString> {
        [EDGE_FILE, SCORE_FILE, OUTPUT_FILE].iter().map(|f| dir.join(f).into_os_string()).collect()
    }

    fn parse_result(&self, output: &str, _inputs: &ToolInputs<'_>) -> anyhow::Result<Vec<String>> {
        Ok(parse_gene_list(output))
    }
}
