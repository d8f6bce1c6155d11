//! GXNA: greedy search for differentially expressed subnetworks.
//!
//! Reads a tab separated edge list and an expression table whose first data
//! row holds the phenotype labels; writes one module gene per line.

use std::ffi::OsString;
use std::path::Path;

use ggibench_common::AlgorithmSelector;

use super::OUTPUT_FILE;
use crate::external::{delimited, gene_edge_list, parse_gene_list, ExternalTool, InputFiles, ToolInputs};

const EDGE_FILE: &str = "edges.tsv";
const EXPRESSION_FILE: &str = "expression.tsv";

#[derive(Debug, Clone, Copy, Default)]
pub struct Gxna;

/// `gene  S1 ..`, then `phenotype  0|1 ..`, then one row per gene.
fn expression_table(inputs: &ToolInputs<'_>) -> anyhow::Result<Vec<u8>> {
    let matrix = inputs.matrix;

    let mut header = Vec::with_capacity(matrix.n_samples() + 1);
    header.push("gene".to_string());
    header.extend(matrix.sample_ids().iter().cloned());

    let mut labels = Vec::with_capacity(matrix.n_samples() + 1);
    labels.push("phenotype".to_string());
    labels.extend(inputs.phenotypes.labels().iter().map(|&l| u8::from(l).to_string()));

    let genes = matrix.gene_ids().iter().enumerate().map(|(g, gene)| {
        std::iter::once(gene.clone()).chain(matrix.column(g).map(|v| v.to_string())).collect::<Vec<_>>()
    });
    delimited(b'\t', [header, labels].into_iter().chain(genes))
}

impl ExternalTool for Gxna {
    fn algorithm(&self) -> AlgorithmSelector {
        AlgorithmSelector::Gxna
    }

    fn input_files(&self, inputs: &ToolInputs<'_>) -> anyhow::Result<InputFiles> {
        Ok(InputFiles::new()
            .with(EDGE_FILE, gene_edge_list(inputs.network, b'\t')?)
            .with(EXPRESSION_FILE, expression_table(inputs)?))
    }

    fn arguments(&self, dir: &Path, _inputs: &ToolInputs<'_>) -> Vec<OsString> {
        [EDGE_FILE, EXPRESSION_FILE, OUTPUT_FILE].iter().map(|f| dir.join(f).into_os_string()).collect()
    }

    fn parse_result(&self, output: &str, _inputs: &ToolInputs<'_>) -> anyhow::Result<Vec<String>> {
        Ok(parse_gene_list(output))
    }
}
