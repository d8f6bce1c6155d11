//! DIAMOnD: iterative seed expansion by connectivity significance.
//!
//! Inputs are a comma separated edge list and the seed list; the program is
//! called as `<network> <seeds> <n_added> <out>` and writes one
//! `rank<TAB>gene<TAB>p` row per added gene.

use std::ffi::OsString;
use std::path::Path;

use ggibench_common::AlgorithmSelector;

use super::OUTPUT_FILE;
use crate::external::{delimited, gene_edge_list, seeds_in_network, ExternalTool, InputFiles, ToolInputs};

const NETWORK_FILE: &str = "network.csv";
const SEED_FILE: &str = "seeds.txt";

#[derive(Debug, Clone, Copy, Default)]
pub struct Diamond;

/// Added genes in rank order; header and comment lines are skipped.
fn parse_added_genes(text: &str) -> anyhow::Result<Vec<String>> {
    let mut added = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        // header row, e.g. "rank  DIAMOnD_node  p_hyper"
        if fields[0].parse::<usize>().is_err() {
            continue;
        }
        let gene = fields
            .get(1)
            .filter(|g| !g.is_empty())
            .ok_or_else(|| anyhow::anyhow!("line {}: missing gene column", line_no + 1))?;
        added.push(gene.to_string());
    }
    Ok(added)
}

impl ExternalTool for Diamond {
    fn algorithm(&self) -> AlgorithmSelector {
        AlgorithmSelector::Diamond
    }

    fn input_files(&self, inputs: &ToolInputs<'_>) -> anyhow::Result<InputFiles> {
        let seeds = seeds_in_network(inputs.network, inputs.seeds);
        if seeds.is_empty() {
            anyhow::bail!("none of the {} seeds is in the network", inputs.seeds.len());
        }
        Ok(InputFiles::new()
            .with(NETWORK_FILE, gene_edge_list(inputs.network, b',')?)
            .with(SEED_FILE, delimited(b'\t', seeds.iter().map(|&s| [s]))?))
    }

    fn arguments(&self, dir: &Path, inputs: &ToolInputs<'_>) -> Vec<OsString> {
        vec![
            dir.join(NETWORK_FILE).into_os_string(),
            dir.join(SEED_FILE).into_os_string(),
            inputs.config.added_nodes.to_string().into(),
            dir.join(OUTPUT_FILE).into_os_string(),
        ]
    }

    fn parse_result(&self, output: &str, inputs: &ToolInputs<'_>) -> anyhow::Result<Vec<String>> {
        let added = parse_added_genes(output)?;
        let mut module: Vec<String> =
            seeds_in_network(inputs.network, inputs.seeds).into_iter().map(str::to_string).collect();
        for gene in added {
            if !module.contains(&gene) {
                module.push(gene);
            }
        }
        Ok(module)
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
    fn test_parse_added_genes() {
        let text = "#rank\tDIAMOnD_node\tp_hyper\n1\tG7\t0.001\n2\tG9\t0.01\n\n";
        assert_eq!(parse_added_genes(text).unwrap(), vec!["G7", "G9"]);
    }

    #[test]
    fn test_parse_rejects_rows_without_gene() {
        assert!(parse_added_genes("1\n").is_err());
    }

    #[test]
    fn test_inputs_and_module_keep_seed_order() {
        let (matrix, phenotypes) = toy_cohort();
        let network = fixture_network();
        let seeds = SeedGeneSet::new(["G4", "ABSENT", "G1"]);
        let config = ToolConfig::new("python3");
        let inputs = ToolInputs { network: &network, matrix: &matrix, phenotypes: &phenotypes, seeds: &seeds, config: &config };

        let files = Diamond.input_files(&inputs).unwrap();
        assert_eq!(files.get(SEED_FILE), Some("G4\nG1\n".as_bytes()));
        let edges = std::str::from_utf8(files.get(NETWORK_FILE).unwrap()).unwrap();
        assert!(edges.lines().all(|l| l.contains(',')));

        let module = Diamond.parse_result("1\tG2\t0.01\n2\tG1\t0.2\n", &inputs).unwrap();
        assert_eq!(module, vec!["G4", "G1", "G2"]);
    }

    #[test]
    fn test_no_seed_in_network_is_an_error() {
        let (matrix, phenotypes) = toy_cohort();
        let network = fixture_network();
        let seeds = SeedGeneSet::new(["ABSENT"]);
        let config = ToolConfig::new("python3");
        let inputs = ToolInputs { network: &network, matrix: &matrix, phenotypes: &phenotypes, seeds: &seeds, config: &config };

        assert!(Diamond.input_files(&inputs).is_err());
    }
}
