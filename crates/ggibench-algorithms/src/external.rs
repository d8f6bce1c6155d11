//! Runs enrichment algorithms shipped as external programs.
//!
//! An [`ExternalTool`] knows the file formats of one program; the
//! [`ExternalToolWrapper`] owns the process lifecycle: temp directory,
//! spawn, timeout, exit status, and result parsing. Tools render their
//! inputs in memory, and all file I/O happens here through `tokio::fs`.

use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use ggibench_common::config::ToolConfig;
use ggibench_common::{
    AlgorithmSelector, ExpressionMatrix, GgiBenchError, PhenotypeVector, Result, ResultModule, SeedGeneSet,
};
use ggibench_network::{induced_mean_degree, GgiNetwork};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::tools::OUTPUT_FILE;
use crate::wrapper::AlgorithmWrapper;

/// Everything a tool may write into its input files.
#[derive(Clone, Copy)]
pub struct ToolInputs<'a> {
    pub network: &'a GgiNetwork,
    pub matrix: &'a ExpressionMatrix,
    pub phenotypes: &'a PhenotypeVector,
    pub seeds: &'a SeedGeneSet,
    pub config: &'a ToolConfig,
}

/// Input files of one invocation, named relative to the working directory.
#[derive(Debug, Default)]
pub struct InputFiles {
    files: Vec<(&'static str, Vec<u8>)>,
}

impl InputFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, contents: Vec<u8>) -> Self {
        self.files.push((name, contents));
        self
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files.iter().find(|(n, _)| *n == name).map(|(_, c)| c.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[u8])> {
        self.files.iter().map(|(n, c)| (*n, c.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// File-level protocol of one external program.
pub trait ExternalTool: Send + Sync {
    fn algorithm(&self) -> AlgorithmSelector;

    /// The program's input files.
    fn input_files(&self, inputs: &ToolInputs<'_>) -> anyhow::Result<InputFiles>;

    /// Arguments appended after the configured ones.
    fn arguments(&self, dir: &Path, inputs: &ToolInputs<'_>) -> Vec<OsString>;

    /// File the program leaves its module in; `None` means stdout.
    fn output_file(&self) -> Option<&'static str> {
        Some(OUTPUT_FILE)
    }

    /// Genes of the result module from the output read after a successful exit.
    fn parse_result(&self, output: &str, inputs: &ToolInputs<'_>) -> anyhow::Result<Vec<String>>;
}

/// [`AlgorithmWrapper`] driving an [`ExternalTool`] as a child process.
pub struct ExternalToolWrapper<T> {
    tool: T,
    config: ToolConfig,
}

impl<T: ExternalTool> ExternalToolWrapper<T> {
    pub fn new(tool: T, config: ToolConfig) -> Self {
        Self { tool, config }
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    async fn execute(&self, inputs: &ToolInputs<'_>) -> anyhow::Result<Vec<String>> {
        let workdir = tokio::task::spawn_blocking(|| tempfile::Builder::new().prefix("ggibench-").tempdir())
            .await?
            .context("creating working directory")?;
        let dir = workdir.path();

        let files = self.tool.input_files(inputs).context("preparing tool inputs")?;
        for (name, contents) in files.iter() {
            let path = dir.join(name);
            tokio::fs::write(&path, contents)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
        }

        let mut command = Command::new(&self.config.executable);
        command
            .args(&self.config.args)
            .args(self.tool.arguments(dir, inputs))
            .current_dir(dir)
            .kill_on_drop(true);

        debug!(algorithm = %self.tool.algorithm(), files = files.len(), ?command, "spawning external tool");
        let output = match self.config.timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), command.output())
                .await
                .map_err(|_| anyhow!("timed out after {secs}s"))?,
            None => command.output().await,
        }
        .with_context(|| format!("spawning {}", self.config.executable.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("{} exited with {}: {}", self.config.executable.display(), output.status, stderr.trim());
        }

        let text = match self.tool.output_file() {
            Some(name) => {
                let path = dir.join(name);
                tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("reading {}", path.display()))?
            }
            None => String::from_utf8_lossy(&output.stdout).into_owned(),
        };
        self.tool.parse_result(&text, inputs).context("reading tool output")
    }
}

#[async_trait]
impl<T: ExternalTool> AlgorithmWrapper for ExternalToolWrapper<T> {
    fn algorithm(&self) -> AlgorithmSelector {
        self.tool.algorithm()
    }

    async fn run(
        &self,
        network: &GgiNetwork,
        matrix: &ExpressionMatrix,
        phenotypes: &PhenotypeVector,
        seeds: &SeedGeneSet,
    ) -> Result<ResultModule> {
        let algorithm = self.tool.algorithm();
        let inputs = ToolInputs { network, matrix, phenotypes, seeds, config: &self.config };

        info!(%algorithm, seeds = seeds.len(), nodes = network.node_count(), "running algorithm");
        let genes = self
            .execute(&inputs)
            .await
            .map_err(|e| GgiBenchError::execution_failed(algorithm, e))?;

        let unknown = genes.iter().filter(|g| !network.contains_gene(g)).count();
        if unknown > 0 {
            warn!(%algorithm, unknown, "result module contains genes outside the network");
        }
        let mean_degree = induced_mean_degree(network, &genes);
        info!(%algorithm, module_size = genes.len(), "algorithm finished");
        Ok(ResultModule { genes, mean_degree })
    }
}

// ── Input rendering shared by the tools ──────────────────────────────────────

/// Header-less delimited rows.
pub(crate) fn delimited<R, F>(delimiter: u8, rows: impl IntoIterator<Item = R>) -> anyhow::Result<Vec<u8>>
where
    R: IntoIterator<Item = F>,
    F: AsRef<[u8]>,
{
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row)?;
    }
    writer.into_inner().map_err(|e| anyhow::Error::from(e.into_error()))
}

/// One `gene<delim>gene` row per network edge.
pub(crate) fn gene_edge_list(network: &GgiNetwork, delimiter: u8) -> anyhow::Result<Vec<u8>> {
    delimited(delimiter, network.edges().map(|(a, b)| [network.gene(a), network.gene(b)]))
}

/// Seeds present in the network, in seed order.
pub(crate) fn seeds_in_network<'a>(network: &GgiNetwork, seeds: &'a SeedGeneSet) -> Vec<&'a str> {
    seeds.iter().filter(|s| network.contains_gene(s)).collect()
}

/// Gene identifiers from a one-gene-per-line file; blank and `#` lines skipped,
/// only the first whitespace-separated field counts.
pub(crate) fn parse_gene_list(text: &str) -> Vec<String> {
    let mut genes: Vec<String> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(gene) = line.split_whitespace().next() {
            if !genes.iter().any(|g| g == gene) {
                genes.push(gene.to_string());
            }
        }
    }
    genes
}
