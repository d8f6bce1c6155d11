//! ggibench: network enrichment benchmark runner.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ggibench_algorithms::AlgorithmRegistry;
use ggibench_common::{
    AlgorithmSelector, BenchmarkConfig, ConditionSelector, GgiNetworkSelector, NetworkGeneratorSelector, Selector,
};
use ggibench_pipeline::providers::write_expression_csv;
use ggibench_pipeline::{BenchmarkRun, FileDataProvider, Pipeline};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ggibench")]
#[command(about = "Benchmark network enrichment algorithms on gene expression data", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON); defaults to $GGIBENCH_CONFIG or ./ggibench.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the data directory from the configuration
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the configured cross-product (or a narrowed one) and write JSON lines
    Run {
        #[arg(long)]
        algorithm: Option<AlgorithmSelector>,
        #[arg(long)]
        network: Option<GgiNetworkSelector>,
        #[arg(long)]
        condition: Option<ConditionSelector>,
        #[arg(long)]
        generator: Option<NetworkGeneratorSelector>,
        /// Report destination; overrides execution.output
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Compute gene p-values, seed genes and seed statistics only
    Seeds {
        #[arg(long)]
        condition: ConditionSelector,
        #[arg(long)]
        network: GgiNetworkSelector,
    },
    /// Write per-sample gene p-values of a condition as CSV
    SamplePValues {
        #[arg(long)]
        condition: ConditionSelector,
        /// CSV destination; stdout when omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// List accepted selector values
    List,
}

fn load_config(cli: &Cli) -> anyhow::Result<BenchmarkConfig> {
    let mut config = match &cli.config {
        Some(path) => BenchmarkConfig::from_path(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => BenchmarkConfig::load().context("loading configuration")?,
    };
    if let Some(dir) = &cli.data_dir {
        config.data.data_dir = dir.clone();
    }
    Ok(config)
}

fn build_pipeline(config: &BenchmarkConfig) -> Pipeline {
    let provider = Arc::new(FileDataProvider::new(&config.data.data_dir));
    let registry = Arc::new(AlgorithmRegistry::from_config(&config.tools, &config.scoring));
    Pipeline::from_config(config, provider, registry)
}

fn output_sink(path: Option<&PathBuf>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(std::io::BufWriter::new(
            std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    })
}

fn list_values<S: Selector>() -> String {
    S::all().iter().map(|s| s.name()).collect::<Vec<_>>().join(", ")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the JSON report
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ggibench=debug,info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::List => {
            println!("algorithms: {}", list_values::<AlgorithmSelector>());
            println!("networks:   {}", list_values::<GgiNetworkSelector>());
            println!("conditions: {}", list_values::<ConditionSelector>());
            println!("generators: {}", list_values::<NetworkGeneratorSelector>());
            Ok(())
        }

        Command::Seeds { condition, network } => {
            let config = load_config(&cli)?;
            let pipeline = build_pipeline(&config);
            let report = pipeline
                .seeds(*condition, *network)
                .await
                .with_context(|| format!("seed extraction for {condition} on {network}"))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }

        Command::SamplePValues { condition, output } => {
            let config = load_config(&cli)?;
            let p_values = build_pipeline(&config)
                .sample_p_values(*condition)
                .await
                .with_context(|| format!("sample p-values for {condition}"))?;
            write_expression_csv(&p_values, output_sink(output.as_ref())?)?;
            Ok(())
        }

        Command::Run { algorithm, network, condition, generator, output } => {
            let mut config = load_config(&cli)?;
            let selection = &mut config.selection;
            if let Some(a) = algorithm { selection.algorithms = vec![*a]; }
            if let Some(n) = network { selection.networks = vec![*n]; }
            if let Some(c) = condition { selection.conditions = vec![*c]; }
            if let Some(g) = generator { selection.generators = vec![*g]; }

            let runs = BenchmarkRun::cross_product(&config.selection);
            info!(
                runs = runs.len(),
                workers = config.execution.parallel_workers,
                data_dir = %config.data.data_dir.display(),
                "ggibench starting"
            );

            let pipeline = build_pipeline(&config);
            let results = pipeline.run_all(runs.clone()).await;

            let mut sink = output_sink(output.as_ref().or(config.execution.output.as_ref()))?;
            let mut failed = 0usize;
            for (run, result) in runs.iter().zip(&results) {
                let line = match result {
                    Ok(report) => serde_json::to_string(report)?,
                    Err(e) => {
                        failed += 1;
                        serde_json::to_string(&serde_json::json!({ "run": run, "error": e.to_string() }))?
                    }
                };
                writeln!(sink, "{line}")?;
            }
            sink.flush()?;

            if failed > 0 {
                warn!(failed, total = runs.len(), "some runs failed");
                anyhow::bail!("{failed} of {} runs failed", runs.len());
            }
            info!(total = runs.len(), "all runs finished");
            Ok(())
        }
    }
}
