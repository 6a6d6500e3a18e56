//! Thin bootstrap around the harness: argument parsing, `.env` loading,
//! subscriber setup and wiring. All evaluation logic lives in the library
//! crates.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use lexbench_client::prelude::*;
use lexbench_core::error::Result;
use lexbench_core::registry::TaskRegistry;
use lexbench_eval::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "lexbench")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Evaluate chat models on LegalBench classification tasks")]
struct Cli {
    /// Model identifier passed to the routing API.
    #[arg(long, default_value = "deepseek-ai/DeepSeek-Prover-V2-671B:novita")]
    model: String,

    /// Task names to evaluate. Omit to run every registered task.
    #[arg(long, num_args = 1..)]
    tasks: Vec<String>,

    /// Few-shot examples sampled from each task's train split.
    #[arg(long, default_value_t = 3)]
    shots: usize,

    /// Maximum test examples per task.
    #[arg(long, default_value_t = 100)]
    max_examples: usize,

    /// Seed for few-shot sampling.
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Directory for per-task logs and summary.json.
    #[arg(long, default_value = "runs")]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "run failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let registry = TaskRegistry::builtin()?;
    let tasks = if cli.tasks.is_empty() {
        registry.task_names().to_vec()
    } else {
        cli.tasks.clone()
    };

    let client = OpenRouterClient::new(ClientConfig::from_env()?, cli.model.clone())?;
    let source = HubDatasetSource::from_env()?;
    let log = RunLog::new(&cli.out_dir)?;
    let runner = EvalRunner::new(
        Arc::new(client),
        Arc::new(source),
        log,
        RunOptions {
            shots: cli.shots,
            max_examples: cli.max_examples,
            seed: cli.seed,
        },
    );

    // Ctrl-C stops between examples; the in-flight call finishes first.
    let cancel = runner.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("stop requested; finishing current example");
            cancel.cancel();
        }
    });

    tracing::info!(model = %cli.model, tasks = tasks.len(), "starting evaluation");
    let reports = runner.run(&registry, &tasks).await?;

    let completed: Vec<String> = reports.iter().map(|r| r.task.clone()).collect();
    let entries = summarize_all(runner.log(), &completed)?;
    for entry in &entries {
        println!(
            "{:<36} n={:<4} accuracy={:.3} coverage={:.3}",
            entry.task, entry.total, entry.accuracy, entry.coverage
        );
    }
    println!(
        "\nSummary written to {}",
        runner.log().summary_path().display()
    );
    Ok(())
}
