use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use lexbench_core::error::{LexError, Result};
use lexbench_core::model::CompletionClient;
use lexbench_core::normalize::normalize;
use lexbench_core::prompt::build_prompt;
use lexbench_core::registry::TaskRegistry;
use lexbench_core::sample::sample_shots;
use lexbench_core::task::TaskConfig;

use crate::dataset::{ExampleSource, Split};
use crate::log::RunLog;
use crate::record::EvalRecord;

/// Lifecycle of one task's evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Done,
    /// Finished, but at least one example exhausted its call retries.
    DoneWithErrors,
}

/// Knobs supplied by the invoking layer.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Few-shot examples sampled from the train split.
    pub shots: usize,
    /// Cap on test examples evaluated per task.
    pub max_examples: usize,
    pub seed: u64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            shots: 3,
            max_examples: 100,
            seed: 7,
        }
    }
}

/// Outcome of one task's run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub task: String,
    pub state: TaskState,
    /// Records appended to the log.
    pub records: usize,
}

/// Drives the evaluation: prompt, call, normalize, score, persist — one
/// record per example, appended as soon as it is scored.
pub struct EvalRunner {
    client: Arc<dyn CompletionClient>,
    source: Arc<dyn ExampleSource>,
    log: RunLog,
    options: RunOptions,
    cancel: CancellationToken,
}

impl EvalRunner {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        source: Arc<dyn ExampleSource>,
        log: RunLog,
        options: RunOptions,
    ) -> Self {
        Self {
            client,
            source,
            log,
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Token honored between examples; an in-flight call completes first.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn log(&self) -> &RunLog {
        &self.log
    }

    /// Evaluate the named tasks. Every name is resolved against the
    /// registry before the first API call, so an unknown task aborts the
    /// run instead of surfacing halfway through. Dataset-level failures
    /// (too few shots, empty split) skip that task and continue.
    pub async fn run(&self, registry: &TaskRegistry, task_names: &[String]) -> Result<Vec<TaskReport>> {
        let tasks = task_names
            .iter()
            .map(|name| registry.get(name))
            .collect::<Result<Vec<_>>>()?;

        let mut reports = Vec::with_capacity(tasks.len());
        for task in tasks {
            if self.cancel.is_cancelled() {
                tracing::info!("run cancelled; remaining tasks skipped");
                break;
            }
            match self.run_task(task).await {
                Ok(report) => reports.push(report),
                Err(LexError::Data(error)) => {
                    tracing::warn!(task = %task.name, %error, "skipping task");
                }
                Err(other) => return Err(other),
            }
        }
        Ok(reports)
    }

    /// Evaluate one task: `Pending → Running → Done | DoneWithErrors`.
    /// Loading and shot sampling happen in the pending phase; nothing is
    /// logged or called until both succeed.
    pub async fn run_task(&self, task: &TaskConfig) -> Result<TaskReport> {
        tracing::info!(task = %task.name, shots = self.options.shots, state = ?TaskState::Pending, "loading dataset");

        let train = if self.options.shots > 0 {
            self.source.load(task, Split::Train).await?
        } else {
            Vec::new()
        };
        let test = self.source.load(task, Split::Test).await?;
        let shots = sample_shots(task, &train, self.options.shots, self.options.seed)?;

        self.log.reset_task(&task.name)?;
        tracing::info!(
            task = %task.name,
            examples = test.len().min(self.options.max_examples),
            state = ?TaskState::Running,
            "starting eval"
        );

        let mut had_call_errors = false;
        let mut written = 0usize;
        for (i, example) in test.iter().take(self.options.max_examples).enumerate() {
            if self.cancel.is_cancelled() {
                tracing::info!(task = %task.name, done = written, "cancelled between examples");
                break;
            }

            let prompt = build_prompt(task, &shots, &example.input)?;
            let response = self.client.call(&prompt).await;

            // A failed call is recorded, never rethrown: the batch goes on.
            if !response.success {
                had_call_errors = true;
            }
            let pred = if response.success {
                normalize(&response.text, task)
            } else {
                None
            };
            let correct = pred.as_deref() == Some(example.label.as_str());

            let record = EvalRecord {
                task: task.name.clone(),
                i,
                gold: example.label.clone(),
                raw: response.text,
                pred,
                correct,
                error: response.error,
                latency_ms: response.latency_ms,
            };
            self.log.append(&record)?;
            written += 1;

            if written % 10 == 0 {
                tracing::info!(task = %task.name, done = written, "progress");
            }
        }

        let state = if had_call_errors {
            TaskState::DoneWithErrors
        } else {
            TaskState::Done
        };
        tracing::info!(task = %task.name, records = written, ?state, "task finished");

        Ok(TaskReport {
            task: task.name.clone(),
            state,
            records: written,
        })
    }
}
