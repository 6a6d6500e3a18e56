use serde::{Deserialize, Serialize};

/// One scored example, as persisted to the task's JSONL log.
///
/// Field names follow the run-log row schema (`task`, `i`, `gold`, `raw`,
/// `pred`, `correct`); records are append-only and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalRecord {
    pub task: String,
    /// Index of the example within the task's evaluation split.
    pub i: usize,
    pub gold: String,
    /// Raw model output, or the error text for a failed call.
    pub raw: String,
    /// Canonical label, or `None` when the output was unparseable.
    pub pred: Option<String>,
    pub correct: bool,
    /// Call failure detail, when the model call did not succeed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub latency_ms: u64,
}

/// Per-task aggregate, derived from the persisted records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub task: String,
    /// Records in the log for this task.
    pub total: usize,
    /// Records with a parseable (non-null) prediction.
    pub scored: usize,
    pub correct: usize,
    /// correct / scored. Consumers wanting an all-examples denominator can
    /// derive it as accuracy * coverage.
    pub accuracy: f64,
    /// scored / total.
    pub coverage: f64,
}
