use lexbench_core::error::Result;

use crate::log::RunLog;
use crate::record::SummaryEntry;

/// Recompute a task's aggregate from its persisted records.
///
/// Always reads the log fresh, so aggregation is idempotent and can run
/// against a partial log without touching the model. `accuracy` counts only
/// parseable predictions; `coverage` reports how many of the records those
/// were.
pub fn summarize(log: &RunLog, task: &str) -> Result<SummaryEntry> {
    let records = log.read_task(task)?;
    let total = records.len();
    let scored = records.iter().filter(|r| r.pred.is_some()).count();
    let correct = records.iter().filter(|r| r.correct).count();

    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    Ok(SummaryEntry {
        task: task.to_string(),
        total,
        scored,
        correct,
        accuracy: ratio(correct, scored),
        coverage: ratio(scored, total),
    })
}

/// Summarize every named task and overwrite `summary.json`.
pub fn summarize_all(log: &RunLog, tasks: &[String]) -> Result<Vec<SummaryEntry>> {
    let entries = tasks
        .iter()
        .map(|task| summarize(log, task))
        .collect::<Result<Vec<_>>>()?;
    log.write_summary(&entries)?;
    Ok(entries)
}
