use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use lexbench_core::error::Result;

use crate::record::{EvalRecord, SummaryEntry};

/// Append-only run log: one `<task>.jsonl` file per task plus an
/// overwritten `summary.json`, all under one output directory.
///
/// Appends are serialized through a single mutex so concurrent task
/// drivers cannot interleave partial lines.
#[derive(Debug)]
pub struct RunLog {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl RunLog {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn task_path(&self, task: &str) -> PathBuf {
        self.dir.join(format!("{task}.jsonl"))
    }

    pub fn summary_path(&self) -> PathBuf {
        self.dir.join("summary.json")
    }

    /// Drop any log left over from an earlier run of this task, so the
    /// fresh run does not append to stale records.
    pub fn reset_task(&self, task: &str) -> Result<()> {
        let path = self.task_path(task);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Append one record and flush, so an interrupted run keeps every
    /// completed example.
    pub fn append(&self, record: &EvalRecord) -> Result<()> {
        let line = serde_json::to_string(record)?;
        let guard = self.write_lock.lock();
        let _guard = match guard {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.task_path(&record.task))?;
        writeln!(file, "{line}")?;
        file.flush()?;
        Ok(())
    }

    /// Read all persisted records for a task. A missing log reads as empty,
    /// so aggregation works over partial runs.
    pub fn read_task(&self, task: &str) -> Result<Vec<EvalRecord>> {
        let path = self.task_path(task);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(path)?);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(records)
    }

    /// Overwrite `summary.json` with the given entries.
    pub fn write_summary(&self, entries: &[SummaryEntry]) -> Result<PathBuf> {
        let path = self.summary_path();
        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&path, json)?;
        Ok(path)
    }
}
