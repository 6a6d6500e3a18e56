use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use lexbench_core::error::{CallError, DataError, LexError, Result};
use lexbench_core::task::{Example, TaskConfig};

/// Keys LegalBench subsets use for the gold label, in probe order.
const LABEL_KEYS: [&str; 5] = ["answer", "label", "output", "target", "gold"];

const HUB_API_BASE: &str = "https://datasets-server.huggingface.co";

/// Rows fetched per page from the hub rows API (its maximum).
const PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "test",
        }
    }
}

/// Source of labeled examples for a task's splits.
///
/// Abstracted so tests substitute in-memory fixtures for the hub.
#[async_trait]
pub trait ExampleSource: Send + Sync {
    async fn load(&self, task: &TaskConfig, split: Split) -> Result<Vec<Example>>;
}

/// Loads task splits from the Hugging Face datasets-server rows API.
pub struct HubDatasetSource {
    http: reqwest::Client,
    base_url: String,
    /// Optional hub access token; absence is not an error.
    token: Option<String>,
}

impl HubDatasetSource {
    pub fn new(token: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| LexError::Call(CallError::Transport(e.to_string())))?;
        Ok(Self {
            http,
            base_url: HUB_API_BASE.into(),
            token,
        })
    }

    /// Read `HF_TOKEN` if present; the loader works anonymously without it.
    pub fn from_env() -> Result<Self> {
        Self::new(std::env::var("HF_TOKEN").ok())
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_page(
        &self,
        task: &TaskConfig,
        split: Split,
        offset: usize,
    ) -> Result<(Vec<Value>, usize)> {
        let url = format!("{}/rows", self.base_url);
        let offset_param = offset.to_string();
        let length_param = PAGE_SIZE.to_string();
        let mut req = self.http.get(&url).query(&[
            ("dataset", task.dataset.repo.as_str()),
            ("config", task.dataset.subset.as_str()),
            ("split", split.as_str()),
            ("offset", offset_param.as_str()),
            ("length", length_param.as_str()),
        ]);
        if let Some(token) = &self.token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let response = req.send().await.map_err(|e| {
            LexError::Call(if e.is_timeout() {
                CallError::Timeout
            } else {
                CallError::Transport(e.to_string())
            })
        })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LexError::Call(CallError::Http {
                status: status.as_u16(),
                body,
            }));
        }

        let page: Value = response
            .json()
            .await
            .map_err(|e| LexError::Call(CallError::InvalidResponse(e.to_string())))?;
        let total = page["num_rows_total"].as_u64().unwrap_or(0) as usize;
        let rows = page["rows"]
            .as_array()
            .map(|rows| {
                rows.iter()
                    .filter_map(|r| r.get("row").cloned())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        Ok((rows, total))
    }
}

#[async_trait]
impl ExampleSource for HubDatasetSource {
    async fn load(&self, task: &TaskConfig, split: Split) -> Result<Vec<Example>> {
        let mut rows = Vec::new();
        let mut offset = 0;
        loop {
            let (page, total) = self.fetch_page(task, split, offset).await?;
            if page.is_empty() {
                break;
            }
            offset += page.len();
            rows.extend(page);
            if offset >= total {
                break;
            }
        }

        tracing::debug!(task = %task.name, split = split.as_str(), rows = rows.len(), "loaded split");
        rows_to_examples(task, split, &rows)
    }
}

/// Convert raw dataset rows into examples, inferring the label and input
/// keys from the first row.
pub fn rows_to_examples(task: &TaskConfig, split: Split, rows: &[Value]) -> Result<Vec<Example>> {
    let first = rows.first().ok_or_else(|| {
        LexError::Data(DataError::EmptySplit {
            task: task.name.clone(),
            split: split.as_str().into(),
        })
    })?;

    let label_key = infer_label_key(first).ok_or_else(|| {
        LexError::Data(DataError::MissingLabelKey {
            task: task.name.clone(),
        })
    })?;
    let input_key = infer_input_key(first, label_key);

    let mut examples = Vec::with_capacity(rows.len());
    for row in rows {
        let label = match row.get(label_key) {
            Some(v) => value_to_text(v),
            None => continue,
        };
        let input = input_key
            .and_then(|k| row.get(k))
            .map(value_to_text)
            .unwrap_or_default();
        examples.push(Example::new(input, label));
    }
    Ok(examples)
}

/// The usual LegalBench gold-label column, probed in a fixed order.
pub fn infer_label_key(row: &Value) -> Option<&'static str> {
    LABEL_KEYS
        .into_iter()
        .find(|k| row.get(k).is_some_and(|v| !v.is_null()))
}

fn infer_input_key<'a>(row: &'a Value, label_key: &str) -> Option<&'a str> {
    let object = row.as_object()?;
    if object.get("text").is_some_and(Value::is_string) {
        return Some("text");
    }
    object
        .iter()
        .find(|(k, v)| k.as_str() != label_key && k.as_str() != "index" && v.is_string())
        .map(|(k, _)| k.as_str())
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Fixture source holding splits in memory, for tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemorySource {
    splits: HashMap<(String, Split), Vec<Example>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_split(
        mut self,
        task: impl Into<String>,
        split: Split,
        examples: Vec<Example>,
    ) -> Self {
        self.splits.insert((task.into(), split), examples);
        self
    }
}

#[async_trait]
impl ExampleSource for InMemorySource {
    async fn load(&self, task: &TaskConfig, split: Split) -> Result<Vec<Example>> {
        match self.splits.get(&(task.name.clone(), split)) {
            Some(examples) if !examples.is_empty() => Ok(examples.clone()),
            _ => Err(LexError::Data(DataError::EmptySplit {
                task: task.name.clone(),
                split: split.as_str().into(),
            })),
        }
    }
}
