use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, LexError, Result};

/// Where a task's examples live on the dataset hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRef {
    /// Hub repository, e.g. "nguha/legalbench".
    pub repo: String,
    /// Subset (config) name within the repository.
    pub subset: String,
}

impl DatasetRef {
    pub fn legalbench(subset: impl Into<String>) -> Self {
        Self {
            repo: "nguha/legalbench".into(),
            subset: subset.into(),
        }
    }
}

/// A labeled example from a dataset split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// The text the model is asked about.
    pub input: String,
    /// Gold label, one of the task's canonical labels.
    pub label: String,
}

impl Example {
    pub fn new(input: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            label: label.into(),
        }
    }
}

/// One ordered normalization rule: first matching rule wins.
///
/// Patterns are matched against cleaned, lowercased model output, so they
/// should be written in lowercase.
#[derive(Debug, Clone)]
pub struct NormRule {
    pub pattern: Regex,
    pub label: String,
}

impl NormRule {
    pub fn new(pattern: &str, label: &str) -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            label: label.to_string(),
        })
    }
}

/// Immutable configuration of one classification task.
#[derive(Debug, Clone)]
pub struct TaskConfig {
    pub name: String,
    pub dataset: DatasetRef,
    /// Canonical labels, in configuration order.
    pub labels: Vec<String>,
    /// Ordered (pattern, label) rules applied after exact label matching.
    pub rules: Vec<NormRule>,
    /// Task instruction shown to the model; names the allowed labels.
    pub instruction: String,
}

impl TaskConfig {
    pub fn new(
        name: impl Into<String>,
        labels: Vec<&str>,
        rules: Vec<(&str, &str)>,
        instruction: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        let compiled = rules
            .into_iter()
            .map(|(pat, label)| {
                NormRule::new(pat, label).map_err(|e| {
                    LexError::Config(ConfigError::MalformedTask {
                        task: name.clone(),
                        reason: format!("bad pattern '{pat}': {e}"),
                    })
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            dataset: DatasetRef::legalbench(name.clone()),
            name,
            labels: labels.into_iter().map(String::from).collect(),
            rules: compiled,
            instruction: instruction.into(),
        })
    }

    /// Build a task for an arbitrary discrete label set, deriving the
    /// instruction and conservative normalization rules from the labels.
    ///
    /// Well-known label families (Yes/No, Correct/Incorrect, True/False,
    /// A/B/C) get their curated rule sets; anything else gets an exact-line
    /// rule followed by a word-boundary rule per label, in label order.
    pub fn derived(name: impl Into<String>, labels: Vec<String>) -> Result<Self> {
        let (suffix, rules) = derive_rules(&labels);
        let labels_ref: Vec<&str> = labels.iter().map(String::as_str).collect();
        TaskConfig::new(
            name,
            labels_ref,
            rules.iter().map(|(p, l)| (p.as_str(), l.as_str())).collect(),
            format!("Follow the task instruction exactly. Output only the label; no explanation. {suffix}"),
        )
    }
}

fn derive_rules(labels: &[String]) -> (String, Vec<(String, String)>) {
    let lower: Vec<String> = labels.iter().map(|l| l.to_lowercase()).collect();

    let known: Option<(&str, Vec<&str>)> = if set_eq(&lower, &["yes", "no"]) {
        Some(("Answer with exactly: 'Yes' or 'No'.", vec!["Yes", "No"]))
    } else if set_eq(&lower, &["correct", "incorrect"]) {
        Some((
            "Answer with exactly: 'Correct' or 'Incorrect'.",
            vec!["Correct", "Incorrect"],
        ))
    } else if set_eq(&lower, &["true", "false"]) {
        Some((
            "Answer with exactly: 'True' or 'False'.",
            vec!["True", "False"],
        ))
    } else if set_eq(&lower, &["a", "b", "c"]) {
        Some(("Answer with exactly one of: A, B, or C.", vec!["A", "B", "C"]))
    } else {
        None
    };

    if let Some((instr, canon)) = known {
        let mut rules = Vec::new();
        // Exact-line rules ordered before word-boundary rules.
        for lab in &canon {
            rules.push((format!(r"^\s*{}\s*$", lab.to_lowercase()), lab.to_string()));
        }
        for lab in &canon {
            rules.push((format!(r"\b{}\b", lab.to_lowercase()), lab.to_string()));
        }
        return (instr.to_string(), rules);
    }

    let joined = labels.join(", ");
    let mut rules = Vec::new();
    for lab in labels {
        let esc = regex::escape(&lab.to_lowercase());
        rules.push((format!(r"^\s*{esc}\s*$"), lab.clone()));
        rules.push((format!(r"\b{esc}\b"), lab.clone()));
    }
    (format!("Answer with exactly one of: {joined}."), rules)
}

fn set_eq(lower: &[String], expected: &[&str]) -> bool {
    lower.len() == expected.len() && expected.iter().all(|e| lower.iter().any(|l| l == e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_compiles_rules_in_order() {
        let task = TaskConfig::new(
            "hearsay",
            vec!["Yes", "No"],
            vec![(r"\byes\b", "Yes"), (r"\bno\b", "No")],
            "Answer Yes or No.",
        )
        .unwrap();
        assert_eq!(task.rules.len(), 2);
        assert_eq!(task.rules[0].label, "Yes");
        assert_eq!(task.rules[1].label, "No");
        assert_eq!(task.dataset, DatasetRef::legalbench("hearsay"));
    }

    #[test]
    fn new_rejects_bad_pattern() {
        let err = TaskConfig::new("broken", vec!["Yes"], vec![("(unclosed", "Yes")], "x")
            .unwrap_err();
        assert!(matches!(
            err,
            LexError::Config(ConfigError::MalformedTask { .. })
        ));
    }

    #[test]
    fn derived_yes_no_family() {
        let task =
            TaskConfig::derived("some_task", vec!["Yes".into(), "No".into()]).unwrap();
        assert!(task.instruction.contains("'Yes' or 'No'"));
        // Exact-line rules come first so a bare "no" line beats "yes" later in text.
        assert_eq!(task.rules[0].pattern.as_str(), r"^\s*yes\s*$");
        assert_eq!(task.rules.len(), 4);
    }

    #[test]
    fn derived_generic_labels() {
        let task = TaskConfig::derived(
            "misc",
            vec!["Breach".into(), "No breach".into()],
        )
        .unwrap();
        assert!(task.instruction.contains("Breach, No breach"));
        assert_eq!(task.rules.len(), 4);
        assert_eq!(task.rules[0].label, "Breach");
        assert_eq!(task.labels, vec!["Breach", "No breach"]);
    }

    #[test]
    fn derived_abc_family() {
        let task = TaskConfig::derived(
            "choices",
            vec!["A".into(), "B".into(), "C".into()],
        )
        .unwrap();
        assert!(task.instruction.contains("A, B, or C"));
        assert_eq!(task.rules.len(), 6);
    }
}
