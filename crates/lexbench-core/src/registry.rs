use std::collections::HashMap;

use crate::error::{ConfigError, LexError, Result};
use crate::task::TaskConfig;

/// Ordered, read-only collection of registered tasks.
///
/// Constructed once at startup and passed by reference into the runner, so
/// tests can substitute fixture registries.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    order: Vec<String>,
    tasks: HashMap<String, TaskConfig>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The curated LegalBench task set: auto-gradable classification tasks
    /// with short, discrete answers.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();

        registry.register(TaskConfig::new(
            "hearsay",
            vec!["Yes", "No"],
            vec![
                (r"\byes\b", "Yes"),
                (r"\bno\b", "No"),
                (r"\bhearsay\b", "Yes"),
                (r"\bnot\s+hearsay\b", "No"),
                (r"\b(inadmissible|out[- ]of[- ]court)\b", "Yes"),
                (r"\b(admissible|non[- ]hearsay)\b", "No"),
            ],
            "Is the evidence hearsay? Answer with exactly: 'Yes' or 'No'.",
        )?)?;

        registry.register(TaskConfig::new(
            "personal_jurisdiction",
            vec!["Yes", "No"],
            vec![
                (r"\byes\b", "Yes"),
                (r"\bno\b", "No"),
                (r"\bhas\s+personal\s+jurisdiction\b", "Yes"),
                (r"\bno\s+personal\s+jurisdiction\b", "No"),
            ],
            "Determine if the forum court could exercise personal jurisdiction \
             over the defendant. Answer with exactly: 'Yes' or 'No'.",
        )?)?;

        registry.register(TaskConfig::new(
            "proa",
            vec!["Yes", "No"],
            vec![
                (r"\byes\b", "Yes"),
                (r"\bno\b", "No"),
                (r"\bprivate\s+right\s+of\s+action\b", "Yes"),
                (r"\bno\s+private\s+right\s+of\s+action\b", "No"),
            ],
            "Decide whether the statute text contains an explicit private right \
             of action. Answer with exactly: 'Yes' or 'No'.",
        )?)?;

        registry.register(TaskConfig::new(
            "privacy_policy_entailment",
            vec!["Correct", "Incorrect"],
            vec![
                (r"\bcorrect\b", "Correct"),
                (r"\bincorrect\b", "Incorrect"),
                (r"\b(entails|supported)\b", "Correct"),
                (r"\b(contradicts|not supported|does not entail)\b", "Incorrect"),
            ],
            "Given a privacy policy clause and a description, decide if the \
             description is correct. Answer with exactly: 'Correct' or 'Incorrect'.",
        )?)?;

        registry.register(TaskConfig::new(
            "insurance_policy_interpretation",
            vec!["A", "B", "C"],
            vec![
                (r"\ba\b", "A"),
                (r"\bb\b", "B"),
                (r"\bc\b", "C"),
                (r"\byes\b", "A"),
                (r"\bno\b", "B"),
                (r"\bambig|can't decide|cannot decide\b", "C"),
            ],
            "Read the insurance policy and claim. Choose: [A: Yes (covered); \
             B: No (not covered); C: It's ambiguous]. Answer with exactly one \
             of: A, B, or C.",
        )?)?;

        registry.register(TaskConfig::new(
            "consumer_contracts_qa",
            vec!["Yes", "No"],
            vec![
                (r"^\s*yes\s*$", "Yes"),
                (r"^\s*no\s*$", "No"),
                (r"\byes\b", "Yes"),
                (r"\bno\b", "No"),
            ],
            "Answer the yes/no question about the consumer contract excerpt. \
             Answer with exactly: 'Yes' or 'No'.",
        )?)?;

        Ok(registry)
    }

    /// Add a task. Registration order is preserved by `task_names`.
    pub fn register(&mut self, task: TaskConfig) -> Result<()> {
        if task.instruction.trim().is_empty() {
            return Err(LexError::Config(ConfigError::MalformedTask {
                task: task.name.clone(),
                reason: "empty instruction".into(),
            }));
        }
        if task.labels.is_empty() {
            return Err(LexError::Config(ConfigError::MalformedTask {
                task: task.name.clone(),
                reason: "empty label set".into(),
            }));
        }
        if !self.tasks.contains_key(&task.name) {
            self.order.push(task.name.clone());
        }
        self.tasks.insert(task.name.clone(), task);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&TaskConfig> {
        self.tasks
            .get(name)
            .ok_or_else(|| LexError::Config(ConfigError::UnknownTask(name.to_string())))
    }

    /// Registered task names, in registration order. Used by discovery mode.
    pub fn task_names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_contains_curated_tasks() {
        let registry = TaskRegistry::builtin().unwrap();
        assert_eq!(
            registry.task_names(),
            &[
                "hearsay",
                "personal_jurisdiction",
                "proa",
                "privacy_policy_entailment",
                "insurance_policy_interpretation",
                "consumer_contracts_qa",
            ]
        );
    }

    #[test]
    fn get_known_task() {
        let registry = TaskRegistry::builtin().unwrap();
        let task = registry.get("hearsay").unwrap();
        assert_eq!(task.labels, vec!["Yes", "No"]);
        assert_eq!(task.dataset.repo, "nguha/legalbench");
        assert_eq!(task.dataset.subset, "hearsay");
    }

    #[test]
    fn get_unknown_task_fails() {
        let registry = TaskRegistry::builtin().unwrap();
        let err = registry.get("rule_qa").unwrap_err();
        assert!(matches!(
            err,
            LexError::Config(ConfigError::UnknownTask(name)) if name == "rule_qa"
        ));
    }

    #[test]
    fn register_preserves_order_and_rejects_empty_instruction() {
        let mut registry = TaskRegistry::new();
        registry
            .register(
                TaskConfig::new("b_task", vec!["Yes", "No"], vec![], "Answer.").unwrap(),
            )
            .unwrap();
        registry
            .register(
                TaskConfig::new("a_task", vec!["Yes", "No"], vec![], "Answer.").unwrap(),
            )
            .unwrap();
        // Registration order, not alphabetical.
        assert_eq!(registry.task_names(), &["b_task", "a_task"]);

        let err = registry
            .register(TaskConfig::new("bad", vec!["Yes"], vec![], "  ").unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            LexError::Config(ConfigError::MalformedTask { .. })
        ));
    }

    #[test]
    fn reregistration_replaces_without_duplicating_order() {
        let mut registry = TaskRegistry::new();
        let t1 = TaskConfig::new("t", vec!["Yes", "No"], vec![], "v1").unwrap();
        let t2 = TaskConfig::new("t", vec!["Yes", "No"], vec![], "v2").unwrap();
        registry.register(t1).unwrap();
        registry.register(t2).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("t").unwrap().instruction, "v2");
    }
}
