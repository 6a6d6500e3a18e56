use std::fmt::Write as _;

use crate::error::{ConfigError, LexError, Result};
use crate::task::{Example, TaskConfig};

/// System message sent with every evaluation prompt.
pub const SYSTEM_INSTRUCTION: &str =
    "Follow the task instruction exactly. Output only the label; no explanation.";

/// A fully composed prompt for one test example. Built fresh per call,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub task: String,
    pub instruction: String,
    pub shots: Vec<Example>,
    pub test_input: String,
}

impl Prompt {
    /// Render the user-message text: instruction, then the shots in order,
    /// then the test input awaiting its answer.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.instruction);
        out.push_str("\n\n");
        for shot in &self.shots {
            let _ = writeln!(out, "Text: {}", shot.input);
            let _ = writeln!(out, "Answer: {}", shot.label);
            out.push('\n');
        }
        let _ = writeln!(out, "Text: {}", self.test_input);
        out.push_str("Answer:");
        out
    }
}

/// Compose a prompt from the task instruction, few-shot examples and the
/// test input. Pure; fails only on malformed task configuration.
pub fn build_prompt(task: &TaskConfig, shots: &[Example], test_input: &str) -> Result<Prompt> {
    if task.instruction.trim().is_empty() {
        return Err(LexError::Config(ConfigError::MalformedTask {
            task: task.name.clone(),
            reason: "empty instruction".into(),
        }));
    }
    Ok(Prompt {
        task: task.name.clone(),
        instruction: task.instruction.clone(),
        shots: shots.to_vec(),
        test_input: test_input.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> TaskConfig {
        TaskConfig::new(
            "hearsay",
            vec!["Yes", "No"],
            vec![],
            "Is the evidence hearsay? Answer with exactly: 'Yes' or 'No'.",
        )
        .unwrap()
    }

    #[test]
    fn zero_shot_render() {
        let prompt = build_prompt(&task(), &[], "Witness repeats what she heard.").unwrap();
        let text = prompt.render();
        assert!(text.starts_with("Is the evidence hearsay?"));
        assert!(text.ends_with("Text: Witness repeats what she heard.\nAnswer:"));
    }

    #[test]
    fn shots_render_before_test_input_in_order() {
        let shots = vec![
            Example::new("first shot", "Yes"),
            Example::new("second shot", "No"),
        ];
        let prompt = build_prompt(&task(), &shots, "the test case").unwrap();
        let text = prompt.render();

        let first = text.find("first shot").unwrap();
        let second = text.find("second shot").unwrap();
        let test = text.find("the test case").unwrap();
        assert!(first < second && second < test);
        assert!(text.contains("Answer: Yes"));
        assert!(text.contains("Answer: No"));
    }

    #[test]
    fn instruction_names_the_label_vocabulary() {
        let prompt = build_prompt(&task(), &[], "x").unwrap();
        let text = prompt.render();
        assert!(text.contains("'Yes' or 'No'"));
    }

    #[test]
    fn empty_instruction_is_config_error() {
        let mut bad = task();
        bad.instruction = "   ".into();
        let err = build_prompt(&bad, &[], "x").unwrap_err();
        assert!(matches!(
            err,
            LexError::Config(ConfigError::MalformedTask { .. })
        ));
    }

    #[test]
    fn building_is_pure() {
        let shots = vec![Example::new("a", "Yes")];
        let p1 = build_prompt(&task(), &shots, "t").unwrap();
        let p2 = build_prompt(&task(), &shots, "t").unwrap();
        assert_eq!(p1, p2);
        assert_eq!(p1.render(), p2.render());
    }
}
