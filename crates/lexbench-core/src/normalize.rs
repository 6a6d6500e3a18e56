use std::sync::OnceLock;

use regex::Regex;

use crate::task::TaskConfig;

/// Map raw model output to one of the task's canonical labels.
///
/// Cleanup first: drop reasoning-model `<think>` blocks, take the first
/// non-empty line, collapse whitespace, strip surrounding punctuation,
/// lowercase. Then exact (case-insensitive) label match, then the task's
/// ordered rules, first match wins. Returns `None` when nothing matches;
/// callers record that as an unparseable prediction, not an error.
pub fn normalize(raw: &str, task: &TaskConfig) -> Option<String> {
    let low = clean(raw);
    if low.is_empty() {
        return None;
    }

    for label in &task.labels {
        if low == label.to_lowercase() {
            return Some(label.clone());
        }
    }

    for rule in &task.rules {
        if rule.pattern.is_match(&low) {
            return Some(rule.label.clone());
        }
    }

    None
}

fn think_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<think>.*?</think>").expect("static pattern"))
}

fn clean(raw: &str) -> String {
    let without_think = think_block().replace_all(raw, "");
    let first_line = without_think
        .trim()
        .lines()
        .next()
        .unwrap_or("")
        .trim()
        .to_string();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| " .,:;\"'`()[]{}".contains(c))
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskConfig;

    fn hearsay_task() -> TaskConfig {
        TaskConfig::new(
            "hearsay",
            vec!["Yes", "No"],
            vec![
                (r"\byes\b", "Yes"),
                (r"\bno\b", "No"),
                (r"\bhearsay\b", "Yes"),
            ],
            "Is the evidence hearsay? Answer with exactly: 'Yes' or 'No'.",
        )
        .unwrap()
    }

    #[test]
    fn exact_label_match_beats_rules() {
        let task = hearsay_task();
        assert_eq!(normalize("No", &task), Some("No".into()));
        assert_eq!(normalize("  yes  ", &task), Some("Yes".into()));
        assert_eq!(normalize("\"No.\"", &task), Some("No".into()));
    }

    #[test]
    fn rules_apply_in_order() {
        let task = hearsay_task();
        // "yes" rule fires before the "hearsay" rule in "yes, this is hearsay".
        assert_eq!(
            normalize("Yes, this is hearsay.", &task),
            Some("Yes".into())
        );
        // Only the "hearsay" rule matches here.
        assert_eq!(
            normalize("This statement is hearsay under FRE 801.", &task),
            Some("Yes".into())
        );
    }

    #[test]
    fn overlapping_rules_first_wins() {
        // Deliberately overlapping patterns for the same text.
        let task = TaskConfig::new(
            "overlap",
            vec!["Yes", "No"],
            vec![(r"\bhearsay\b", "Yes"), (r"\bhearsay\b", "No")],
            "x",
        )
        .unwrap();
        assert_eq!(normalize("hearsay indeed", &task), Some("Yes".into()));
    }

    #[test]
    fn unmatched_output_is_none() {
        let task = hearsay_task();
        assert_eq!(normalize("I cannot determine this.", &task), None);
        assert_eq!(normalize("", &task), None);
        assert_eq!(normalize("   \n  ", &task), None);
    }

    #[test]
    fn only_first_line_is_considered() {
        let task = hearsay_task();
        // Label on a later line does not count.
        assert_eq!(normalize("Unclear.\nYes", &task), None);
        assert_eq!(normalize("Yes\nBecause it was out of court.", &task), Some("Yes".into()));
    }

    #[test]
    fn think_blocks_are_stripped() {
        let task = hearsay_task();
        let raw = "<think>The declarant spoke out of court...\nso no?</think>\nYes";
        assert_eq!(normalize(raw, &task), Some("Yes".into()));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let task = hearsay_task();
        assert_eq!(normalize("YES", &task), Some("Yes".into()));
        assert_eq!(normalize("This Is HEARSAY", &task), Some("Yes".into()));
    }

    #[test]
    fn whitespace_is_collapsed_before_matching() {
        let task = TaskConfig::new(
            "spacing",
            vec!["Not covered"],
            vec![(r"\bnot covered\b", "Not covered")],
            "x",
        )
        .unwrap();
        assert_eq!(
            normalize("Not\t  covered", &task),
            Some("Not covered".into())
        );
    }
}
