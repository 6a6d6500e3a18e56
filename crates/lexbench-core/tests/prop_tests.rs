use proptest::prelude::*;

use lexbench_core::prelude::*;

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

fn arb_pool(min: usize) -> impl Strategy<Value = Vec<Example>> {
    prop::collection::vec(
        ("[a-zA-Z ]{1,30}", prop::bool::ANY)
            .prop_map(|(input, yes)| Example::new(input, if yes { "Yes" } else { "No" })),
        min..40,
    )
}

proptest! {
    /// Normalization has no hidden state: same input, same output.
    #[test]
    fn normalize_is_deterministic(raw in "\\PC{0,80}") {
        let task = hearsay_task();
        prop_assert_eq!(normalize(&raw, &task), normalize(&raw, &task));
    }

    /// Any label the normalizer produces is a member of the task's
    /// canonical label set.
    #[test]
    fn normalized_label_is_canonical(raw in "\\PC{0,80}") {
        let task = hearsay_task();
        if let Some(label) = normalize(&raw, &task) {
            prop_assert!(task.labels.contains(&label),
                "'{}' not in canonical label set", label);
        }
    }

    /// Sampling with the same seed returns an identical ordered sequence.
    #[test]
    fn sampler_is_deterministic(pool in arb_pool(1), n in 0usize..10, seed in any::<u64>()) {
        let task = hearsay_task();
        let a = sample_shots(&task, &pool, n.min(pool.len()), seed).unwrap();
        let b = sample_shots(&task, &pool, n.min(pool.len()), seed).unwrap();
        prop_assert_eq!(a, b);
    }

    /// Requesting more shots than the pool holds always fails, never panics.
    #[test]
    fn sampler_rejects_oversized_requests(pool in arb_pool(0), extra in 1usize..5, seed in any::<u64>()) {
        let task = hearsay_task();
        let result = sample_shots(&task, &pool, pool.len() + extra, seed);
        let is_insufficient = matches!(
            result,
            Err(LexError::Data(DataError::InsufficientExamples { .. }))
        );
        prop_assert!(is_insufficient);
    }

    /// Prompt rendering keeps shots ahead of the test input.
    #[test]
    fn prompt_orders_shots_before_test(n in 0usize..5) {
        let task = hearsay_task();
        let shots: Vec<Example> = (0..n)
            .map(|i| Example::new(format!("shotmarker{i}"), "Yes"))
            .collect();
        let prompt = build_prompt(&task, &shots, "finalmarker").unwrap();
        let text = prompt.render();
        let test_pos = text.rfind("finalmarker").unwrap();
        for i in 0..n {
            let pos = text.find(&format!("shotmarker{i}")).unwrap();
            prop_assert!(pos < test_pos);
        }
    }
}
