use proptest::prelude::*;
use std::collections::BTreeSet;
use speechlauncher::gate::{accept, ConfidenceThreshold};
use speechlauncher::grammar::{compile, normalize_phrase};
use speechlauncher::interpreter::RecognitionResult;
use speechlauncher::resolver::resolve;
use speechlauncher::{Action, Config, Topic};

fn result(confidence: u8) -> RecognitionResult {
    RecognitionResult {
        topic_label: "Test".into(),
        action_label: "Echo".into(),
        confidence_percent: confidence,
    }
}

/// Configurations with unique names and at least one trigger word everywhere
fn config_strategy() -> impl Strategy<Value = Config> {
    let words = prop::collection::vec("[a-z]{1,6}( [a-z]{1,6})?", 1..4);
    let actions = prop::collection::vec(words.clone(), 1..4);
    prop::collection::vec((words, actions), 1..5).prop_map(|topics| Config {
        objects: topics
            .into_iter()
            .enumerate()
            .map(|(t, (topic_words, actions))| Topic {
                name: format!("Topic{}", t),
                trigger_words: topic_words,
                actions: actions
                    .into_iter()
                    .enumerate()
                    .map(|(a, action_words)| Action {
                        name: format!("Action{}", a),
                        trigger_words: action_words,
                        command: format!("cmd-{}-{}", t, a),
                        ..Action::default()
                    })
                    .collect(),
            })
            .collect(),
        ..Config::default()
    })
}

proptest! {
    #[test]
    fn gate_is_monotonic(confidence in 0u8..=100, t in 0u8..=100, lower in 0u8..=100) {
        let r = result(confidence);
        if accept(&r, ConfidenceThreshold::new(t)) {
            let lower = lower.min(t);
            prop_assert!(accept(&r, ConfidenceThreshold::new(lower)));
        }
    }

    #[test]
    fn gate_boundary_is_inclusive(t in 0u8..=100) {
        prop_assert!(accept(&result(t), ConfidenceThreshold::new(t)));
    }

    #[test]
    fn vocabulary_sizes_match_distinct_trigger_words(config in config_strategy()) {
        let grammar = compile(&config).unwrap();

        let topic_words: BTreeSet<String> = config.objects.iter()
            .flat_map(|t| t.trigger_words.iter().map(|w| normalize_phrase(w)))
            .collect();
        let action_words: BTreeSet<String> = config.objects.iter()
            .flat_map(|t| t.actions.iter())
            .flat_map(|a| a.trigger_words.iter().map(|w| normalize_phrase(w)))
            .collect();

        prop_assert_eq!(grammar.object.vocabulary_size(), topic_words.len());
        prop_assert_eq!(grammar.action.vocabulary_size(), action_words.len());
    }

    #[test]
    fn resolve_is_deterministic(config in config_strategy(), t in 0usize..5, a in 0usize..4) {
        let topic = format!("Topic{}", t);
        let action = format!("Action{}", a);
        let first = resolve(&config, &topic, &action).ok().map(|x| x as *const Action);
        for _ in 0..3 {
            let again = resolve(&config, &topic, &action).ok().map(|x| x as *const Action);
            prop_assert_eq!(first, again);
        }
    }
}
