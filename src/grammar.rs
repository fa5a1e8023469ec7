//! Grammar compiler
//!
//! Turns the configuration into a three-part grammar: the wake phrase, one
//! `"object"` slot and one `"action"` slot. Actions of every object share a
//! single vocabulary; each action alternative remembers the object that
//! declared it so a tagger can prefer the heard object's own action.

use crate::config::Config;
use crate::error::{LauncherError, LauncherResult};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Semantic key of the object region
pub const OBJECT_SLOT: &str = "object";
/// Semantic key of the action region
pub const ACTION_SLOT: &str = "action";

/// One spoken alternative and the label it yields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alternative {
    pub phrase: String,
    pub label: String,
    /// Object that declared this action phrase (action slot only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// A named grammar region whose matched alternative yields a label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemanticSlot {
    pub key: &'static str,
    pub alternatives: Vec<Alternative>,
}

impl SemanticSlot {
    fn new(key: &'static str) -> Self {
        Self {
            key,
            alternatives: Vec::new(),
        }
    }

    fn push(&mut self, word: &str, label: &str, owner: Option<&str>) {
        let phrase = normalize_phrase(word);
        if phrase.is_empty() {
            return;
        }
        self.alternatives.push(Alternative {
            phrase,
            label: label.to_string(),
            owner: owner.map(str::to_string),
        });
    }

    /// Distinct phrases of this slot, sorted
    pub fn vocabulary(&self) -> BTreeSet<&str> {
        self.alternatives.iter().map(|a| a.phrase.as_str()).collect()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary().len()
    }

    /// Alternatives for a phrase, in declaration order
    pub fn labels_for<'a>(&'a self, phrase: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.alternatives
            .iter()
            .filter(move |a| a.phrase == phrase)
            .map(|a| a.label.as_str())
    }

    /// Label for `phrase`, preferring an alternative declared by `owner`
    /// and falling back to the first declared one
    pub fn label_owned_by(&self, phrase: &str, owner: &str) -> Option<&str> {
        let mut matching = self.alternatives.iter().filter(|a| a.phrase == phrase);
        let first = matching.next()?;
        let chosen = if first.owner.as_deref() == Some(owner) {
            first
        } else {
            matching
                .find(|a| a.owner.as_deref() == Some(owner))
                .unwrap_or(first)
        };
        Some(chosen.label.as_str())
    }
}

/// Compiled grammar: `<wake phrase> <object slot> <action slot>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrammarSpec {
    pub wake_phrase: String,
    pub object: SemanticSlot,
    pub action: SemanticSlot,
}

impl GrammarSpec {
    /// Every accepted utterance, for engines that take a flat phrase list
    pub fn phrases(&self) -> Vec<String> {
        let actions = self.action.vocabulary();
        self.object
            .vocabulary()
            .into_iter()
            .flat_map(|object| {
                actions
                    .iter()
                    .map(move |action| format!("{} {} {}", self.wake_phrase, object, action))
            })
            .collect()
    }
}

/// Compile the configuration into a grammar
///
/// Objects and actions without trigger words contribute no alternatives.
/// Fails only when there is nothing to match against.
pub fn compile(config: &Config) -> LauncherResult<GrammarSpec> {
    if config.objects.is_empty() {
        return Err(LauncherError::Config("no objects to compile".to_string()));
    }

    let wake_phrase = normalize_phrase(&config.wake_word);
    if wake_phrase.is_empty() {
        return Err(LauncherError::Config("wake word is empty".to_string()));
    }

    let mut object = SemanticSlot::new(OBJECT_SLOT);
    let mut action = SemanticSlot::new(ACTION_SLOT);

    for topic in &config.objects {
        for word in &topic.trigger_words {
            object.push(word, &topic.name, None);
        }
        for entry in &topic.actions {
            for word in &entry.trigger_words {
                action.push(word, &entry.name, Some(&topic.name));
            }
        }
    }

    debug!(
        "Compiled grammar: wake='{}', {} object phrases, {} action phrases",
        wake_phrase,
        object.vocabulary_size(),
        action.vocabulary_size()
    );

    Ok(GrammarSpec {
        wake_phrase,
        object,
        action,
    })
}

/// Lowercase, drop punctuation, collapse whitespace
pub fn normalize_phrase(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '\'' {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .to_lowercase();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Action, Topic};

    #[test]
    fn test_normalize_phrase() {
        assert_eq!(normalize_phrase("  Okay,   Computer! "), "okay computer");
        assert_eq!(normalize_phrase("What's\tthe time"), "what's the time");
        assert_eq!(normalize_phrase("..."), "");
    }

    #[test]
    fn test_compile_sample() {
        let grammar = compile(&Config::sample()).expect("Failed to compile");
        assert_eq!(grammar.wake_phrase, "okay computer");
        assert_eq!(grammar.object.key, OBJECT_SLOT);
        assert_eq!(grammar.action.key, ACTION_SLOT);
        assert_eq!(grammar.object.vocabulary_size(), 2);
        assert_eq!(grammar.action.vocabulary_size(), 4);
        assert_eq!(
            grammar.action.labels_for("is the time").collect::<Vec<_>>(),
            vec!["Current Time"]
        );
    }

    #[test]
    fn test_action_vocabulary_is_global() {
        let grammar = compile(&Config::sample()).expect("Failed to compile");
        let phrases = grammar.phrases();
        // Actions are not scoped per object in the grammar
        assert!(phrases.contains(&"okay computer test time is it".to_string()));
        assert!(phrases.contains(&"okay computer what echo".to_string()));
        assert_eq!(phrases.len(), 2 * 4);
    }

    #[test]
    fn test_empty_trigger_lists_contribute_nothing() {
        let config = Config {
            objects: vec![
                Topic::new("Silent", &[]).with_action(Action::new("Hidden", &[], "true")),
                Topic::new("Loud", &["loud", " "]).with_action(Action::new("Go", &["go"], "true")),
            ],
            ..Config::default()
        };
        let grammar = compile(&config).expect("Failed to compile");
        assert_eq!(grammar.object.alternatives.len(), 1);
        assert_eq!(grammar.action.alternatives.len(), 1);
        assert_eq!(grammar.object.labels_for("silent").count(), 0);
    }

    #[test]
    fn test_duplicates_are_kept_in_declaration_order() {
        let config = Config {
            objects: vec![
                Topic::new("Music", &["music"]).with_action(Action::new("Play", &["play"], "mpc")),
                Topic::new("Player", &["MUSIC"]).with_action(Action::new("Start", &["play"], "vlc")),
            ],
            ..Config::default()
        };
        let grammar = compile(&config).expect("Failed to compile");
        assert_eq!(grammar.object.alternatives.len(), 2);
        assert_eq!(grammar.object.vocabulary_size(), 1);
        assert_eq!(
            grammar.object.labels_for("music").collect::<Vec<_>>(),
            vec!["Music", "Player"]
        );
        assert_eq!(
            grammar.action.labels_for("play").collect::<Vec<_>>(),
            vec!["Play", "Start"]
        );
    }

    #[test]
    fn test_action_label_prefers_owner() {
        let config = Config {
            objects: vec![
                Topic::new("Browser", &["browser"]).with_action(Action::new("Open", &["open"], "firefox")),
                Topic::new("Editor", &["editor"]).with_action(Action::new("Edit", &["open"], "code")),
            ],
            ..Config::default()
        };
        let grammar = compile(&config).expect("Failed to compile");
        assert_eq!(grammar.action.label_owned_by("open", "Browser"), Some("Open"));
        assert_eq!(grammar.action.label_owned_by("open", "Editor"), Some("Edit"));
        // No owned alternative: first declared wins
        assert_eq!(grammar.action.label_owned_by("open", "Ghost"), Some("Open"));
        assert_eq!(grammar.action.label_owned_by("close", "Browser"), None);
        assert_eq!(grammar.object.alternatives[0].owner, None);
        assert_eq!(grammar.action.alternatives[1].owner.as_deref(), Some("Editor"));
    }

    #[test]
    fn test_compile_rejects_empty_config() {
        assert!(matches!(
            compile(&Config::default()),
            Err(LauncherError::Config(_))
        ));

        let mut config = Config::sample();
        config.wake_word = " ! ".into();
        assert!(compile(&config).is_err());
    }

    #[test]
    fn test_compile_is_deterministic() {
        let config = Config::sample();
        assert_eq!(compile(&config).unwrap(), compile(&config).unwrap());
    }
}
