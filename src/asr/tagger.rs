//! Grammar tagger
//!
//! Assigns slot values to an utterance the way a grammar-driven engine does:
//! the wake phrase, then exactly one object phrase, then exactly one action
//! phrase, with nothing left over. An action phrase shared by several objects
//! resolves to the heard object's own action; otherwise the first declared
//! alternative wins.

use super::RawEvent;
use crate::grammar::{normalize_phrase, GrammarSpec, ACTION_SLOT, OBJECT_SLOT};
use std::collections::BTreeMap;

/// Tag an utterance against the grammar; `None` if it does not fit
pub fn tag(grammar: &GrammarSpec, utterance: &str, confidence: f32) -> Option<RawEvent> {
    let text = normalize_phrase(utterance);
    let rest = strip_phrase(&text, &grammar.wake_phrase)?;

    let mut fallback = None;
    for object in &grammar.object.alternatives {
        let Some(tail) = strip_phrase(rest, &object.phrase) else {
            continue;
        };
        let Some(action) = grammar.action.label_owned_by(tail, &object.label) else {
            continue;
        };
        if owns(grammar, tail, &object.label, action) {
            return Some(event(text, &object.label, action, confidence));
        }
        fallback.get_or_insert((object.label.as_str(), action));
    }

    fallback.map(|(object, action)| event(text, object, action, confidence))
}

/// Whether `action` under `phrase` was declared by `object`
fn owns(grammar: &GrammarSpec, phrase: &str, object: &str, action: &str) -> bool {
    grammar.action.alternatives.iter().any(|a| {
        a.phrase == phrase && a.label == action && a.owner.as_deref() == Some(object)
    })
}

fn event(text: String, object: &str, action: &str, confidence: f32) -> RawEvent {
    let mut semantics = BTreeMap::new();
    semantics.insert(OBJECT_SLOT.to_string(), object.to_string());
    semantics.insert(ACTION_SLOT.to_string(), action.to_string());
    RawEvent {
        text,
        semantics,
        confidence,
    }
}

/// `text` minus a leading whole-word `phrase` and the following space
fn strip_phrase<'a>(text: &'a str, phrase: &str) -> Option<&'a str> {
    text.strip_prefix(phrase)?.strip_prefix(' ')
}
