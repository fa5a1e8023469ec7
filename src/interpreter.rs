//! Recognition result interpreter
//!
//! Pulls the `"object"` and `"action"` slot values and the confidence out of
//! a raw recognizer event.

use crate::asr::RawEvent;
use crate::error::{LauncherError, LauncherResult};
use crate::grammar::{ACTION_SLOT, OBJECT_SLOT};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One interpreted utterance; consumed once and discarded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub topic_label: String,
    pub action_label: String,
    /// 0..=100
    pub confidence_percent: u8,
}

impl fmt::Display for RecognitionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" => \"{}\" ({}%)",
            self.topic_label, self.action_label, self.confidence_percent
        )
    }
}

/// Interpret a raw event. Missing slots mean the grammar and recognizer disagree.
pub fn interpret(event: &RawEvent) -> LauncherResult<RecognitionResult> {
    let topic_label = slot(event, OBJECT_SLOT)?;
    let action_label = slot(event, ACTION_SLOT)?;
    let confidence_percent = to_percent(event.confidence)?;

    Ok(RecognitionResult {
        topic_label,
        action_label,
        confidence_percent,
    })
}

fn slot(event: &RawEvent, key: &str) -> LauncherResult<String> {
    event
        .semantics
        .get(key)
        .cloned()
        .ok_or_else(|| LauncherError::MalformedEvent(format!("missing '{}' slot", key)))
}

/// Engine-native 0.0..=1.0 to a rounded, clamped percentage
pub fn to_percent(confidence: f32) -> LauncherResult<u8> {
    if !confidence.is_finite() {
        return Err(LauncherError::MalformedEvent(format!(
            "confidence {} is not a number",
            confidence
        )));
    }
    Ok((confidence * 100.0).round().clamp(0.0, 100.0) as u8)
}
