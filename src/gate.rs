//! Confidence gate
//!
//! Each utterance is judged on its own: no smoothing, no hysteresis.

use crate::interpreter::RecognitionResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum confidence (percent) a result needs to be dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConfidenceThreshold(u8);

impl ConfidenceThreshold {
    /// Values above 100 are clamped
    pub fn new(percent: u8) -> Self {
        Self(percent.min(100))
    }

    pub fn percent(&self) -> u8 {
        self.0
    }
}

impl Default for ConfidenceThreshold {
    fn default() -> Self {
        Self(40)
    }
}

impl fmt::Display for ConfidenceThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Accept when the confidence reaches the threshold (inclusive)
pub fn accept(result: &RecognitionResult, threshold: ConfidenceThreshold) -> bool {
    result.confidence_percent >= threshold.percent()
}
