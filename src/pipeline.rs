//! Recognition pipeline
//!
//! Runs interpret -> gate -> resolve -> dispatch for each event, in arrival
//! order, on a single consumer. Nothing that happens to one utterance stops
//! the loop.

use crate::asr::RawEvent;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::LauncherError;
use crate::gate::{self, ConfidenceThreshold};
use crate::interpreter::{self, RecognitionResult};
use crate::resolver;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// What happened to one event
#[derive(Debug)]
pub enum Outcome {
    /// Action resolved and handed to the launcher
    Dispatched(RecognitionResult),
    /// Below the confidence threshold; not an error
    LowConfidence(RecognitionResult),
    /// Malformed event or labels that match nothing configured
    Rejected(LauncherError),
    /// Resolved, but the launcher failed
    LaunchFailed(LauncherError),
}

/// Counters for one run of the loop
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    pub received: usize,
    pub dispatched: usize,
    pub low_confidence: usize,
    pub rejected: usize,
    pub launch_failed: usize,
}

impl PipelineStats {
    fn record(&mut self, outcome: &Outcome) {
        self.received += 1;
        match outcome {
            Outcome::Dispatched(_) => self.dispatched += 1,
            Outcome::LowConfidence(_) => self.low_confidence += 1,
            Outcome::Rejected(_) => self.rejected += 1,
            Outcome::LaunchFailed(_) => self.launch_failed += 1,
        }
    }
}

pub struct Pipeline {
    config: Arc<Config>,
    threshold: ConfidenceThreshold,
    dispatcher: Dispatcher,
}

impl Pipeline {
    pub fn new(config: Arc<Config>, dispatcher: Dispatcher) -> Self {
        let threshold = config.threshold();
        Self {
            config,
            threshold,
            dispatcher,
        }
    }

    pub fn threshold(&self) -> ConfidenceThreshold {
        self.threshold
    }

    /// Process one event synchronously
    pub fn handle(&self, event: &RawEvent) -> Outcome {
        if !event.text.is_empty() {
            debug!("📝 Heard: '{}'", event.text);
        }

        let result = match interpreter::interpret(event) {
            Ok(result) => result,
            Err(e) => {
                warn!("⚠️ Dropping event: {}", e);
                return Outcome::Rejected(e);
            }
        };
        info!("🎯 {}", result);

        if !gate::accept(&result, self.threshold) {
            info!(
                "🔇 Confidence low ({}% < {}), ignoring",
                result.confidence_percent, self.threshold
            );
            return Outcome::LowConfidence(result);
        }

        let action = match resolver::resolve(&self.config, &result.topic_label, &result.action_label)
        {
            Ok(action) => action,
            Err(e) => {
                warn!("⚠️ Grammar and configuration disagree: {}", e);
                return Outcome::Rejected(e);
            }
        };

        match self.dispatcher.dispatch(&result, action) {
            Ok(()) => Outcome::Dispatched(result),
            Err(e) => {
                error!("❌ Failed to execute {}/{}: {}", result.topic_label, result.action_label, e);
                Outcome::LaunchFailed(e)
            }
        }
    }

    /// Consume events until every sender is gone
    pub async fn run(&self, mut events: mpsc::Receiver<RawEvent>) -> PipelineStats {
        let mut stats = PipelineStats::default();
        while let Some(event) = events.recv().await {
            let outcome = self.handle(&event);
            stats.record(&outcome);
        }
        info!(
            "Recognition loop finished: {} events, {} dispatched",
            stats.received, stats.dispatched
        );
        stats
    }
}
