//! ASR (Automatic Speech Recognition) Module
//!
//! Recognizer backends that turn input into grammar-tagged events:
//! - Line: typed utterances or JSON events from any reader (stdin)
//! - Vosk: local offline recognition from the microphone (feature `vosk`)
//!
//! Recognizers run on their own thread and hand events to the pipeline
//! through a bounded channel, preserving emission order.

pub mod line;
pub mod tagger;
#[cfg(feature = "vosk")]
pub mod vosk;

use crate::config::Config;
use crate::grammar::{GrammarSpec, ACTION_SLOT, OBJECT_SLOT};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

// Re-export main types
pub use line::{LineFormat, LineRecognizer};
pub use tagger::tag;
#[cfg(feature = "vosk")]
pub use vosk::VoskRecognizer;

/// Capacity of the recognizer -> pipeline channel
pub const EVENT_QUEUE_SIZE: usize = 32;

/// Raw recognition event as produced by an engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Heard text, for logging
    #[serde(default)]
    pub text: String,
    /// Semantic slot values keyed by slot name
    #[serde(default)]
    pub semantics: BTreeMap<String, String>,
    /// Engine-native confidence, 0.0..=1.0
    pub confidence: f32,
}

impl RawEvent {
    pub fn new(topic_label: &str, action_label: &str, confidence: f32) -> Self {
        let mut semantics = BTreeMap::new();
        semantics.insert(OBJECT_SLOT.to_string(), topic_label.to_string());
        semantics.insert(ACTION_SLOT.to_string(), action_label.to_string());
        Self {
            text: String::new(),
            semantics,
            confidence,
        }
    }
}

/// Trait for recognition engines
pub trait SpeechRecognizer: Send {
    /// Constrain recognition to the compiled grammar
    fn load_grammar(&mut self, grammar: &GrammarSpec) -> Result<()>;

    /// Block until the next utterance matching the grammar.
    /// Returns `None` when the input is exhausted.
    fn next_event(&mut self) -> Result<Option<RawEvent>>;

    /// Get the engine name
    fn name(&self) -> &str;
}

/// Where recognition input comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum InputKind {
    /// Microphone through Vosk
    Mic,
    /// One typed utterance per line on stdin
    Text,
    /// One JSON event per line on stdin
    Json,
}

impl Default for InputKind {
    fn default() -> Self {
        if cfg!(feature = "vosk") {
            InputKind::Mic
        } else {
            InputKind::Text
        }
    }
}

/// Factory to create the requested recognizer
pub fn create_recognizer(
    input: InputKind,
    config: &Config,
    device: Option<usize>,
) -> Result<Box<dyn SpeechRecognizer>> {
    match input {
        InputKind::Text => Ok(Box::new(LineRecognizer::stdin(LineFormat::Text))),
        InputKind::Json => Ok(Box::new(LineRecognizer::stdin(LineFormat::Json))),
        #[cfg(feature = "vosk")]
        InputKind::Mic => Ok(Box::new(VoskRecognizer::new(config, device)?)),
        #[cfg(not(feature = "vosk"))]
        InputKind::Mic => {
            let _ = (config, device);
            anyhow::bail!("microphone input needs a build with the 'vosk' feature")
        }
    }
}

/// Handle to a recognizer running on its own thread
pub struct RecognizerHandle {
    running: Arc<AtomicBool>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl RecognizerHandle {
    /// Start feeding events from `recognizer` into `events`
    pub fn spawn(
        mut recognizer: Box<dyn SpeechRecognizer>,
        events: mpsc::Sender<RawEvent>,
    ) -> Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let name = recognizer.name().to_string();

        let thread_handle = thread::Builder::new()
            .name(format!("recognizer-{}", name))
            .spawn(move || {
                info!("🎙️ Recognizer '{}' listening", name);
                while flag.load(Ordering::SeqCst) {
                    match recognizer.next_event() {
                        Ok(Some(event)) => {
                            if !flag.load(Ordering::SeqCst) {
                                break;
                            }
                            if events.blocking_send(event).is_err() {
                                debug!("Event receiver dropped");
                                break;
                            }
                        }
                        Ok(None) => {
                            info!("Recognizer '{}' input ended", name);
                            break;
                        }
                        Err(e) => {
                            error!("❌ Recognizer '{}' failed: {:#}", name, e);
                            break;
                        }
                    }
                }
                flag.store(false, Ordering::SeqCst);
            })?;

        Ok(Self {
            running,
            thread_handle: Some(thread_handle),
        })
    }

    /// Stop producing events; the recognizer exits after its current read
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Wait for the recognizer thread to finish
    pub fn join(mut self) {
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RecognizerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
