//! ASR (Automatic Speech Recognition) module using Vosk

use super::{tagger, RawEvent, SpeechRecognizer};
use crate::audio::{self, AudioCapture};
use crate::config::Config;
use crate::grammar::GrammarSpec;
use anyhow::{Context, Result};
use std::sync::mpsc::Receiver;
use tracing::{debug, info};
use vosk::{Model, Recognizer};

/// Vosk-based recognizer constrained to the compiled phrases
pub struct VoskRecognizer {
    model: Model,
    recognizer: Option<Recognizer>,
    grammar: Option<GrammarSpec>,
    audio_rx: Receiver<Vec<i16>>,
    // Dropped with the recognizer, releasing the microphone
    capture: AudioCapture,
}

impl VoskRecognizer {
    /// Load the model and start microphone capture
    pub fn new(config: &Config, device: Option<usize>) -> Result<Self> {
        let model_path = std::path::PathBuf::from(&config.vosk_model_path);

        if !model_path.exists() {
            return Err(anyhow::anyhow!(
                "Vosk model not found at {}",
                model_path.display()
            ));
        }

        info!("Loading Vosk model from: {}", model_path.display());

        let model_str = model_path.to_str().ok_or_else(|| {
            anyhow::anyhow!(
                "Vosk model path is not valid UTF-8: {}",
                model_path.display()
            )
        })?;

        let model = Model::new(model_str).context("Failed to load Vosk model")?;
        let (capture, audio_rx) = AudioCapture::start(device)?;

        Ok(Self {
            model,
            recognizer: None,
            grammar: None,
            audio_rx,
            capture,
        })
    }
}

impl SpeechRecognizer for VoskRecognizer {
    fn load_grammar(&mut self, grammar: &GrammarSpec) -> Result<()> {
        let phrases = grammar.phrases();
        info!(
            "⚙️ Using grammar ({} phrases) on {}",
            phrases.len(),
            self.capture.device_name()
        );

        let sample_rate = audio::SAMPLE_RATE as f32;
        let mut recognizer = Recognizer::new_with_grammar(&self.model, sample_rate, &phrases)
            .context("Failed to create Vosk recognizer with grammar")?;
        recognizer.set_words(true);

        self.recognizer = Some(recognizer);
        self.grammar = Some(grammar.clone());
        Ok(())
    }

    fn next_event(&mut self) -> Result<Option<RawEvent>> {
        let (Some(recognizer), Some(grammar)) = (self.recognizer.as_mut(), self.grammar.as_ref())
        else {
            anyhow::bail!("No grammar loaded");
        };

        // Audio capture ending closes the channel
        while let Ok(samples) = self.audio_rx.recv() {
            match recognizer.accept_waveform(&samples) {
                vosk::DecodingState::Finalized => {
                    let result = recognizer.final_result();
                    let Some(single) = result.single() else {
                        continue;
                    };
                    let Some(text) = extract_text(single.text) else {
                        continue;
                    };

                    // Mean word confidence
                    let confidence = if single.result.is_empty() {
                        1.0f32
                    } else {
                        let sum: f32 = single.result.iter().map(|w| w.conf).sum();
                        sum / single.result.len() as f32
                    };

                    match tagger::tag(grammar, &text, confidence) {
                        Some(event) => return Ok(Some(event)),
                        None => debug!("Out of grammar: '{}'", text),
                    }
                }
                vosk::DecodingState::Running => {
                    // Hypothesis in progress
                    debug!("Partial: {}", recognizer.partial_result().partial);
                }
                vosk::DecodingState::Failed => {
                    debug!("Decoding failed for this chunk");
                }
            }
        }

        Ok(None)
    }

    fn name(&self) -> &str {
        "vosk"
    }
}

/// Extract text from Vosk result, filtering empty and unknown results
fn extract_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "[unk]" {
        None
    } else {
        Some(trimmed.to_string())
    }
}
