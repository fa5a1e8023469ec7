//! Line-oriented recognizer
//!
//! Reads utterances or pre-tagged JSON events from a reader, one per line.
//! Useful without a microphone and for driving the launcher from another
//! speech engine.

use super::{tagger, RawEvent, SpeechRecognizer};
use crate::grammar::GrammarSpec;
use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, Stdin};
use tracing::{debug, warn};

/// Confidence given to typed utterances without an explicit value
pub const TYPED_CONFIDENCE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFormat {
    /// `okay computer test echo` or `okay computer test echo | 0.3`;
    /// the confidence is engine-native, 0.0 to 1.0
    Text,
    /// `{"semantics": {"object": "Test", "action": "Echo"}, "confidence": 0.75}`
    Json,
}

pub struct LineRecognizer<R> {
    reader: R,
    format: LineFormat,
    grammar: Option<GrammarSpec>,
}

impl LineRecognizer<BufReader<Stdin>> {
    pub fn stdin(format: LineFormat) -> Self {
        Self::new(BufReader::new(std::io::stdin()), format)
    }
}

impl<R: BufRead> LineRecognizer<R> {
    pub fn new(reader: R, format: LineFormat) -> Self {
        Self {
            reader,
            format,
            grammar: None,
        }
    }

    fn parse_text(&self, line: &str) -> Result<Option<RawEvent>> {
        let grammar = self
            .grammar
            .as_ref()
            .context("No grammar loaded for text input")?;

        let (utterance, confidence) = match line.rsplit_once('|') {
            Some((text, value)) => match value.trim().parse::<f32>() {
                Ok(confidence) if confidence > 1.0 => {
                    warn!(
                        "⚠️ Confidence {} is above 1.0 and counts as 100% (scale is 0.0 to 1.0)",
                        confidence
                    );
                    (text, confidence)
                }
                Ok(confidence) => (text, confidence),
                Err(_) => {
                    warn!("⚠️ Ignoring bad confidence '{}'", value.trim());
                    (text, TYPED_CONFIDENCE)
                }
            },
            None => (line, TYPED_CONFIDENCE),
        };

        let event = tagger::tag(grammar, utterance, confidence);
        if event.is_none() {
            debug!("No grammar match for: '{}'", utterance.trim());
        }
        Ok(event)
    }

    fn parse_json(&self, line: &str) -> Option<RawEvent> {
        let event: RawEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                warn!("⚠️ Skipping unreadable event: {}", e);
                return None;
            }
        };

        // Untagged events with text go through the grammar like typed input
        if event.semantics.is_empty() && !event.text.is_empty() {
            if let Some(grammar) = &self.grammar {
                let tagged = tagger::tag(grammar, &event.text, event.confidence);
                if tagged.is_none() {
                    debug!("No grammar match for: '{}'", event.text);
                }
                return tagged;
            }
        }

        Some(event)
    }
}

impl<R: BufRead + Send> SpeechRecognizer for LineRecognizer<R> {
    fn load_grammar(&mut self, grammar: &GrammarSpec) -> Result<()> {
        self.grammar = Some(grammar.clone());
        Ok(())
    }

    fn next_event(&mut self) -> Result<Option<RawEvent>> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if self.reader.read_until(b'\n', &mut buf)? == 0 {
                return Ok(None);
            }

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line,
                Err(e) => {
                    warn!("⚠️ Skipping line that is not UTF-8: {}", e);
                    continue;
                }
            };
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let event = match self.format {
                LineFormat::Text => self.parse_text(trimmed)?,
                LineFormat::Json => self.parse_json(trimmed),
            };
            if event.is_some() {
                return Ok(event);
            }
        }
    }

    fn name(&self) -> &str {
        match self.format {
            LineFormat::Text => "text",
            LineFormat::Json => "json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::grammar::{compile, ACTION_SLOT, OBJECT_SLOT};
    use crate::interpreter::interpret;
    use std::io::Cursor;

    fn recognizer(input: &str, format: LineFormat) -> LineRecognizer<Cursor<Vec<u8>>> {
        let mut rec = LineRecognizer::new(Cursor::new(input.as_bytes().to_vec()), format);
        rec.load_grammar(&compile(&Config::sample()).unwrap()).unwrap();
        rec
    }

    #[test]
    fn test_text_lines_skip_non_matching() {
        let mut rec = recognizer(
            "hello there\n\n# comment\nokay computer test echo | 0.3\nokay computer what time is it\n",
            LineFormat::Text,
        );

        let first = rec.next_event().unwrap().expect("Expected event");
        assert_eq!(first.semantics[OBJECT_SLOT], "Test");
        assert_eq!(first.confidence, 0.3);

        let second = rec.next_event().unwrap().expect("Expected event");
        assert_eq!(second.semantics[ACTION_SLOT], "Current Time");
        assert_eq!(second.confidence, TYPED_CONFIDENCE);

        assert!(rec.next_event().unwrap().is_none());
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        let mut input = b"okay computer test echo\n".to_vec();
        input.extend_from_slice(b"\xff\xfe garbage\n");
        input.extend_from_slice(b"okay computer what time is it\n");
        let mut rec = LineRecognizer::new(Cursor::new(input), LineFormat::Text);
        rec.load_grammar(&compile(&Config::sample()).unwrap()).unwrap();

        let first = rec.next_event().unwrap().expect("Expected event");
        assert_eq!(first.semantics[ACTION_SLOT], "Echo");
        let second = rec.next_event().unwrap().expect("Line after bad bytes lost");
        assert_eq!(second.semantics[ACTION_SLOT], "Current Time");
        assert!(rec.next_event().unwrap().is_none());
    }

    #[test]
    fn test_percent_confidence_passes_through_for_clamping() {
        let mut rec = recognizer("okay computer test echo | 75\n", LineFormat::Text);
        let event = rec.next_event().unwrap().expect("Expected event");
        assert_eq!(event.confidence, 75.0);
        assert_eq!(interpret(&event).unwrap().confidence_percent, 100);
    }

    #[test]
    fn test_text_without_grammar_fails() {
        let mut rec = LineRecognizer::new(Cursor::new(b"okay computer test echo\n".to_vec()), LineFormat::Text);
        assert!(rec.next_event().is_err());
    }

    #[test]
    fn test_json_lines() {
        let mut rec = recognizer(
            concat!(
                "not json\n",
                "{\"semantics\":{\"object\":\"Ghost\",\"action\":\"Echo\"},\"confidence\":0.9}\n",
                "{\"semantics\":{\"object\":\"Test\"},\"confidence\":0.9}\n",
                "{\"text\":\"okay computer test message\",\"confidence\":0.6}\n",
            ),
            LineFormat::Json,
        );

        // Pre-tagged events pass through untouched, even if unknown or incomplete
        let ghost = rec.next_event().unwrap().unwrap();
        assert_eq!(ghost.semantics[OBJECT_SLOT], "Ghost");
        let partial = rec.next_event().unwrap().unwrap();
        assert!(!partial.semantics.contains_key(ACTION_SLOT));

        let tagged = rec.next_event().unwrap().unwrap();
        assert_eq!(tagged.semantics[ACTION_SLOT], "Echo");
        assert_eq!(tagged.confidence, 0.6);

        assert!(rec.next_event().unwrap().is_none());
        assert_eq!(rec.name(), "json");
    }
}
