//! Configuration model
//!
//! Wake word, confidence threshold, and the objects (topics) with their
//! actions. Loaded once from `settings.yml` and read-only afterwards.

use crate::error::{LauncherError, LauncherResult};
use crate::gate::ConfidenceThreshold;
use crate::grammar::normalize_phrase;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Speech
    pub locale: String,
    pub confidence: u8,
    pub wake_word: String,
    pub vosk_model_path: String,

    // Feedback
    pub notifier: String,
    pub audit_log: bool,

    // Data
    pub objects: Vec<Topic>,
}

/// A named group of voice-triggerable actions ("object" in the settings file)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Topic {
    pub name: String,
    #[serde(rename = "words")]
    pub trigger_words: Vec<String>,
    pub actions: Vec<Action>,
}

/// A command with its launch parameters and its own trigger words
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Action {
    pub name: String,
    #[serde(rename = "words")]
    pub trigger_words: Vec<String>,
    #[serde(rename = "cmd", alias = "command")]
    pub command: String,
    pub arguments: String,
    #[serde(rename = "dir", alias = "working_directory")]
    pub working_directory: String,
    pub visible: bool,
}

impl Topic {
    pub fn new(name: &str, trigger_words: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            trigger_words: trigger_words.iter().map(|w| w.to_string()).collect(),
            actions: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }
}

impl Action {
    pub fn new(name: &str, trigger_words: &[&str], command: &str) -> Self {
        Self {
            name: name.to_string(),
            trigger_words: trigger_words.iter().map(|w| w.to_string()).collect(),
            command: command.to_string(),
            ..Default::default()
        }
    }

    pub fn arguments(mut self, arguments: &str) -> Self {
        self.arguments = arguments.to_string();
        self
    }

    pub fn working_directory(mut self, dir: &str) -> Self {
        self.working_directory = dir.to_string();
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-GB".to_string(),
            confidence: 40,
            wake_word: "okay computer".to_string(),
            vosk_model_path: dirs::data_dir()
                .unwrap_or_default()
                .join("speechlauncher/models/vosk-model-small-en-us")
                .to_string_lossy()
                .to_string(),
            notifier: "desktop".to_string(),
            audit_log: true,
            objects: Vec::new(),
        }
    }
}

/// Non-fatal findings about a configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Object with no trigger words; it can never be heard
    DeadTopic { topic: String },
    /// Action with no trigger words; it can never be heard
    DeadAction { topic: String, action: String },
    /// Object with no actions; hearing it can never dispatch anything
    EmptyTopic { topic: String },
    /// Trigger word used by more than one object
    SharedTopicWord { word: String, topics: Vec<String> },
    /// Trigger word used by more than one action (actions share one vocabulary)
    SharedActionWord { word: String, actions: Vec<String> },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DeadTopic { topic } => {
                write!(f, "object '{}' has no trigger words and is unreachable", topic)
            }
            Diagnostic::DeadAction { topic, action } => write!(
                f,
                "action '{}' of object '{}' has no trigger words and is unreachable",
                action, topic
            ),
            Diagnostic::EmptyTopic { topic } => write!(f, "object '{}' has no actions", topic),
            Diagnostic::SharedTopicWord { word, topics } => write!(
                f,
                "trigger word '{}' is shared by objects {}; attribution is ambiguous",
                word,
                topics.join(", ")
            ),
            Diagnostic::SharedActionWord { word, actions } => write!(
                f,
                "trigger word '{}' is shared by actions {}; attribution is ambiguous",
                word,
                actions.join(", ")
            ),
        }
    }
}

impl Config {
    /// The two sample objects written on first run
    pub fn sample() -> Self {
        Self {
            objects: vec![
                Topic::new("Test", &["test"]).with_action(
                    Action::new("Echo", &["echo", "message"], "echo")
                        .arguments("Hello World")
                        .visible(true),
                ),
                Topic::new("Question", &["what"]).with_action(Action::new(
                    "Current Time",
                    &["time is it", "is the time"],
                    "https://time.is/",
                )),
            ],
            ..Self::default()
        }
    }

    /// Load config from a file, writing the sample config if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("📝 No settings at {}, writing defaults", path.display());
            let config = Self::sample();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        match Self::from_yaml(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!("⚠️ Settings file corrupted or invalid, using defaults: {}", e);
                let backup_path = path.with_extension("yml.corrupt");
                match std::fs::rename(path, &backup_path) {
                    Ok(()) => info!("Moved bad settings to {}", backup_path.display()),
                    Err(e) => warn!(
                        "⚠️ Could not move bad settings to {} ({}); {} is left in place",
                        backup_path.display(),
                        e,
                        path.display()
                    ),
                }
                Ok(Self::sample())
            }
        }
    }

    pub fn from_yaml(content: &str) -> LauncherResult<Self> {
        let config: Option<Self> = serde_yaml::from_str(content)?;
        config.ok_or_else(|| LauncherError::Config("empty settings file".to_string()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn threshold(&self) -> ConfidenceThreshold {
        ConfidenceThreshold::new(self.confidence)
    }

    /// Structural checks run once at startup; any failure is fatal
    pub fn validate(&self) -> LauncherResult<()> {
        let mut problems = Vec::new();

        if self.wake_word.trim().is_empty() {
            problems.push("wake_word is empty".to_string());
        }
        if self.confidence > 100 {
            problems.push(format!("confidence {} is outside 0-100", self.confidence));
        }
        if self.objects.is_empty() {
            problems.push("no objects configured".to_string());
        }

        let mut topic_names = HashSet::new();
        for topic in &self.objects {
            if topic.name.trim().is_empty() {
                problems.push("object with an empty name".to_string());
            } else if !topic_names.insert(topic.name.as_str()) {
                problems.push(format!("duplicate object name '{}'", topic.name));
            }

            let mut action_names = HashSet::new();
            for action in &topic.actions {
                if action.name.trim().is_empty() {
                    problems.push(format!("action with an empty name in '{}'", topic.name));
                } else if !action_names.insert(action.name.as_str()) {
                    problems.push(format!(
                        "duplicate action name '{}' in '{}'",
                        action.name, topic.name
                    ));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(LauncherError::Config(problems.join("; ")))
        }
    }

    /// Dead entries and ambiguous trigger words
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut found = Vec::new();
        let mut topic_words: HashMap<String, Vec<String>> = HashMap::new();
        let mut action_words: HashMap<String, Vec<String>> = HashMap::new();
        let mut word_order = Vec::new();

        for topic in &self.objects {
            if topic.trigger_words.is_empty() {
                found.push(Diagnostic::DeadTopic {
                    topic: topic.name.clone(),
                });
            }
            if topic.actions.is_empty() {
                found.push(Diagnostic::EmptyTopic {
                    topic: topic.name.clone(),
                });
            }
            for word in &topic.trigger_words {
                let key = normalize_phrase(word);
                let owners = topic_words.entry(key.clone()).or_default();
                if owners.is_empty() {
                    word_order.push((true, key));
                }
                if !owners.contains(&topic.name) {
                    owners.push(topic.name.clone());
                }
            }

            for action in &topic.actions {
                if action.trigger_words.is_empty() {
                    found.push(Diagnostic::DeadAction {
                        topic: topic.name.clone(),
                        action: action.name.clone(),
                    });
                }
                let qualified = format!("{}/{}", topic.name, action.name);
                for word in &action.trigger_words {
                    let key = normalize_phrase(word);
                    let owners = action_words.entry(key.clone()).or_default();
                    if owners.is_empty() {
                        word_order.push((false, key));
                    }
                    if !owners.contains(&qualified) {
                        owners.push(qualified.clone());
                    }
                }
            }
        }

        for (is_topic, word) in word_order {
            if is_topic {
                let topics = &topic_words[&word];
                if topics.len() > 1 {
                    found.push(Diagnostic::SharedTopicWord {
                        word,
                        topics: topics.clone(),
                    });
                }
            } else {
                let actions = &action_words[&word];
                if actions.len() > 1 {
                    found.push(Diagnostic::SharedActionWord {
                        word,
                        actions: actions.clone(),
                    });
                }
            }
        }

        found
    }
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("speechlauncher")
}

pub fn config_path() -> PathBuf {
    config_dir().join("settings.yml")
}
