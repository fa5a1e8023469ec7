//! SpeechLauncher Error Types
//!
//! Per-utterance failures (`MalformedEvent`, `UnknownTopic`, `UnknownAction`)
//! are contained by the pipeline; the rest surface at setup or to the caller.

use thiserror::Error;

/// Central error type for SpeechLauncher
#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("malformed recognition event: {0}")]
    MalformedEvent(String),

    #[error("unknown object '{0}'")]
    UnknownTopic(String),

    #[error("unknown action '{action}' for object '{topic}'")]
    UnknownAction { topic: String, action: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Launch failed for '{command}': {reason}")]
    Launch { command: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for SpeechLauncher operations
pub type LauncherResult<T> = Result<T, LauncherError>;
