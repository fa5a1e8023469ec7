//! SpeechLauncher Library
//!
//! Voice-triggered command launcher: compiles configured objects and actions
//! into a grammar, interprets recognition results, gates them on confidence,
//! resolves them to actions and launches them.

pub mod asr;
pub mod audit;
#[cfg(feature = "vosk")]
pub mod audio;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gate;
pub mod grammar;
pub mod interpreter;
pub mod launcher;
pub mod menu;
pub mod notify;
pub mod pipeline;
pub mod resolver;

pub use config::{Action, Config, Topic};
pub use error::{LauncherError, LauncherResult};
