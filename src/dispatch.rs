//! Dispatcher
//!
//! Notifies the user, then hands the action to the process launcher.
//! Every call launches; there is no dedup or debounce.

use crate::audit;
use crate::config::Action;
use crate::error::LauncherResult;
use crate::interpreter::RecognitionResult;
use crate::launcher::{LaunchRequest, ProcessLauncher};
use crate::notify::Notifier;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
    launcher: Arc<dyn ProcessLauncher>,
    audit_log: Option<PathBuf>,
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, launcher: Arc<dyn ProcessLauncher>) -> Self {
        Self {
            notifier,
            launcher,
            audit_log: None,
        }
    }

    /// Record every launch in the audit log at `path`
    pub fn with_audit_log(mut self, path: PathBuf) -> Self {
        self.audit_log = Some(path);
        self
    }

    /// Notify, then launch. Launch failures are returned, not retried.
    pub fn dispatch(&self, result: &RecognitionResult, action: &Action) -> LauncherResult<()> {
        self.notifier
            .notify(&result.topic_label, &notification_body(result));

        let origin = format!(
            "{}/{} {}%",
            result.topic_label, result.action_label, result.confidence_percent
        );
        self.launch_as(&origin, action)
    }

    /// Launch without a notification (manual invocation)
    pub fn launch(&self, action: &Action) -> LauncherResult<()> {
        self.launch_as("menu", action)
    }

    fn launch_as(&self, origin: &str, action: &Action) -> LauncherResult<()> {
        let request = LaunchRequest::from(action);
        if let Some(path) = &self.audit_log {
            if let Err(e) = audit::log_launch_to(path, origin, &request) {
                warn!("⚠️ Could not write audit log: {:#}", e);
            }
        }
        self.launcher.launch(&request)
    }
}

/// Notification text shown for a dispatched result
pub fn notification_body(result: &RecognitionResult) -> String {
    format!(
        "Action: {}\nConfidence: {}%",
        result.action_label, result.confidence_percent
    )
}
