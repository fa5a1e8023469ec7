//! Action resolver
//!
//! Maps accepted labels back to the configured action, scoped by object first.

use crate::config::{Action, Config};
use crate::error::{LauncherError, LauncherResult};

/// Find the action named `action_label` inside the object named `topic_label`
///
/// The action vocabulary is global in the grammar, so an action recognized
/// under the wrong object is a reachable `UnknownAction`.
pub fn resolve<'a>(
    config: &'a Config,
    topic_label: &str,
    action_label: &str,
) -> LauncherResult<&'a Action> {
    let topic = config
        .objects
        .iter()
        .find(|t| t.name == topic_label)
        .ok_or_else(|| LauncherError::UnknownTopic(topic_label.to_string()))?;

    topic
        .actions
        .iter()
        .find(|a| a.name == action_label)
        .ok_or_else(|| LauncherError::UnknownAction {
            topic: topic_label.to_string(),
            action: action_label.to_string(),
        })
}
