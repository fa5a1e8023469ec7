//! Object/action menu
//!
//! Lists every configured action under its object and runs one on request,
//! without going through recognition.

use crate::config::{Action, Config};
use crate::dispatch::Dispatcher;
use crate::error::LauncherResult;
use crate::resolver;
use std::fmt::Write;

/// Render the menu as indented text
pub fn render(config: &Config) -> String {
    let mut out = String::new();
    for topic in &config.objects {
        let _ = writeln!(out, "{} [{}]", topic.name, topic.trigger_words.join(", "));
        for action in &topic.actions {
            let _ = writeln!(
                out,
                "  {} [{}] -> {}",
                action.name,
                action.trigger_words.join(", "),
                describe(action)
            );
        }
    }
    out
}

fn describe(action: &Action) -> String {
    if action.arguments.is_empty() {
        action.command.clone()
    } else {
        format!("{} {}", action.command, action.arguments)
    }
}

/// Run the action `action_name` of object `topic_name`
pub fn run(
    config: &Config,
    dispatcher: &Dispatcher,
    topic_name: &str,
    action_name: &str,
) -> LauncherResult<()> {
    let action = resolver::resolve(config, topic_name, action_name)?;
    dispatcher.launch(action)
}
