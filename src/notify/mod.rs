//! User notification surface
//!
//! Fire-and-forget `(title, body)` notifications. Implementations must be
//! callable from any thread and never block the caller.

use crate::config::Config;
use std::sync::Arc;
use tracing::{info, warn};

pub mod desktop;

pub use desktop::DesktopNotifier;

/// Trait for notification backends
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Show a transient notification
    fn notify(&self, title: &str, body: &str);

    /// Get the backend name
    fn name(&self) -> &str;
}

/// Notifier that only writes to the log
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str) {
        info!("🔔 {}: {}", title, body.replace('\n', " | "));
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Factory to create the configured notifier
///
/// Falls back to the log notifier when the desktop service is unavailable.
pub async fn create_notifier(config: &Config) -> Arc<dyn Notifier> {
    info!("🛠️ Creating notifier: {}", config.notifier);
    let notifier: Arc<dyn Notifier> = match config.notifier.as_str() {
        "desktop" => match DesktopNotifier::connect().await {
            Ok(notifier) => Arc::new(notifier),
            Err(e) => {
                warn!("⚠️ Desktop notifications unavailable, using log: {:#}", e);
                Arc::new(LogNotifier)
            }
        },
        "log" => Arc::new(LogNotifier),
        other => {
            warn!("  - Unknown notifier '{}', falling back to log", other);
            Arc::new(LogNotifier)
        }
    };
    info!("✅ Notifier '{}' initialized", notifier.name());
    notifier
}
