//! Desktop notifications over D-Bus
//!
//! Uses zbus to talk to the freedesktop notification daemon.

use super::Notifier;
use anyhow::Result;
use std::collections::HashMap;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};
use zbus::{proxy, zvariant::Value, Connection};

const APP_NAME: &str = "Speech Launcher";
/// Milliseconds a notification stays on screen
const EXPIRE_TIMEOUT_MS: i32 = 1000;

/// D-Bus proxy for the freedesktop notification service
#[proxy(
    interface = "org.freedesktop.Notifications",
    default_service = "org.freedesktop.Notifications",
    default_path = "/org/freedesktop/Notifications"
)]
trait Notifications {
    /// Show a notification, returning its id
    fn notify(
        &self,
        app_name: &str,
        replaces_id: u32,
        app_icon: &str,
        summary: &str,
        body: &str,
        actions: &[&str],
        hints: &HashMap<&str, &Value<'_>>,
        expire_timeout: i32,
    ) -> zbus::Result<u32>;

    /// Server name, vendor, version, spec version
    fn get_server_information(&self) -> zbus::Result<(String, String, String, String)>;
}

/// Notifier backed by the session bus
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    proxy: NotificationsProxy<'static>,
    runtime: Handle,
}

impl DesktopNotifier {
    /// Connect to the notification service; must run inside a tokio runtime
    pub async fn connect() -> Result<Self> {
        let connection = Connection::session().await?;
        let proxy = NotificationsProxy::new(&connection).await?;

        let (name, vendor, version, _) = proxy.get_server_information().await?;
        info!("🔔 Connected to notification server: {} {} ({})", name, version, vendor);

        Ok(Self {
            proxy,
            runtime: Handle::current(),
        })
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) {
        let proxy = self.proxy.clone();
        let title = title.to_string();
        let body = body.to_string();

        self.runtime.spawn(async move {
            let hints = HashMap::new();
            match proxy
                .notify(APP_NAME, 0, "", &title, &body, &[], &hints, EXPIRE_TIMEOUT_MS)
                .await
            {
                Ok(id) => debug!("Notification {} shown", id),
                Err(e) => warn!("⚠️ Notification failed: {}", e),
            }
        });
    }

    fn name(&self) -> &str {
        "desktop"
    }
}
