// SPDX-License-Identifier: GPL-3.0-only
//! Desktop notifications
//!
//! Shows the controller's confirmation messages through the freedesktop
//! notification service. Without a session bus the messages only go to the log.

use std::collections::HashMap;
use std::time::Duration;

use zbus::{Connection, proxy, zvariant::Value};

use crate::error::Result;
use crate::fl;

/// How long ordinary confirmations stay on screen
pub const DEFAULT_EXPIRY: Duration = Duration::from_millis(2000);
/// Expiry of the "fix in progress" notice
pub const SHORT_EXPIRY: Duration = Duration::from_millis(1000);

const ICON: &str = "video-display";

/// org.freedesktop.Notifications D-Bus proxy
#[proxy(
    interface = "org.freedesktop.Notifications",
    default_service = "org.freedesktop.Notifications",
    default_path = "/org/freedesktop/Notifications",
    gen_blocking = false
)]
trait Notifications {
    #[allow(clippy::too_many_arguments)]
    fn notify(
        &self,
        app_name: &str,
        replaces_id: u32,
        app_icon: &str,
        summary: &str,
        body: &str,
        actions: &[&str],
        hints: HashMap<&str, Value<'_>>,
        expire_timeout: i32,
    ) -> zbus::Result<u32>;
}

pub struct Notifier {
    proxy: Option<NotificationsProxy<'static>>,
}

impl Notifier {
    /// Connect to the session bus
    pub async fn connect() -> Result<Self> {
        let connection = Connection::session().await?;
        let proxy = NotificationsProxy::new(&connection).await?;
        Ok(Self { proxy: Some(proxy) })
    }

    /// Connect, or fall back to logging only
    pub async fn connect_or_log() -> Self {
        match Self::connect().await {
            Ok(notifier) => notifier,
            Err(e) => {
                warn!("notifications unavailable, messages will only be logged: {}", e);
                Self::log_only()
            }
        }
    }

    pub fn log_only() -> Self {
        Self { proxy: None }
    }

    pub async fn show(&self, body: &str, expiry: Duration) {
        info!("{}", body);

        let Some(proxy) = &self.proxy else {
            return;
        };

        let summary = fl!("app-title");
        let expiry = i32::try_from(expiry.as_millis()).unwrap_or(i32::MAX);
        if let Err(e) = proxy
            .notify(&summary, 0, ICON, &summary, body, &[], HashMap::new(), expiry)
            .await
        {
            warn!("failed to show notification: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_only_notifier_does_not_need_a_bus() {
        let notifier = Notifier::log_only();
        notifier.show("External screen enabled", DEFAULT_EXPIRY).await;
        assert!(notifier.proxy.is_none());
    }
}
