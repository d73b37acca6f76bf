// SPDX-License-Identifier: GPL-3.0-only
//! Presentation shell
//!
//! Wires the tray, the status poll and the display controller together. All
//! user actions and hotplug notices arrive as [`AppMsg`]s on one channel; the
//! event loop dispatches them and polls the connector status on a fixed
//! interval.

mod messages;
mod tray;
mod update;

pub use messages::AppMsg;
pub use tray::HdmiTray;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::MissedTickBehavior;

use crate::config::Config;
use crate::display::DisplayController;
use crate::fl;
use crate::notify::{DEFAULT_EXPIRY, Notifier};
use crate::status::{StatusMonitor, StatusReader};
use crate::tool::{CommandRunner, KscreenDoctor};

pub const APPID: &str = "io.github.hdmi-manager";

pub struct App<R> {
    controller: Arc<DisplayController<R>>,
    notifier: Arc<Notifier>,
    status: StatusMonitor,
    tray: Option<ksni::Handle<HdmiTray>>,
    poll_interval: Duration,
}

impl<R: CommandRunner + 'static> App<R> {
    pub fn new(
        controller: DisplayController<R>,
        notifier: Notifier,
        status: StatusReader,
        tray: Option<ksni::Handle<HdmiTray>>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            controller: Arc::new(controller),
            notifier: Arc::new(notifier),
            status: StatusMonitor::new(status),
            tray,
            poll_interval,
        }
    }

    /// Process messages until `Quit` arrives or every sender is gone
    pub async fn run(mut self, mut messages: UnboundedReceiver<AppMsg>) {
        let mut poll = tokio::time::interval(self.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // The first tick fires immediately and gives the initial status
                _ = poll.tick() => self.refresh_status(),
                message = messages.recv() => {
                    let Some(message) = message else {
                        break;
                    };
                    if self.update(message).is_break() {
                        break;
                    }
                }
            }
        }

        info!("event loop stopped");
    }

    fn refresh_status(&mut self) {
        let Some(connected) = self.status.poll() else {
            return;
        };

        if let Some(tray) = &self.tray {
            tray.update(|tray| tray.set_connected(connected));
        }
    }
}

/// Build every service from `config`, show the tray and run until quit
pub async fn run(config: Config) {
    let (sender, receiver) = mpsc::unbounded_channel();

    let service = ksni::TrayService::new(HdmiTray::new(sender.clone(), &config));
    let tray = service.handle();
    service.spawn();

    #[cfg(feature = "hotplug")]
    if config.hotplug {
        if let Err(e) = crate::hotplug::spawn(sender.clone()) {
            error!("failed to start hotplug thread: {}", e);
        }
    }
    drop(sender);

    let tool = KscreenDoctor::from_config(&config.tool);
    info!(
        "driving {} with a {:?} timeout, polling {} every {:?}",
        tool.program(),
        config.tool.timeout(),
        config.status_path.display(),
        config.poll_interval()
    );
    let controller = DisplayController::new(tool, &config);
    let notifier = Notifier::connect_or_log().await;
    let app = App::new(
        controller,
        notifier,
        StatusReader::new(&config.status_path),
        Some(tray),
        config.poll_interval(),
    );

    app.notifier.show(&fl!("app-started"), DEFAULT_EXPIRY).await;
    app.run(receiver).await;
}
