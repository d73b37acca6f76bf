// SPDX-License-Identifier: GPL-3.0-only
//! Display hotplug detection using udev
//!
//! Connector changes show up as udev events on the DRM device. Each event asks
//! the event loop to re-read the connector status right away instead of
//! waiting for the next poll.

mod udev_monitor;

use tokio::sync::mpsc::UnboundedSender;

use crate::app::AppMsg;
use crate::error::Result;
use udev_monitor::UdevMonitor;

/// Start the udev listener on a dedicated thread.
///
/// `MonitorSocket` is not `Send`, so the socket is opened on the thread
/// itself. Once the event loop has dropped its receiver, the thread notices at
/// the next udev event and ends then.
pub fn spawn(sender: UnboundedSender<AppMsg>) -> Result<()> {
    std::thread::Builder::new()
        .name("hotplug".into())
        .spawn(move || {
            let monitor = match UdevMonitor::new() {
                Ok(m) => m,
                Err(e) => {
                    error!("Failed to initialize display hotplug monitoring: {}", e);
                    return;
                }
            };

            let err = monitor.run(|_event| sender.send(AppMsg::HotplugDetected).is_ok());
            debug!("Display hotplug monitoring stopped: {}", err);
        })?;

    Ok(())
}
