// SPDX-License-Identifier: GPL-3.0-only
use std::os::fd::AsRawFd;

/// Monitors udev for DRM connector events
///
/// Runs on a dedicated blocking thread; waits on the socket with `poll(2)`.
pub struct UdevMonitor {
    socket: udev::MonitorSocket,
}

impl UdevMonitor {
    /// Listen on the drm subsystem, DRM minor devices only (card0, card1, ...)
    pub fn new() -> Result<Self, std::io::Error> {
        let socket = udev::MonitorBuilder::new()?
            .match_subsystem_devtype("drm", "drm_minor")?
            .listen()?;

        Ok(Self { socket })
    }

    /// Block, calling `callback` for every add/remove/change event.
    ///
    /// Returns when polling fails or the callback returns `false`.
    pub fn run<F>(self, mut callback: F) -> std::io::Error
    where
        F: FnMut(udev::Event) -> bool,
    {
        info!("Display hotplug monitoring started");

        let fd = self.socket.as_raw_fd();

        loop {
            let mut poll_fd = libc::pollfd {
                fd,
                events: libc::POLLIN,
                revents: 0,
            };

            let poll_result = unsafe { libc::poll(&mut poll_fd, 1, -1) };

            if poll_result < 0 {
                let err = std::io::Error::last_os_error();
                if err.kind() == std::io::ErrorKind::Interrupted {
                    continue;
                }
                error!("Poll error: {}", err);
                return err;
            }

            let Some(event) = self.socket.iter().next() else {
                continue;
            };

            match event.event_type() {
                udev::EventType::Add | udev::EventType::Remove | udev::EventType::Change => {
                    debug!(
                        "udev {:?} event at {:?}",
                        event.event_type(),
                        event.syspath()
                    );

                    if !callback(event) {
                        return std::io::Error::new(
                            std::io::ErrorKind::Interrupted,
                            "Stopped by callback",
                        );
                    }
                }
                _ => {}
            }
        }
    }
}
