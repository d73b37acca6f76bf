// SPDX-License-Identifier: GPL-3.0-only
//! External output connection status
//!
//! The kernel exposes the connector state as a one-line sysfs attribute
//! (`/sys/class/drm/card0-HDMI-A-1/status`) reading `connected` or
//! `disconnected`. Anything we cannot read counts as disconnected.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct StatusReader {
    path: PathBuf,
}

impl StatusReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` iff the status file exists and reads exactly `connected`
    pub fn is_external_connected(&self) -> bool {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => content.trim() == "connected",
            Err(e) => {
                debug!("can't read {}: {}", self.path.display(), e);
                false
            }
        }
    }
}

/// Polls a [`StatusReader`] and remembers only the last observed value
#[derive(Debug)]
pub struct StatusMonitor {
    reader: StatusReader,
    last: Option<bool>,
}

impl StatusMonitor {
    pub fn new(reader: StatusReader) -> Self {
        Self { reader, last: None }
    }

    /// Result of the most recent poll, `None` before the first one
    pub fn last(&self) -> Option<bool> {
        self.last
    }

    /// Read the status now. Returns the new value if it differs from the
    /// previous poll (the first poll always counts as a change).
    pub fn poll(&mut self) -> Option<bool> {
        let connected = self.reader.is_external_connected();
        if self.last == Some(connected) {
            return None;
        }

        match self.last {
            None => info!(
                "external output is {}",
                if connected { "connected" } else { "disconnected" }
            ),
            Some(_) if connected => info!("external output connected"),
            Some(_) => info!("external output disconnected"),
        }

        self.last = Some(connected);
        Some(connected)
    }
}
