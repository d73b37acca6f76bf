// SPDX-License-Identifier: GPL-3.0-only
//! User configuration
//!
//! Everything is optional: without a config file the defaults describe a
//! laptop with a 1920px-wide `eDP-1` panel and a 4K monitor on `HDMI-A-1`,
//! driven through `kscreen-doctor`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::display::{Mode, ScaleFactor};
use crate::error::{AppError, Result};

pub const CONFIG_DIR: &str = "hdmi-manager";
pub const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_EXTERNAL_SCALES: [&str; 5] = ["1", "1.25", "1.5", "1.75", "2"];
pub const DEFAULT_LAPTOP_SCALES: [&str; 6] = ["1", "1.25", "1.5", "1.75", "2", "2.25"];

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Config {
    pub tool: ToolConfig,
    /// Connector status attribute of the external output
    pub status_path: PathBuf,
    pub poll_interval_secs: u64,
    /// Pause between the two phases of the fix
    pub fix_delay_ms: u64,
    pub outputs: OutputNames,
    pub geometry: Geometry,
    pub scales: ScaleChoices,
    /// Refresh the status on udev events in addition to polling
    pub hotplug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tool: ToolConfig::default(),
            status_path: PathBuf::from("/sys/class/drm/card0-HDMI-A-1/status"),
            poll_interval_secs: 5,
            fix_delay_ms: 1500,
            outputs: OutputNames::default(),
            geometry: Geometry::default(),
            scales: ScaleChoices::default(),
            hotplug: true,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct ToolConfig {
    pub program: String,
    pub timeout_secs: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: "kscreen-doctor".to_string(),
            timeout_secs: 10,
        }
    }
}

impl ToolConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Connector names of the two outputs
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct OutputNames {
    pub laptop: String,
    pub external: String,
}

impl Default for OutputNames {
    fn default() -> Self {
        Self {
            laptop: "eDP-1".to_string(),
            external: "HDMI-A-1".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Geometry {
    /// Width of the laptop panel in desktop pixels
    pub laptop_width: u32,
    /// Mode the external monitor should end up in
    pub native_mode: Mode,
    /// Transient mode used by the first phase of the fix
    pub fallback_mode: Mode,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            laptop_width: 1920,
            native_mode: Mode::new(3840, 2160, 60),
            fallback_mode: Mode::new(1920, 1080, 60),
        }
    }
}

/// Scale factors offered in the menus, as written in the file
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct ScaleChoices {
    pub external: Vec<String>,
    pub laptop: Vec<String>,
}

impl Default for ScaleChoices {
    fn default() -> Self {
        Self {
            external: DEFAULT_EXTERNAL_SCALES.iter().map(|s| s.to_string()).collect(),
            laptop: DEFAULT_LAPTOP_SCALES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ScaleChoices {
    pub fn external_factors(&self) -> Vec<ScaleFactor> {
        parse_scales(&self.external)
    }

    pub fn laptop_factors(&self) -> Vec<ScaleFactor> {
        parse_scales(&self.laptop)
    }
}

fn parse_scales(entries: &[String]) -> Vec<ScaleFactor> {
    entries
        .iter()
        .filter_map(|entry| match entry.parse() {
            Ok(factor) => Some(factor),
            Err(e) => {
                warn!("ignoring scale entry: {}", e);
                None
            }
        })
        .collect()
}

impl Config {
    /// Default location, `~/.config/hdmi-manager/config.toml`
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn fix_delay(&self) -> Duration {
        Duration::from_millis(self.fix_delay_ms)
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(AppError::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        toml::from_str(&text).map_err(|source| AppError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the user's config, falling back to defaults on any error
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_or_default(&path),
            None => {
                warn!("no config directory available, using defaults");
                Self::default()
            }
        }
    }

    /// Like [`Config::load_from`], but logs any error and uses the defaults
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(config) => {
                info!("configuration loaded from {}", path.display());
                config
            }
            Err(err) => {
                error!("{}", err);
                Self::default()
            }
        }
    }
}
