// SPDX-License-Identifier: GPL-3.0-only
//! Error types for the application
//!
//! Subprocess failures stay inside the `tool` module as [`ToolError`] and are
//! reduced to a boolean before reaching the display controller. Everything
//! else that can go wrong while starting up is an [`AppError`].

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Failure of a single configuration tool invocation
#[derive(Error, Debug)]
pub enum ToolError {
    /// The binary could not be started (usually not installed)
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process did not finish within the configured timeout and was killed
    #[error("{program} did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    /// The process ran but rejected the arguments
    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration file could not be read
    #[error("Failed to read configuration {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for our schema
    #[error("Invalid configuration {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Scale factor that is not a positive number
    #[error("Invalid scale factor {0:?}")]
    InvalidScale(String),

    /// D-Bus error (notifications)
    #[error("D-Bus error: {0}")]
    DBus(#[from] zbus::Error),

    /// I/O error (hotplug thread startup)
    #[cfg(feature = "hotplug")]
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;
