// SPDX-License-Identifier: GPL-3.0-only
//! Display data model
//!
//! Types describing what can be asked of the configuration tool: which output,
//! which mode, where it sits and how it is scaled. [`OutputCommand`] renders the
//! `output.<id>.<setting>` argument grammar the tool understands.

pub mod controller;

pub use controller::DisplayController;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{Geometry, OutputNames};
use crate::error::AppError;

/// The two outputs this tool knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Output {
    /// Built-in laptop panel
    Laptop,
    /// HDMI-connected monitor
    External,
}

impl Output {
    /// Connector name as the configuration tool knows it (e.g. "HDMI-A-1")
    pub fn connector<'a>(&self, names: &'a OutputNames) -> &'a str {
        match self {
            Output::Laptop => &names.laptop,
            Output::External => &names.external,
        }
    }
}

/// A display mode, rendered as `<W>x<H>@<HZ>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Mode {
    pub width: u32,
    pub height: u32,
    pub refresh: u32,
}

impl Mode {
    pub const fn new(width: u32, height: u32, refresh: u32) -> Self {
        Self {
            width,
            height,
            refresh,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}@{}", self.width, self.height, self.refresh)
    }
}

/// Absolute position of an output's top-left corner in the virtual desktop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Placement of the external output relative to the laptop panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    Right,
    Left,
    Above,
}

impl Layout {
    pub const ALL: [Layout; 3] = [Layout::Right, Layout::Left, Layout::Above];

    /// Positions to apply, external output first.
    ///
    /// `Right` leaves the laptop wherever it is; it is expected to sit at the
    /// origin already.
    pub fn placements(self, geometry: &Geometry) -> Vec<(Output, Position)> {
        match self {
            Layout::Right => vec![(
                Output::External,
                Position::new(geometry.laptop_width, 0),
            )],
            Layout::Left => vec![
                (Output::External, Position::new(0, 0)),
                (
                    Output::Laptop,
                    Position::new(geometry.native_mode.width, 0),
                ),
            ],
            Layout::Above => vec![
                (Output::External, Position::new(0, 0)),
                (
                    Output::Laptop,
                    Position::new(0, geometry.native_mode.height),
                ),
            ],
        }
    }
}

/// Per-output scaling multiplier.
///
/// Keeps the text it was parsed from so that "1.50" reaches the tool as
/// "1.50" and not as a reformatted float.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleFactor {
    text: String,
    value: f64,
}

impl ScaleFactor {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Percentage shown to the user, rounded to the nearest integer
    pub fn percent(&self) -> u32 {
        (self.value * 100.0).round() as u32
    }
}

impl FromStr for ScaleFactor {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() && value > 0.0 => Ok(Self {
                text: text.to_owned(),
                value,
            }),
            _ => Err(AppError::InvalidScale(s.to_owned())),
        }
    }
}

impl fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One setting change for one output
#[derive(Debug, Clone, PartialEq)]
pub enum OutputCommand {
    Mode(Mode),
    Position(Position),
    Scale(ScaleFactor),
    Enable,
    Disable,
}

impl OutputCommand {
    /// Render the tool argument, e.g. `output.HDMI-A-1.mode.3840x2160@60`
    pub fn argument(&self, connector: &str) -> String {
        match self {
            OutputCommand::Mode(mode) => format!("output.{connector}.mode.{mode}"),
            OutputCommand::Position(pos) => format!("output.{connector}.position.{pos}"),
            OutputCommand::Scale(scale) => format!("output.{connector}.scale.{scale}"),
            OutputCommand::Enable => format!("output.{connector}.enable"),
            OutputCommand::Disable => format!("output.{connector}.disable"),
        }
    }
}
