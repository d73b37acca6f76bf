// SPDX-License-Identifier: GPL-3.0-only
//! Display controller
//!
//! One method per user action. Each method issues a short, fixed sequence of
//! tool invocations and returns the message to show the user. Nothing is read
//! back from the tool: an accepted command is assumed to have taken effect,
//! and a rejected one is only logged.
//!
//! # Fix workflow
//!
//! Some monitors only come up in their native 4K mode after a transient drop
//! to 1080p. [`DisplayController::fix_external_display`] walks through
//! [`FixPhase::AwaitingDrop`] (issue the fallback mode), sleeps for the
//! configured delay, then [`FixPhase::AwaitingRestore`] (native mode, then the
//! "right of laptop" position). Only one fix may be pending at a time; a second
//! request is rejected without issuing anything.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Mutex as CommandLock;

use super::{Layout, Output, OutputCommand, ScaleFactor};
use crate::config::{Config, Geometry, OutputNames};
use crate::fl;
use crate::tool::CommandRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixPhase {
    /// Fallback mode is being applied
    AwaitingDrop,
    /// Waiting for the delay to elapse before restoring the native mode
    AwaitingRestore,
}

pub struct DisplayController<R> {
    runner: R,
    outputs: OutputNames,
    geometry: Geometry,
    fix_delay: Duration,
    fix_phase: Mutex<Option<FixPhase>>,
    /// Held while an action issues its commands so batches never interleave
    commands: CommandLock<()>,
}

/// Marks a fix as pending; clears the phase when the fix ends or is dropped
struct FixGuard<'a> {
    phase: &'a Mutex<Option<FixPhase>>,
}

impl FixGuard<'_> {
    fn advance(&self, next: FixPhase) {
        *lock_phase(self.phase) = Some(next);
    }
}

impl Drop for FixGuard<'_> {
    fn drop(&mut self) {
        *lock_phase(self.phase) = None;
    }
}

fn lock_phase(phase: &Mutex<Option<FixPhase>>) -> MutexGuard<'_, Option<FixPhase>> {
    phase.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<R: CommandRunner> DisplayController<R> {
    pub fn new(runner: R, config: &Config) -> Self {
        Self {
            runner,
            outputs: config.outputs.clone(),
            geometry: config.geometry.clone(),
            fix_delay: config.fix_delay(),
            fix_phase: Mutex::new(None),
            commands: CommandLock::new(()),
        }
    }

    /// Phase of the pending fix, if any
    #[cfg(test)]
    pub fn fix_phase(&self) -> Option<FixPhase> {
        *lock_phase(&self.fix_phase)
    }

    /// Run the two-phase 1080p → 4K workaround on the external output.
    ///
    /// `started` receives the progress message once the fix has been accepted
    /// and before the first command is issued.
    pub async fn fix_external_display<F>(&self, started: F) -> String
    where
        F: FnOnce(String) + Send,
    {
        let Some(fix) = self.begin_fix() else {
            info!("fix requested while another one is pending, ignoring");
            return fl!("fix-busy");
        };
        started(fl!("fix-started"));

        let fallback = [(
            Output::External,
            OutputCommand::Mode(self.geometry.fallback_mode),
        )];
        let dropped = self.issue_all(&fallback).await;

        fix.advance(FixPhase::AwaitingRestore);
        debug!("fix: waiting {:?} before restoring native mode", self.fix_delay);
        tokio::time::sleep(self.fix_delay).await;

        let mut restore = vec![(
            Output::External,
            OutputCommand::Mode(self.geometry.native_mode),
        )];
        restore.extend(
            Layout::Right
                .placements(&self.geometry)
                .into_iter()
                .map(|(output, pos)| (output, OutputCommand::Position(pos))),
        );
        let restored = self.issue_all(&restore).await;

        let native = self.geometry.native_mode.to_string();
        if dropped && restored {
            info!("fix complete, external output back to {}", native);
        } else {
            warn!("fix finished but the tool rejected part of it, {} may not be applied", native);
        }
        fl!("fix-done", mode = native)
    }

    /// Place the external output right of, left of or above the laptop panel
    pub async fn set_layout(&self, layout: Layout) -> String {
        let commands: Vec<_> = layout
            .placements(&self.geometry)
            .into_iter()
            .map(|(output, pos)| (output, OutputCommand::Position(pos)))
            .collect();
        if self.issue_all(&commands).await {
            debug!("layout {:?} applied", layout);
        }

        match layout {
            Layout::Right => fl!("layout-right"),
            Layout::Left => fl!("layout-left"),
            Layout::Above => fl!("layout-above"),
        }
    }

    pub async fn set_scale(&self, output: Output, factor: &ScaleFactor) -> String {
        if self
            .issue_all(&[(output, OutputCommand::Scale(factor.clone()))])
            .await
        {
            debug!("{:?} scale set to {}", output, factor);
        }

        let screen = match output {
            Output::External => fl!("screen-external"),
            Output::Laptop => fl!("screen-laptop"),
        };
        fl!(
            "scale-set",
            screen = screen,
            percent = factor.percent().to_string()
        )
    }

    pub async fn enable_external(&self) -> String {
        self.toggle_external(OutputCommand::Enable).await;
        fl!("external-enabled")
    }

    pub async fn disable_external(&self) -> String {
        self.toggle_external(OutputCommand::Disable).await;
        fl!("external-disabled")
    }

    async fn toggle_external(&self, command: OutputCommand) {
        if self.issue_all(&[(Output::External, command.clone())]).await {
            debug!("external output: {:?} accepted", command);
        }
    }

    fn begin_fix(&self) -> Option<FixGuard<'_>> {
        let mut phase = lock_phase(&self.fix_phase);
        if phase.is_some() {
            return None;
        }
        *phase = Some(FixPhase::AwaitingDrop);
        Some(FixGuard {
            phase: &self.fix_phase,
        })
    }

    /// Issue `commands` in order while holding the command lock. Returns
    /// whether every one of them was accepted.
    async fn issue_all(&self, commands: &[(Output, OutputCommand)]) -> bool {
        let _lock = self.commands.lock().await;

        let mut accepted = true;
        for (output, command) in commands {
            let args = [command.argument(output.connector(&self.outputs))];
            if !self.runner.run(&args).await {
                warn!("{} was not accepted", args[0]);
                accepted = false;
            }
        }
        accepted
    }
}
