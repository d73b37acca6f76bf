// SPDX-License-Identifier: GPL-3.0-only
//! Display configuration tool invocation
//!
//! The controller only needs to know whether the tool accepted an argument
//! list. Implementations swallow every failure and log it; nothing past this
//! boundary deals with subprocess errors.

pub mod kscreen;

pub use kscreen::KscreenDoctor;

use std::future::Future;

/// Runs the external display configuration tool
pub trait CommandRunner: Send + Sync {
    /// Invoke the tool once with `args`.
    ///
    /// Returns `true` iff the tool exited with status 0. Never panics or
    /// propagates errors.
    fn run(&self, args: &[String]) -> impl Future<Output = bool> + Send;
}
