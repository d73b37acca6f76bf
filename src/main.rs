// SPDX-License-Identifier: GPL-3.0-only
use anyhow::Context;

use crate::config::Config;
use crate::localize::localize;

#[macro_use]
extern crate tracing;

mod app;
mod config;
mod display;
mod error;
#[cfg(feature = "hotplug")]
mod hotplug;
mod localize;
mod notify;
mod status;
mod tool;

fn setup_logs() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = fmt::layer().with_target(false);
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new(format!(
        "warn,{}=info",
        env!("CARGO_CRATE_NAME")
    )));

    if let Ok(journal_layer) = tracing_journald::layer() {
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .with(journal_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    setup_logs();
    localize();

    let config = Config::load();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the tokio runtime")?;

    runtime.block_on(app::run(config));
    Ok(())
}
