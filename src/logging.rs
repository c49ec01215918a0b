//! # Logging Setup
//!
//! Diagnostics are emitted with the `tracing` macros throughout the crate.
//! This module installs the subscriber that prints them: stderr, no
//! timestamps, no targets, `INFO` by default and `DEBUG` when the launcher
//! runs with `--debug`.
//!
//! Command output proper (help text, history listings, warnings about
//! unknown commands) does not go through here; the Dispatcher writes it to
//! its own output writer.

use tracing::Level;

pub fn init(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::INFO };

    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();

    if installed.is_ok() && debug {
        tracing::debug!("Debug mode activated");
    }
}
