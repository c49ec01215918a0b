//! # ruleshell Configuration Module
//!
//! This module centralizes the configuration constants of the interpreter.
//! Values that depend on each other (the completion delimiter sets, the
//! history cap) live next to each other and their relationships are
//! enforced through compile-time assertions.
//!
//! Runtime configuration is deliberately small:
//!
//! - `RULESHELL_HISTORY` overrides the history file location (see
//!   [`crate::cli::history::history_path`])
//! - `COLUMNS` is consulted for the terminal width when the terminal
//!   cannot be queried directly
//! - The launcher's `--debug` flag raises the log level
//!
//! ## Module Organization
//!
//! - [`constants`]: All prompt, history, preprocessing and completion constants

pub mod constants;
pub use constants::*;
