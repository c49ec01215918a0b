//! # ruleshell - Interactive Command Interpreter
//!
//! ruleshell reads one line at a time, normalizes it, resolves it to a
//! registered command and runs it. It offers context-sensitive tab
//! completion and keeps a history of the commands issued.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ruleshell::cli::{CommandRegistry, Repl};
//!
//! let registry = CommandRegistry::with_builtins()?;
//! let mut repl = Repl::new(registry, ruleshell::cli::history::history_path())?;
//! repl.run()?;
//! ```
//!
//! ## Extending
//!
//! Domain commands are registered next to the built-ins before the
//! interpreter starts. The registry is immutable once the session runs.
//!
//! ```ignore
//! use ruleshell::cli::{CommandEntry, CommandRegistry, CommandResult};
//!
//! let mut registry = CommandRegistry::with_builtins()?;
//! registry.register(
//!     CommandEntry::new("display", |_, args| CommandResult::Output(args.to_string()))
//!         .with_help(|| "   Syntax: display <text>".to_string()),
//! )?;
//! ```
//!
//! ## Line Syntax
//!
//! ```text
//! load model \              <- continues on the next line
//!   sm                      <- executed as "load model sm"
//! set mz=91.19 # Z mass     <- comment stripped, operators spaced
//! show mz; show mw          <- two commands, run in order
//! !ls -l                    <- shell command, left untouched
//! ```
//!
//! ## Module Overview
//!
//! - [`cli`]: Interpreter components and the interactive front-end
//! - [`config`]: Centralized constants
//! - [`error`]: Error taxonomy
//! - [`logging`]: Diagnostic log setup

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;

pub use cli::{CommandEntry, CommandRegistry, CommandResult, Dispatcher, Repl};
pub use error::ReplError;
