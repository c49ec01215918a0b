//! # ruleshell CLI Module
//!
//! This module provides the interactive command interpreter. It supports:
//!
//! - Line continuation, quote-aware comments and `;`-separated statements
//! - A registry of named commands with help text and tab completion
//! - Command history persisted between sessions
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      CLI Entry Point                        │
//! │                    (bin/ruleshell.rs)                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     REPL (rustyline)                        │
//! │  - Reads input, Tab key drives completion                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │                        Dispatcher                           │
//! │  - Preprocesses lines, resolves and runs commands           │
//! ├───────────────┬───────────────┬───────────────┬─────────────┤
//! │ Preprocessor  │  Completion   │   Commands    │   History   │
//! │ continuation, │  engine +     │  registry +   │  persisted  │
//! │ comments, ';' │  rendering    │  built-ins    │  log        │
//! └───────────────┴───────────────┴───────────────┴─────────────┘
//! ```
//!
//! ## Built-in Commands
//!
//! | Command                      | Description                              |
//! |------------------------------|------------------------------------------|
//! | `help [command]`             | List commands or show a command's help   |
//! | `history [clean \| <file>]`  | Print, clear or export the history       |
//! | `shell <cmd>` / `!<cmd>`     | Run a command line in a subprocess       |
//! | `quit` / `exit` / Ctrl+D     | Exit the interpreter                     |
//!
//! ## Module Organization
//!
//! - `repl`: rustyline front-end and Tab handling
//! - `dispatch`: read-preprocess-execute loop
//! - `preprocess`: line normalization pipeline
//! - `completion`: completion candidates
//! - `render`: candidate listing layout
//! - `commands`: command registry and built-in commands
//! - `history`: history log and file location
//! - `path`: filesystem path completion

pub mod commands;
pub mod completion;
pub mod dispatch;
pub mod history;
pub mod path;
pub mod preprocess;
pub mod render;
pub mod repl;

pub use commands::{CommandEntry, CommandRegistry, CommandResult};
pub use dispatch::Dispatcher;
pub use repl::Repl;
