//! # Interpreter Errors
//!
//! Every failure the interpreter core can observe, with the policy applied
//! at the call site:
//!
//! | Variant             | Raised by                 | Policy                         |
//! |---------------------|---------------------------|--------------------------------|
//! | `UnknownCommand`    | Dispatcher                | warning line, loop continues   |
//! | `DuplicateCommand`  | CommandRegistry::register | fatal at startup               |
//! | `HistoryFileExists` | `history <file>`          | error line, loop continues     |
//! | `HistoryIo`         | HistoryStore load/save    | debug log only                 |
//! | `CompletionRender`  | CompletionEngine          | error log, no suggestions      |
//! | `ShellSpawn`        | `shell <cmd>`             | error line, loop continues     |
//!
//! Only `DuplicateCommand` may end a session.

use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ReplError {
    UnknownCommand(String),
    DuplicateCommand(String),
    HistoryFileExists(PathBuf),
    HistoryIo { path: PathBuf, source: io::Error },
    CompletionRender(String),
    ShellSpawn(io::Error),
}

impl std::fmt::Display for ReplError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplError::UnknownCommand(name) => write!(f, "Command \"{}\" not implemented.", name),
            ReplError::DuplicateCommand(name) => {
                write!(f, "command '{}' is already registered", name)
            }
            ReplError::HistoryFileExists(path) => write!(
                f,
                "The file {} already exists. Please choose another filename.",
                path.display()
            ),
            ReplError::HistoryIo { path, source } => {
                write!(f, "history file {}: {}", path.display(), source)
            }
            ReplError::CompletionRender(reason) => write!(f, "completion failed: {}", reason),
            ReplError::ShellSpawn(source) => write!(f, "could not run shell command: {}", source),
        }
    }
}

impl std::error::Error for ReplError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReplError::HistoryIo { source, .. } | ReplError::ShellSpawn(source) => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn unknown_command_message_names_the_command() {
        let err = ReplError::UnknownCommand("frobnicate".to_string());
        assert_eq!(err.to_string(), "Command \"frobnicate\" not implemented.");
    }

    #[test]
    fn io_variants_expose_source() {
        let err = ReplError::HistoryIo {
            path: PathBuf::from("/nowhere"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.source().is_some());
        assert!(ReplError::DuplicateCommand("quit".into()).source().is_none());
    }
}
