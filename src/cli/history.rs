//! # History Management
//!
//! Two concerns live here: where the history file is, and the in-memory
//! log of accepted command lines that the `history` command prints and
//! the session persists on exit.
//!
//! ## Location
//!
//! By default history is stored in `.ruleshell_history` under the working
//! directory the session was started from. The location can be overridden
//! using the `RULESHELL_HISTORY` environment variable:
//!
//! ```bash
//! export RULESHELL_HISTORY=/custom/path/history
//! ruleshell
//! ```
//!
//! To disable history persistence, set `RULESHELL_HISTORY` to an empty
//! string.
//!
//! ## File Format
//!
//! One entry per line, UTF-8, newline-joined. A save overwrites the file
//! and keeps only the most recent [`HISTORY_MAX_ENTRIES`] entries. A
//! missing or unreadable file is not an error for the session; callers
//! receive a [`ReplError::HistoryIo`] and decide how loudly to report it.

use crate::config::{HISTORY_ENV_VAR, HISTORY_FILE_NAME, HISTORY_MAX_ENTRIES};
use crate::error::ReplError;
use std::env;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub fn history_path() -> Option<PathBuf> {
    if let Ok(custom_path) = env::var(HISTORY_ENV_VAR) {
        if custom_path.is_empty() {
            return None;
        }
        return Some(PathBuf::from(custom_path));
    }

    env::current_dir().ok().map(|cwd| cwd.join(HISTORY_FILE_NAME))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryStore {
    entries: Vec<String>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, ReplError> {
        let content = fs::read_to_string(path).map_err(|source| ReplError::HistoryIo {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            entries: content.lines().map(str::to_string).collect(),
        })
    }

    pub fn append(&mut self, line: &str) {
        self.entries.push(line.to_string());
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Trims the log to the most recent [`HISTORY_MAX_ENTRIES`] entries and
    /// overwrites `path` with them.
    pub fn save(&mut self, path: &Path) -> Result<(), ReplError> {
        if self.entries.len() > HISTORY_MAX_ENTRIES {
            let excess = self.entries.len() - HISTORY_MAX_ENTRIES;
            self.entries.drain(..excess);
        }

        fs::write(path, self.entries.join("\n")).map_err(|source| ReplError::HistoryIo {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes the whole log to a new file. An existing file is never
    /// overwritten.
    pub fn write_to(&self, path: &Path) -> Result<(), ReplError> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|source| match source.kind() {
                io::ErrorKind::AlreadyExists => ReplError::HistoryFileExists(path.to_path_buf()),
                _ => ReplError::HistoryIo {
                    path: path.to_path_buf(),
                    source,
                },
            })?;

        file.write_all(self.entries.join("\n").as_bytes())
            .map_err(|source| ReplError::HistoryIo {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // One test touches the environment so that parallel tests never race
    // on the variable.
    #[test]
    fn history_path_follows_env_override() {
        env::remove_var(HISTORY_ENV_VAR);
        if let Some(path) = history_path() {
            assert!(path.to_string_lossy().ends_with(HISTORY_FILE_NAME));
        }

        env::set_var(HISTORY_ENV_VAR, "/custom/path");
        assert_eq!(history_path(), Some(PathBuf::from("/custom/path")));

        env::set_var(HISTORY_ENV_VAR, "");
        assert_eq!(history_path(), None);

        env::remove_var(HISTORY_ENV_VAR);
    }

    #[test]
    fn append_keeps_order_and_duplicates() {
        let mut history = HistoryStore::new();
        history.append("foo");
        history.append("bar");
        history.append("foo");

        assert_eq!(history.entries(), &["foo", "bar", "foo"]);
    }

    #[test]
    fn save_keeps_most_recent_hundred() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history");

        let mut history = HistoryStore::new();
        for i in 0..150 {
            history.append(&format!("cmd{}", i));
        }
        history.save(&path).unwrap();

        let reloaded = HistoryStore::load(&path).unwrap();
        assert_eq!(reloaded.len(), 100);
        assert_eq!(reloaded.entries()[0], "cmd50");
        assert_eq!(reloaded.entries()[99], "cmd149");
        assert_eq!(history.len(), 100);
    }

    #[test]
    fn load_missing_file_is_history_io_error() {
        let dir = tempdir().unwrap();
        let result = HistoryStore::load(&dir.path().join("absent"));

        assert!(matches!(result, Err(ReplError::HistoryIo { .. })));
    }

    #[test]
    fn save_into_missing_directory_fails_without_panicking() {
        let dir = tempdir().unwrap();
        let mut history = HistoryStore::new();
        history.append("foo");

        let result = history.save(&dir.path().join("no/such/dir/history"));
        assert!(matches!(result, Err(ReplError::HistoryIo { .. })));
    }

    #[test]
    fn clear_only_touches_memory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history");

        let mut history = HistoryStore::new();
        history.append("foo");
        history.save(&path).unwrap();
        history.clear();

        assert!(history.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "foo");
    }

    #[test]
    fn write_to_creates_newline_joined_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("somefile.txt");

        let mut history = HistoryStore::new();
        history.append("foo");
        history.append("bar");
        history.write_to(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "foo\nbar");
    }

    #[test]
    fn write_to_refuses_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("somefile.txt");
        fs::write(&path, "keep me").unwrap();

        let mut history = HistoryStore::new();
        history.append("foo");
        let result = history.write_to(&path);

        assert!(matches!(result, Err(ReplError::HistoryFileExists(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");
    }
}
