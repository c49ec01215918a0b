//! # Path Completion
//!
//! Stateless helpers that turn a partial token into completion candidates:
//! filesystem paths for commands that take file arguments, and plain
//! prefix filtering over a fixed option list.
//!
//! ## Path Rules
//!
//! - The partial text is split into a directory prefix and a name fragment
//! - `base_dir` joined with the prefix is listed; the prefix is kept on
//!   every candidate
//! - Dot-files are hidden unless the fragment itself starts with `.`
//! - Directories are suffixed with `/`, files are not
//! - With `relative`, `./` and `../` are offered when they match, unless the
//!   prefix is already dot-relative
//! - A directory that cannot be read yields no candidates

use crate::config::PATH_SEPARATOR;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub fn list_completion(text: &str, options: &[&str]) -> Vec<String> {
    options
        .iter()
        .filter(|option| text.is_empty() || option.starts_with(text))
        .map(|option| option.to_string())
        .collect()
}

pub fn path_completion(
    text: &str,
    base_dir: Option<&Path>,
    only_dirs: bool,
    relative: bool,
) -> Vec<String> {
    let base_dir = match base_dir {
        Some(dir) => dir.to_path_buf(),
        None => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };

    let (mut prefix, fragment) = split_path(text);
    let listed_dir = base_dir.join(&prefix);

    if !prefix.is_empty() && !prefix.ends_with(PATH_SEPARATOR) {
        prefix.push(PATH_SEPARATOR);
    }

    let mut files = Vec::new();
    let mut dirs = Vec::new();

    if let Ok(entries) = fs::read_dir(&listed_dir) {
        for entry in entries.filter_map(|e| e.ok()) {
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(_) => continue,
            };
            if !name.starts_with(fragment) || (name.starts_with('.') && !fragment.starts_with('.'))
            {
                continue;
            }
            if entry.path().is_dir() {
                dirs.push(format!("{}{}{}", prefix, name, PATH_SEPARATOR));
            } else if !only_dirs {
                files.push(format!("{}{}", prefix, name));
            }
        }
    }

    files.sort();
    dirs.sort();

    let mut completion = if only_dirs {
        dirs
    } else {
        files.extend(dirs);
        files
    };

    if relative && !prefix.starts_with('.') {
        for special in [".", ".."] {
            let candidate = format!("{}{}", special, PATH_SEPARATOR);
            if candidate.starts_with(fragment) {
                completion.push(format!("{}{}", prefix, candidate));
            }
        }
    }

    completion
}

fn split_path(text: &str) -> (String, &str) {
    match text.rfind(PATH_SEPARATOR) {
        Some(0) => (PATH_SEPARATOR.to_string(), &text[1..]),
        Some(idx) => (text[..idx].to_string(), &text[idx + 1..]),
        None => (String::new(), text),
    }
}
