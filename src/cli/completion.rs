//! # Tab Completion
//!
//! Given the line buffer and the cursor's word range, produces the list of
//! completion candidates. The engine follows the readline protocol: the
//! candidate list is computed when state `0` is requested and later
//! states walk through that list until it is exhausted.
//!
//! ## Context Reconstruction
//!
//! Before asking a completer for candidates the request is normalized:
//!
//! 1. Leading whitespace is stripped and the word offsets shifted to match
//! 2. Everything up to the last `;` before the cursor is peeled off, so
//!    only the statement under the cursor is considered
//! 3. A cursor on the first token completes command names; anywhere else
//!    the command's own completer is used, or path completion when it has
//!    none
//!
//! ## Split Corrections
//!
//! The word range comes from readline-style delimiters, which split
//! `my\ file` after the escaped space and `--with-mass` after each hyphen.
//! Both cases are re-derived from the whole token, handed to the completer
//! and the already-typed part is cut off every returned candidate again:
//!
//! ```text
//! buffer:     load my\ fi|          load --with-m|
//! word:                fi                       m
//! completer:        "my fi"               "--with-m"
//! candidate:    "my file.txt"         "--with-mass"
//! returned:        "file.txt "              "mass "
//! ```
//!
//! ## Categories
//!
//! A completer may group its candidates by category. The groups are
//! flattened into one list in which a `@@label@@` marker entry precedes the
//! candidates of each category; [`crate::cli::render`] turns the markers
//! back into headings. Markers are never inserted into the line.

use crate::cli::commands::{complete_path_argument, parse_command, CommandRegistry, CompleteFn};
use crate::cli::preprocess::last_separator;
use crate::config::{CATEGORY_MARKER, COMPLETION_WORD_BREAKS, PATH_SEPARATOR, TOKEN_COMPLETE_DELIMITERS};
use crate::error::ReplError;
use std::rc::Rc;
use tracing::error;

/// What a completer is asked to complete. `begidx..endidx` is the word
/// range inside `line`, which is the statement under the cursor.
pub struct CompletionRequest<'a> {
    pub text: &'a str,
    pub line: &'a str,
    pub begidx: usize,
    pub endidx: usize,
    pub registry: &'a CommandRegistry,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CandidateSet {
    Flat(Vec<String>),
    Categorized(Vec<(String, Vec<String>)>),
}

impl CandidateSet {
    /// Flattens the set into the candidate list handed to the line editor.
    /// Categories are sorted and de-duplicated; a lone category is emitted
    /// without its marker.
    pub fn into_matches(self) -> Vec<String> {
        match self {
            CandidateSet::Flat(candidates) => {
                let mut seen = std::collections::HashSet::new();
                candidates
                    .into_iter()
                    .filter(|candidate| seen.insert(candidate.clone()))
                    .collect()
            }
            CandidateSet::Categorized(groups) => {
                let groups: Vec<(String, Vec<String>)> = groups
                    .into_iter()
                    .filter(|(_, candidates)| !candidates.is_empty())
                    .collect();
                let with_markers = groups.len() > 1;

                let mut matches = Vec::new();
                for (label, mut candidates) in groups {
                    candidates.sort();
                    candidates.dedup();
                    if with_markers {
                        matches.push(category_marker(&label));
                    }
                    matches.extend(candidates);
                }
                matches
            }
        }
    }
}

pub fn category_marker(label: &str) -> String {
    format!("{}{}{}", CATEGORY_MARKER, label.replace(' ', "_"), CATEGORY_MARKER)
}

pub fn category_label(candidate: &str) -> Option<String> {
    candidate
        .strip_prefix(CATEGORY_MARKER)?
        .strip_suffix(CATEGORY_MARKER)
        .filter(|label| !label.is_empty())
        .map(|label| label.replace('_', " "))
}

pub fn is_category_marker(candidate: &str) -> bool {
    category_label(candidate).is_some()
}

/// Start of the completion word ending at `pos`, using readline's
/// delimiter set.
pub fn word_start(line: &str, pos: usize) -> usize {
    line.get(..pos)
        .and_then(|head| {
            head.char_indices()
                .rev()
                .find(|(_, c)| COMPLETION_WORD_BREAKS.contains(*c))
                .map(|(idx, c)| idx + c.len_utf8())
        })
        .unwrap_or(0)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub matches: Vec<String>,
    /// Already-typed text cut from the candidates by a split correction.
    /// Rendering puts it back in front of each candidate.
    pub prefix: String,
}

pub struct CompletionEngine {
    registry: Rc<CommandRegistry>,
    current: Completion,
}

impl CompletionEngine {
    pub fn new(registry: Rc<CommandRegistry>) -> Self {
        Self {
            registry,
            current: Completion::default(),
        }
    }

    /// Returns candidate number `state`. State `0` recomputes the list; a
    /// failed computation is logged and behaves as "no candidates".
    pub fn complete(&mut self, buffer: &str, begidx: usize, endidx: usize, state: usize) -> Option<String> {
        if state == 0 {
            self.current = self.compute(buffer, begidx, endidx).unwrap_or_else(|err| {
                error!("{}", err);
                Completion::default()
            });
        }
        self.current.matches.get(state).cloned()
    }

    pub fn matches(&self) -> &[String] {
        &self.current.matches
    }

    pub fn prefix(&self) -> &str {
        &self.current.prefix
    }

    pub fn compute(&self, buffer: &str, begidx: usize, endidx: usize) -> Result<Completion, ReplError> {
        let text = buffer.get(begidx..endidx).ok_or_else(|| {
            ReplError::CompletionRender(format!(
                "word range {}..{} is outside a buffer of {} bytes",
                begidx,
                endidx,
                buffer.len()
            ))
        })?;

        let mut line = buffer.trim_start();
        let stripped = buffer.len() - line.len();
        let mut begidx = begidx.saturating_sub(stripped);
        let mut endidx = endidx.saturating_sub(stripped);

        if let Some(separator) = line.get(..endidx).and_then(last_separator) {
            let peeled = separator + 1;
            line = &line[peeled..];
            begidx = begidx.saturating_sub(peeled);
            endidx = endidx.saturating_sub(peeled);
            if line.get(..begidx).map_or(false, |head| head.chars().all(|c| c == ' ')) {
                begidx = 0;
            }
        }

        let registry = &*self.registry;
        let completer: CompleteFn = if begidx > 0 {
            let (name, _) = parse_command(line);
            registry
                .get(name)
                .and_then(|entry| entry.completer())
                .unwrap_or(complete_path_argument)
        } else {
            complete_command_names
        };

        let token = |start: usize| {
            line.get(start..endidx).ok_or_else(|| {
                ReplError::CompletionRender(format!("token start {} is past the cursor", start))
            })
        };

        let (raw, prefix) = if begidx > 2 && line.get(begidx - 2..begidx) == Some("\\ ") {
            let start = escaped_token_start(line, endidx);
            let whole = token(start)?;
            let prefix = format!("{}\\ ", whole.rsplit_once("\\ ").map_or("", |(head, _)| head));
            let unescaped = whole.replace("\\ ", " ");
            let cut = prefix.replace("\\ ", " ").len();
            let request = CompletionRequest {
                text: &unescaped,
                line,
                begidx: start,
                endidx,
                registry,
            };
            (cut_typed_prefix(completer(&request).into_matches(), cut), prefix)
        } else if begidx > 0 && line.get(..begidx).map_or(false, |head| head.ends_with('-')) {
            let start = whitespace_token_start(line, endidx);
            let whole = token(start)?;
            let prefix = format!("{}-", whole.rsplit_once('-').map_or("", |(head, _)| head));
            let request = CompletionRequest {
                text: whole,
                line,
                begidx: start,
                endidx,
                registry,
            };
            (cut_typed_prefix(completer(&request).into_matches(), prefix.len()), prefix)
        } else {
            let request = CompletionRequest {
                text,
                line,
                begidx,
                endidx,
                registry,
            };
            (completer(&request).into_matches(), String::new())
        };

        let matches = raw
            .into_iter()
            .filter(|candidate| !candidate.is_empty())
            .map(|candidate| {
                if candidate.ends_with(TOKEN_COMPLETE_DELIMITERS) {
                    candidate
                } else {
                    candidate + " "
                }
            })
            .collect();

        Ok(Completion { matches, prefix })
    }
}

fn complete_command_names(request: &CompletionRequest<'_>) -> CandidateSet {
    CandidateSet::Flat(
        request
            .registry
            .names()
            .into_iter()
            .filter(|name| name.starts_with(request.text))
            .map(str::to_string)
            .collect(),
    )
}

fn cut_typed_prefix(candidates: Vec<String>, cut: usize) -> Vec<String> {
    let trimmed: Vec<String> = candidates
        .into_iter()
        .filter_map(|candidate| {
            if is_category_marker(&candidate) {
                return Some(candidate);
            }
            candidate
                .get(cut..)
                .filter(|rest| !rest.is_empty())
                .map(str::to_string)
        })
        .collect();

    drop_empty_categories(trimmed)
}

// A marker followed by another marker, or by nothing, heads an empty group.
fn drop_empty_categories(candidates: Vec<String>) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if is_category_marker(&candidate) && kept.last().map_or(false, |m| is_category_marker(m)) {
            kept.pop();
        }
        kept.push(candidate);
    }
    if kept.last().map_or(false, |m| is_category_marker(m)) {
        kept.pop();
    }
    kept
}

// Tokens end at a path separator or at whitespace that is not escaped.
fn escaped_token_start(line: &str, end: usize) -> usize {
    let mut start = 0;
    let mut previous = None;
    for (idx, ch) in line[..end].char_indices() {
        if ch == PATH_SEPARATOR || (ch.is_whitespace() && previous != Some('\\')) {
            start = idx + ch.len_utf8();
        }
        previous = Some(ch);
    }
    start
}

fn whitespace_token_start(line: &str, end: usize) -> usize {
    line[..end]
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map_or(0, |(idx, c)| idx + c.len_utf8())
}
