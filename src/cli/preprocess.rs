//! # Line Preprocessing
//!
//! Turns one raw input line into zero or more normalized command lines.
//! The pipeline is deterministic and runs in a fixed order:
//!
//! ```text
//! raw line
//!    │
//!    ▼
//! ┌──────────────────────┐
//! │ trim leading space   │── empty ──────────────────────> Empty
//! └──────────────────────┘
//!    │
//!    ▼
//! ┌──────────────────────┐
//! │ record in history    │  (skipped for history / # / help)
//! └──────────────────────┘
//!    │
//!    ▼
//! ┌──────────────────────┐
//! │ join pending line    │── ends with '\' ── keep pending ─> Empty
//! └──────────────────────┘
//!    │
//!    ▼
//! ┌──────────────────────┐
//! │ strip '#' comment    │  (quote aware)
//! └──────────────────────┘
//!    │
//!    ▼
//! ┌──────────────────────┐
//! │ space operators      │  (skipped for `shell`)
//! └──────────────────────┘
//!    │
//!    ▼
//! ┌──────────────────────┐
//! │ split on ';'         │── has ';' ──────────────────> Statements
//! └──────────────────────┘   (not for `shell` / `!`)
//!    │
//!    ▼
//!  Line
//! ```
//!
//! ## Statements
//!
//! A line holding unescaped `;` separators is returned as its individual
//! statements. The caller dispatches each of them directly, left to right,
//! without running them through this pipeline again.
//!
//! ## History
//!
//! History records the physical line as typed (after trimming), before any
//! transformation. A line that continues on the next one is recorded as
//! two entries, one per physical line.

use crate::cli::history::HistoryStore;
use crate::config::{
    COMMENT_CHAR, CONTINUATION_MARKER, HISTORY_EXCLUDED_PREFIXES, OPERATOR_CHARS, SHELL_COMMAND,
    SHELL_SHORTHAND, STATEMENT_SEPARATOR,
};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum Preprocessed {
    Empty,
    Line(String),
    Statements(Vec<String>),
}

#[derive(Debug, Default)]
pub struct LinePreprocessor {
    pending: String,
}

impl LinePreprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn discard_pending(&mut self) {
        self.pending.clear();
    }

    pub fn process(&mut self, raw: &str, history: &mut HistoryStore) -> Preprocessed {
        let trimmed = raw.trim_start();
        if trimmed.is_empty() {
            return Preprocessed::Empty;
        }

        if !is_meta_command(trimmed) {
            history.append(trimmed);
        }

        let mut line = std::mem::take(&mut self.pending);
        line.push_str(trimmed);

        if let Some(head) = line.strip_suffix(CONTINUATION_MARKER) {
            self.pending = head.to_string();
            return Preprocessed::Empty;
        }

        let line = strip_comment(&line);
        let is_shell = line.starts_with(SHELL_COMMAND);

        let line = if is_shell {
            line.to_string()
        } else {
            space_operators(line)
        };

        if !is_shell && !trimmed_starts_with_shorthand(&line) && has_separator(&line) {
            return Preprocessed::Statements(split_statements(&line));
        }

        debug!("Entered command: {:?}", split_args(&line));
        Preprocessed::Line(line)
    }
}

pub fn is_meta_command(line: &str) -> bool {
    HISTORY_EXCLUDED_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
}

/// Truncates `line` at the first `#` found outside single or double quotes.
pub fn strip_comment(line: &str) -> &str {
    let mut in_single = false;
    let mut in_double = false;

    for (idx, ch) in line.char_indices() {
        match ch {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            c if c == COMMENT_CHAR && !in_single && !in_double => return &line[..idx],
            _ => {}
        }
    }

    line
}

pub fn space_operators(line: &str) -> String {
    let mut spaced = String::with_capacity(line.len() * 2);
    for ch in line.chars() {
        if OPERATOR_CHARS.contains(&ch) {
            spaced.push(' ');
            spaced.push(ch);
            spaced.push(' ');
        } else {
            spaced.push(ch);
        }
    }
    spaced
}

// Operator spacing turns a leading '!' into " ! ".
fn trimmed_starts_with_shorthand(line: &str) -> bool {
    line.trim_start().starts_with(SHELL_SHORTHAND)
}

fn has_separator(line: &str) -> bool {
    separator_positions(line).next().is_some()
}

fn separator_positions(line: &str) -> impl Iterator<Item = usize> + '_ {
    let mut escaped = false;
    line.char_indices().filter_map(move |(idx, ch)| {
        let is_separator = ch == STATEMENT_SEPARATOR && !escaped;
        escaped = ch == '\\' && !escaped;
        is_separator.then_some(idx)
    })
}

/// Byte offset of the last unescaped `;` in `line`.
pub fn last_separator(line: &str) -> Option<usize> {
    separator_positions(line).last()
}

/// Splits on every `;` not preceded by a backslash.
pub fn split_statements(line: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut start = 0;

    for idx in separator_positions(line) {
        statements.push(line[start..idx].to_string());
        start = idx + STATEMENT_SEPARATOR.len_utf8();
    }
    statements.push(line[start..].to_string());

    statements
}

/// Splits command arguments on whitespace. A token ending in a backslash
/// is joined to the following one with a single space.
pub fn split_args(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut joined = String::new();

    for token in line.split_whitespace() {
        if let Some(head) = token.strip_suffix('\\') {
            joined.push_str(head);
            joined.push(' ');
        } else if !joined.is_empty() {
            joined.push_str(token);
            args.push(std::mem::take(&mut joined));
        } else {
            args.push(token.to_string());
        }
    }

    if !joined.is_empty() {
        args.push(joined.trim_end().to_string());
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(pre: &mut LinePreprocessor, raw: &str) -> Preprocessed {
        pre.process(raw, &mut HistoryStore::new())
    }

    #[test]
    fn blank_line_is_empty_and_not_recorded() {
        let mut pre = LinePreprocessor::new();
        let mut history = HistoryStore::new();

        assert_eq!(pre.process("    ", &mut history), Preprocessed::Empty);
        assert!(history.is_empty());
    }

    #[test]
    fn continuation_joins_with_next_line() {
        let mut pre = LinePreprocessor::new();

        assert_eq!(run(&mut pre, "load model\\"), Preprocessed::Empty);
        assert!(pre.has_pending());

        assert_eq!(
            run(&mut pre, "  sm"),
            Preprocessed::Line("load modelsm".to_string())
        );
        assert!(!pre.has_pending());
    }

    #[test]
    fn continuation_can_span_several_lines() {
        let mut pre = LinePreprocessor::new();

        assert_eq!(run(&mut pre, "a \\"), Preprocessed::Empty);
        assert_eq!(run(&mut pre, "b \\"), Preprocessed::Empty);
        assert_eq!(run(&mut pre, "c"), Preprocessed::Line("a b c".to_string()));
    }

    #[test]
    fn discard_pending_drops_partial_line() {
        let mut pre = LinePreprocessor::new();
        run(&mut pre, "partial \\");
        pre.discard_pending();

        assert_eq!(run(&mut pre, "fresh"), Preprocessed::Line("fresh".to_string()));
    }

    #[test]
    fn comment_inside_double_quotes_survives() {
        assert_eq!(
            strip_comment(r#"say "this is # not a comment" # but this is"#),
            r#"say "this is # not a comment" "#
        );
    }

    #[test]
    fn quotes_of_other_kind_are_inert() {
        assert_eq!(strip_comment(r#"say "it's # here" # gone"#), r#"say "it's # here" "#);
        assert_eq!(strip_comment(r##"say 'a "# b' # gone"##), r##"say 'a "# b' "##);
    }

    #[test]
    fn whole_line_comment_becomes_blank() {
        let mut pre = LinePreprocessor::new();
        assert_eq!(run(&mut pre, "# just a note"), Preprocessed::Line(String::new()));
    }

    #[test]
    fn operators_are_padded() {
        assert_eq!(space_operators("set a=b(1)"), "set a = b ( 1 ) ");
        assert_eq!(space_operators("x>=y,z"), "x >  = y , z");
    }

    #[test]
    fn shell_lines_keep_operators() {
        let mut pre = LinePreprocessor::new();
        assert_eq!(
            run(&mut pre, "shell ls | grep x"),
            Preprocessed::Line("shell ls | grep x".to_string())
        );
    }

    #[test]
    fn semicolons_split_into_statements() {
        let mut pre = LinePreprocessor::new();
        assert_eq!(
            run(&mut pre, "cmdA; cmdB; cmdC"),
            Preprocessed::Statements(vec![
                "cmdA".to_string(),
                " cmdB".to_string(),
                " cmdC".to_string()
            ])
        );
    }

    #[test]
    fn shell_and_bang_lines_are_not_split() {
        let mut pre = LinePreprocessor::new();

        assert!(matches!(run(&mut pre, "shell echo a; echo b"), Preprocessed::Line(_)));
        assert!(matches!(run(&mut pre, "!echo a; echo b"), Preprocessed::Line(_)));
    }

    #[test]
    fn escaped_semicolon_does_not_split() {
        assert_eq!(split_statements(r"echo a\;b"), vec![r"echo a\;b".to_string()]);

        let mut pre = LinePreprocessor::new();
        assert!(matches!(run(&mut pre, r"echo a\;b"), Preprocessed::Line(_)));
    }

    #[test]
    fn trailing_segment_is_kept() {
        assert_eq!(
            split_statements("a;b;"),
            vec!["a".to_string(), "b".to_string(), String::new()]
        );
    }

    #[test]
    fn meta_commands_are_not_recorded() {
        let mut pre = LinePreprocessor::new();
        let mut history = HistoryStore::new();

        for line in ["history", "# comment", "help quit", "foo", "  bar x=1 # note"] {
            pre.process(line, &mut history);
        }

        assert_eq!(history.entries(), &["foo", "bar x=1 # note"]);
    }

    #[test]
    fn split_args_joins_escaped_spaces() {
        assert_eq!(
            split_args(r"cat my\ file.txt other"),
            vec!["cat", "my file.txt", "other"]
        );
        assert_eq!(split_args("  a   b "), vec!["a", "b"]);
        assert!(split_args("").is_empty());
    }
}
