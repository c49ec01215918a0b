//! # REPL - Interactive Front-end
//!
//! Connects the [`Dispatcher`] to a terminal through rustyline:
//!
//! - Reading input with rustyline (line editing, arrow-key history)
//! - Tab completion through [`CompletionEngine`], rendered with
//!   [`SuggestionFormatter`]
//! - Seeding the editor's history with the persisted command history
//!
//! ## Tab Handling
//!
//! ```text
//! Tab ──> word start (readline delimiters)
//!          │
//!          ▼
//!   CompletionEngine ── 0 candidates ──> beep
//!          │
//!          ├── 1 candidate ─────────────> inserted
//!          │
//!          └── several ──> listing printed below the prompt,
//!                          longest common prefix inserted,
//!                          prompt and buffer redrawn by rustyline
//! ```
//!
//! The terminal is in raw mode while rustyline reads a key, so the
//! listing is written with `\r\n` line endings. A listing that cannot be
//! written is logged and the Tab press offers no suggestions.

use crate::cli::commands::CommandRegistry;
use crate::cli::completion::{is_category_marker, word_start, CompletionEngine};
use crate::cli::dispatch::{Dispatcher, Input, LineSource};
use crate::cli::render::{terminal_width, SuggestionFormatter};
use crate::error::ReplError;
use eyre::{Result, WrapErr};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Context, Editor, Helper};
use std::cell::RefCell;
use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use std::rc::Rc;
use tracing::{debug, error};

pub struct ReplHelper {
    engine: RefCell<CompletionEngine>,
}

impl ReplHelper {
    pub fn new(registry: Rc<CommandRegistry>) -> Self {
        Self {
            engine: RefCell::new(CompletionEngine::new(registry)),
        }
    }
}

impl ReplHelper {
    /// Computes the replacement for the word ending at `pos`. Several
    /// candidates are listed on `out` first; a listing that cannot be
    /// written is logged and leaves the line unchanged.
    fn suggest<W: Write>(&self, line: &str, pos: usize, out: &mut W) -> (usize, Vec<Pair>) {
        let start = word_start(line, pos);
        let mut engine = self.engine.borrow_mut();
        engine.complete(line, start, pos, 0);

        let insertable: Vec<&str> = engine
            .matches()
            .iter()
            .filter(|m| !is_category_marker(m))
            .map(String::as_str)
            .collect();

        let replacement = match insertable.as_slice() {
            [] => return (start, Vec::new()),
            [single] => single.to_string(),
            _ => {
                let listing =
                    SuggestionFormatter::new(engine.matches(), engine.prefix(), terminal_width())
                        .render();
                if let Err(err) = show_listing(out, &listing) {
                    error!("{}", err);
                    return (start, Vec::new());
                }

                let typed = &line[start..pos];
                let common = longest_common_prefix(&insertable);
                if common.starts_with(typed) {
                    common.to_string()
                } else {
                    typed.to_string()
                }
            }
        };

        (
            start,
            vec![Pair {
                display: replacement.clone(),
                replacement,
            }],
        )
    }
}

fn show_listing<W: Write>(out: &mut W, listing: &str) -> Result<(), ReplError> {
    write!(out, "{}", listing.replace('\n', "\r\n"))
        .and_then(|()| out.flush())
        .map_err(|err| ReplError::CompletionRender(format!("cannot show suggestions: {}", err)))
}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(self.suggest(line, pos, &mut io::stdout()))
    }
}

impl Hinter for ReplHelper {
    type Hint = String;
}

impl Highlighter for ReplHelper {}

impl Validator for ReplHelper {}

impl Helper for ReplHelper {}

fn longest_common_prefix<'a>(candidates: &[&'a str]) -> &'a str {
    let Some((first, rest)) = candidates.split_first() else {
        return "";
    };

    let mut end = first.len();
    for candidate in rest {
        end = first
            .char_indices()
            .zip(candidate.chars())
            .take_while(|((_, a), b)| a == b)
            .map(|((idx, a), _)| idx + a.len_utf8())
            .last()
            .unwrap_or(0)
            .min(end);
    }
    &first[..end]
}

impl LineSource for Editor<ReplHelper, DefaultHistory> {
    fn read_line(&mut self, prompt: &str) -> Result<Input> {
        match self.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.add_history_entry(line.as_str()).ok();
                }
                Ok(Input::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
            Err(ReadlineError::Eof) => Ok(Input::Eof),
            Err(err) => Err(err).wrap_err("error reading input"),
        }
    }
}

pub struct Repl {
    editor: Editor<ReplHelper, DefaultHistory>,
    dispatcher: Dispatcher<Stdout>,
}

impl Repl {
    pub fn new(registry: CommandRegistry, history_file: Option<PathBuf>) -> Result<Self> {
        debug!("Starting the interpreter");
        let registry = Rc::new(registry);
        let dispatcher = Dispatcher::new(Rc::clone(&registry), history_file, io::stdout());

        let config = Config::builder()
            .completion_type(CompletionType::List)
            .auto_add_history(false)
            .build();
        let mut editor: Editor<ReplHelper, DefaultHistory> =
            Editor::with_config(config).wrap_err("failed to initialize line editor")?;
        editor.set_helper(Some(ReplHelper::new(registry)));

        for entry in dispatcher.history().entries() {
            editor.add_history_entry(entry.as_str()).ok();
        }

        Ok(Self { editor, dispatcher })
    }

    pub fn run(&mut self) -> Result<()> {
        self.dispatcher.run_loop(&mut self.editor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_prefix_of_candidates() {
        assert_eq!(longest_common_prefix(&["help ", "history "]), "h");
        assert_eq!(longest_common_prefix(&["mass ", "mass_ratio "]), "mass");
        assert_eq!(longest_common_prefix(&["quit "]), "quit ");
        assert_eq!(longest_common_prefix(&["abc", "xyz"]), "");
        assert_eq!(longest_common_prefix(&[]), "");
    }

    struct ClosedTerminal;

    impl Write for ClosedTerminal {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn helper() -> ReplHelper {
        ReplHelper::new(Rc::new(CommandRegistry::with_builtins().unwrap()))
    }

    #[test]
    fn several_candidates_are_listed_with_raw_line_endings() {
        let mut out = Vec::new();
        let (start, pairs) = helper().suggest("h", 1, &mut out);

        assert_eq!(start, 0);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].replacement, "h");

        let listing = String::from_utf8(out).unwrap();
        assert!(listing.contains("help"));
        assert!(listing.contains("history"));
        assert!(listing.starts_with("\r\n"));
    }

    #[test]
    fn single_candidate_is_inserted_without_listing() {
        let mut out = Vec::new();
        let (_, pairs) = helper().suggest("hist", 4, &mut out);

        assert_eq!(pairs[0].replacement, "history ");
        assert!(out.is_empty());
    }

    #[test]
    fn unwritable_listing_means_no_suggestions() {
        let (start, pairs) = helper().suggest("h", 1, &mut ClosedTerminal);

        assert_eq!(start, 0);
        assert!(pairs.is_empty());
    }
}
