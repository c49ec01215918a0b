//! # Dispatcher
//!
//! Owns the command registry, the history and the line preprocessor, and
//! drives the read-preprocess-execute loop.
//!
//! ## Execution Flow
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │              Read Line (LineSource)                       │
//! └──────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │              LinePreprocessor                             │
//! └──────────────────────────────────────────────────────────┘
//!        │ Empty           │ Line              │ Statements
//!        ▼                 ▼                   ▼
//!    [next line]    ┌──────────────┐   ┌──────────────────────┐
//!                   │ Execute      │   │ Execute each, in     │
//!                   │              │   │ order                │
//!                   └──────────────┘   └──────────────────────┘
//!                           │
//!                           ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │   Print result / warning          Exit? ── save history  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Input Sources
//!
//! The loop reads through the [`LineSource`] trait. The interactive
//! front-end implements it on top of rustyline; tests feed scripted lines.
//!
//! ## Error Handling
//!
//! Unknown commands, failed commands and history write failures are
//! reported and the loop continues. End of input runs the `EOF` command.
//! The only error that leaves [`Dispatcher::run_loop`] early is a failure of
//! the input source itself.

use crate::cli::commands::{parse_command, CommandRegistry, CommandResult, Session};
use crate::cli::history::HistoryStore;
use crate::cli::preprocess::{LinePreprocessor, Preprocessed};
use crate::config::{CONTINUATION_PROMPT, PRIMARY_PROMPT};
use crate::error::ReplError;
use eyre::{Result, WrapErr};
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::debug;

const EOF_COMMAND: &str = "EOF";

#[derive(Debug, PartialEq)]
pub enum Input {
    Line(String),
    Interrupted,
    Eof,
}

pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Result<Input>;
}

pub struct Dispatcher<W: Write> {
    registry: Rc<CommandRegistry>,
    preprocessor: LinePreprocessor,
    history: HistoryStore,
    history_file: Option<PathBuf>,
    out: W,
}

impl<W: Write> Dispatcher<W> {
    /// Creates a dispatcher, loading history from `history_file` when one is
    /// given. A history file that cannot be read leaves the history empty.
    pub fn new(registry: Rc<CommandRegistry>, history_file: Option<PathBuf>, out: W) -> Self {
        let history = match &history_file {
            Some(path) => HistoryStore::load(path).unwrap_or_else(|err| {
                debug!("Loading the previous history failed: {}", err);
                HistoryStore::new()
            }),
            None => HistoryStore::new(),
        };

        Self {
            registry,
            preprocessor: LinePreprocessor::new(),
            history,
            history_file,
            out,
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn prompt(&self) -> &'static str {
        if self.preprocessor.has_pending() {
            CONTINUATION_PROMPT
        } else {
            PRIMARY_PROMPT
        }
    }

    pub fn run_loop<S: LineSource>(&mut self, source: &mut S) -> Result<()> {
        let outcome = self.read_and_dispatch(source);
        self.shutdown();
        outcome
    }

    fn read_and_dispatch<S: LineSource>(&mut self, source: &mut S) -> Result<()> {
        loop {
            let keep_running = match source.read_line(self.prompt())? {
                Input::Line(line) => self.accept(&line)?,
                Input::Interrupted => {
                    self.preprocessor.discard_pending();
                    writeln!(self.out, "^C").wrap_err("failed to write output")?;
                    true
                }
                Input::Eof => {
                    writeln!(self.out).wrap_err("failed to write output")?;
                    self.execute(EOF_COMMAND)?
                }
            };

            if !keep_running {
                return Ok(());
            }
        }
    }

    /// Runs one raw line through preprocessing and dispatch. Returns `false`
    /// once a command asked to leave the loop.
    pub fn accept(&mut self, raw: &str) -> Result<bool> {
        match self.preprocessor.process(raw, &mut self.history) {
            Preprocessed::Empty => Ok(true),
            Preprocessed::Line(line) => self.execute(&line),
            Preprocessed::Statements(statements) => {
                for statement in &statements {
                    if !self.execute(statement)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    /// Dispatches one already-normalized line.
    pub fn execute(&mut self, line: &str) -> Result<bool> {
        if line.trim().is_empty() {
            return Ok(true);
        }

        let (name, args) = parse_command(line);
        let registry = Rc::clone(&self.registry);

        let entry = match registry.get(name) {
            Some(entry) => entry,
            None => {
                let unknown = match name {
                    "" => line.split_whitespace().next().unwrap_or_default(),
                    _ => name,
                };
                self.warn(&ReplError::UnknownCommand(unknown.to_string()))?;
                return Ok(true);
            }
        };

        let mut session = Session {
            registry: &registry,
            history: &mut self.history,
        };

        match entry.run(&mut session, args) {
            CommandResult::Exit => Ok(false),
            CommandResult::Continue => Ok(true),
            CommandResult::Output(text) => {
                writeln!(self.out, "{}", text).wrap_err("failed to write output")?;
                Ok(true)
            }
            CommandResult::Error(msg) => {
                writeln!(self.out, "Error: {}", msg).wrap_err("failed to write output")?;
                Ok(true)
            }
        }
    }

    /// Persists the history. Failures are logged at debug level only.
    pub fn shutdown(&mut self) {
        debug!("Stopping the interpreter");
        if let Err(err) = self.out.flush() {
            debug!("Flushing the output failed: {}", err);
        }

        if let Some(path) = &self.history_file {
            debug!("Saving the history in {}", path.display());
            match self.history.save(path) {
                Ok(()) => debug!("  --> Success"),
                Err(err) => debug!("  --> Failed: {}", err),
            }
        }
    }

    fn warn(&mut self, err: &ReplError) -> Result<()> {
        writeln!(self.out, "Warning: {}", err).wrap_err("failed to write output")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::CommandEntry;
    use std::collections::VecDeque;
    use tempfile::tempdir;

    struct Script(VecDeque<Input>);

    impl Script {
        fn new(lines: &[&str]) -> Self {
            Self(lines.iter().map(|l| Input::Line(l.to_string())).collect())
        }
    }

    impl LineSource for Script {
        fn read_line(&mut self, _prompt: &str) -> Result<Input> {
            Ok(self.0.pop_front().unwrap_or(Input::Eof))
        }
    }

    fn echo(_session: &mut Session<'_>, args: &str) -> CommandResult {
        CommandResult::Output(format!("echo:{}", args))
    }

    fn dispatcher() -> Dispatcher<Vec<u8>> {
        let mut registry = CommandRegistry::with_builtins().unwrap();
        registry.register(CommandEntry::new("echo", echo)).unwrap();
        Dispatcher::new(Rc::new(registry), None, Vec::new())
    }

    fn output(dispatcher: &Dispatcher<Vec<u8>>) -> String {
        String::from_utf8_lossy(dispatcher.output()).into_owned()
    }

    #[test]
    fn empty_line_does_nothing() {
        let mut d = dispatcher();

        assert!(d.accept("   ").unwrap());
        assert!(output(&d).is_empty());
        assert!(d.history().is_empty());
    }

    #[test]
    fn unknown_command_warns_and_continues() {
        let mut d = dispatcher();

        assert!(d.accept("frobnicate now").unwrap());
        assert_eq!(output(&d), "Warning: Command \"frobnicate\" not implemented.\n");
    }

    #[test]
    fn quit_stops() {
        let mut d = dispatcher();
        assert!(!d.accept("quit").unwrap());
    }

    #[test]
    fn quit_inside_statements_stops_remaining_ones() {
        let mut d = dispatcher();

        assert!(!d.accept("echo a; quit; echo b").unwrap());
        assert_eq!(output(&d), "echo:a\n");
    }

    #[test]
    fn prompt_switches_while_continuing() {
        let mut d = dispatcher();
        assert_eq!(d.prompt(), PRIMARY_PROMPT);

        d.accept("echo a \\").unwrap();
        assert_eq!(d.prompt(), CONTINUATION_PROMPT);

        d.accept("b").unwrap();
        assert_eq!(d.prompt(), PRIMARY_PROMPT);
        assert_eq!(output(&d), "echo:a b\n");
    }

    #[test]
    fn interrupt_discards_pending_line() {
        let mut d = dispatcher();
        let mut script = Script(VecDeque::from(vec![
            Input::Line("echo partial \\".to_string()),
            Input::Interrupted,
            Input::Line("echo fresh".to_string()),
        ]));

        d.run_loop(&mut script).unwrap();
        assert_eq!(output(&d), "^C\necho:fresh\n\n");
    }

    #[test]
    fn loop_saves_history_on_exit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history");
        let registry = Rc::new(CommandRegistry::with_builtins().unwrap());

        let mut d = Dispatcher::new(Rc::clone(&registry), Some(path.clone()), Vec::new());
        d.run_loop(&mut Script::new(&["foo", "bar", "quit"])).unwrap();

        let reloaded = Dispatcher::new(registry, Some(path), Vec::new());
        assert_eq!(reloaded.history().entries(), &["foo", "bar", "quit"]);
    }

    struct UnflushableOutput;

    impl Write for UnflushableOutput {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn failed_flush_still_saves_history() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history");
        let registry = Rc::new(CommandRegistry::with_builtins().unwrap());

        let mut d = Dispatcher::new(registry, Some(path.clone()), UnflushableOutput);
        d.run_loop(&mut Script::new(&["foo", "quit"])).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "foo\nquit");
    }
}
