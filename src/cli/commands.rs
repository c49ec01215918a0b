//! # Command Registry and Built-in Commands
//!
//! Commands are plain values: a name, a category label and up to three
//! function pointers (run, help, complete). The registry maps names to
//! entries, is filled once at startup and is read-only afterwards.
//!
//! ## Built-in Commands
//!
//! | Command                        | Description                                |
//! |--------------------------------|--------------------------------------------|
//! | `help [command]`               | List commands, or show one command's help  |
//! | `history [clean \| <file>]`    | Print, clear, or export the history        |
//! | `shell <cmd>` / `!<cmd>`       | Run a command line in a subprocess         |
//! | `quit` / `exit` / `EOF`        | Leave the interpreter                      |
//!
//! ## Results
//!
//! A handler returns a [`CommandResult`]:
//! - Output: Text to display to the user
//! - Exit: Signal to terminate the loop
//! - Continue: Nothing to display
//! - Error: Error message to display
//!
//! ## Aliases
//!
//! An alias is a second entry sharing the run/help/complete functions of
//! another one under a different name (see [`CommandEntry::alias`]).

use crate::cli::completion::{CandidateSet, CompletionRequest};
use crate::cli::history::HistoryStore;
use crate::cli::path::{list_completion, path_completion};
use crate::cli::preprocess::split_args;
use crate::cli::render::{columnize, terminal_width};
use crate::config::{HELP_SHORTHAND, PATH_SEPARATOR, SHELL_COMMAND, SHELL_SHORTHAND};
use crate::error::ReplError;
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

pub const BUILTIN_CATEGORY: &str = "Interpreter";
pub const DEFAULT_CATEGORY: &str = "Commands";

#[derive(Debug, PartialEq)]
pub enum CommandResult {
    Output(String),
    Exit,
    Continue,
    Error(String),
}

/// Mutable state a handler may touch while it runs.
pub struct Session<'a> {
    pub registry: &'a CommandRegistry,
    pub history: &'a mut HistoryStore,
}

pub type RunFn = fn(&mut Session<'_>, &str) -> CommandResult;
pub type HelpFn = fn() -> String;
pub type CompleteFn = fn(&CompletionRequest<'_>) -> CandidateSet;

#[derive(Clone)]
pub struct CommandEntry {
    name: String,
    category: String,
    run: RunFn,
    help: Option<HelpFn>,
    complete: Option<CompleteFn>,
}

impl CommandEntry {
    pub fn new(name: impl Into<String>, run: RunFn) -> Self {
        Self {
            name: name.into(),
            category: DEFAULT_CATEGORY.to_string(),
            run,
            help: None,
            complete: None,
        }
    }

    pub fn with_help(mut self, help: HelpFn) -> Self {
        self.help = Some(help);
        self
    }

    pub fn with_completer(mut self, complete: CompleteFn) -> Self {
        self.complete = Some(complete);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn alias(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn run(&self, session: &mut Session<'_>, args: &str) -> CommandResult {
        (self.run)(session, args)
    }

    pub fn help(&self) -> Option<String> {
        self.help.map(|help| help())
    }

    pub fn completer(&self) -> Option<CompleteFn> {
        self.complete
    }
}

impl std::fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandEntry")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("help", &self.help.is_some())
            .field("complete", &self.complete.is_some())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct CommandRegistry {
    entries: Vec<CommandEntry>,
    index: HashMap<String, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Result<Self, ReplError> {
        let mut registry = Self::new();
        register_builtins(&mut registry)?;
        Ok(registry)
    }

    pub fn register(&mut self, entry: CommandEntry) -> Result<(), ReplError> {
        if self.index.contains_key(entry.name()) {
            return Err(ReplError::DuplicateCommand(entry.name().to_string()));
        }
        self.index.insert(entry.name().to_string(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.index.get(name).map(|&idx| &self.entries[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Entries in registration order.
    pub fn entries(&self) -> &[CommandEntry] {
        &self.entries
    }

    /// Command names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.iter().map(|e| e.name()).collect();
        names.sort_unstable();
        names
    }
}

/// Splits a normalized line into its command name and argument text.
/// A leading `?` stands for `help` and a leading `!` for `shell`; otherwise
/// the name is the leading run of identifier characters.
pub fn parse_command(line: &str) -> (&str, &str) {
    let line = line.trim();

    if let Some(rest) = line.strip_prefix(HELP_SHORTHAND) {
        return ("help", rest.trim_start());
    }
    if let Some(rest) = line.strip_prefix(SHELL_SHORTHAND) {
        return (SHELL_COMMAND, rest.trim_start());
    }

    let end = line
        .char_indices()
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
        .map_or(line.len(), |(idx, _)| idx);

    (&line[..end], line[end..].trim_start())
}

pub fn register_builtins(registry: &mut CommandRegistry) -> Result<(), ReplError> {
    let quit = CommandEntry::new("quit", do_quit)
        .with_help(help_quit)
        .with_category(BUILTIN_CATEGORY);

    registry.register(
        CommandEntry::new("help", do_help)
            .with_help(help_help)
            .with_completer(complete_help)
            .with_category(BUILTIN_CATEGORY),
    )?;
    registry.register(
        CommandEntry::new("history", do_history)
            .with_help(help_history)
            .with_completer(complete_history)
            .with_category(BUILTIN_CATEGORY),
    )?;
    registry.register(
        CommandEntry::new("shell", do_shell)
            .with_help(help_shell)
            .with_completer(complete_shell)
            .with_category(BUILTIN_CATEGORY),
    )?;
    registry.register(quit.alias("exit"))?;
    registry.register(quit.alias("EOF"))?;
    registry.register(quit)?;

    Ok(())
}

fn do_quit(_session: &mut Session<'_>, _args: &str) -> CommandResult {
    CommandResult::Exit
}

fn help_quit() -> String {
    "   Syntax: quit (or exit, or Ctrl+D)\n   Exits the program.".to_string()
}

fn do_help(session: &mut Session<'_>, args: &str) -> CommandResult {
    let args = split_args(args);

    match args.first() {
        None => {
            let names = session.registry.names();
            let mut text = String::from("Available commands (type help <command>):\n");
            text.push_str(&"=".repeat(text.len() - 1));
            text.push('\n');
            text.push_str(&columnize(&names, terminal_width()));
            CommandResult::Output(text.trim_end().to_string())
        }
        Some(name) => match session.registry.get(name) {
            Some(entry) => match entry.help() {
                Some(text) => CommandResult::Output(text),
                None => CommandResult::Error(format!("No help available for '{}'.", name)),
            },
            None => CommandResult::Error(format!(
                "Unknown command '{}'. Type help for available commands.",
                name
            )),
        },
    }
}

fn help_help() -> String {
    "   Syntax: help [<command>]\n   \
     Display the list of all available commands.\n   \
     If a command is passed as an argument, its manual is displayed to the screen."
        .to_string()
}

fn complete_help(request: &CompletionRequest<'_>) -> CandidateSet {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();

    for entry in request.registry.entries() {
        if !entry.name().starts_with(request.text) {
            continue;
        }
        match groups.iter_mut().find(|(label, _)| label == entry.category()) {
            Some((_, names)) => names.push(entry.name().to_string()),
            None => groups.push((entry.category().to_string(), vec![entry.name().to_string()])),
        }
    }

    CandidateSet::Categorized(groups)
}

fn do_history(session: &mut Session<'_>, args: &str) -> CommandResult {
    let args = split_args(args);

    match args.as_slice() {
        [] if session.history.is_empty() => CommandResult::Continue,
        [] => CommandResult::Output(session.history.entries().join("\n")),
        [option] if option == "clean" => {
            session.history.clear();
            CommandResult::Output("History is cleaned".to_string())
        }
        [file] => match session.history.write_to(Path::new(file)) {
            Ok(()) => CommandResult::Output(format!(
                "Command history written to the file {}.",
                file
            )),
            Err(err) => CommandResult::Error(err.to_string()),
        },
        _ => CommandResult::Error("'history' takes either zero or one argument".to_string()),
    }
}

fn help_history() -> String {
    "   Syntax: history [clean | <filename>]\n   \
     Displays the history of the commands typed in by the user.\n   \
     The option \"clean\" removes all entries from the history.\n   \
     A filename writes the history to that file, which must not exist yet."
        .to_string()
}

fn complete_history(request: &CompletionRequest<'_>) -> CandidateSet {
    CandidateSet::Flat(list_completion(request.text, &["clean"]))
}

fn do_shell(_session: &mut Session<'_>, args: &str) -> CommandResult {
    let command_line = args.trim();
    if command_line.is_empty() {
        return CommandResult::Output(help_shell());
    }

    info!("Running the shell command: {}.", command_line);
    match shell_command(command_line).status() {
        Ok(status) => {
            debug!("shell command finished with {}", status);
            CommandResult::Continue
        }
        Err(err) => CommandResult::Error(ReplError::ShellSpawn(err).to_string()),
    }
}

#[cfg(unix)]
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(command_line);
    command
}

#[cfg(not(unix))]
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(command_line);
    command
}

fn help_shell() -> String {
    "   Syntax: shell <command> (or !<command>)\n   \
     Runs the command on a shell and retrieves the output."
        .to_string()
}

/// Completes path arguments. When the cursor sits right after a `/` that
/// ends a previous argument, that argument is the directory listed.
pub fn complete_path_argument(request: &CompletionRequest<'_>) -> CandidateSet {
    let before = request.line.get(..request.begidx).unwrap_or("");
    let previous = split_args(before);

    let candidates = if previous.len() > 1 && before.ends_with(PATH_SEPARATOR) {
        let base_dir = previous.last().map(String::as_str).unwrap_or("");
        path_completion(request.text, Some(Path::new(base_dir)), false, true)
    } else {
        path_completion(request.text, None, false, true)
    };

    CandidateSet::Flat(candidates)
}

fn complete_shell(request: &CompletionRequest<'_>) -> CandidateSet {
    complete_path_argument(request)
}
