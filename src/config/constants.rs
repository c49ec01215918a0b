//! # ruleshell Configuration Constants
//!
//! Every tunable of the interpreter lives here. Constants that depend on
//! each other are co-located so they cannot drift apart.
//!
//! ## Dependency Graph
//!
//! ```text
//! COMPLETION_WORD_BREAKS (readline-compatible delimiters)
//!       │
//!       ├─> must contain ' ' and '\\'
//!       │     The escaped-space correction in the completion engine relies
//!       │     on both characters ending a completion word.
//!       │
//!       └─> must contain '-'
//!             The hyphen correction relies on '-' ending a completion word.
//!
//! TOKEN_COMPLETE_DELIMITERS (' ', '@', '=', '/')
//!       │
//!       └─> must contain the last character of CATEGORY_MARKER
//!             Category markers are never suffixed with a space.
//!
//! HISTORY_MAX_ENTRIES (100)
//!       └─> applied on save only, never on append
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use crate::config::{HISTORY_MAX_ENTRIES, PRIMARY_PROMPT};
//! ```

// ============================================================================
// PROMPTS
// ============================================================================

/// Prompt shown when no continuation line is pending.
pub const PRIMARY_PROMPT: &str = "ruleshell> ";

/// Prompt shown while a line ending in the continuation marker is pending.
pub const CONTINUATION_PROMPT: &str = "        -> ";

// ============================================================================
// HISTORY
// ============================================================================

/// Maximum number of history entries written by a save.
pub const HISTORY_MAX_ENTRIES: usize = 100;

/// File name of the persisted history, relative to the working directory.
pub const HISTORY_FILE_NAME: &str = ".ruleshell_history";

/// Environment variable overriding the history file location.
/// An empty value disables persistence.
pub const HISTORY_ENV_VAR: &str = "RULESHELL_HISTORY";

/// Lines starting with any of these prefixes are never recorded.
pub const HISTORY_EXCLUDED_PREFIXES: &[&str] = &["history", "#", "help"];

const _: () = assert!(HISTORY_MAX_ENTRIES > 0, "history cap must keep at least one entry");

// ============================================================================
// LINE PREPROCESSING
// ============================================================================

/// Trailing character that joins a line with the next one.
pub const CONTINUATION_MARKER: char = '\\';

/// Starts a comment when found outside a quoted span.
pub const COMMENT_CHAR: char = '#';

/// Statement separator.
pub const STATEMENT_SEPARATOR: char = ';';

/// Characters padded with a space on both sides before dispatch.
pub const OPERATOR_CHARS: &[char] = &['(', ')', '[', ']', '&', '|', '^', '!', '=', '>', '<', ','];

/// Command whose arguments bypass operator spacing and statement splitting.
pub const SHELL_COMMAND: &str = "shell";

/// Single-character shorthand for [`SHELL_COMMAND`].
pub const SHELL_SHORTHAND: char = '!';

/// Single-character shorthand for `help`.
pub const HELP_SHORTHAND: char = '?';

// ============================================================================
// COMPLETION
// ============================================================================

/// Characters that end a completion word, matching the delimiter set the
/// readline bindings use by default.
pub const COMPLETION_WORD_BREAKS: &str = " \t\n`~!@#$%^&*()-=+[{]}\\|;:'\",<>/?";

/// A candidate ending in one of these is already a complete token and is
/// not suffixed with a space.
pub const TOKEN_COMPLETE_DELIMITERS: &[char] = &[' ', '@', '=', '/'];

/// Wraps a category label inside the flat candidate list.
pub const CATEGORY_MARKER: &str = "@@";

/// Filesystem path separator used by completion.
pub const PATH_SEPARATOR: char = '/';

/// Width used when the terminal size cannot be determined.
pub const DEFAULT_TERMINAL_WIDTH: usize = 80;

const fn str_contains(haystack: &str, needle: u8) -> bool {
    let bytes = haystack.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == needle {
            return true;
        }
        i += 1;
    }
    false
}

const _: () = assert!(
    str_contains(COMPLETION_WORD_BREAKS, b' ') && str_contains(COMPLETION_WORD_BREAKS, b'\\'),
    "escaped-space completion needs both ' ' and '\\\\' to break words"
);

const _: () = assert!(
    str_contains(COMPLETION_WORD_BREAKS, b'-'),
    "hyphen completion needs '-' to break words"
);

const _: () = assert!(
    str_contains(COMPLETION_WORD_BREAKS, b'/'),
    "path completion needs the path separator to break words"
);

const fn chars_contain(set: &[char], needle: char) -> bool {
    let mut i = 0;
    while i < set.len() {
        if set[i] == needle {
            return true;
        }
        i += 1;
    }
    false
}

const _: () = assert!(
    chars_contain(TOKEN_COMPLETE_DELIMITERS, '@')
        && CATEGORY_MARKER.as_bytes()[CATEGORY_MARKER.len() - 1] == b'@',
    "category markers must end in a token-complete delimiter"
);

const _: () = assert!(
    chars_contain(TOKEN_COMPLETE_DELIMITERS, PATH_SEPARATOR),
    "directory candidates must not get a trailing space"
);

const _: () = assert!(DEFAULT_TERMINAL_WIDTH >= 20, "fallback terminal width is unusably small");
