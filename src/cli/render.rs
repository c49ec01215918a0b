//! # Suggestion Rendering
//!
//! Lays out completion candidates for display below the prompt.
//!
//! ## Output Format
//!
//! A single candidate is emitted inline. Several candidates start on a
//! new line and fill as many fixed-width columns as the terminal allows:
//!
//! ```text
//! EOF      exit     help     history
//! quit     shell
//! ```
//!
//! Candidate lists carrying category markers are grouped, each group
//! preceded by a blank line and an underlined heading:
//!
//! ```text
//!
//!  Interpreter:
//! =============
//! help     history
//!
//!  Commands:
//! ==========
//! hello
//! ```
//!
//! ## Column Width Calculation
//!
//! Every cell is as wide as the longest candidate (including the typed
//! prefix put back in front of it) plus one space. The number of columns
//! is the terminal width divided by the cell width, never less than one.
//!
//! Redrawing the prompt and the in-progress buffer afterwards is left to
//! the line editor.

use crate::cli::completion::category_label;
use crate::config::DEFAULT_TERMINAL_WIDTH;
use std::env;
use std::fmt::Write;

pub struct SuggestionFormatter<'a> {
    matches: &'a [String],
    prefix: &'a str,
    cell_width: usize,
    columns: usize,
}

impl<'a> SuggestionFormatter<'a> {
    pub fn new(matches: &'a [String], prefix: &'a str, terminal_width: usize) -> Self {
        let prefix_width = prefix.chars().count();
        let longest = matches
            .iter()
            .filter(|m| category_label(m).is_none())
            .map(|m| prefix_width + m.chars().count())
            .max()
            .unwrap_or(0);
        let cell_width = longest + 1;

        Self {
            matches,
            prefix,
            cell_width,
            columns: (terminal_width / cell_width).max(1),
        }
    }

    pub fn render(&self) -> String {
        match self.matches {
            [] => String::new(),
            [single] => single.clone(),
            _ if self.matches.iter().any(|m| category_label(m).is_some()) => {
                self.render_categorized()
            }
            _ => {
                let mut output = String::from("\n");
                self.write_grid(&mut output, self.matches.iter());
                output
            }
        }
    }

    fn render_categorized(&self) -> String {
        let mut output = String::from("\n");
        let mut group: Vec<&String> = Vec::new();

        for candidate in self.matches {
            match category_label(candidate) {
                Some(label) => {
                    self.write_grid(&mut output, group.drain(..));
                    let _ = write!(output, "\n {}:\n{}\n", label, "=".repeat(label.chars().count() + 2));
                }
                None => group.push(candidate),
            }
        }
        self.write_grid(&mut output, group.drain(..));

        output
    }

    fn write_grid<'b>(&self, output: &mut String, cells: impl Iterator<Item = &'b String>) {
        let mut written = 0;
        for cell in cells {
            if written > 0 && written % self.columns == 0 {
                output.push('\n');
            }
            let _ = write!(
                output,
                "{:<width$}",
                format!("{}{}", self.prefix, cell),
                width = self.cell_width
            );
            written += 1;
        }
        if written > 0 {
            output.push('\n');
        }
    }
}

/// Lays out `items` in terminal-width columns, one row per line.
pub fn columnize<S: AsRef<str>>(items: &[S], terminal_width: usize) -> String {
    let owned: Vec<String> = items.iter().map(|item| item.as_ref().to_string()).collect();
    let formatter = SuggestionFormatter::new(&owned, "", terminal_width);

    let mut output = String::new();
    formatter.write_grid(&mut output, owned.iter());
    output
}

pub fn terminal_width() -> usize {
    if let Ok((columns, _)) = crossterm::terminal::size() {
        if columns > 0 {
            return columns as usize;
        }
    }

    env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|&columns| columns > 0)
        .unwrap_or(DEFAULT_TERMINAL_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn nothing_to_render() {
        assert_eq!(SuggestionFormatter::new(&[], "", 80).render(), "");
    }

    #[test]
    fn single_candidate_is_inline() {
        let matches = strings(&["help "]);
        assert_eq!(SuggestionFormatter::new(&matches, "", 80).render(), "help ");
    }

    #[test]
    fn candidates_wrap_into_columns() {
        let matches = strings(&["aa ", "bb ", "cc "]);
        let rendered = SuggestionFormatter::new(&matches, "", 8).render();

        assert_eq!(rendered, "\naa  bb  \ncc  \n");
    }

    #[test]
    fn narrow_terminal_still_gets_one_column() {
        let matches = strings(&["history ", "shell "]);
        let rendered = SuggestionFormatter::new(&matches, "", 3).render();

        assert_eq!(rendered, "\nhistory  \nshell    \n");
    }

    #[test]
    fn typed_prefix_is_put_back() {
        let matches = strings(&["mass ", "width "]);
        let rendered = SuggestionFormatter::new(&matches, "--with-", 80).render();

        assert!(rendered.contains("--with-mass"));
        assert!(rendered.contains("--with-width"));
    }

    #[test]
    fn categories_get_underlined_headings() {
        let matches = strings(&["@@Interpreter@@", "help ", "@@Commands@@", "hello "]);
        let rendered = SuggestionFormatter::new(&matches, "", 80).render();

        assert_eq!(
            rendered,
            "\n\n Interpreter:\n=============\nhelp   \n\n Commands:\n==========\nhello  \n"
        );
    }

    #[test]
    fn category_labels_restore_spaces() {
        let matches = strings(&["@@Model_parameters@@", "mw ", "mz ", "@@Blocks@@", "sminputs "]);
        let rendered = SuggestionFormatter::new(&matches, "", 80).render();

        assert!(rendered.contains(" Model parameters:\n"));
        assert!(rendered.contains(&"=".repeat("Model parameters".len() + 2)));
    }

    #[test]
    fn columnize_lays_out_plain_names() {
        assert_eq!(columnize(&["quit", "exit"], 80), "quit exit \n");
    }
}
