//! Interactive shell: many commands against one open page.
//!
//! Input is read with `rustyline`, so lines can be edited and recalled; the
//! history is kept in the profile directory. Lines are split with shell
//! quoting rules and parsed with the same grammar as the command line, so
//! `add 3` in the shell is `bookstore add 3`.

use std::path::Path;

use bookstore_storefront::Storefront;
use clap::Parser;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, warn};

use super::CliError;
use crate::terminal::{self, TerminalNotifier};
use crate::{Cli, Commands};

const PROMPT: &str = "bookstore> ";
const HISTORY_FILE: &str = "shell_history.txt";

/// What the shell should do with one input line.
#[derive(Debug)]
enum Line {
    Empty,
    Exit,
    Command(Box<Commands>),
    Invalid(String),
}

/// Read-eval loop until `exit`, `quit`, Ctrl-C or end of input.
pub async fn run(
    page: &mut Storefront,
    notifier: &TerminalNotifier,
    profile_dir: &Path,
) -> Result<(), CliError> {
    let mut editor = DefaultEditor::new()?;
    let history = profile_dir.join(HISTORY_FILE);
    if let Err(e) = editor.load_history(&history) {
        debug!(error = %e, "No shell history loaded");
    }

    terminal::print_view(&page.render_nav()?);

    while let Some(input) = next_line(editor.readline(PROMPT))? {
        let input = input.trim();
        if !input.is_empty() {
            editor.add_history_entry(input)?;
        }

        match parse_line(input) {
            Line::Empty => {}
            Line::Exit => break,
            Line::Invalid(message) => terminal::print_view(&message),
            Line::Command(command) => {
                if let Err(e) = super::dispatch(page, notifier, *command).await {
                    e.report();
                }
            }
        }
    }

    if let Err(e) = editor.save_history(&history) {
        warn!(error = %e, "Failed to save shell history");
    }
    Ok(())
}

/// `None` once the user ends the session with Ctrl-C or Ctrl-D.
fn next_line(read: Result<String, ReadlineError>) -> Result<Option<String>, CliError> {
    match read {
        Ok(line) => Ok(Some(line)),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_line(input: &str) -> Line {
    let words = match shell_words::split(input) {
        Ok(words) => words,
        Err(e) => return Line::Invalid(format!("error: {e}")),
    };

    match words.first().map(String::as_str) {
        None => Line::Empty,
        Some("exit" | "quit") => Line::Exit,
        Some(_) => {
            let argv = std::iter::once("bookstore".to_string()).chain(words);
            match Cli::try_parse_from(argv) {
                Ok(cli) => Line::Command(Box::new(cli.command)),
                Err(e) => Line::Invalid(e.render().to_string()),
            }
        }
    }
}
