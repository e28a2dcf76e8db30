//! Terminal front end: the alert, notification and confirmation surface.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use bookstore_storefront::notify::{NotificationKind, Notifier};

/// Notifier that prints to the terminal and asks y/N on stdin.
#[derive(Debug, Default)]
pub struct TerminalNotifier {
    assume_yes: AtomicBool,
}

impl TerminalNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every confirmation with yes until reset.
    pub fn set_assume_yes(&self, yes: bool) {
        self.assume_yes.store(yes, Ordering::Relaxed);
    }
}

impl Notifier for TerminalNotifier {
    fn alert(&self, message: &str) {
        println!("{message}");
    }

    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Error | NotificationKind::Warning => eprintln!("[{kind}] {message}"),
            NotificationKind::Success | NotificationKind::Info => println!("[{kind}] {message}"),
        }
    }

    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes.load(Ordering::Relaxed) {
            println!("{prompt} [y/N]: y");
            return true;
        }

        match ask(prompt, &mut io::stdin().lock(), &mut io::stdout()) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "Confirmation prompt failed");
                false
            }
        }
    }
}

/// Print a rendered view.
pub fn print_view(view: &str) {
    println!("{}", view.trim_end());
}

/// Print an error line to stderr.
pub fn print_error(message: &str) {
    eprintln!("error: {message}");
}

/// Write a y/N question and read the answer.
fn ask(prompt: &str, input: &mut impl BufRead, output: &mut impl Write) -> io::Result<bool> {
    write!(output, "{prompt} [y/N]: ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
