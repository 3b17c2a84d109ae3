//! Command implementations

pub mod doctor;
pub mod fetch;
pub mod generate;
pub mod verify;

use std::io::{self, IsTerminal, Write};

/// Ask a yes/no question on the terminal; non-interactive stdin answers no.
pub(crate) fn confirm(question: &str) -> bool {
    if !io::stdin().is_terminal() {
        return false;
    }
    eprint!("{} [y/N]: ", question);
    let _ = io::stderr().flush();

    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Prompt for one line of input; non-interactive stdin yields `None`.
pub(crate) fn prompt_line(question: &str) -> Option<String> {
    if !io::stdin().is_terminal() {
        return None;
    }
    eprint!("{}: ", question);
    let _ = io::stderr().flush();

    let mut line = String::new();
    io::stdin().read_line(&mut line).ok()?;
    let trimmed = line.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
