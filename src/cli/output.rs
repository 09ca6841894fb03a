//! Terminal output.
//!
//! stdout carries nothing but `export` lines so it can be `eval`ed; all
//! diagnostics go to stderr (red / cyan, respects NO_COLOR).

use std::io::{self, Write};

use console::style;

use crate::core::batch::SecretEntry;

/// Check if color output is disabled via NO_COLOR env var.
fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Print an error message to stderr (red).
///
/// Example: `✗ DB: authentication failed`
pub fn error(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("✗").red(), msg);
    } else {
        eprintln!("✗ {}", msg);
    }
}

/// Print a hint message to stderr (cyan).
///
/// Example: `→ check AWS credentials and KMS key permissions`
pub fn hint(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("→").cyan(), style(msg).cyan());
    } else {
        eprintln!("→ {}", msg);
    }
}

/// Quote `value` for the inside of a double-quoted shell string.
fn shell_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `export NAME="VALUE"`
pub fn export_line(name: &str, value: &str) -> String {
    format!("export {}=\"{}\"", name, shell_escape(value))
}

/// Write one export line per entry, skipping entries without a name.
pub fn write_exports<W: Write>(out: &mut W, entries: &[SecretEntry]) -> io::Result<()> {
    for entry in entries.iter().filter(|e| !e.name.is_empty()) {
        writeln!(out, "{}", export_line(&entry.name, &entry.value))?;
    }
    out.flush()
}

/// Print export lines to stdout.
pub fn print_exports(entries: &[SecretEntry]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    write_exports(&mut lock, entries)
}
