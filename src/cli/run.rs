//! Run command.
//!
//! Executes a command with the processed variables added to its environment
//! and relays its exit status.

use std::process::{Command, ExitStatus};

use tracing::debug;

use crate::core::batch::SecretEntry;
use crate::error::{Error, Result};

/// Run `command` with `entries` added to the inherited environment.
///
/// Returns the child's exit code. A child killed by a signal reports
/// `128 + signal`, as shells do.
pub fn run(command: &[String], entries: &[SecretEntry]) -> Result<i32> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| Error::Other("no command specified".to_string()))?;

    debug!(program = %program, vars = entries.len(), "running command");

    let status = Command::new(program)
        .args(args)
        .envs(
            entries
                .iter()
                .filter(|e| !e.name.is_empty())
                .map(|e| (e.name.as_str(), e.value.as_str())),
        )
        .status()
        .map_err(|source| Error::Spawn {
            command: program.clone(),
            source,
        })?;

    Ok(exit_code(status))
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
