//! Clipboard backed by external commands.

use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

use fb_02_request_dispatch::{Clipboard, ClipboardError};
use tracing::debug;

/// One clipboard program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardCommand {
    /// Executable name, looked up on `PATH`.
    pub program: String,
    /// Arguments.
    pub args: Vec<String>,
}

impl ClipboardCommand {
    /// Build a command.
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Pipes text into the first clipboard program found on the host.
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    candidates: Vec<ClipboardCommand>,
}

impl CommandClipboard {
    /// `wl-copy`, then `xclip -selection clipboard`, then `pbcopy`.
    pub fn new() -> Self {
        Self::with_commands(vec![
            ClipboardCommand::new("wl-copy", &[]),
            ClipboardCommand::new("xclip", &["-selection", "clipboard"]),
            ClipboardCommand::new("pbcopy", &[]),
        ])
    }

    /// Use an explicit candidate list.
    pub fn with_commands(candidates: Vec<ClipboardCommand>) -> Self {
        Self { candidates }
    }

    /// `Ok(false)` when the program is not installed.
    fn run(command: &ClipboardCommand, text: &str) -> Result<bool, ClipboardError> {
        let spawned = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => {
                return Err(ClipboardError::WriteFailed(format!(
                    "{}: {e}",
                    command.program
                )))
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(text.as_bytes()) {
                drop(stdin);
                // Reap the child before reporting.
                let _ = child.kill();
                let _ = child.wait();
                return Err(ClipboardError::WriteFailed(format!(
                    "{}: {e}",
                    command.program
                )));
            }
        }

        let status = child
            .wait()
            .map_err(|e| ClipboardError::WriteFailed(format!("{}: {e}", command.program)))?;
        if status.success() {
            Ok(true)
        } else {
            Err(ClipboardError::WriteFailed(format!(
                "{} exited with {status}",
                command.program
            )))
        }
    }
}

impl Default for CommandClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard for CommandClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        for command in &self.candidates {
            if Self::run(command, text)? {
                debug!(program = %command.program, bytes = text.len(), "Clipboard written");
                return Ok(());
            }
            debug!(program = %command.program, "Clipboard program not found");
        }
        Err(ClipboardError::Unavailable(
            self.candidates
                .iter()
                .map(|c| c.program.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        ))
    }
}
