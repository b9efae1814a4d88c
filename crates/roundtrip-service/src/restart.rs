//! External command that restarts the conversion service.

use std::process::Command;

use tracing::info;

use crate::error::{Result, ServiceError};

/// A restart command line such as `docker restart xsugar`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartCommand {
    program: String,
    args: Vec<String>,
}

impl RestartCommand {
    /// Build from an argv-style list. Returns `None` for an empty list.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the command to completion.
    pub fn run(&self) -> Result<()> {
        info!(command = %self.display(), "restarting conversion service");
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| ServiceError::Restart {
                command: self.display(),
                details: e.to_string(),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ServiceError::Restart {
                command: self.display(),
                details: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            })
        }
    }
}
