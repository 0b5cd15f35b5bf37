use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tokio::process::Command;

/// A fully expanded invocation of the entry point for a single seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSpec {
    pub seed: u64,
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl RunSpec {
    /// Renders the invocation the way it would be typed in a shell.
    ///
    /// # Returns
    /// `KEY=VAL ... program arg ...` with unsafe words single-quoted.
    pub fn command_line(&self) -> String {
        let env = self
            .env
            .iter()
            .map(|(key, val)| format!("{key}={}", shell_quote(val)));

        let cmd = std::iter::once(shell_quote(&self.program))
            .chain(self.args.iter().map(|arg| shell_quote(arg)));

        env.chain(cmd).collect::<Vec<_>>().join(" ")
    }

    /// Builds the process for this run.
    ///
    /// The child is killed if its handle is dropped before it exits.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).envs(&self.env).kill_on_drop(true);
        cmd
    }
}

fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | '=' | ':' | ',' | '+')
        });

    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// How a single run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Succeeded,
    /// The process exited unsuccessfully; `code` is `None` when killed by a signal.
    Failed { code: Option<i32> },
    /// Never launched because the sweep stopped earlier.
    Skipped,
    /// Interrupted while running.
    Cancelled,
}

impl RunStatus {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// The record of one seed in a finished sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub seed: u64,
    pub command_line: String,
    #[serde(flatten)]
    pub status: RunStatus,
    pub elapsed_ms: u64,
}
