use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};

use crate::run::{RunOutcome, RunStatus};

/// The result of a finished sweep, one outcome per seed in launch order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub experiment: String,
    pub num_loc: usize,
    pub outcomes: Vec<RunOutcome>,
}

impl SweepReport {
    pub fn succeeded(&self) -> usize {
        self.count(|status| matches!(status, RunStatus::Succeeded))
    }

    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, RunStatus::Failed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|status| matches!(status, RunStatus::Skipped))
    }

    pub fn cancelled(&self) -> usize {
        self.count(|status| matches!(status, RunStatus::Cancelled))
    }

    /// Whether every seed ran to a successful end.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.status.is_success())
    }

    /// Writes the report as pretty-printed JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, json)
    }

    fn count(&self, pred: impl Fn(RunStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o.status)).count()
    }
}
