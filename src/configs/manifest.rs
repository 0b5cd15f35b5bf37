use std::{collections::BTreeMap, fs, num::NonZeroUsize, path::Path};

use serde::{Deserialize, Serialize};

use super::{Experiment, FailurePolicy, SweepConfig};
use crate::error::{Result, SweepError};

/// A sweep described in a JSON file. Missing fields keep their defaults.
///
/// ```json
/// {
///   "experiment": "am-ppo",
///   "num_loc": 100,
///   "seeds": [1, 2, 3],
///   "logger": { "project": "routing", "tags": ["tsp"] },
///   "env_overrides": { "WANDB_MODE": "offline" }
/// }
/// ```
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepManifest {
    pub experiment: Option<String>,
    pub num_loc: Option<usize>,
    pub seeds: Option<Vec<u64>>,
    pub train_data_size: Option<NonZeroUsize>,
    pub batch_size: Option<NonZeroUsize>,
    pub max_epochs: Option<NonZeroUsize>,
    pub device: Option<String>,
    #[serde(default)]
    pub logger: LoggerManifest,
    #[serde(default)]
    pub entry_point: EntryPointManifest,
    #[serde(default)]
    pub env_overrides: BTreeMap<String, String>,
    pub failure_policy: Option<FailurePolicy>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggerManifest {
    pub project: Option<String>,
    pub tags: Option<Vec<String>>,
    pub name_prefix: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryPointManifest {
    pub program: Option<String>,
    pub args: Option<Vec<String>>,
}

impl SweepManifest {
    /// Reads a manifest from a JSON file.
    ///
    /// # Errors
    /// Returns `SweepError::Manifest` if the file can't be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let manifest_err = |msg: String| SweepError::Manifest {
            path: path.to_path_buf(),
            msg,
        };

        let content =
            fs::read_to_string(path).map_err(|e| manifest_err(format!("cannot read: {e}")))?;
        serde_json::from_str(&content).map_err(|e| manifest_err(format!("invalid JSON: {e}")))
    }

    /// Applies the manifest on top of the default sweep.
    ///
    /// # Errors
    /// Returns `SweepError::UnknownExperiment` if the experiment isn't known.
    pub fn into_config(self) -> Result<SweepConfig> {
        let mut cfg = SweepConfig::default();

        if let Some(experiment) = self.experiment {
            cfg.experiment = experiment.parse::<Experiment>()?;
        }
        if let Some(num_loc) = self.num_loc {
            cfg.num_loc = num_loc;
        }
        if let Some(seeds) = self.seeds {
            cfg.seeds = seeds;
        }
        if let Some(size) = self.train_data_size {
            cfg.train_data_size = size;
        }
        if let Some(size) = self.batch_size {
            cfg.batch_size = size;
        }
        if let Some(epochs) = self.max_epochs {
            cfg.max_epochs = epochs;
        }
        if let Some(device) = self.device {
            cfg.device = device;
        }
        if let Some(policy) = self.failure_policy {
            cfg.failure_policy = policy;
        }

        let LoggerManifest {
            project,
            tags,
            name_prefix,
        } = self.logger;
        if let Some(project) = project {
            cfg.logger.project = project;
        }
        if let Some(tags) = tags {
            cfg.logger.tags = tags;
        }
        cfg.logger.name_prefix = name_prefix;

        if let Some(program) = self.entry_point.program {
            cfg.entry_point.program = program;
        }
        if let Some(args) = self.entry_point.args {
            cfg.entry_point.args = args;
        }

        cfg.env_overrides = self.env_overrides;
        Ok(cfg)
    }
}
