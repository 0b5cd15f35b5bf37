use std::{collections::BTreeMap, num::NonZeroUsize};

use serde::{Deserialize, Serialize};

use super::Experiment;

/// Environment variable that selects the training device of each run.
pub const DEVICE_ENV: &str = "CUDA_VISIBLE_DEVICES";

/// Where and how runs report to the experiment tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    pub project: String,
    pub tags: Vec<String>,
    pub name_prefix: Option<String>,
}

impl LoggerConfig {
    /// Builds the tracker run name for one seed, e.g. `am-50-s1234`.
    pub fn run_name(&self, experiment: Experiment, num_loc: usize, seed: u64) -> String {
        let prefix = self.name_prefix.as_deref().unwrap_or(experiment.name());
        format!("{prefix}-{num_loc}-s{seed}")
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            project: "rl4co".to_string(),
            tags: Vec::new(),
            name_prefix: None,
        }
    }
}

/// The external training program and its leading arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for EntryPoint {
    fn default() -> Self {
        Self {
            program: "python".to_string(),
            args: vec!["run.py".to_string()],
        }
    }
}

/// What the session does once a seed fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failing seed and skip the rest.
    #[default]
    FailFast,
    /// Run every seed regardless of earlier failures.
    Continue,
}

/// A training configuration re-run once per seed.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub experiment: Experiment,
    pub num_loc: usize,
    pub seeds: Vec<u64>,
    pub train_data_size: NonZeroUsize,
    pub batch_size: NonZeroUsize,
    pub max_epochs: NonZeroUsize,
    pub logger: LoggerConfig,
    pub device: String,
    pub entry_point: EntryPoint,
    pub env_overrides: BTreeMap<String, String>,
    pub failure_policy: FailurePolicy,
}

impl SweepConfig {
    pub const DEFAULT_SEEDS: [u64; 3] = [1234, 1235, 1236];
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            experiment: Experiment::Am,
            num_loc: 50,
            seeds: Self::DEFAULT_SEEDS.to_vec(),
            train_data_size: NonZeroUsize::new(1_280_000).unwrap_or(NonZeroUsize::MIN),
            batch_size: NonZeroUsize::new(512).unwrap_or(NonZeroUsize::MIN),
            max_epochs: NonZeroUsize::new(100).unwrap_or(NonZeroUsize::MIN),
            logger: LoggerConfig::default(),
            device: "0".to_string(),
            entry_point: EntryPoint::default(),
            env_overrides: BTreeMap::new(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_name_defaults_to_experiment_name() {
        let logger = LoggerConfig::default();
        assert_eq!(logger.run_name(Experiment::Am, 50, 1234), "am-50-s1234");
    }

    #[test]
    fn run_name_uses_prefix_when_set() {
        let logger = LoggerConfig {
            name_prefix: Some("baseline".into()),
            ..Default::default()
        };
        assert_eq!(
            logger.run_name(Experiment::SymNco, 100, 7),
            "baseline-100-s7"
        );
    }

    #[test]
    fn default_sweep_is_consistent() {
        let cfg = SweepConfig::default();
        assert_eq!(cfg.seeds, vec![1234, 1235, 1236]);
        assert!(cfg.batch_size <= cfg.train_data_size);
        assert_eq!(cfg.failure_policy, FailurePolicy::FailFast);
    }
}
