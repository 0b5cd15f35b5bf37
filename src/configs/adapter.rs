use std::collections::{BTreeMap, HashSet};

use super::{DEVICE_ENV, SweepConfig};
use crate::{
    error::{Result, SweepError},
    run::RunSpec,
};

/// Turns a [`SweepConfig`] into the concrete runs of the sweep.
pub struct Adapter;

impl Adapter {
    pub fn new() -> Self {
        Self
    }

    /// Validates the sweep and expands it into one run per seed, in seed order.
    ///
    /// # Arguments
    /// * `sweep` - The sweep to expand.
    ///
    /// # Returns
    /// The runs to launch, or the first configuration problem found.
    pub fn adapt_config(&self, sweep: &SweepConfig) -> Result<Vec<RunSpec>> {
        self.validate(sweep)?;

        let size_overrides = sweep.experiment.size_overrides(sweep.num_loc)?;
        let env = self.adapt_env(sweep);

        let runs = sweep
            .seeds
            .iter()
            .map(|&seed| RunSpec {
                seed,
                program: sweep.entry_point.program.clone(),
                args: self.adapt_args(sweep, seed, &size_overrides),
                env: env.clone(),
            })
            .collect();

        Ok(runs)
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    fn validate(&self, sweep: &SweepConfig) -> Result<()> {
        if sweep.seeds.is_empty() {
            return Err(SweepError::InvalidConfig(
                "at least one seed is required".into(),
            ));
        }

        let mut seen = HashSet::with_capacity(sweep.seeds.len());
        if let Some(seed) = sweep.seeds.iter().find(|&&seed| !seen.insert(seed)) {
            return Err(SweepError::InvalidConfig(format!(
                "seed {seed} is listed more than once"
            )));
        }

        if sweep.num_loc < 2 {
            return Err(SweepError::InvalidConfig(format!(
                "num_loc ({}) must be at least 2",
                sweep.num_loc
            )));
        }

        if sweep.batch_size > sweep.train_data_size {
            return Err(SweepError::InvalidConfig(format!(
                "batch_size ({}) exceeds train_data_size ({})",
                sweep.batch_size, sweep.train_data_size
            )));
        }

        if sweep.device.trim().is_empty() {
            return Err(SweepError::InvalidConfig("device must not be empty".into()));
        }

        if sweep.entry_point.program.trim().is_empty() {
            return Err(SweepError::InvalidConfig(
                "entry point program must not be empty".into(),
            ));
        }

        for key in sweep.env_overrides.keys() {
            if key.is_empty() || key.contains('=') {
                return Err(SweepError::InvalidConfig(format!(
                    "invalid environment variable name: {key:?}"
                )));
            }
        }

        self.validate_no_nul(sweep)
    }

    /// Every string handed to the child process must be representable as a C string.
    fn validate_no_nul(&self, sweep: &SweepConfig) -> Result<()> {
        let logger = &sweep.logger;
        let forwarded = [
            ("device", sweep.device.as_str()),
            ("entry point program", sweep.entry_point.program.as_str()),
            ("logger project", logger.project.as_str()),
        ]
        .into_iter()
        .chain(logger.name_prefix.as_deref().map(|p| ("logger name prefix", p)))
        .chain(logger.tags.iter().map(|t| ("logger tag", t.as_str())))
        .chain(sweep.entry_point.args.iter().map(|a| ("entry point argument", a.as_str())))
        .chain(sweep.env_overrides.iter().flat_map(|(key, val)| {
            [
                ("environment variable name", key.as_str()),
                ("environment variable value", val.as_str()),
            ]
        }));

        for (what, value) in forwarded {
            if value.contains('\0') {
                return Err(SweepError::InvalidConfig(format!(
                    "{what} contains a NUL byte: {value:?}"
                )));
            }
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Adaptation
    // -------------------------------------------------------------------------

    fn adapt_env(&self, sweep: &SweepConfig) -> BTreeMap<String, String> {
        let mut env = sweep.env_overrides.clone();
        env.insert(DEVICE_ENV.to_string(), sweep.device.clone());
        env
    }

    fn adapt_args(&self, sweep: &SweepConfig, seed: u64, size_overrides: &[String]) -> Vec<String> {
        let mut args = sweep.entry_point.args.clone();

        args.extend([
            format!("experiment={}", sweep.experiment.config_path()),
            format!("env.num_loc={}", sweep.num_loc),
            format!("seed={seed}"),
            format!("data.train_data_size={}", sweep.train_data_size),
            format!("data.batch_size={}", sweep.batch_size),
            format!("trainer.max_epochs={}", sweep.max_epochs),
        ]);
        args.extend_from_slice(size_overrides);

        if sweep.experiment.logs_to_wandb() {
            args.extend(self.adapt_logger(sweep, seed));
        }

        args
    }

    fn adapt_logger(&self, sweep: &SweepConfig, seed: u64) -> Vec<String> {
        let logger = &sweep.logger;
        let mut args = vec![
            "logger=wandb".to_string(),
            format!("logger.wandb.project={}", logger.project),
            format!(
                "logger.wandb.name={}",
                logger.run_name(sweep.experiment, sweep.num_loc, seed)
            ),
        ];

        if !logger.tags.is_empty() {
            args.push(format!("logger.wandb.tags=[{}]", logger.tags.join(",")));
        }

        args
    }
}

impl Default for Adapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::configs::{EntryPoint, Experiment, LoggerConfig};

    fn sweep(experiment: Experiment, num_loc: usize) -> SweepConfig {
        SweepConfig {
            experiment,
            num_loc,
            ..Default::default()
        }
    }

    #[test]
    fn one_run_per_seed_in_order() {
        let cfg = SweepConfig {
            seeds: vec![9, 3, 5],
            ..sweep(Experiment::Pomo, 20)
        };
        let runs = Adapter::new().adapt_config(&cfg).unwrap();
        let seeds: Vec<_> = runs.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![9, 3, 5]);
        assert!(runs.iter().all(|r| r.args.contains(&format!("seed={}", r.seed))));
    }

    #[test]
    fn am_command_line_matches_template() {
        let cfg = SweepConfig {
            seeds: vec![1234],
            ..sweep(Experiment::Am, 50)
        };
        let runs = Adapter::new().adapt_config(&cfg).unwrap();
        assert_eq!(
            runs[0].command_line(),
            "CUDA_VISIBLE_DEVICES=0 python run.py experiment=routing/am env.num_loc=50 \
             seed=1234 data.train_data_size=1280000 data.batch_size=512 \
             trainer.max_epochs=100 logger=wandb logger.wandb.project=rl4co \
             logger.wandb.name=am-50-s1234"
        );
    }

    #[test]
    fn am_ppo_appends_size_overrides_before_logger() {
        let runs = Adapter::new()
            .adapt_config(&sweep(Experiment::AmPpo, 100))
            .unwrap();
        let args = &runs[0].args;
        let ppo = args.iter().position(|a| a == "model.ppo_epochs=2").unwrap();
        let logger = args.iter().position(|a| a == "logger=wandb").unwrap();
        assert!(ppo < logger);
    }

    #[test]
    fn am_ppo_rejects_unsupported_size() {
        let err = Adapter::new()
            .adapt_config(&sweep(Experiment::AmPpo, 75))
            .unwrap_err();
        assert!(matches!(
            err,
            SweepError::UnsupportedProblemSize {
                experiment: "am-ppo",
                num_loc: 75
            }
        ));
    }

    #[test]
    fn ptrnet_has_no_logger_args() {
        let runs = Adapter::new()
            .adapt_config(&sweep(Experiment::PtrNet, 20))
            .unwrap();
        assert!(runs[0].args.iter().all(|a| !a.starts_with("logger")));
    }

    #[test]
    fn tags_are_forwarded_as_list() {
        let cfg = SweepConfig {
            logger: LoggerConfig {
                tags: vec!["tsp".into(), "seeds".into()],
                ..Default::default()
            },
            ..sweep(Experiment::SymNco, 50)
        };
        let runs = Adapter::new().adapt_config(&cfg).unwrap();
        assert_eq!(runs[0].args.last().unwrap(), "logger.wandb.tags=[tsp,seeds]");
    }

    #[test]
    fn device_wins_over_env_overrides() {
        let cfg = SweepConfig {
            device: "2".into(),
            env_overrides: BTreeMap::from([
                (DEVICE_ENV.to_string(), "7".to_string()),
                ("WANDB_MODE".to_string(), "offline".to_string()),
            ]),
            ..Default::default()
        };
        let runs = Adapter::new().adapt_config(&cfg).unwrap();
        assert_eq!(runs[0].env[DEVICE_ENV], "2");
        assert_eq!(runs[0].env["WANDB_MODE"], "offline");
    }

    #[test]
    fn rejects_invalid_configs() {
        let adapter = Adapter::new();
        let cases = [
            SweepConfig {
                seeds: vec![],
                ..Default::default()
            },
            SweepConfig {
                seeds: vec![1, 2, 1],
                ..Default::default()
            },
            SweepConfig {
                num_loc: 1,
                ..Default::default()
            },
            SweepConfig {
                batch_size: NonZeroUsize::new(64).unwrap(),
                train_data_size: NonZeroUsize::new(32).unwrap(),
                ..Default::default()
            },
            SweepConfig {
                device: " ".into(),
                ..Default::default()
            },
            SweepConfig {
                entry_point: EntryPoint {
                    program: String::new(),
                    args: vec![],
                },
                ..Default::default()
            },
            SweepConfig {
                env_overrides: BTreeMap::from([("A=B".to_string(), "1".to_string())]),
                ..Default::default()
            },
        ];

        for cfg in cases {
            assert!(matches!(
                adapter.adapt_config(&cfg),
                Err(SweepError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn rejects_nul_in_forwarded_strings() {
        let adapter = Adapter::new();
        let cases = [
            SweepConfig {
                env_overrides: BTreeMap::from([("WANDB_MODE".to_string(), "off\0line".to_string())]),
                ..Default::default()
            },
            SweepConfig {
                entry_point: EntryPoint {
                    program: "python".into(),
                    args: vec!["run\0.py".into()],
                },
                ..Default::default()
            },
            SweepConfig {
                logger: LoggerConfig {
                    tags: vec!["tsp".into(), "a\0b".into()],
                    ..Default::default()
                },
                ..Default::default()
            },
            SweepConfig {
                logger: LoggerConfig {
                    project: "rl\04co".into(),
                    ..Default::default()
                },
                ..Default::default()
            },
            SweepConfig {
                device: "0\0".into(),
                ..Default::default()
            },
        ];

        for cfg in cases {
            match adapter.adapt_config(&cfg) {
                Err(SweepError::InvalidConfig(msg)) => assert!(msg.contains("NUL"), "{msg}"),
                other => panic!("expected a NUL rejection, got {other:?}"),
            }
        }
    }
}
