use std::{fmt, str::FromStr};

use crate::error::{Result, SweepError};

/// The named experiment configurations a sweep can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Experiment {
    /// Attention Model with a greedy rollout baseline.
    Am,
    /// Attention Model with a learned critic baseline.
    AmCritic,
    /// Attention Model trained with PPO.
    AmPpo,
    /// Attention Model with a deeper encoder.
    AmXl,
    /// POMO multi-start training.
    Pomo,
    /// SymNCO symmetric training.
    SymNco,
    /// Pointer Network.
    PtrNet,
    /// Heterogeneous Attention Model.
    Ham,
}

impl Experiment {
    pub const ALL: [Experiment; 8] = [
        Self::Am,
        Self::AmCritic,
        Self::AmPpo,
        Self::AmXl,
        Self::Pomo,
        Self::SymNco,
        Self::PtrNet,
        Self::Ham,
    ];

    /// The identifier accepted on the command line and in manifests.
    pub fn name(self) -> &'static str {
        match self {
            Self::Am => "am",
            Self::AmCritic => "am-critic",
            Self::AmPpo => "am-ppo",
            Self::AmXl => "am-xl",
            Self::Pomo => "pomo",
            Self::SymNco => "symnco",
            Self::PtrNet => "ptrnet",
            Self::Ham => "ham",
        }
    }

    /// The experiment configuration forwarded to the entry point.
    pub fn config_path(self) -> String {
        format!("routing/{}", self.name())
    }

    /// Whether runs of this experiment forward logging target names.
    pub fn logs_to_wandb(self) -> bool {
        !matches!(self, Self::PtrNet | Self::Ham)
    }

    /// Key of the model zoo family this experiment trains.
    pub fn family_key(self) -> &'static str {
        match self {
            Self::Am | Self::AmXl => "am",
            Self::AmCritic | Self::AmPpo => "amppo",
            Self::Pomo => "pomo",
            Self::SymNco => "symnco",
            Self::PtrNet => "ptrnet",
            Self::Ham => "ham",
        }
    }

    /// Extra overrides selected by problem size.
    ///
    /// # Arguments
    /// * `num_loc` - The number of nodes of the problem instances.
    ///
    /// # Returns
    /// The overrides to append, or an error if the experiment has no
    /// configuration for this size.
    pub fn size_overrides(self, num_loc: usize) -> Result<Vec<String>> {
        let Self::AmPpo = self else {
            return Ok(Vec::new());
        };

        let overrides = match num_loc {
            20 => vec!["model.mini_batch_size=512".to_string()],
            50 => vec!["model.mini_batch_size=256".to_string()],
            100 => vec![
                "model.mini_batch_size=128".to_string(),
                "model.ppo_epochs=2".to_string(),
            ],
            _ => {
                return Err(SweepError::UnsupportedProblemSize {
                    experiment: self.name(),
                    num_loc,
                });
            }
        };

        Ok(overrides)
    }
}

impl fmt::Display for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Experiment {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|exp| exp.name() == s)
            .ok_or_else(|| SweepError::UnknownExperiment(s.to_string()))
    }
}
