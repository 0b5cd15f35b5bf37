use std::{fmt, io, path::PathBuf};

/// The sweep's result type.
pub type Result<T> = std::result::Result<T, SweepError>;

/// All errors that can occur while expanding or running a sweep.
#[derive(Debug)]
pub enum SweepError {
    /// Invalid configuration, caught before anything is launched.
    InvalidConfig(String),
    /// The experiment identifier doesn't name any known configuration.
    UnknownExperiment(String),
    /// The experiment has no command template for this problem size.
    UnsupportedProblemSize {
        experiment: &'static str,
        num_loc: usize,
    },
    /// The entry point could not be started for a seed.
    Spawn {
        seed: u64,
        program: String,
        source: io::Error,
    },
    /// A sweep manifest could not be read or parsed.
    Manifest { path: PathBuf, msg: String },
    /// An underlying I/O error not covered by the above variants.
    Io(io::Error),
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::UnknownExperiment(name) => write!(f, "unknown experiment: {name}"),
            Self::UnsupportedProblemSize {
                experiment,
                num_loc,
            } => write!(
                f,
                "experiment {experiment} has no configuration for {num_loc} nodes"
            ),
            Self::Spawn {
                seed,
                program,
                source,
            } => write!(f, "failed to launch {program} for seed {seed}: {source}"),
            Self::Manifest { path, msg } => {
                write!(f, "manifest {}: {msg}", path.display())
            }
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for SweepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SweepError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
