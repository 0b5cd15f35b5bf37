pub mod configs;
pub mod error;
pub mod launcher;
pub mod report;
pub mod run;
mod session;
pub mod zoo;

pub use error::{Result, SweepError};
pub use launcher::{DryRunLauncher, Launcher, ProcessLauncher};
pub use report::SweepReport;
pub use session::Session;

use configs::{Adapter, SweepConfig};

/// Expands a sweep into its runs and returns a session ready to launch them.
///
/// # Errors
/// Returns a `SweepError` if the configuration is invalid; nothing is launched then.
pub fn prepare(sweep: SweepConfig) -> Result<Session> {
    log::info!("adapting sweep for {} on {} nodes", sweep.experiment, sweep.num_loc);
    let adapter = Adapter::new();
    let runs = adapter.adapt_config(&sweep)?;
    log::info!("prepared {} run(s)", runs.len());
    Ok(Session::new(
        sweep.experiment,
        sweep.num_loc,
        runs,
        sweep.failure_policy,
    )?)
}

/// Runs a sweep to completion with the given launcher.
///
/// # Errors
/// Returns a `SweepError` if the configuration is invalid or a run can't be started.
pub fn sweep<L: Launcher>(config: SweepConfig, launcher: L) -> Result<SweepReport> {
    prepare(config)?.run(launcher)
}
