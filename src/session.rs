use std::{future::Future, pin::Pin, time::Instant};

use log::{info, warn};
use tokio::{io, runtime::Runtime};

use crate::{
    configs::{Experiment, FailurePolicy},
    error::{Result, SweepError},
    launcher::Launcher,
    report::SweepReport,
    run::{RunOutcome, RunSpec, RunStatus},
};

/// A sweep ready to run: the expanded runs plus the runtime that drives them.
pub struct Session {
    runtime: Runtime,
    experiment: Experiment,
    num_loc: usize,
    runs: Vec<RunSpec>,
    failure_policy: FailurePolicy,
}

impl Session {
    /// Creates a new `Session`.
    ///
    /// # Arguments
    /// * `experiment` - The experiment every run trains.
    /// * `num_loc` - The problem size every run trains on.
    /// * `runs` - The runs to launch, in order.
    /// * `failure_policy` - What to do after a run fails.
    ///
    /// # Returns
    /// A new `Session` instance or an io error if the runtime can't be built.
    pub fn new(
        experiment: Experiment,
        num_loc: usize,
        runs: Vec<RunSpec>,
        failure_policy: FailurePolicy,
    ) -> io::Result<Self> {
        let runtime = Runtime::new()?;

        Ok(Self {
            runtime,
            experiment,
            num_loc,
            runs,
            failure_policy,
        })
    }

    /// The runs this session will launch.
    pub fn runs(&self) -> &[RunSpec] {
        &self.runs
    }

    /// Launches every run, one after the other, stopping early on Ctrl-C.
    ///
    /// # Arguments
    /// * `launcher` - Carries out each run.
    ///
    /// # Returns
    /// The report of the sweep, or an error if a run couldn't be started.
    pub fn run<L: Launcher>(self, launcher: L) -> Result<SweepReport> {
        self.run_until(launcher, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("cannot listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
            }
        })
    }

    /// Same as [`Session::run`] but cancels on `shutdown` instead of Ctrl-C.
    ///
    /// Once `shutdown` completes, the run in progress is dropped, which kills its
    /// process, and every later run is skipped.
    pub fn run_until<L, F>(self, mut launcher: L, shutdown: F) -> Result<SweepReport>
    where
        L: Launcher,
        F: Future<Output = ()>,
    {
        let Self {
            runtime,
            experiment,
            num_loc,
            runs,
            failure_policy,
        } = self;

        let total = runs.len();
        let outcomes = runtime.block_on(async move {
            tokio::pin!(shutdown);

            let mut outcomes = Vec::with_capacity(total);
            let mut stopped = false;

            for (i, run) in runs.into_iter().enumerate() {
                let command_line = run.command_line();

                if !stopped && Self::has_fired(shutdown.as_mut()).await {
                    warn!("shutdown requested, skipping seed {} and the rest", run.seed);
                    stopped = true;
                }

                if stopped {
                    outcomes.push(RunOutcome {
                        seed: run.seed,
                        command_line,
                        status: RunStatus::Skipped,
                        elapsed_ms: 0,
                    });
                    continue;
                }

                info!("[{}/{total}] {experiment} seed={}: {command_line}", i + 1, run.seed);
                let start = Instant::now();

                // Shutdown is polled first so a child dying from the same Ctrl-C
                // is still recorded as cancelled.
                let status = tokio::select! {
                    biased;
                    _ = &mut shutdown => {
                        warn!("seed {} cancelled, skipping remaining runs", run.seed);
                        stopped = true;
                        RunStatus::Cancelled
                    }
                    status = launcher.launch(&run) => {
                        status.map_err(|source| SweepError::Spawn {
                            seed: run.seed,
                            program: run.program.clone(),
                            source,
                        })?
                    }
                };

                let elapsed_ms = start.elapsed().as_millis() as u64;
                match status {
                    RunStatus::Failed { code } => {
                        warn!("seed {} failed with exit code {code:?}", run.seed);
                        if failure_policy == FailurePolicy::FailFast {
                            stopped = true;
                        }
                    }
                    _ => info!("seed {} finished: {status:?} in {elapsed_ms}ms", run.seed),
                }

                outcomes.push(RunOutcome {
                    seed: run.seed,
                    command_line,
                    status,
                    elapsed_ms,
                });
            }

            Ok::<_, SweepError>(outcomes)
        })?;

        Ok(SweepReport {
            experiment: experiment.name().to_string(),
            num_loc,
            outcomes,
        })
    }

    /// Polls `shutdown` once without waiting on it.
    ///
    /// Must not be called again once it has returned `true`.
    async fn has_fired<F: Future<Output = ()>>(shutdown: Pin<&mut F>) -> bool {
        tokio::select! {
            biased;
            _ = shutdown => true,
            _ = std::future::ready(()) => false,
        }
    }
}
