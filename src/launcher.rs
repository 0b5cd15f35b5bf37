use std::{io, process::Stdio};

use log::debug;

use crate::run::{RunSpec, RunStatus};

/// This trait acts as an indirection layer between the `Session` and the way a run
/// is actually carried out.
#[async_trait::async_trait]
pub trait Launcher: Send {
    /// Carries out a single run and waits for it to end.
    ///
    /// # Arguments
    /// * `run` - The run to carry out.
    ///
    /// # Returns
    /// How the run ended, or an io error if it couldn't be started at all.
    async fn launch(&mut self, run: &RunSpec) -> io::Result<RunStatus>;
}

/// Spawns the entry point as a child process sharing this process' stdio.
#[derive(Debug, Default)]
pub struct ProcessLauncher;

#[async_trait::async_trait]
impl Launcher for ProcessLauncher {
    async fn launch(&mut self, run: &RunSpec) -> io::Result<RunStatus> {
        let mut child = run
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()?;

        debug!("seed {} spawned as pid {:?}", run.seed, child.id());
        let status = child.wait().await?;

        if status.success() {
            Ok(RunStatus::Succeeded)
        } else {
            Ok(RunStatus::Failed {
                code: status.code(),
            })
        }
    }
}

/// Prints every run instead of launching it.
#[derive(Debug, Default)]
pub struct DryRunLauncher;

#[async_trait::async_trait]
impl Launcher for DryRunLauncher {
    async fn launch(&mut self, run: &RunSpec) -> io::Result<RunStatus> {
        println!("{}", run.command_line());
        Ok(RunStatus::Succeeded)
    }
}
