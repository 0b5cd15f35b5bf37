use std::{num::NonZeroUsize, path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;

use zoo_sweep::{
    DryRunLauncher, ProcessLauncher, SweepReport,
    configs::{Experiment, FailurePolicy, SweepConfig, SweepManifest},
    zoo,
};

#[derive(Debug, Parser)]
#[command(
    name = "zoo-sweep",
    about = "Re-runs model zoo training configurations across random seeds",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Launch one training run per seed, one after the other.
    Run(RunArgs),
    /// List the known experiments.
    List,
    /// Print the model zoo reference.
    Zoo {
        #[arg(long, value_enum, default_value_t = FormatArg::Markdown)]
        format: FormatArg,
    },
}

#[derive(Debug, Args)]
struct RunArgs {
    /// JSON manifest to start from; flags below override it.
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Experiment to run (see `list`).
    #[arg(long, short)]
    experiment: Option<String>,

    /// Problem size in nodes.
    #[arg(long, short = 'n')]
    num_loc: Option<usize>,

    /// Comma separated seeds.
    #[arg(long, value_delimiter = ',')]
    seeds: Option<Vec<u64>>,

    #[arg(long)]
    train_data_size: Option<NonZeroUsize>,

    #[arg(long)]
    batch_size: Option<NonZeroUsize>,

    #[arg(long)]
    max_epochs: Option<NonZeroUsize>,

    /// Value of CUDA_VISIBLE_DEVICES for every run.
    #[arg(long, env = "ZOO_SWEEP_DEVICE")]
    device: Option<String>,

    /// Experiment tracker project.
    #[arg(long)]
    project: Option<String>,

    /// Experiment tracker tag (repeatable).
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Training program.
    #[arg(long)]
    program: Option<String>,

    /// Leading argument of the training program (repeatable).
    #[arg(long = "entry")]
    entry_args: Vec<String>,

    /// Extra environment variable for every run, as KEY=VAL (repeatable).
    #[arg(long = "env", value_parser = parse_env_pair)]
    env: Vec<(String, String)>,

    /// Keep going after a seed fails.
    #[arg(long)]
    continue_on_failure: bool,

    /// Print the commands instead of running them.
    #[arg(long)]
    dry_run: bool,

    /// Write a JSON report of the sweep.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Markdown,
    Plain,
}

fn parse_env_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, val)) if !key.is_empty() => Ok((key.to_string(), val.to_string())),
        _ => Err(format!("expected KEY=VAL, got {s:?}")),
    }
}

impl RunArgs {
    fn into_config(self) -> anyhow::Result<SweepConfig> {
        let mut cfg = match &self.manifest {
            Some(path) => SweepManifest::load(path)?.into_config()?,
            None => SweepConfig::default(),
        };

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
        if let Some(project) = self.project {
            cfg.logger.project = project;
        }
        if !self.tags.is_empty() {
            cfg.logger.tags = self.tags;
        }
        if let Some(program) = self.program {
            cfg.entry_point.program = program;
        }
        if !self.entry_args.is_empty() {
            cfg.entry_point.args = self.entry_args;
        }
        cfg.env_overrides.extend(self.env);
        if self.continue_on_failure {
            cfg.failure_policy = FailurePolicy::Continue;
        }

        Ok(cfg)
    }
}

fn run(args: RunArgs) -> anyhow::Result<ExitCode> {
    let dry_run = args.dry_run;
    let report_path = args.report.clone();
    let cfg = args.into_config()?;

    let session = zoo_sweep::prepare(cfg).context("cannot prepare sweep")?;
    let report = if dry_run {
        session.run(DryRunLauncher)?
    } else {
        session.run(ProcessLauncher)?
    };

    if let Some(path) = report_path {
        report
            .write_json(&path)
            .with_context(|| format!("cannot write report to {}", path.display()))?;
        info!("report written to {}", path.display());
    }

    Ok(summarize(&report))
}

fn summarize(report: &SweepReport) -> ExitCode {
    info!(
        "{} on {} nodes: {} succeeded, {} failed, {} cancelled, {} skipped",
        report.experiment,
        report.num_loc,
        report.succeeded(),
        report.failed(),
        report.cancelled(),
        report.skipped(),
    );

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn list() {
    for exp in Experiment::ALL {
        let wandb = if exp.logs_to_wandb() { "wandb" } else { "-" };
        println!("{:<10} {:<8} {wandb}", exp.name(), exp.family_key());
    }
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();

    match Cli::parse().command {
        Command::Run(args) => run(args),
        Command::List => {
            list();
            Ok(ExitCode::SUCCESS)
        }
        Command::Zoo { format } => {
            let format = match format {
                FormatArg::Markdown => zoo::Format::Markdown,
                FormatArg::Plain => zoo::Format::Plain,
            };
            print!("{}", zoo::render(format));
            Ok(ExitCode::SUCCESS)
        }
    }
}
