#![cfg(unix)]

use std::collections::BTreeMap;

use zoo_sweep::{
    DryRunLauncher, ProcessLauncher, SweepError,
    configs::{EntryPoint, Experiment, FailurePolicy, SweepConfig},
    run::RunStatus,
};

/// A sweep whose entry point is a shell snippet; the forwarded overrides
/// land in the snippet's positional parameters.
fn shell_sweep(script: &str, seeds: &[u64]) -> SweepConfig {
    SweepConfig {
        experiment: Experiment::Am,
        num_loc: 20,
        seeds: seeds.to_vec(),
        entry_point: EntryPoint {
            program: "sh".into(),
            args: vec!["-c".into(), script.into(), "train".into()],
        },
        ..Default::default()
    }
}

#[test]
fn successful_process_is_reported() {
    let report = zoo_sweep::sweep(shell_sweep("exit 0", &[1, 2]), ProcessLauncher).unwrap();
    assert!(report.is_success());
    assert_eq!(report.succeeded(), 2);
}

#[test]
fn exit_code_is_kept() {
    let cfg = SweepConfig {
        failure_policy: FailurePolicy::Continue,
        ..shell_sweep("exit 3", &[1, 2])
    };

    let report = zoo_sweep::sweep(cfg, ProcessLauncher).unwrap();
    assert!(
        report
            .outcomes
            .iter()
            .all(|o| o.status == RunStatus::Failed { code: Some(3) })
    );
}

#[test]
fn process_sees_device_and_overrides() {
    let cfg = SweepConfig {
        device: "3".into(),
        env_overrides: BTreeMap::from([("WANDB_MODE".to_string(), "offline".to_string())]),
        ..shell_sweep(
            r#"test "$CUDA_VISIBLE_DEVICES" = 3 && test "$WANDB_MODE" = offline"#,
            &[7],
        )
    };

    let report = zoo_sweep::sweep(cfg, ProcessLauncher).unwrap();
    assert!(report.is_success());
}

#[test]
fn process_receives_seed_override() {
    let script = r#"for arg in "$@"; do [ "$arg" = "seed=$SEED" ] && exit 0; done; exit 1"#;
    let cfg = SweepConfig {
        env_overrides: BTreeMap::from([("SEED".to_string(), "42".to_string())]),
        ..shell_sweep(script, &[42])
    };

    let report = zoo_sweep::sweep(cfg, ProcessLauncher).unwrap();
    assert!(report.is_success());
}

#[test]
fn missing_program_is_a_spawn_error() {
    let cfg = SweepConfig {
        entry_point: EntryPoint {
            program: "/nonexistent/zoo-sweep-train".into(),
            args: vec![],
        },
        ..Default::default()
    };

    let err = zoo_sweep::sweep(cfg, ProcessLauncher).unwrap_err();
    assert!(matches!(err, SweepError::Spawn { seed: 1234, .. }));
}

#[test]
fn dry_run_never_spawns() {
    let cfg = SweepConfig {
        entry_point: EntryPoint {
            program: "/nonexistent/zoo-sweep-train".into(),
            args: vec![],
        },
        ..Default::default()
    };

    let report = zoo_sweep::sweep(cfg, DryRunLauncher).unwrap();
    assert_eq!(report.succeeded(), 3);
    assert!(report.outcomes[0].command_line.contains("seed=1234"));
}
