//! Integration tests for the step public API.
#![cfg(unix)]

use shell_step::config::{LayeredConfig, ValueLookup};
use shell_step::shell::{CaptureSink, KillHandle, OutputLine};
use shell_step::steps::{ResultEntry, ShellStep, StepResult};
use shell_step::workspace::SequentialGenerator;
use shell_step::ShellStepError;
use std::fs;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn step_config(yaml: &str) -> LayeredConfig {
    LayeredConfig::new().with_step(serde_yaml::from_str(yaml).unwrap())
}

fn run(temp: &TempDir, lookup: &dyn ValueLookup) -> shell_step::Result<StepResult> {
    ShellStep::new(temp.path()).run_with_sink(lookup, &mut CaptureSink::new())
}

#[test]
fn failing_script_keeps_partial_results() {
    let temp = TempDir::new().unwrap();
    let config = step_config(
        r#"
shell-script: |
  echo "hello" > artifacts/greeting; printf "desc\nvalue" > evidence/proof; exit 1
"#,
    );

    let result = run(&temp, &config).unwrap();

    assert!(!result.success);
    assert!(result.message.is_some());
    assert_eq!(result.artifacts, vec![ResultEntry::new("greeting", "", "hello")]);
    assert_eq!(result.evidence, vec![ResultEntry::new("proof", "value", "desc")]);
}

#[test]
fn multi_line_value_round_trips() {
    let temp = TempDir::new().unwrap();
    let config = step_config(
        r#"
shell-script: printf "desc line\nvalue line 1\nvalue line 2" > artifacts/report
"#,
    );

    let result = run(&temp, &config).unwrap();

    assert!(result.success);
    assert_eq!(result.artifacts[0].description, "desc line");
    assert_eq!(result.artifacts[0].value, "value line 1\nvalue line 2");
}

#[test]
fn clean_exit_without_files_is_empty_success() {
    let temp = TempDir::new().unwrap();
    let result = run(&temp, &step_config("shell-script: \"true\"")).unwrap();

    assert!(result.success);
    assert!(result.message.is_none());
    assert!(result.artifacts.is_empty());
    assert!(result.evidence.is_empty());
}

#[test]
fn references_resolve_from_previous_results() {
    let temp = TempDir::new().unwrap();
    let mut build = StepResult::new("build");
    build.add_artifact("image", "registry.local/app:7", "container image");
    let config = step_config(
        r#"
shell-script: printf "deployed\n%s" "$IMAGE" > evidence/deployment
shell-parameters:
  IMAGE: ${image}
"#,
    )
    .with_previous_results(vec![build]);

    let result = run(&temp, &config).unwrap();

    assert!(result.success);
    assert_eq!(
        result.get_evidence_value("deployment"),
        Some("registry.local/app:7")
    );
}

#[test]
fn unresolved_reference_runs_nothing() {
    let temp = TempDir::new().unwrap();
    let config = step_config(
        r#"
shell-script: echo should-not-run
shell-parameters:
  IMAGE: ${image}
"#,
    );

    let err = run(&temp, &config).unwrap_err();

    assert!(err.to_string().contains("IMAGE"));
    assert!(err.to_string().contains("image"));
    assert!(matches!(err, ShellStepError::UnresolvedParameter { .. }));
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn concurrent_invocations_are_isolated() {
    let temp = Arc::new(TempDir::new().unwrap());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let temp = Arc::clone(&temp);
            thread::spawn(move || {
                let config = step_config(&format!(
                    "shell-script: printf 'run\\n{i}' > artifacts/id"
                ));
                ShellStep::new(temp.path())
                    .run_with_sink(&config, &mut CaptureSink::new())
                    .unwrap()
            })
        })
        .collect();

    let results: Vec<StepResult> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.artifacts.len(), 1);
        assert_eq!(result.get_artifact_value("id"), Some(i.to_string().as_str()));
    }
    let mut workspaces: Vec<_> = results.iter().map(|r| r.workspace.clone()).collect();
    workspaces.sort();
    workspaces.dedup();
    assert_eq!(workspaces.len(), 4);
}

#[test]
fn injected_id_generator_names_workspaces() {
    let temp = TempDir::new().unwrap();
    let step = ShellStep::new(temp.path())
        .with_id_generator(Arc::new(SequentialGenerator::new("fixed")));

    let result = step
        .run_with_sink(&step_config("shell-script: \"true\""), &mut CaptureSink::new())
        .unwrap();

    assert_eq!(result.workspace, Some(temp.path().join("fixed-1")));
    assert!(temp.path().join("fixed-1").join("script.sh").is_file());
}

#[test]
fn kill_handle_interrupts_and_still_harvests() {
    let temp = TempDir::new().unwrap();
    let step = ShellStep::new(temp.path());
    let kill = KillHandle::new();
    let config = step_config(
        r#"
shell-script: |
  echo "before kill" > artifacts/partial
  echo ready
  sleep 30
  echo "after kill" > artifacts/late
"#,
    );
    let remote = kill.clone();
    let mut sink = |line: OutputLine| {
        if line.text() == "ready" {
            remote.kill();
        }
    };

    let started = Instant::now();
    let result = step.run_with_kill(&config, &mut sink, &kill).unwrap();

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(!result.success);
    assert_eq!(
        result.message.as_deref(),
        Some("Script failed to run: interrupted")
    );
    assert_eq!(result.artifacts, vec![ResultEntry::new("partial", "", "before kill")]);
}

#[test]
fn killing_one_run_leaves_later_runs_alone() {
    let temp = TempDir::new().unwrap();
    let step = ShellStep::new(temp.path());
    let kill = KillHandle::new();
    kill.kill();

    let killed = step
        .run_with_kill(
            &step_config("shell-script: sleep 30"),
            &mut CaptureSink::new(),
            &kill,
        )
        .unwrap();
    let next = step
        .run_with_sink(&step_config("shell-script: \"true\""), &mut CaptureSink::new())
        .unwrap();

    assert!(!killed.success);
    assert!(next.success);
}

#[test]
fn one_step_serves_overlapping_runs() {
    let temp = TempDir::new().unwrap();
    let step = Arc::new(ShellStep::new(temp.path()));

    let slow = {
        let step = Arc::clone(&step);
        thread::spawn(move || {
            step.run_with_sink(
                &step_config("shell-script: sleep 2; exit 5"),
                &mut CaptureSink::new(),
            )
        })
    };
    thread::sleep(Duration::from_millis(200));
    let fast = {
        let step = Arc::clone(&step);
        thread::spawn(move || {
            step.run_with_sink(
                &step_config("shell-script: sleep 1; echo ok > artifacts/fast"),
                &mut CaptureSink::new(),
            )
        })
    };

    let fast = fast.join().unwrap().unwrap();
    let slow = slow.join().unwrap().unwrap();

    assert!(fast.success);
    assert_eq!(fast.exit_code, Some(0));
    assert_eq!(fast.artifacts.len(), 1);
    assert!(!slow.success);
    assert_eq!(slow.exit_code, Some(5));
    assert!(slow.artifacts.is_empty());
}

#[test]
fn result_serializes_for_later_steps() {
    let mut result = StepResult::new("build");
    result.add_artifact("version", "1.0.0", "release version");

    let json = serde_json::to_string(&result).unwrap();
    let parsed: StepResult = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, result);
}
