//! Tests for running a trailing command.

use crate::support::*;

#[cfg(unix)]
#[test]
fn test_run_passes_environment_through() {
    let t = Test::new();

    let output = t.exec_with_env(
        &[("KEEP_ME", "kept")],
        &["sh", "-c", "test \"$KEEP_ME\" = kept && echo ok"],
    );
    assert_success(&output);
    assert_stdout_contains(&output, "ok");
}

#[cfg(unix)]
#[test]
fn test_run_command_exit_code_passthrough() {
    let t = Test::new();

    let output = t.exec_with_env(&[], &["sh", "-c", "exit 42"]);
    assert_eq!(output.status.code(), Some(42));
}

#[cfg(unix)]
#[test]
fn test_run_without_separator() {
    let t = Test::new();

    let output = t.cmd().args(["echo", "hello"]).output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "hello");
}

#[cfg(unix)]
#[test]
fn test_run_command_args_with_hyphens() {
    let t = Test::new();

    let output = t.exec_with_env(&[], &["sh", "-c", "echo \"$1\"", "sh", "--flag"]);
    assert_success(&output);
    assert_stdout_contains(&output, "--flag");
}

#[test]
fn test_run_missing_program_fails() {
    let t = Test::new();

    let output = t.exec_with_env(&[], &["kmscrypter-test-no-such-program"]);
    assert_eq!(output.status.code(), Some(1));
    assert_stderr_contains(&output, "failed to start");
}

#[cfg(unix)]
#[test]
fn test_run_not_started_when_decryption_fails() {
    let t = Test::new();
    let marker = t.home.path().join("ran");

    let output = t.exec_with_env(
        &[("BROKEN_KMS", "!!not-a-record!!")],
        &["touch", marker.to_str().unwrap()],
    );
    assert_failure(&output);
    assert!(!marker.exists(), "command must not run after a failed decrypt");
}
