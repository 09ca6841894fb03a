//! Tests for the no-command mode that prints `export` lines.

use crate::support::*;

#[test]
fn test_nothing_marked_prints_nothing() {
    let t = Test::new();

    let output = t.run_with_env(&[("PLAIN_VAR", "value")]);
    assert_success(&output);
    assert_stdout_empty(&output);
}

#[test]
fn test_encrypt_mode_without_plaintext_vars_prints_nothing() {
    let t = Test::new();

    let output = t.run_with_env(&[("KMS_CMK", KEY_ARN), ("DB_KMS_LIKE", "x")]);
    assert_success(&output);
    assert_stdout_empty(&output);
}

#[test]
fn test_unmarked_suffix_lookalikes_are_ignored() {
    let t = Test::new();

    // Suffix must be at the end of the name.
    let output = t.run_with_env(&[("A_KMS_OLD", "x"), ("B_PLAINTEXT_OLD", "y")]);
    assert_success(&output);
    assert_stdout_empty(&output);
}

#[test]
fn test_logs_never_reach_stdout() {
    let t = Test::new();

    let output = t.cmd().arg("--verbose").output().unwrap();
    assert_success(&output);
    assert_stdout_empty(&output);
    assert_stderr_contains(&output, "no variables to process");
}

#[test]
fn test_log_env_var() {
    let t = Test::new();

    let output = t.cmd().env("KMSCRYPTER_LOG", "debug").output().unwrap();
    assert_success(&output);
    assert_stdout_empty(&output);
    assert_stderr_contains(&output, "no variables to process");
}

#[test]
fn test_default_no_log_output() {
    let t = Test::new();

    let output = t.cmd().output().unwrap();
    assert_success(&output);
    let err = stderr(&output);
    assert!(
        !err.contains("DEBUG") && !err.contains("TRACE"),
        "Default mode should not show debug/trace output"
    );
}
