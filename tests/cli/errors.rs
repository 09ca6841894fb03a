//! Tests for error handling and CLI flags.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_help() {
    let t = Test::new();

    let output = t.cmd().arg("--help").output().unwrap();
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("kmscrypter") || out.contains("Usage"));
    assert!(out.contains("KMS_CMK"));
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    let output = t.cmd().arg("--version").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "kmscrypter");
    assert_stdout_contains(&output, env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_malformed_record_is_fatal() {
    let t = Test::new();

    t.cmd()
        .env("DB_PASSWORD_KMS", "not base64 at all!")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("DB_PASSWORD: malformed record"));
}

#[test]
fn test_malformed_record_hides_other_results() {
    let t = Test::new();

    // Both entries fail to decode before any KMS call, whichever comes first.
    let output = t.run_with_env(&[("A_KMS", "%%%"), ("B_KMS", "eJwDAAAAAAE=")]);
    assert_failure(&output);
    assert_stdout_empty(&output);
    assert_stderr_contains(&output, "malformed record");
}

#[test]
fn test_error_includes_hint() {
    let t = Test::new();

    t.cmd()
        .env("X_KMS", "###")
        .assert()
        .failure()
        .stderr(predicate::str::contains("✗").and(predicate::str::contains("→")));
}
