//! Encrypt and decrypt through the binary, against the in-process key
//! service that `test-kms` builds swap in for AWS KMS.

use crate::support::*;
use kmscrypter::core::envelope::EnvelopeRecord;
use predicates::prelude::*;

/// Pull the value out of `export NAME="VALUE"` on stdout.
fn exported(output: &std::process::Output, name: &str) -> String {
    let prefix = format!("export {}=\"", name);
    stdout(output)
        .lines()
        .find_map(|line| line.strip_prefix(&prefix)?.strip_suffix('"').map(str::to_string))
        .unwrap_or_else(|| panic!("no export for {} in: {}", name, stdout(output)))
}

fn seal(t: &Test, name: &str, value: &str) -> String {
    let var = format!("{}_PLAINTEXT", name);
    let output = t.run_with_env(&[("KMS_CMK", KEY_ARN), (var.as_str(), value)]);
    assert_success(&output);
    exported(&output, &format!("{}_KMS", name))
}

#[test]
fn test_encrypt_prints_kms_export() {
    let t = Test::new();

    t.cmd()
        .env("KMS_CMK", KEY_ARN)
        .env("DB_PASSWORD_PLAINTEXT", "hunter2")
        .env("UNRELATED", "x")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("export DB_PASSWORD_KMS=\""))
        .stdout(predicate::str::contains("hunter2").not())
        .stdout(predicate::str::contains("UNRELATED").not());
}

#[test]
fn test_encrypted_value_is_a_record() {
    let t = Test::new();

    let value = seal(&t, "API_KEY", "sk-test-12345");
    assert!(EnvelopeRecord::decode(&value).is_ok());
}

#[test]
fn test_decrypt_prints_plain_export() {
    let t = Test::new();
    let sealed = seal(&t, "API_KEY", "sk-test-12345");

    t.cmd()
        .env("API_KEY_KMS", &sealed)
        .assert()
        .success()
        .stdout("export API_KEY=\"sk-test-12345\"\n");
}

#[cfg(unix)]
#[test]
fn test_decrypt_injects_into_command() {
    let t = Test::new();
    let sealed = seal(&t, "DATABASE_URL", "postgres://localhost/mydb");

    t.cmd()
        .env("DATABASE_URL_KMS", &sealed)
        .args(["--", "sh", "-c", "printf '%s' \"$DATABASE_URL\""])
        .assert()
        .success()
        .stdout("postgres://localhost/mydb");
}

#[cfg(unix)]
#[test]
fn test_encrypt_injects_into_command() {
    let t = Test::new();

    t.cmd()
        .env("KMS_CMK", KEY_ARN)
        .env("TOKEN_PLAINTEXT", "abc")
        .args(["--", "sh", "-c", "test -n \"$TOKEN_KMS\" && test \"$TOKEN_KMS\" != abc"])
        .assert()
        .success();
}

#[test]
fn test_every_marked_variable_roundtrips() {
    let t = Test::new();

    for (name, value) in STANDARD_SECRETS {
        let sealed = seal(&t, name, value);
        let var = format!("{}_KMS", name);
        let output = t.run_with_env(&[(var.as_str(), sealed.as_str())]);
        assert_success(&output);
        assert_eq!(exported(&output, name), *value);
    }
}

#[test]
fn test_renamed_value_is_rejected() {
    let t = Test::new();
    let sealed = seal(&t, "DB_PASSWORD", "hunter2");

    t.cmd()
        .env("OTHER_KMS", &sealed)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("OTHER"))
        .stderr(predicate::str::contains("encryption context mismatch"));
}

#[test]
fn test_encrypt_failure_is_fatal_and_prints_nothing() {
    let t = Test::new();

    t.cmd()
        .env("KMS_CMK", "alias/disabled-app")
        .env("A_PLAINTEXT", "1")
        .env("B_PLAINTEXT", "2")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("DisabledException"));
}

#[cfg(unix)]
#[test]
fn test_command_not_run_when_decrypt_fails() {
    let t = Test::new();
    let sealed = seal(&t, "A", "1");
    let marker = t.home.path().join("ran");

    t.cmd()
        .env("B_KMS", &sealed)
        .args(["--", "touch", marker.to_str().unwrap()])
        .assert()
        .failure();
    assert!(!marker.exists());
}
