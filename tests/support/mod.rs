//! Test support utilities for kmscrypter integration tests.
//!
//! Provides an isolated environment for running the binary.

#![allow(dead_code)]

pub mod fixtures;
pub mod skip;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::path::PathBuf;

use tempfile::TempDir;

/// Test environment with an isolated home directory.
///
/// The binary runs with a cleared environment, so nothing from the
/// developer's shell (AWS profiles, KMS_CMK, stray `*_KMS` variables) leaks
/// into a test.
pub struct Test {
    /// Temporary home directory holding `.aws/`
    pub home: TempDir,
}

impl Test {
    pub fn new() -> Self {
        let home = TempDir::new().expect("failed to create temp home");
        Self { home }
    }

    /// Write `~/.aws/config`.
    pub fn with_config(self, contents: &str) -> Self {
        self.write_aws_file("config", contents);
        self
    }

    /// Write `~/.aws/credentials`.
    pub fn with_credentials(self, contents: &str) -> Self {
        self.write_aws_file("credentials", contents);
        self
    }

    pub fn aws_dir(&self) -> PathBuf {
        self.home.path().join(".aws")
    }

    fn write_aws_file(&self, name: &str, contents: &str) {
        let dir = self.aws_dir();
        std::fs::create_dir_all(&dir).expect("failed to create .aws");
        std::fs::write(dir.join(name), contents).expect("failed to write aws file");
    }
}
