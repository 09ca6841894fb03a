//! Runtime settings.
//!
//! Everything kmscrypter needs to know comes from the process environment
//! (via clap's `env` support in the CLI layer). This module turns those raw
//! values into a run mode, a profile name and the two shared-file paths.

use std::path::{is_separator, Path, PathBuf};

use tracing::debug;

use crate::core::constants;

/// Raw settings, one field per environment variable.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// `KMS_CMK`: master key id; presence selects encrypt mode.
    pub kms_cmk: Option<String>,
    /// `AWS_DEFAULT_PROFILE`
    pub default_profile: Option<String>,
    /// `AWS_PROFILE`
    pub profile: Option<String>,
    /// `AWS_CONFIG_FILE`
    pub config_file: Option<String>,
    /// `AWS_SHARED_CREDENTIALS_FILE`
    pub credentials_file: Option<String>,
    /// `HOME`, or the platform home directory when unset.
    pub home: Option<PathBuf>,
}

/// What a run does with the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Seal every `*_PLAINTEXT` variable under this master key.
    Encrypt { key_id: String },
    /// Open every `*_KMS` variable.
    Decrypt,
}

impl Settings {
    /// Fill in the home directory from the platform when `HOME` was not given.
    pub fn with_platform_home(mut self) -> Self {
        if self.home.is_none() {
            self.home = dirs::home_dir();
            debug!(home = ?self.home, "HOME unset, using platform home directory");
        }
        self
    }

    /// Encrypt when a master key is configured, decrypt otherwise.
    pub fn mode(&self) -> Mode {
        match non_empty(&self.kms_cmk) {
            Some(key_id) => Mode::Encrypt {
                key_id: key_id.to_string(),
            },
            None => Mode::Decrypt,
        }
    }

    /// Profile to resolve: AWS_DEFAULT_PROFILE, then AWS_PROFILE, then "default".
    pub fn profile_name(&self) -> &str {
        self.explicit_profile().unwrap_or(constants::DEFAULT_PROFILE)
    }

    /// Profile named by AWS_DEFAULT_PROFILE or AWS_PROFILE, if any.
    pub fn explicit_profile(&self) -> Option<&str> {
        non_empty(&self.default_profile).or_else(|| non_empty(&self.profile))
    }

    /// Config file path, only when overridden.
    pub fn config_override(&self) -> Option<PathBuf> {
        non_empty(&self.config_file).map(|_| self.config_path())
    }

    /// Credentials file path, only when overridden.
    pub fn credentials_override(&self) -> Option<PathBuf> {
        non_empty(&self.credentials_file).map(|_| self.credentials_path())
    }

    /// Path of the shared config file.
    pub fn config_path(&self) -> PathBuf {
        aws_file_path(
            non_empty(&self.config_file),
            constants::CONFIG_PATH,
            self.home.as_deref(),
        )
    }

    /// Path of the shared credentials file.
    pub fn credentials_path(&self) -> PathBuf {
        aws_file_path(
            non_empty(&self.credentials_file),
            constants::CREDENTIALS_PATH,
            self.home.as_deref(),
        )
    }
}

/// Resolve a shared AWS file path.
///
/// An explicit override wins; a leading `~` in it is expanded against `home`.
/// Without an override the file lives at `home/default_path`. With neither,
/// the returned path is empty and any attempt to load it fails.
pub fn aws_file_path(override_path: Option<&str>, default_path: &str, home: Option<&Path>) -> PathBuf {
    let home = home.filter(|h| !h.as_os_str().is_empty());

    if let Some(path) = override_path.filter(|p| !p.is_empty()) {
        return match path.strip_prefix('~') {
            // Without a home the remainder keeps its leading separator: `~/x` is `/x`.
            Some(rest) => match home {
                Some(home) => home.join(rest.trim_start_matches(is_separator)),
                None => PathBuf::from(rest),
            },
            None => PathBuf::from(path),
        };
    }

    match home {
        Some(home) => home.join(default_path),
        None => PathBuf::new(),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
