//! Credential selection.
//!
//! Decides, once per run, which identity talks to KMS: whatever the SDK finds
//! on its own, or a role assumed from a `source_profile`'s static keys.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::config::Settings;
use crate::core::kms::AwsKms;
use crate::core::profile::{self, ProfileConfig, ProfileSources, StaticCredentials};
use crate::error::{KmsError, ProfileError};

/// Credentials used to build the KMS client.
#[derive(Debug, Clone)]
pub enum CredentialContext {
    /// SDK default discovery (environment, shared files, instance role, ...).
    Ambient,
    /// Assume `role_arn` using the static keys of `source_profile`.
    Chained(ChainedRole),
}

/// A role to assume and the profile whose keys assume it.
#[derive(Debug, Clone)]
pub struct ChainedRole {
    pub role_arn: String,
    pub source_profile: String,
    /// Region from the resolved profile, if it had one.
    pub region: Option<String>,
    pub source_credentials: StaticCredentials,
}

impl CredentialContext {
    pub fn is_chained(&self) -> bool {
        matches!(self, CredentialContext::Chained(_))
    }
}

/// Profile and shared files the SDK's own discovery should read.
///
/// Empty by default, which leaves the SDK to its environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SdkProfile {
    pub profile: Option<String>,
    pub config_file: Option<PathBuf>,
    pub credentials_file: Option<PathBuf>,
}

impl SdkProfile {
    /// Carry the profile and file overrides from `settings` over to the SDK.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            profile: settings.explicit_profile().map(str::to_string),
            config_file: settings.config_override(),
            credentials_file: settings.credentials_override(),
        }
    }

    pub fn has_file_overrides(&self) -> bool {
        self.config_file.is_some() || self.credentials_file.is_some()
    }
}

/// Pick credentials for a resolved (or unresolvable) profile.
///
/// Resolution failures and incomplete chains fall back to ambient credentials.
/// The source profile's static keys are read from `credentials_path`.
pub fn select(
    resolved: Result<ProfileConfig, ProfileError>,
    credentials_path: &Path,
) -> CredentialContext {
    let config = match resolved {
        Ok(config) => config,
        Err(e) => {
            debug!(error = %e, "no profile chain, using ambient credentials");
            return CredentialContext::Ambient;
        }
    };

    if config.source_profile.is_empty() {
        debug!("profile has no source_profile, using ambient credentials");
        return CredentialContext::Ambient;
    }

    match profile::load_static_credentials(credentials_path, &config.source_profile) {
        Ok(source_credentials) => {
            debug!(
                role_arn = %config.role_arn,
                source_profile = %config.source_profile,
                "assuming role from source profile"
            );
            CredentialContext::Chained(ChainedRole {
                role_arn: config.role_arn,
                source_profile: config.source_profile,
                region: Some(config.region).filter(|r| !r.is_empty()),
                source_credentials,
            })
        }
        Err(e) => {
            warn!(
                source_profile = %config.source_profile,
                error = %e,
                "cannot load source profile credentials, using ambient credentials"
            );
            CredentialContext::Ambient
        }
    }
}

/// Resolve the profile named by `settings` and select credentials for it.
pub fn from_settings(settings: &Settings) -> CredentialContext {
    let sources = ProfileSources {
        config: settings.config_path(),
        credentials: settings.credentials_path(),
    };
    let profile_name = settings.profile_name();
    debug!(profile = profile_name, "resolving profile");

    select(profile::resolve(profile_name, &sources), &sources.credentials)
}

/// Build the KMS client for `settings`.
pub fn connect(settings: &Settings) -> Result<AwsKms, KmsError> {
    AwsKms::connect(&from_settings(settings), &SdkProfile::from_settings(settings))
}
