//! Shared config / credentials profile resolution.
//!
//! Mirrors how the AWS CLI finds role-assumption settings: a profile may live
//! in `~/.aws/config` or `~/.aws/credentials`, under either `[name]` or
//! `[profile name]`. The order in which those places are consulted is
//! [`lookup_plan`]; [`resolve`] walks it.

use std::fmt;
use std::path::{Path, PathBuf};

use ini::{Ini, Properties};
use tracing::{debug, trace};

use crate::core::constants;
use crate::error::ProfileError;

/// Role-assumption parameters read from one profile section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileConfig {
    pub role_arn: String,
    pub source_profile: String,
    pub region: String,
}

impl ProfileConfig {
    /// Both `role_arn` and `source_profile` are set.
    pub fn is_chained(&self) -> bool {
        !self.role_arn.is_empty() && !self.source_profile.is_empty()
    }

    fn from_section(props: &Properties) -> Self {
        let get = |key: &str| props.get(key).unwrap_or_default().trim().to_string();
        Self {
            role_arn: get(constants::INI_ROLE_ARN),
            source_profile: get(constants::INI_SOURCE_PROFILE),
            region: get(constants::INI_REGION),
        }
    }
}

/// Which shared file a lookup reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Config,
    Credentials,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Config => write!(f, "config"),
            FileKind::Credentials => write!(f, "credentials"),
        }
    }
}

/// Locations of the two shared files.
#[derive(Debug, Clone)]
pub struct ProfileSources {
    pub config: PathBuf,
    pub credentials: PathBuf,
}

impl ProfileSources {
    fn path(&self, kind: FileKind) -> &Path {
        match kind {
            FileKind::Config => &self.config,
            FileKind::Credentials => &self.credentials,
        }
    }
}

/// One attempted section lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub file: FileKind,
    pub section: String,
}

/// Section names a profile may appear under, in lookup order.
pub fn section_names(profile: &str) -> [String; 2] {
    [profile.to_string(), format!("profile {}", profile)]
}

/// Every lookup [`resolve`] may perform, in order.
///
/// Config file first, then credentials file; within each file the bare name
/// before `profile <name>`.
pub fn lookup_plan(profile: &str) -> Vec<Lookup> {
    [FileKind::Config, FileKind::Credentials]
        .into_iter()
        .flat_map(|file| {
            section_names(profile)
                .into_iter()
                .map(move |section| Lookup { file, section })
        })
        .collect()
}

/// Resolve role-assumption settings for `profile`.
///
/// The config file's result is used only when it describes a complete chain.
/// Otherwise the credentials file decides, including its error, even if the
/// config file had a partial section (e.g. only `region`).
pub fn resolve(profile: &str, sources: &ProfileSources) -> Result<ProfileConfig, ProfileError> {
    match lookup_in(FileKind::Config, profile, sources) {
        Ok(config) if config.is_chained() => {
            debug!(profile, file = %FileKind::Config, "resolved chained profile");
            return Ok(config);
        }
        Ok(_) => trace!(profile, "config profile incomplete, trying credentials file"),
        Err(e) => trace!(profile, error = %e, "config lookup failed, trying credentials file"),
    }

    let resolved = lookup_in(FileKind::Credentials, profile, sources)?;
    debug!(
        profile,
        file = %FileKind::Credentials,
        chained = resolved.is_chained(),
        "resolved profile"
    );
    Ok(resolved)
}

/// Look `profile` up in one file, trying both section names.
pub fn lookup_in(
    file: FileKind,
    profile: &str,
    sources: &ProfileSources,
) -> Result<ProfileConfig, ProfileError> {
    let path = sources.path(file);
    let ini = load(path)?;
    let props = find_section(&ini, file, profile, path)?;
    Ok(ProfileConfig::from_section(props))
}

/// Long-term keys of a profile in the credentials file.
#[derive(Clone)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &self.session_token.as_ref().map(|_| "** redacted **"))
            .finish()
    }
}

/// Read the static keys of `profile` from the credentials file at `path`.
pub fn load_static_credentials(path: &Path, profile: &str) -> Result<StaticCredentials, ProfileError> {
    let ini = load(path)?;
    let props = find_section(&ini, FileKind::Credentials, profile, path)?;

    let required = |key: &'static str| {
        props
            .get(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ProfileError::MissingCredentials {
                profile: profile.to_string(),
                path: path.to_path_buf(),
                key,
            })
    };

    Ok(StaticCredentials {
        access_key_id: required(constants::INI_ACCESS_KEY_ID)?,
        secret_access_key: required(constants::INI_SECRET_ACCESS_KEY)?,
        session_token: props
            .get(constants::INI_SESSION_TOKEN)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string),
    })
}

fn load(path: &Path) -> Result<Ini, ProfileError> {
    trace!(path = %path.display(), "loading shared file");
    if path.as_os_str().is_empty() {
        return Err(ProfileError::ConfigLoad {
            path: path.to_path_buf(),
            reason: "no path (HOME is not set)".to_string(),
        });
    }
    Ini::load_from_file_noescape(path).map_err(|e| ProfileError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn find_section<'a>(
    ini: &'a Ini,
    file: FileKind,
    profile: &str,
    path: &Path,
) -> Result<&'a Properties, ProfileError> {
    lookup_plan(profile)
        .into_iter()
        .filter(|lookup| lookup.file == file)
        .find_map(|lookup| ini.section(Some(lookup.section)))
        .ok_or_else(|| ProfileError::SectionNotFound {
            profile: profile.to_string(),
            path: path.to_path_buf(),
        })
}
