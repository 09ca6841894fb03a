//! Command-line interface.
//!
//! kmscrypter takes no subcommands. Its mode comes from the environment:
//! with `KMS_CMK` set it encrypts every `*_PLAINTEXT` variable, otherwise it
//! decrypts every `*_KMS` variable. The result is printed as `export` lines,
//! or injected into a trailing command which is then run.

pub mod output;
pub mod run;

use std::path::PathBuf;

use clap::Parser;
use tracing::debug;

use crate::core::batch::{self, SecretEntry};
use crate::core::config::{Mode, Settings};
use crate::core::constants::{ENCRYPTED_SUFFIX, PLAINTEXT_SUFFIX};
#[cfg(feature = "test-kms")]
use crate::core::kms::stub::StubKms;
use crate::core::kms::KeyService;
#[cfg(not(feature = "test-kms"))]
use crate::core::{kms::AwsKms, session};
use crate::error::Result;

/// Encrypt and decrypt environment variables with AWS KMS.
#[derive(Parser, Debug)]
#[command(
    name = "kmscrypter",
    about = "Encrypt and decrypt environment variables with AWS KMS",
    version,
    after_help = "Encrypt:  KMS_CMK=alias/app DB_PASSWORD_PLAINTEXT=... kmscrypter\n\
                  Decrypt:  DB_PASSWORD_KMS=... kmscrypter -- ./server"
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// KMS master key id, ARN or alias; selects encrypt mode
    #[arg(long, env = "KMS_CMK", hide_env_values = true)]
    pub kms_cmk: Option<String>,

    /// Profile to resolve (takes precedence over --profile)
    #[arg(long, env = "AWS_DEFAULT_PROFILE")]
    pub default_profile: Option<String>,

    /// Profile to resolve
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Shared config file
    #[arg(long, env = "AWS_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Shared credentials file
    #[arg(long, env = "AWS_SHARED_CREDENTIALS_FILE")]
    pub credentials_file: Option<String>,

    /// Home directory used to locate the shared files
    #[arg(long, env = "HOME", hide = true)]
    pub home: Option<PathBuf>,

    /// Command to run with the resulting variables
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl Cli {
    pub fn settings(&self) -> Settings {
        Settings {
            kms_cmk: self.kms_cmk.clone(),
            default_profile: self.default_profile.clone(),
            profile: self.profile.clone(),
            config_file: self.config_file.clone(),
            credentials_file: self.credentials_file.clone(),
            home: self.home.clone().filter(|h| !h.as_os_str().is_empty()),
        }
        .with_platform_home()
    }
}

/// Run kmscrypter and return the process exit code.
pub fn execute(cli: Cli) -> Result<i32> {
    let settings = cli.settings();
    let entries = transform(&settings, batch::process_env())?;

    if cli.command.is_empty() {
        output::print_exports(&entries)?;
        return Ok(0);
    }
    run::run(&cli.command, &entries)
}

/// Apply the configured mode to `pairs`.
///
/// The KMS client is only built when there is something to process, so a run
/// with no marked variables never touches AWS.
pub fn transform(settings: &Settings, pairs: Vec<(String, String)>) -> Result<Vec<SecretEntry>> {
    let mode = settings.mode();

    if !batch::has_targets(&pairs, target_suffix(&mode)) {
        debug!(?mode, "no variables to process");
        return Ok(Vec::new());
    }

    let kms = key_service(settings)?;
    transform_with(&kms, mode, pairs)
}

/// Apply `mode` to `pairs` using `kms`.
pub fn transform_with<K: KeyService + ?Sized>(
    kms: &K,
    mode: Mode,
    pairs: Vec<(String, String)>,
) -> Result<Vec<SecretEntry>> {
    match mode {
        Mode::Encrypt { key_id } => batch::encrypt_all(kms, &key_id, pairs),
        Mode::Decrypt => batch::decrypt_all(kms, pairs),
    }
}

fn target_suffix(mode: &Mode) -> &'static str {
    match mode {
        Mode::Encrypt { .. } => PLAINTEXT_SUFFIX,
        Mode::Decrypt => ENCRYPTED_SUFFIX,
    }
}

#[cfg(not(feature = "test-kms"))]
fn key_service(settings: &Settings) -> Result<AwsKms> {
    session::connect(settings).map_err(Into::into)
}

#[cfg(feature = "test-kms")]
fn key_service(settings: &Settings) -> Result<StubKms> {
    debug!(
        profile = settings.profile_name(),
        "test-kms build, using the in-process key service"
    );
    Ok(StubKms::new())
}
