//! Constants used throughout kmscrypter.
//!
//! Centralizes magic strings and configuration values.

/// Suffix marking a plaintext secret to encrypt (`DB_PASSWORD_PLAINTEXT`).
pub const PLAINTEXT_SUFFIX: &str = "_PLAINTEXT";

/// Suffix marking an encrypted secret to decrypt (`DB_PASSWORD_KMS`).
pub const ENCRYPTED_SUFFIX: &str = "_KMS";

/// Encryption context key binding a data key to its logical secret name.
pub const CONTEXT_KEY_NAME: &str = "keyName";

/// Shared credentials file relative to HOME.
pub const CREDENTIALS_PATH: &str = ".aws/credentials";

/// Shared config file relative to HOME.
pub const CONFIG_PATH: &str = ".aws/config";

/// Profile used when neither AWS_DEFAULT_PROFILE nor AWS_PROFILE is set.
pub const DEFAULT_PROFILE: &str = "default";

/// INI keys read from a profile section.
pub const INI_ROLE_ARN: &str = "role_arn";
pub const INI_SOURCE_PROFILE: &str = "source_profile";
pub const INI_REGION: &str = "region";
pub const INI_ACCESS_KEY_ID: &str = "aws_access_key_id";
pub const INI_SECRET_ACCESS_KEY: &str = "aws_secret_access_key";
pub const INI_SESSION_TOKEN: &str = "aws_session_token";

/// STS session name used when assuming a role.
pub const ROLE_SESSION_NAME: &str = "kmscrypter";

/// Exit code when the child command cannot be started.
pub const EXIT_SPAWN_FAILURE: i32 = 1;
