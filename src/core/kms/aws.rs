//! AWS KMS key service.
//!
//! The SDK is async; kmscrypter is not. [`AwsKms`] owns a current-thread
//! tokio runtime and blocks on each request.

use aws_config::profile::profile_file::{ProfileFileKind, ProfileFiles};
use aws_config::sts::AssumeRoleProvider;
use aws_config::{BehaviorVersion, ConfigLoader, Region, SdkConfig};
use aws_sdk_kms::config::Credentials;
use aws_sdk_kms::error::DisplayErrorContext;
use aws_sdk_kms::primitives::Blob;
use aws_sdk_kms::types::DataKeySpec;
use tokio::runtime::Runtime;
use tracing::{debug, trace};
use zeroize::Zeroizing;

use super::{DataKey, EncryptionContext, KeyService, UnwrappedKey};
use crate::core::constants;
use crate::core::session::{ChainedRole, CredentialContext, SdkProfile};
use crate::error::KmsError;

/// KMS client bound to one credential context.
pub struct AwsKms {
    runtime: Runtime,
    client: aws_sdk_kms::Client,
}

impl AwsKms {
    /// Build a client for `context`.
    ///
    /// `sdk` points the SDK's own discovery (ambient credentials, region) at
    /// the selected profile and shared files. No request is made here;
    /// credentials are fetched on first use.
    pub fn connect(context: &CredentialContext, sdk: &SdkProfile) -> Result<Self, KmsError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(KmsError::Runtime)?;

        let client = runtime.block_on(async {
            match context {
                CredentialContext::Ambient => {
                    let config = sdk_loader(sdk).load().await;
                    debug!(
                        profile = ?sdk.profile,
                        region = ?config.region(),
                        "KMS client with ambient credentials"
                    );
                    aws_sdk_kms::Client::new(&config)
                }
                CredentialContext::Chained(role) => chained_client(role, sdk).await,
            }
        });

        Ok(Self { runtime, client })
    }
}

/// SDK config loader reading the profile and shared files in `sdk`.
fn sdk_loader(sdk: &SdkProfile) -> ConfigLoader {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(profile) = &sdk.profile {
        loader = loader.profile_name(profile);
    }
    if sdk.has_file_overrides() {
        let files = ProfileFiles::builder();
        let files = match &sdk.config_file {
            Some(path) => files.with_file(ProfileFileKind::Config, path),
            None => files.include_default_config_file(true),
        };
        let files = match &sdk.credentials_file {
            Some(path) => files.with_file(ProfileFileKind::Credentials, path),
            None => files.include_default_credentials_file(true),
        };
        loader = loader.profile_files(files.build());
    }
    loader
}

async fn chained_client(role: &ChainedRole, sdk: &SdkProfile) -> aws_sdk_kms::Client {
    let mut loader = sdk_loader(sdk);
    if let Some(region) = &role.region {
        loader = loader.region(Region::new(region.clone()));
    }
    let base: SdkConfig = loader.load().await;

    let source = &role.source_credentials;
    let source = Credentials::new(
        source.access_key_id.clone(),
        source.secret_access_key.clone(),
        source.session_token.clone(),
        None,
        "kmscrypter-source-profile",
    );

    let provider = AssumeRoleProvider::builder(role.role_arn.clone())
        .session_name(constants::ROLE_SESSION_NAME)
        .configure(&base)
        .build_from_provider(source)
        .await;

    debug!(
        role_arn = %role.role_arn,
        region = ?base.region(),
        "KMS client with assumed role"
    );

    let config = aws_sdk_kms::config::Builder::from(&base)
        .credentials_provider(provider)
        .build();
    aws_sdk_kms::Client::from_conf(config)
}

impl KeyService for AwsKms {
    fn generate_data_key(&self, key_id: &str, context: &EncryptionContext) -> Result<DataKey, KmsError> {
        trace!(key_id, "kms:GenerateDataKey");

        let output = self
            .runtime
            .block_on(async {
                let mut request = self
                    .client
                    .generate_data_key()
                    .key_id(key_id)
                    .key_spec(DataKeySpec::from(super::DATA_KEY_SPEC));
                for (k, v) in context.iter() {
                    request = request.encryption_context(k, v);
                }
                request.send().await
            })
            .map_err(|e| KmsError::GenerateDataKey(DisplayErrorContext(&e).to_string()))?;

        let plaintext = output.plaintext.ok_or(KmsError::MissingField {
            operation: "GenerateDataKey",
            field: "Plaintext",
        })?;
        let plaintext = Zeroizing::new(plaintext.into_inner());

        let wrapped = output.ciphertext_blob.ok_or(KmsError::MissingField {
            operation: "GenerateDataKey",
            field: "CiphertextBlob",
        })?;

        Ok(DataKey {
            plaintext,
            wrapped: wrapped.into_inner(),
            key_id: output.key_id.unwrap_or_else(|| key_id.to_string()),
        })
    }

    fn decrypt(&self, wrapped: &[u8], context: &EncryptionContext) -> Result<UnwrappedKey, KmsError> {
        trace!(wrapped_len = wrapped.len(), "kms:Decrypt");

        let output = self
            .runtime
            .block_on(async {
                let mut request = self
                    .client
                    .decrypt()
                    .ciphertext_blob(Blob::new(wrapped.to_vec()));
                for (k, v) in context.iter() {
                    request = request.encryption_context(k, v);
                }
                request.send().await
            })
            .map_err(|e| KmsError::Decrypt(DisplayErrorContext(&e).to_string()))?;

        let plaintext = output.plaintext.ok_or(KmsError::MissingField {
            operation: "Decrypt",
            field: "Plaintext",
        })?;
        let plaintext = Zeroizing::new(plaintext.into_inner());

        let key_id = output.key_id.ok_or(KmsError::MissingField {
            operation: "Decrypt",
            field: "KeyId",
        })?;

        Ok(UnwrappedKey { plaintext, key_id })
    }
}
