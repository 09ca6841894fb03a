//! In-process key service for tests.
//!
//! Hands out random data keys whose wrapped form carries the key itself,
//! the master key id and the encryption context, so a value sealed by one
//! process opens in another. Like KMS it refuses to unwrap when the
//! encryption context differs from the one the key was generated with.
//! Nothing here is secret; it only stands in for KMS.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use aes_gcm::aead::{KeyInit, OsRng};
use aes_gcm::Aes256Gcm;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{DataKey, EncryptionContext, KeyService, UnwrappedKey};
use crate::error::KmsError;

const WRAPPED_PREFIX: &str = "stub-wrapped:";

/// Key ids containing this are treated as disabled master keys.
pub const DISABLED_MARKER: &str = "disabled";

#[derive(Serialize, Deserialize)]
struct Wrapped {
    key_id: String,
    context: BTreeMap<String, String>,
    key: String,
}

impl Wrapped {
    fn to_bytes(&self) -> Result<Vec<u8>, KmsError> {
        let json = serde_json::to_string(self)
            .map_err(|e| KmsError::GenerateDataKey(format!("stub wrap failed: {}", e)))?;
        Ok(format!("{}{}", WRAPPED_PREFIX, json).into_bytes())
    }

    fn from_bytes(wrapped: &[u8]) -> Option<Self> {
        let json = std::str::from_utf8(wrapped).ok()?.strip_prefix(WRAPPED_PREFIX)?;
        serde_json::from_str(json).ok()
    }
}

fn context_map(context: &EncryptionContext) -> BTreeMap<String, String> {
    context
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Stand-in for KMS.
#[derive(Debug, Default)]
pub struct StubKms {
    generate_calls: AtomicUsize,
    decrypt_calls: AtomicUsize,
}

impl StubKms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn decrypt_calls(&self) -> usize {
        self.decrypt_calls.load(Ordering::SeqCst)
    }
}

impl KeyService for StubKms {
    fn generate_data_key(&self, key_id: &str, context: &EncryptionContext) -> Result<DataKey, KmsError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);

        if key_id.is_empty() {
            return Err(KmsError::GenerateDataKey(
                "ValidationException: KeyId is required".to_string(),
            ));
        }
        if key_id.contains(DISABLED_MARKER) {
            return Err(KmsError::GenerateDataKey(format!(
                "DisabledException: {} is disabled",
                key_id
            )));
        }

        let key = Aes256Gcm::generate_key(OsRng);
        let plaintext = Zeroizing::new(key.to_vec());
        let wrapped = Wrapped {
            key_id: key_id.to_string(),
            context: context_map(context),
            key: STANDARD.encode(plaintext.as_slice()),
        }
        .to_bytes()?;

        Ok(DataKey {
            plaintext,
            wrapped,
            key_id: key_id.to_string(),
        })
    }

    fn decrypt(&self, wrapped: &[u8], context: &EncryptionContext) -> Result<UnwrappedKey, KmsError> {
        self.decrypt_calls.fetch_add(1, Ordering::SeqCst);

        let wrapped = Wrapped::from_bytes(wrapped)
            .ok_or_else(|| KmsError::Decrypt("InvalidCiphertextException: unknown key".to_string()))?;

        if wrapped.context != context_map(context) {
            return Err(KmsError::Decrypt(
                "InvalidCiphertextException: encryption context mismatch".to_string(),
            ));
        }

        let plaintext = STANDARD
            .decode(&wrapped.key)
            .map(Zeroizing::new)
            .map_err(|e| KmsError::Decrypt(format!("InvalidCiphertextException: {}", e)))?;

        Ok(UnwrappedKey {
            plaintext,
            key_id: wrapped.key_id,
        })
    }
}
