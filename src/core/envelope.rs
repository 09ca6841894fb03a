//! Envelope encryption of a single secret value.
//!
//! A value is sealed with AES-256-GCM under a fresh KMS data key. The stored
//! form keeps only the KMS-wrapped data key next to the sealed payload:
//!
//! ```text
//! base64( zlib( json { version, wrapped_key, sealed_payload } ) )
//!                                           nonce(12) || ciphertext || tag(16)
//! ```
//!
//! The data key is bound to the secret's logical name through the KMS
//! encryption context, and the payload is bound to the master key id through
//! the AEAD associated data. Plaintext key bytes only ever live in
//! `Zeroizing` buffers that are wiped when the seal/open call returns.

use std::io::{Read, Write};

use aes_gcm::aead::{Aead, AeadCore, KeyInit, Nonce, OsRng, Payload};
use aes_gcm::Aes256Gcm;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use tracing::trace;
use zeroize::Zeroizing;

use crate::core::kms::{EncryptionContext, KeyService};
use crate::error::{EnvelopeError, Result};

const RECORD_VERSION: &str = "kmscrypter-envelope-v1";

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// AES-GCM tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Stored form of one encrypted secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeRecord {
    version: String,
    /// Data key encrypted under the KMS master key.
    pub wrapped_key: Vec<u8>,
    /// `nonce || ciphertext || tag`
    pub sealed_payload: Vec<u8>,
}

impl EnvelopeRecord {
    pub fn new(wrapped_key: Vec<u8>, sealed_payload: Vec<u8>) -> Self {
        Self {
            version: RECORD_VERSION.to_string(),
            wrapped_key,
            sealed_payload,
        }
    }

    /// Serialize, compress and base64-encode the record.
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self)
            .map_err(|e| EnvelopeError::Encryption(format!("failed to serialize record: {}", e)))?;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(&json)?;
        let compressed = encoder.finish()?;

        Ok(STANDARD.encode(compressed))
    }

    /// Inverse of [`encode`](Self::encode).
    ///
    /// Any failure along the way is a `MalformedRecord`.
    pub fn decode(encoded: &str) -> Result<Self> {
        let compressed = STANDARD
            .decode(encoded.trim())
            .map_err(|e| malformed(format!("invalid base64: {}", e)))?;

        let mut json = Vec::new();
        ZlibDecoder::new(compressed.as_slice())
            .read_to_end(&mut json)
            .map_err(|e| malformed(format!("invalid compressed stream: {}", e)))?;

        let record: Self = serde_json::from_slice(&json)
            .map_err(|e| malformed(format!("invalid record: {}", e)))?;

        if record.version != RECORD_VERSION {
            return Err(malformed(format!("unsupported version '{}'", record.version)));
        }
        record.split_payload()?;

        Ok(record)
    }

    /// Split the sealed payload into nonce and ciphertext+tag.
    fn split_payload(&self) -> Result<(&[u8], &[u8])> {
        if self.sealed_payload.len() < NONCE_LEN {
            return Err(malformed(format!(
                "sealed payload is {} bytes, shorter than the {}-byte nonce",
                self.sealed_payload.len(),
                NONCE_LEN
            )));
        }
        Ok(self.sealed_payload.split_at(NONCE_LEN))
    }
}

fn malformed(reason: String) -> crate::error::Error {
    EnvelopeError::MalformedRecord(reason).into()
}

fn cipher_for(key: &[u8]) -> Result<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key).map_err(|_| EnvelopeError::InvalidDataKey(key.len()).into())
}

/// Seal `plaintext` for the secret `name` under the master key `key_id`.
///
/// Returns the encoded record, ready to be stored as an environment value.
pub fn seal<K: KeyService + ?Sized>(kms: &K, key_id: &str, name: &str, plaintext: &str) -> Result<String> {
    let context = EncryptionContext::for_secret(name);
    let data_key = kms.generate_data_key(key_id, &context)?;
    trace!(name, key_id = %data_key.key_id, "generated data key");

    let cipher = cipher_for(&data_key.plaintext)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(
            &nonce,
            Payload {
                msg: plaintext.as_bytes(),
                aad: data_key.key_id.as_bytes(),
            },
        )
        .map_err(|e| EnvelopeError::Encryption(format!("AES-256-GCM seal failed: {}", e)))?;

    let mut sealed_payload = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    sealed_payload.extend_from_slice(&nonce);
    sealed_payload.extend_from_slice(&ciphertext);

    EnvelopeRecord::new(data_key.wrapped, sealed_payload).encode()
}

/// Open an encoded record for the secret `name`.
///
/// KMS rejects the unwrap when `name` differs from the name used to seal.
pub fn open<K: KeyService + ?Sized>(kms: &K, name: &str, encoded: &str) -> Result<String> {
    let record = EnvelopeRecord::decode(encoded)?;
    open_record(kms, name, &record)
}

/// Open an already-decoded record.
pub fn open_record<K: KeyService + ?Sized>(
    kms: &K,
    name: &str,
    record: &EnvelopeRecord,
) -> Result<String> {
    let (nonce, ciphertext) = record.split_payload()?;

    let context = EncryptionContext::for_secret(name);
    let data_key = kms.decrypt(&record.wrapped_key, &context)?;
    trace!(name, key_id = %data_key.key_id, "unwrapped data key");

    let cipher = cipher_for(&data_key.plaintext)?;

    let plaintext = Zeroizing::new(
        cipher
            .decrypt(
                Nonce::<Aes256Gcm>::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: data_key.key_id.as_bytes(),
                },
            )
            .map_err(|_| EnvelopeError::AuthenticationFailed)?,
    );

    std::str::from_utf8(&plaintext)
        .map(str::to_string)
        .map_err(|e| malformed(format!("decrypted value is not valid UTF-8: {}", e)))
}
