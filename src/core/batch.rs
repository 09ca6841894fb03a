//! Encrypt or decrypt every marked variable of an environment.
//!
//! `NAME_PLAINTEXT` variables are sealed into `NAME_KMS`; `NAME_KMS`
//! variables are opened back into `NAME`. Both directions stop at the first
//! failing entry and return nothing else, so a run never emits a half
//! transformed environment.

use std::fmt;

use tracing::debug;
use zeroize::Zeroize;

use crate::core::constants::{ENCRYPTED_SUFFIX, PLAINTEXT_SUFFIX};
use crate::core::envelope;
use crate::core::kms::KeyService;
use crate::error::{Error, Result};

/// One environment variable.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretEntry {
    pub name: String,
    pub value: String,
}

impl SecretEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Name without `suffix`, if it carries it.
    fn logical_name(&self, suffix: &str) -> Option<&str> {
        self.name.strip_suffix(suffix)
    }
}

impl Drop for SecretEntry {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

impl fmt::Debug for SecretEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretEntry")
            .field("name", &self.name)
            .field("value_len", &self.value.len())
            .finish()
    }
}

/// Entries whose name ends with `suffix`, in input order.
pub fn scan<I, K, V>(pairs: I, suffix: &str) -> Vec<SecretEntry>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| SecretEntry::new(k, v))
        .filter(|entry| entry.name.ends_with(suffix))
        .collect()
}

/// The current process environment, skipping variables that are not UTF-8.
pub fn process_env() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

/// Does the environment hold anything the given direction would touch?
pub fn has_targets(pairs: &[(String, String)], suffix: &str) -> bool {
    pairs.iter().any(|(k, _)| k.ends_with(suffix))
}

/// Seal every `*_PLAINTEXT` entry under `key_id`, renaming it to `*_KMS`.
///
/// Other entries are dropped from the output.
pub fn encrypt_all<K, I, N, V>(kms: &K, key_id: &str, pairs: I) -> Result<Vec<SecretEntry>>
where
    K: KeyService + ?Sized,
    I: IntoIterator<Item = (N, V)>,
    N: Into<String>,
    V: Into<String>,
{
    let targets = scan(pairs, PLAINTEXT_SUFFIX);
    debug!(count = targets.len(), "encrypting variables");

    targets
        .iter()
        .map(|entry| {
            let name = entry
                .logical_name(PLAINTEXT_SUFFIX)
                .unwrap_or(entry.name.as_str());
            let sealed = envelope::seal(kms, key_id, name, &entry.value)
                .map_err(|e| Error::for_secret(name, e))?;
            Ok(SecretEntry::new(format!("{}{}", name, ENCRYPTED_SUFFIX), sealed))
        })
        .collect()
}

/// Open every `*_KMS` entry, renaming it to its logical name.
///
/// Fails on the first entry that cannot be opened.
pub fn decrypt_all<K, I, N, V>(kms: &K, pairs: I) -> Result<Vec<SecretEntry>>
where
    K: KeyService + ?Sized,
    I: IntoIterator<Item = (N, V)>,
    N: Into<String>,
    V: Into<String>,
{
    let targets = scan(pairs, ENCRYPTED_SUFFIX);
    debug!(count = targets.len(), "decrypting variables");

    targets
        .iter()
        .map(|entry| {
            let name = entry
                .logical_name(ENCRYPTED_SUFFIX)
                .unwrap_or(entry.name.as_str());
            let plaintext =
                envelope::open(kms, name, &entry.value).map_err(|e| Error::for_secret(name, e))?;
            Ok(SecretEntry::new(name, plaintext))
        })
        .collect()
}
