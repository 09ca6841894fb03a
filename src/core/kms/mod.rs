//! Remote key service.
//!
//! The envelope codec needs exactly two things from KMS: a fresh data key
//! (plaintext + wrapped) and the unwrapping of a stored data key. Both are
//! behind [`KeyService`] so the codec can run against [`stub::StubKms`] in
//! tests.
//!
//! - `aws`: AWS KMS through aws-sdk-kms
//! - `stub`: in-process stand-in (test builds and the `test-kms` feature)

use std::collections::BTreeMap;
use std::fmt;

use zeroize::Zeroizing;

use crate::core::constants;
use crate::error::KmsError;

pub mod aws;
pub use aws::AwsKms;

#[cfg(any(test, feature = "test-kms"))]
pub mod stub;

/// Key spec requested for every data key.
pub const DATA_KEY_SPEC: &str = "AES_256";

/// Data key length in bytes for [`DATA_KEY_SPEC`].
pub const DATA_KEY_LEN: usize = 32;

/// Non-secret key/value pairs KMS binds into a wrapped key.
///
/// The same context must be presented on decrypt or KMS refuses to unwrap.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncryptionContext(BTreeMap<String, String>);

impl EncryptionContext {
    /// The context kmscrypter uses: `{"keyName": <secret name>}`.
    pub fn for_secret(name: &str) -> Self {
        let mut map = BTreeMap::new();
        map.insert(constants::CONTEXT_KEY_NAME.to_string(), name.to_string());
        Self(map)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Response of `GenerateDataKey`.
pub struct DataKey {
    /// Raw key bytes; wiped on drop.
    pub plaintext: Zeroizing<Vec<u8>>,
    /// The same key encrypted under the master key.
    pub wrapped: Vec<u8>,
    /// Id of the master key that wrapped it, as reported by the service.
    pub key_id: String,
}

/// Response of `Decrypt`.
pub struct UnwrappedKey {
    /// Raw key bytes; wiped on drop.
    pub plaintext: Zeroizing<Vec<u8>>,
    /// Id of the master key that unwrapped it.
    pub key_id: String,
}

impl fmt::Debug for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataKey")
            .field("wrapped_len", &self.wrapped.len())
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for UnwrappedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnwrappedKey")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

/// The two KMS operations the envelope codec consumes.
///
/// Implemented by [`AwsKms`] and by the stub used in tests.
pub trait KeyService {
    /// Generate a new 256-bit data key under `key_id`, bound to `context`.
    fn generate_data_key(&self, key_id: &str, context: &EncryptionContext) -> Result<DataKey, KmsError>;

    /// Unwrap a data key previously returned by [`generate_data_key`].
    ///
    /// [`generate_data_key`]: KeyService::generate_data_key
    fn decrypt(&self, wrapped: &[u8], context: &EncryptionContext) -> Result<UnwrappedKey, KmsError>;
}

impl<T: KeyService + ?Sized> KeyService for &T {
    fn generate_data_key(&self, key_id: &str, context: &EncryptionContext) -> Result<DataKey, KmsError> {
        (**self).generate_data_key(key_id, context)
    }

    fn decrypt(&self, wrapped: &[u8], context: &EncryptionContext) -> Result<UnwrappedKey, KmsError> {
        (**self).decrypt(wrapped, context)
    }
}
