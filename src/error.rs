//! Error types.
//!
//! Each concern has its own enum; [`Error`] wraps them so callers can match
//! on the layer that failed.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Kms(#[from] KmsError),

    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    /// A secret could not be sealed or opened.
    #[error("{name}: {source}")]
    Secret {
        name: String,
        #[source]
        source: Box<Error>,
    },

    #[error("failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Attach the logical secret name to an error raised while processing it.
    pub fn for_secret(name: &str, source: impl Into<Error>) -> Self {
        Error::Secret {
            name: name.to_string(),
            source: Box::new(source.into()),
        }
    }

    /// The innermost error, skipping any secret-name wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Error::Secret { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Shared config / credentials file errors.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("failed to load {}: {reason}", path.display())]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("profile '{profile}' not found in {}", path.display())]
    SectionNotFound { profile: String, path: PathBuf },

    #[error("profile '{profile}' in {} has no {key}", path.display())]
    MissingCredentials {
        profile: String,
        path: PathBuf,
        key: &'static str,
    },
}

/// Remote key service failures.
#[derive(Error, Debug)]
pub enum KmsError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("GenerateDataKey failed: {0}")]
    GenerateDataKey(String),

    #[error("Decrypt failed: {0}")]
    Decrypt(String),

    #[error("{operation} response is missing {field}")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },
}

/// Envelope encoding and AEAD failures.
#[derive(Error, Debug)]
pub enum EnvelopeError {
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("authentication failed: record was tampered with or bound to another key")]
    AuthenticationFailed,

    #[error("data key has invalid length {0}")]
    InvalidDataKey(usize),

    #[error("encryption failed: {0}")]
    Encryption(String),
}

pub type Result<T> = std::result::Result<T, Error>;
