//! kmscrypter - envelope encryption of environment variables with AWS KMS.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── output        # export lines and diagnostics
//! │   └── run           # run a command with the variables injected
//! └── core/             # Core library components
//!     ├── config        # settings from the environment, shared file paths
//!     ├── profile       # ~/.aws/config + ~/.aws/credentials resolution
//!     ├── session       # ambient vs. assumed-role credentials
//!     ├── kms/          # Key service
//!     │   ├── mod       # KeyService trait
//!     │   ├── aws       # AWS KMS implementation
//!     │   └── stub      # in-process stand-in for tests
//!     ├── envelope      # AES-256-GCM seal/open and the record encoding
//!     └── batch         # *_PLAINTEXT -> *_KMS and back
//! ```
//!
//! # Features
//!
//! - Per-secret data keys from KMS `GenerateDataKey`, bound to the secret name
//! - AES-256-GCM with the master key id as associated data
//! - AWS CLI compatible profile and `source_profile` role chaining
//! - Data keys wiped from memory on every exit path

pub mod cli;
pub mod core;
pub mod error;
