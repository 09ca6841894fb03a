//! Core library components.
//!
//! Profile resolution, credential selection, the KMS key service and the
//! envelope codec, independent of the command line.

pub mod batch;
pub mod config;
pub mod constants;
pub mod envelope;
pub mod kms;
pub mod profile;
pub mod session;
