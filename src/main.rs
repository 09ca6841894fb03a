//! kmscrypter - envelope-encrypt environment variables with AWS KMS.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kmscrypter::cli::output;
use kmscrypter::cli::{execute, Cli};
use kmscrypter::core::constants::EXIT_SPAWN_FAILURE;
use kmscrypter::error::{EnvelopeError, Error};

fn main() {
    let cli = Cli::parse();

    // stdout is reserved for export lines
    let filter = EnvFilter::try_from_env("KMSCRYPTER_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("kmscrypter=debug")
        } else {
            EnvFilter::new("kmscrypter=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match execute(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            let suggestion = match e.root() {
                Error::Kms(_) => Some("check AWS credentials, region and KMS key permissions"),
                Error::Envelope(EnvelopeError::MalformedRecord(_)) => {
                    Some("the *_KMS value must be produced by kmscrypter")
                }
                Error::Envelope(EnvelopeError::AuthenticationFailed) => {
                    Some("the value was modified or sealed under a different KMS key")
                }
                _ => None,
            };

            output::error(&e.to_string());
            if let Some(hint) = suggestion {
                output::hint(hint);
            }

            let code = match e {
                Error::Spawn { .. } => EXIT_SPAWN_FAILURE,
                _ => 1,
            };
            std::process::exit(code);
        }
    }
}
