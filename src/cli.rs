//! Plumbing shared by the binaries: tracing and sentry setup, address lookup and the
//! log-then-exit failure path.

use alloy::primitives::Address;
use std::process::ExitCode;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::logger::{ERROR_CHANNEL, RunLog};
use crate::models::ContractName;
use crate::services::propagation::AddressBook;

/// Installs the fmt subscriber (`RUST_LOG`, default `info`) and sentry when `SENTRY_DSN` is
/// set. Keep the returned guard alive for the whole run.
pub fn init_tracing() -> sentry::ClientInitGuard {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    // A second init (tests, several binaries in one process) keeps the first subscriber
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let dsn = std::env::var("SENTRY_DSN")
        .ok()
        .and_then(|s| s.parse().ok());
    sentry::init(sentry::ClientOptions {
        dsn,
        release: sentry::release_name!(),
        ..Default::default()
    })
}

/// Address of a logical contract: the address book first, then the environment.
pub fn resolve_contract_address(config: &Config, name: ContractName) -> Result<Option<Address>> {
    let book = AddressBook::load(&config.address_book)?;
    Ok(book.address(name).or(config.contract_address(name)))
}

pub fn require_contract_address(config: &Config, name: ContractName) -> Result<Address> {
    resolve_contract_address(config, name)?.ok_or_else(|| {
        Error::Configuration(format!(
            "{name} address not found in {} or {}",
            config.address_book.display(),
            name.env_key()
        ))
    })
}

/// Logs a failed run to its channel and the shared error channel.
pub fn report_failure(log: &RunLog, channel: &str, error: &Error) {
    tracing::error!("{} failed: {}", channel, error);
    sentry::capture_message(&format!("{channel} failed: {error}"), sentry::Level::Error);

    for target in [channel, ERROR_CHANNEL] {
        if let Err(e) = log.log(target, &format!("Error: {error}")) {
            tracing::warn!("Could not write to {} log: {}", target, e);
        }
    }
}

/// Maps a run's result to the process exit code, reporting the failure first.
pub fn finish(log: &RunLog, channel: &str, result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_failure(log, channel, &e);
            ExitCode::FAILURE
        }
    }
}
