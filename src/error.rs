use alloy::primitives::{Address, B256};
use thiserror::Error;

use crate::models::ContractName;
use crate::services::propagation::PropagationReport;

/// Errors shared by the deployment pipeline, the CLIs and the API.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed configuration value. Fatal before any chain call.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Insufficient funds: wallet {address} has zero balance")]
    InsufficientFunds { address: Address },

    /// RPC or explorer call failed. Never retried automatically.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid address '{0}': expected 0x followed by 40 hex characters")]
    InvalidAddress(String),

    #[error("Artifact error: {0}")]
    Artifact(String),

    #[error("Cannot deploy {contract}: dependency {dependency} has no known address")]
    MissingDependency {
        contract: ContractName,
        dependency: ContractName,
    },

    #[error("Deployment of {contract} failed: {reason}")]
    Deployment {
        contract: ContractName,
        reason: String,
    },

    #[error("Transaction {0} reverted")]
    Reverted(B256),

    #[error("Unit conversion error: {0}")]
    UnitConversion(String),

    #[error("Address propagation incomplete: {0}")]
    Propagation(PropagationReport),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
