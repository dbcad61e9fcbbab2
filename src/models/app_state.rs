use alloy::primitives::Address;
use std::sync::Arc;

use crate::config::AppEnvironment;
use crate::guards::RateLimiter;
use crate::services::explorer::DeploymentExplorer;
use crate::services::rpc::ChainReader;

/// Shared state managed by Rocket. Read-only after startup apart from the rate limiter.
pub struct AppState {
    pub chain: Arc<dyn ChainReader>,
    pub explorer: Arc<dyn DeploymentExplorer>,

    // Token whose Transfer events count as paymaster fees
    pub token_address: Option<Address>,

    /// Block explorer UI base, used to build links in responses.
    pub explorer_url: String,
    pub environment: AppEnvironment,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn address_url(&self, address: &str) -> String {
        format!("{}/address/{}", self.explorer_url, address)
    }

    pub fn tx_url(&self, hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url, hash)
    }
}
