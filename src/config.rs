use alloy::primitives::Address;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::models::{ContractName, parse_address};

pub const DEFAULT_API_PORT: u16 = 8080;
pub const DEFAULT_EXPLORER_URL: &str = "https://sepolia.explorer.zksync.io";
pub const DEFAULT_EXPLORER_API_URL: &str = "https://block-explorer-api.sepolia.zksync.dev";
pub const DEFAULT_PAYMASTER_ADDRESS: &str = "0x3cb2b87d10ac01736a65688f3e0fb1b070b3eea3";
pub const DEFAULT_ENV_FILE: &str = ".env";
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts-zk";
pub const DEFAULT_ADDRESS_BOOK: &str = "deployments/addresses.json";
pub const DEFAULT_RATE_LIMIT_MAX: u32 = 100;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 15 * 60;

/// Controls how much error detail the API exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnvironment {
    Development,
    #[default]
    Production,
}

impl AppEnvironment {
    fn parse(raw: &str) -> Result<Self> {
        match raw.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(Error::Configuration(format!(
                "Invalid APP_ENV value '{raw}'. Must be 'development' or 'production'"
            ))),
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Process-wide configuration, built once at startup and passed explicitly to every component.
#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: Option<String>,
    pub private_key: Option<String>,
    pub fidtoken_address: Option<Address>,
    pub zkmessages_address: Option<Address>,
    pub paymaster_address: Address,
    pub wallet_address: Option<String>,
    pub api_port: u16,
    pub explorer_url: String,
    pub explorer_api_url: String,
    pub environment: AppEnvironment,
    pub log_dir: PathBuf,
    pub env_file: PathBuf,
    pub artifacts_dir: PathBuf,
    pub address_book: PathBuf,
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
}

impl Config {
    /// Loads the env file (if present) into the process environment, then reads it.
    pub fn from_env() -> Result<Self> {
        let env_file = env::var("ENV_FILE").unwrap_or_else(|_| DEFAULT_ENV_FILE.to_string());
        match dotenvy::from_path(&env_file) {
            Ok(()) => tracing::debug!("Loaded environment from {}", env_file),
            Err(e) if e.not_found() => {
                tracing::debug!("No env file at {}, using process environment", env_file)
            }
            Err(e) => {
                return Err(Error::Configuration(format!(
                    "Failed to load env file {env_file}: {e}"
                )));
            }
        }

        Self::from_map(&env::vars().collect())
    }

    /// Builds a configuration from explicit key/value pairs. Empty values count as unset.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let contract_address = |name: ContractName| -> Result<Option<Address>> {
            get(name.env_key())
                .map(|raw| {
                    parse_address(&raw).map_err(|_| {
                        Error::Configuration(format!(
                            "{} is not a valid address: '{raw}'",
                            name.env_key()
                        ))
                    })
                })
                .transpose()
        };

        let paymaster_raw =
            get("PAYMASTER_ADDRESS").unwrap_or_else(|| DEFAULT_PAYMASTER_ADDRESS.to_string());
        let paymaster_address = parse_address(&paymaster_raw).map_err(|_| {
            Error::Configuration(format!(
                "PAYMASTER_ADDRESS is not a valid address: '{paymaster_raw}'"
            ))
        })?;

        let api_port = match get("API_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| {
                Error::Configuration(format!("Invalid API_PORT '{raw}': {e}"))
            })?,
            None => DEFAULT_API_PORT,
        };

        let rate_limit_max = match get("RATE_LIMIT_MAX") {
            Some(raw) => raw.parse::<u32>().map_err(|e| {
                Error::Configuration(format!("Invalid RATE_LIMIT_MAX '{raw}': {e}"))
            })?,
            None => DEFAULT_RATE_LIMIT_MAX,
        };

        let rate_limit_window_secs = match get("RATE_LIMIT_WINDOW_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                Error::Configuration(format!("Invalid RATE_LIMIT_WINDOW_SECS '{raw}': {e}"))
            })?,
            None => DEFAULT_RATE_LIMIT_WINDOW_SECS,
        };

        let environment = match get("APP_ENV") {
            Some(raw) => AppEnvironment::parse(&raw)?,
            None => AppEnvironment::default(),
        };

        Ok(Self {
            rpc_url: get("RPC_URL"),
            private_key: get("PRIVATE_KEY"),
            fidtoken_address: contract_address(ContractName::FidToken)?,
            zkmessages_address: contract_address(ContractName::ZkMessages)?,
            paymaster_address,
            wallet_address: get("WALLET_ADDRESS"),
            api_port,
            explorer_url: get("EXPLORER_URL")
                .unwrap_or_else(|| DEFAULT_EXPLORER_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            explorer_api_url: get("EXPLORER_API_URL")
                .unwrap_or_else(|| DEFAULT_EXPLORER_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            environment,
            log_dir: get("LOG_DIR")
                .unwrap_or_else(|| crate::logger::DEFAULT_LOG_DIR.to_string())
                .into(),
            env_file: get("ENV_FILE")
                .unwrap_or_else(|| DEFAULT_ENV_FILE.to_string())
                .into(),
            artifacts_dir: get("ARTIFACTS_DIR")
                .unwrap_or_else(|| DEFAULT_ARTIFACTS_DIR.to_string())
                .into(),
            address_book: get("ADDRESS_BOOK")
                .unwrap_or_else(|| DEFAULT_ADDRESS_BOOK.to_string())
                .into(),
            rate_limit_max,
            rate_limit_window: Duration::from_secs(rate_limit_window_secs),
        })
    }

    /// RPC endpoint for any chain-touching operation.
    pub fn require_rpc_url(&self) -> Result<&str> {
        self.rpc_url
            .as_deref()
            .ok_or_else(|| Error::Configuration("RPC_URL not configured".to_string()))
    }

    pub fn require_private_key(&self) -> Result<&str> {
        self.private_key
            .as_deref()
            .ok_or_else(|| Error::Configuration("PRIVATE_KEY not configured".to_string()))
    }

    /// Address configured through the environment for a logical contract.
    pub fn contract_address(&self, name: ContractName) -> Option<Address> {
        match name {
            ContractName::FidToken => self.fidtoken_address,
            ContractName::ZkMessages => self.zkmessages_address,
        }
    }
}
