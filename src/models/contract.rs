use alloy::primitives::{Address, B256};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::Error;

/// Logical names of the contracts this project deploys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContractName {
    FidToken,
    #[serde(rename = "zkMessages")]
    ZkMessages,
}

impl ContractName {
    pub const ALL: [ContractName; 2] = [ContractName::FidToken, ContractName::ZkMessages];

    /// Name of the compiled artifact and the label used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractName::FidToken => "FidToken",
            ContractName::ZkMessages => "zkMessages",
        }
    }

    /// Key used in the persisted environment configuration.
    pub fn env_key(&self) -> &'static str {
        match self {
            ContractName::FidToken => "FIDTOKEN_ADDRESS",
            ContractName::ZkMessages => "ZKMESSAGES_ADDRESS",
        }
    }

    /// Constant names that embed this contract's address in dependent scripts.
    pub fn constant_names(&self) -> &'static [&'static str] {
        match self {
            ContractName::FidToken => &["FIDTOKEN_ADDRESS", "TOKEN_CONTRACT_ADDRESS"],
            ContractName::ZkMessages => &["ZKMESSAGES_ADDRESS"],
        }
    }
}

impl fmt::Display for ContractName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FidToken" => Ok(ContractName::FidToken),
            "zkMessages" => Ok(ContractName::ZkMessages),
            other => Err(format!(
                "Unknown contract '{other}'. Must be 'FidToken' or 'zkMessages'"
            )),
        }
    }
}

fn address_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("static regex"))
}

/// Parses an address in canonical `0x` + 40 hex form, with no surrounding whitespace.
///
/// Stricter than `Address::from_str`, which also accepts unprefixed hex.
pub fn parse_address(raw: &str) -> Result<Address, Error> {
    if !address_pattern().is_match(raw) {
        return Err(Error::InvalidAddress(raw.to_string()));
    }
    Address::from_str(raw).map_err(|_| Error::InvalidAddress(raw.to_string()))
}

/// Logical name → deployed address. Ordered so every rewrite is deterministic.
pub type AddressMap = BTreeMap<ContractName, Address>;

/// Validates every raw address before anything is written.
pub fn validate_addresses(raw: &BTreeMap<ContractName, String>) -> Result<AddressMap, Error> {
    raw.iter()
        .map(|(name, address)| Ok((*name, parse_address(address)?)))
        .collect()
}

/// Outcome of one successful deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub contract_name: ContractName,
    pub address: Address,
    pub deployed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<B256>,
}
