use alloy::primitives::Address;
use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Error, Result};

/// One contract deployment as reported by the block explorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerDeployment {
    pub contract_address: Option<String>,
    pub transaction_hash: String,
    pub block_number: u64,
    pub timestamp: u64,
}

#[async_trait]
pub trait DeploymentExplorer: Send + Sync {
    /// Contract deployments sent by `address`, most recent block first.
    async fn contract_deployments(&self, address: Address) -> Result<Vec<ExplorerDeployment>>;
}

/// Etherscan-style explorer API (`/api?module=account&action=txlist`).
pub struct HttpExplorer {
    client: reqwest::Client,
    api_base: String,
}

impl HttpExplorer {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl DeploymentExplorer for HttpExplorer {
    async fn contract_deployments(&self, address: Address) -> Result<Vec<ExplorerDeployment>> {
        let url = format!("{}/api", self.api_base);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("module", "account"),
                ("action", "txlist"),
                ("address", &address.to_string()),
                ("txtype", "contract_deployment"),
            ])
            .send()
            .await
            .map_err(|e| Error::Network(format!("Explorer request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "Explorer API returned {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::Network(format!("Invalid explorer response: {e}")))?;
        tracing::debug!("Explorer response for {}: {}", address, body);

        Ok(parse_deployments(&body))
    }
}

fn lenient_u64(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or_default(),
        Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    }
}

/// Reads the `result` array of an explorer response. Anything other than an array means no
/// deployments.
pub fn parse_deployments(body: &Value) -> Vec<ExplorerDeployment> {
    let Some(entries) = body.get("result").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut deployments: Vec<ExplorerDeployment> = entries
        .iter()
        .map(|entry| ExplorerDeployment {
            contract_address: entry
                .get("contractAddress")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            transaction_hash: entry
                .get("hash")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            block_number: lenient_u64(entry.get("blockNumber")),
            timestamp: lenient_u64(entry.get("timestamp")),
        })
        .collect();

    deployments.sort_by(|a, b| b.block_number.cmp(&a.block_number));
    deployments
}
