use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Transaction and receipt exactly as the node returned them.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct TokenTransactionResponse {
    pub transaction: Value,
    pub receipt: Value,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GasFeeEthResponse {
    pub gas_fee_eth: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FidFeeResponse {
    pub fee_paid_in_fid_token: String, // smallest token units
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub balance: String,
    pub explorer_url: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletTransactionResponse {
    pub hash: String,
    pub from: String,
    pub to: Option<String>,
    pub value: String,
    pub nonce: String,
    pub gas_limit: Option<String>,
    pub gas_price: Option<String>,
    pub data: String,
    pub chain_id: Option<String>,
    pub block_number: Option<String>,
    pub block_hash: Option<String>,
    pub timestamp: Option<String>,
    pub explorer_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentEntry {
    pub contract_address: Option<String>,
    pub transaction_hash: String,
    pub block_number: u64,
    pub timestamp: u64,
    pub explorer_url: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContractDeploymentsResponse {
    pub address: String,
    pub total_deployments: usize,
    pub deployments: Vec<DeploymentEntry>,
}
