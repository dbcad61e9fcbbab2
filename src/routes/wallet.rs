use alloy::primitives::utils::format_ether;
use rocket::serde::json::Json;
use rocket::{State, get};
use rocket_okapi::openapi;

use super::{ApiError, internal_error, not_found, parse_path_address, parse_tx_hash};
use crate::guards::ClientQuota;
use crate::models::{
    AppState, BalanceResponse, ContractDeploymentsResponse, DeploymentEntry,
    WalletTransactionResponse,
};

/// Native balance of a wallet in ETH.
#[openapi(tag = "Wallet")]
#[get("/api/wallet/balance/<address>")]
pub async fn get_balance(
    state: &State<AppState>,
    address: &str,
    _quota: ClientQuota,
) -> Result<Json<BalanceResponse>, ApiError> {
    tracing::info!("Received request: GET /api/wallet/balance/{}", address);
    let parsed = parse_path_address(address)?;

    let balance = state
        .chain
        .get_balance(parsed)
        .await
        .map_err(|e| internal_error(state, "Failed to get wallet balance", e))?;

    Ok(Json(BalanceResponse {
        balance: format_ether(balance),
        explorer_url: state.address_url(address),
    }))
}

/// Transaction fields with the containing block's timestamp.
#[openapi(tag = "Wallet")]
#[get("/api/wallet/tx/<hash>")]
pub async fn get_wallet_transaction(
    state: &State<AppState>,
    hash: &str,
    _quota: ClientQuota,
) -> Result<Json<WalletTransactionResponse>, ApiError> {
    tracing::info!("Received request: GET /api/wallet/tx/{}", hash);
    let parsed = parse_tx_hash(hash)?;

    let tx = state
        .chain
        .get_transaction(parsed)
        .await
        .map_err(|e| internal_error(state, "Failed to get transaction", e))?
        .ok_or_else(|| not_found("Transaction not found"))?;

    let timestamp = match tx.block_number {
        Some(number) => state
            .chain
            .get_block_timestamp(number)
            .await
            .map_err(|e| internal_error(state, "Failed to get transaction", e))?,
        None => None,
    };

    Ok(Json(WalletTransactionResponse {
        hash: tx.hash.to_string(),
        from: tx.from.to_string(),
        to: tx.to.map(|to| to.to_string()),
        value: tx.value.to_string(),
        nonce: tx.nonce.to_string(),
        gas_limit: tx.gas.map(|gas| gas.to_string()),
        gas_price: tx.gas_price.map(|price| price.to_string()),
        data: tx.input.to_string(),
        chain_id: tx.chain_id.map(|id| id.to_string()),
        block_number: tx.block_number.map(|n| n.to_string()),
        block_hash: tx.block_hash.map(|h| h.to_string()),
        timestamp: timestamp.map(|t| t.to_string()),
        explorer_url: state.tx_url(hash),
    }))
}

/// Contracts deployed by a wallet, most recent first.
#[openapi(tag = "Wallet")]
#[get("/api/wallet/contract/deployment/<address>")]
pub async fn get_contract_deployments(
    state: &State<AppState>,
    address: &str,
    _quota: ClientQuota,
) -> Result<Json<ContractDeploymentsResponse>, ApiError> {
    tracing::info!(
        "Received request: GET /api/wallet/contract/deployment/{}",
        address
    );
    let parsed = parse_path_address(address)?;

    let mut found = state
        .explorer
        .contract_deployments(parsed)
        .await
        .map_err(|e| internal_error(state, "Failed to get contract deployments", e))?;
    found.sort_by(|a, b| b.block_number.cmp(&a.block_number));

    let deployments: Vec<DeploymentEntry> = found
        .into_iter()
        .map(|d| DeploymentEntry {
            explorer_url: state.tx_url(&d.transaction_hash),
            contract_address: d.contract_address,
            transaction_hash: d.transaction_hash,
            block_number: d.block_number,
            timestamp: d.timestamp,
        })
        .collect();

    Ok(Json(ContractDeploymentsResponse {
        address: address.to_string(),
        total_deployments: deployments.len(),
        deployments,
    }))
}
