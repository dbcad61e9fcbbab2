use alloy::primitives::utils::format_ether;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{State, get};
use rocket_okapi::openapi;
use serde_json::Value;

use super::{ApiError, internal_error, not_found, parse_tx_hash};
use crate::guards::ClientQuota;
use crate::models::{
    AppState, ErrorBody, FidFeeResponse, GasFeeEthResponse, TokenTransactionResponse,
};
use crate::services::transaction::sum_transfer_values;

const RECEIPT_NOT_FOUND: &str =
    "Transaction receipt not found. The transaction may be pending or invalid.";

/// Transaction and receipt for a hash.
///
/// Returns 404 while the transaction has no receipt.
#[openapi(tag = "Token")]
#[get("/api/token/tx/<hash>")]
pub async fn get_token_transaction(
    state: &State<AppState>,
    hash: &str,
    _quota: ClientQuota,
) -> Result<Json<TokenTransactionResponse>, ApiError> {
    tracing::info!("Received request: GET /api/token/tx/{}", hash);
    let hash = parse_tx_hash(hash)?;

    let transaction = state
        .chain
        .get_transaction(hash)
        .await
        .map_err(|e| internal_error(state, "Failed to get transaction", e))?;
    let receipt = state
        .chain
        .get_receipt(hash)
        .await
        .map_err(|e| internal_error(state, "Failed to get transaction", e))?
        .ok_or_else(|| not_found(RECEIPT_NOT_FOUND))?;

    Ok(Json(TokenTransactionResponse {
        transaction: transaction.map(|tx| tx.raw).unwrap_or(Value::Null),
        receipt: receipt.raw,
    }))
}

/// Gas fee of a transaction in ETH (`gasUsed * effectiveGasPrice`).
#[openapi(tag = "Token")]
#[get("/api/token/tx/gasfeeeth/<hash>")]
pub async fn get_gas_fee_eth(
    state: &State<AppState>,
    hash: &str,
    _quota: ClientQuota,
) -> Result<Json<GasFeeEthResponse>, ApiError> {
    tracing::info!("Received request: GET /api/token/tx/gasfeeeth/{}", hash);
    let hash = parse_tx_hash(hash)?;

    let receipt = state
        .chain
        .get_receipt(hash)
        .await
        .map_err(|e| internal_error(state, "Failed to get gas fee", e))?
        .ok_or_else(|| not_found(RECEIPT_NOT_FOUND))?;

    Ok(Json(GasFeeEthResponse {
        gas_fee_eth: format_ether(receipt.gas_fee()),
    }))
}

/// Total FidToken moved by Transfer events of the token contract in a transaction.
///
/// With a paymaster the fee is paid by a token transfer to the paymaster, so this is the fee
/// charged in FidToken, in the token's smallest unit.
#[openapi(tag = "Token")]
#[get("/api/token/tx/gasfeefid/<hash>")]
pub async fn get_gas_fee_fid(
    state: &State<AppState>,
    hash: &str,
    _quota: ClientQuota,
) -> Result<Json<FidFeeResponse>, ApiError> {
    tracing::info!("Received request: GET /api/token/tx/gasfeefid/{}", hash);
    let hash = parse_tx_hash(hash)?;

    let receipt = state
        .chain
        .get_receipt(hash)
        .await
        .map_err(|e| internal_error(state, "Failed to get FidToken fee", e))?
        .ok_or_else(|| not_found(RECEIPT_NOT_FOUND))?;

    let Some(token) = state.token_address else {
        tracing::error!("FIDTOKEN_ADDRESS is not configured");
        return Err((
            Status::InternalServerError,
            Json(ErrorBody {
                error: "Token contract address not configured".to_string(),
                details: None,
            }),
        ));
    };

    let total = sum_transfer_values(&receipt.logs, token);
    Ok(Json(FidFeeResponse {
        fee_paid_in_fid_token: total.to_string(),
    }))
}
