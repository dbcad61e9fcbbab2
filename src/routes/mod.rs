use alloy::primitives::{Address, B256};
use alloy::sol;
use rocket::Route;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket_okapi::okapi::openapi3::OpenApi;
use rocket_okapi::openapi_get_routes_spec;
use rocket_okapi::settings::OpenApiSettings;
use std::fmt::Display;
use std::str::FromStr;

use crate::models::{AppState, ErrorBody};

pub mod health;
pub mod token;
pub mod wallet;

pub use health::*;
pub use token::*;
pub use wallet::*;

// Contract interfaces shared by the routes and the scripts
sol! {
    interface IFidToken {
        function approve(address spender, uint256 amount) external returns (bool);
        function mint(address to, uint256 amount) external;
        function balanceOf(address account) external view returns (uint256 balance);
        event Transfer(address indexed from, address indexed to, uint256 value);
    }

    interface IZkMessages {
        function sendMessage(string message) external;
        function getLastMessage() external view returns (string);
    }

    interface IPaymasterFlow {
        function general(bytes input) external;
        function approvalBased(address token, uint256 minAllowance, bytes innerInput) external;
    }
}

/// Error half of every handler result.
pub type ApiError = (Status, Json<ErrorBody>);

/// Generic 500 detail shown outside development.
pub const GENERIC_ERROR_DETAILS: &str = "Something went wrong";

pub(crate) fn not_found(message: &str) -> ApiError {
    (
        Status::NotFound,
        Json(ErrorBody {
            error: message.to_string(),
            details: None,
        }),
    )
}

pub(crate) fn bad_request(message: String) -> ApiError {
    (
        Status::BadRequest,
        Json(ErrorBody {
            error: message,
            details: None,
        }),
    )
}

/// 500 response. Full error text only in development.
pub(crate) fn internal_error(state: &AppState, error: &str, cause: impl Display) -> ApiError {
    let cause = cause.to_string();
    tracing::error!("{}: {}", error, cause);
    sentry::capture_message(&format!("{error}: {cause}"), sentry::Level::Error);

    let details = if state.environment.is_development() {
        cause
    } else {
        GENERIC_ERROR_DETAILS.to_string()
    };
    (
        Status::InternalServerError,
        Json(ErrorBody {
            error: error.to_string(),
            details: Some(details),
        }),
    )
}

pub(crate) fn parse_tx_hash(raw: &str) -> Result<B256, ApiError> {
    let trimmed = raw.trim();
    if trimmed.len() != 66 || !trimmed.starts_with("0x") {
        return Err(bad_request(format!("Invalid transaction hash: {raw}")));
    }
    B256::from_str(trimmed).map_err(|e| bad_request(format!("Invalid transaction hash: {e}")))
}

pub(crate) fn parse_path_address(raw: &str) -> Result<Address, ApiError> {
    crate::models::parse_address(raw).map_err(|e| bad_request(e.to_string()))
}

/// Every documented route plus the OpenAPI document describing them.
pub fn api_routes(settings: &OpenApiSettings) -> (Vec<Route>, OpenApi) {
    let settings = settings.clone();
    openapi_get_routes_spec![
        settings:
        health::health,
        token::get_token_transaction,
        token::get_gas_fee_eth,
        token::get_gas_fee_fid,
        wallet::get_balance,
        wallet::get_wallet_transaction,
        wallet::get_contract_deployments,
    ]
}
