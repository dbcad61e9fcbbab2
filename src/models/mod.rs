pub mod app_state;
pub mod contract;
pub mod responses;

pub use app_state::AppState;
pub use contract::{AddressMap, ContractName, DeploymentRecord, parse_address, validate_addresses};
pub use responses::{
    BalanceResponse, ContractDeploymentsResponse, DeploymentEntry, ErrorBody, FidFeeResponse,
    GasFeeEthResponse, HealthResponse, TokenTransactionResponse, WalletTransactionResponse,
};
