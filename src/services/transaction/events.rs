use alloy::primitives::{Address, U256};
use alloy::rpc::types::Log;

use crate::routes::IFidToken;

/// Sums the `value` of every Transfer event emitted by `token`.
///
/// Logs from other contracts, and logs from the token that are not Transfer events, are skipped.
pub fn sum_transfer_values(logs: &[Log], token: Address) -> U256 {
    logs.iter()
        .filter(|log| log.address() == token)
        .filter_map(|log| match log.log_decode::<IFidToken::Transfer>() {
            Ok(decoded) => Some(decoded.inner.data.value),
            Err(_) => {
                tracing::trace!("Skipping non-Transfer log from {}", token);
                None
            }
        })
        .fold(U256::ZERO, |total, value| total.saturating_add(value))
}
