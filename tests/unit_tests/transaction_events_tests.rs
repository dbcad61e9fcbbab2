use alloy::primitives::{Address, U256};
use alloy::rpc::types::Log;

use crate::test_utils::{transfer_log_json, unrelated_log_json};
use zkpay::services::transaction::sum_transfer_values;

fn parse(values: Vec<serde_json::Value>) -> Vec<Log> {
    values
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap())
        .collect()
}

#[test]
fn test_rpc_logs_are_summed_per_token() {
    let token = Address::repeat_byte(0x0f);
    let other = Address::repeat_byte(0x10);
    let from = Address::repeat_byte(0xaa);
    let to = Address::repeat_byte(0xbb);

    let logs = parse(vec![
        transfer_log_json(token, from, to, 100),
        transfer_log_json(other, from, to, 1_000),
        unrelated_log_json(token),
        transfer_log_json(token, to, from, 250),
    ]);

    assert_eq!(sum_transfer_values(&logs, token), U256::from(350u64));
    assert_eq!(sum_transfer_values(&logs, other), U256::from(1_000u64));
    assert_eq!(
        sum_transfer_values(&logs, Address::repeat_byte(0x11)),
        U256::ZERO
    );
}

#[test]
fn test_no_logs_sum_to_zero() {
    assert_eq!(
        sum_transfer_values(&[], Address::repeat_byte(0x0f)),
        U256::ZERO
    );
}
