use alloy::primitives::Address;
use rocket::State;
use rocket::http::Status;
use std::sync::Arc;

use crate::test_utils::{
    MockChainReader, MockExplorer, UNKNOWN_HASH, hash, receipt_json, test_app_state,
    transaction_json, transfer_log_json, unrelated_log_json,
};
use zkpay::guards::ClientQuota;
use zkpay::routes::GENERIC_ERROR_DETAILS;
use zkpay::routes::token::{get_gas_fee_eth, get_gas_fee_fid, get_token_transaction};

fn token() -> Address {
    Address::repeat_byte(0x0f)
}

fn quota() -> ClientQuota {
    ClientQuota(99)
}

#[tokio::test]
async fn test_gas_fee_routes_return_404_without_receipt() {
    let test_state = test_app_state(
        Arc::new(MockChainReader::default()),
        Arc::new(MockExplorer::default()),
        Some(token()),
    );
    let state = State::from(&test_state);

    let (status, body) = get_gas_fee_eth(state, UNKNOWN_HASH, quota())
        .await
        .unwrap_err();
    assert_eq!(status, Status::NotFound);
    assert!(body.error.contains("receipt not found"));

    let (status, _) = get_gas_fee_fid(state, UNKNOWN_HASH, quota())
        .await
        .unwrap_err();
    assert_eq!(status, Status::NotFound);

    let (status, _) = get_token_transaction(state, UNKNOWN_HASH, quota())
        .await
        .unwrap_err();
    assert_eq!(status, Status::NotFound);
}

#[tokio::test]
async fn test_fee_in_fid_sums_token_transfers() {
    let chain = Arc::new(MockChainReader::default());
    let tx = hash(0x21);
    let payer = Address::repeat_byte(0xaa);
    let paymaster = Address::repeat_byte(0xbb);
    chain.insert_receipt(
        tx,
        receipt_json(
            tx,
            21_000,
            25_000_000,
            vec![
                transfer_log_json(token(), payer, paymaster, 100),
                // same event from another contract is not counted
                transfer_log_json(Address::repeat_byte(0x33), payer, paymaster, 7_000),
                unrelated_log_json(token()),
                transfer_log_json(token(), payer, paymaster, 250),
            ],
        ),
    );
    let test_state = test_app_state(chain, Arc::new(MockExplorer::default()), Some(token()));
    let state = State::from(&test_state);

    let response = get_gas_fee_fid(state, &tx.to_string(), quota())
        .await
        .unwrap()
        .into_inner();
    assert_eq!(response.fee_paid_in_fid_token, "350");

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["feePaidInFidToken"], "350");
}

#[tokio::test]
async fn test_fee_in_fid_is_zero_without_transfers() {
    let chain = Arc::new(MockChainReader::default());
    let tx = hash(0x22);
    chain.insert_receipt(tx, receipt_json(tx, 21_000, 25_000_000, vec![]));
    let test_state = test_app_state(chain, Arc::new(MockExplorer::default()), Some(token()));

    let response = get_gas_fee_fid(State::from(&test_state), &tx.to_string(), quota())
        .await
        .unwrap()
        .into_inner();
    assert_eq!(response.fee_paid_in_fid_token, "0");
}

#[tokio::test]
async fn test_fee_in_fid_requires_token_address() {
    let chain = Arc::new(MockChainReader::default());
    let tx = hash(0x23);
    chain.insert_receipt(tx, receipt_json(tx, 21_000, 25_000_000, vec![]));
    let test_state = test_app_state(chain, Arc::new(MockExplorer::default()), None);

    let (status, body) = get_gas_fee_fid(State::from(&test_state), &tx.to_string(), quota())
        .await
        .unwrap_err();
    assert_eq!(status, Status::InternalServerError);
    assert_eq!(body.error, "Token contract address not configured");
}

#[tokio::test]
async fn test_gas_fee_in_eth() {
    let chain = Arc::new(MockChainReader::default());
    let tx = hash(0x24);
    // 21000 gas at 0.025 gwei
    chain.insert_receipt(tx, receipt_json(tx, 21_000, 25_000_000, vec![]));
    let test_state = test_app_state(chain, Arc::new(MockExplorer::default()), None);

    let response = get_gas_fee_eth(State::from(&test_state), &tx.to_string(), quota())
        .await
        .unwrap()
        .into_inner();
    assert_eq!(response.gas_fee_eth, "0.000000525000000000");
}

#[tokio::test]
async fn test_token_transaction_returns_raw_node_objects() {
    let chain = Arc::new(MockChainReader::default());
    let tx = hash(0x25);
    chain.insert_transaction(tx, transaction_json(tx, Some(16)));
    chain.insert_receipt(tx, receipt_json(tx, 21_000, 25_000_000, vec![]));
    let test_state = test_app_state(chain, Arc::new(MockExplorer::default()), None);

    let response = get_token_transaction(State::from(&test_state), &tx.to_string(), quota())
        .await
        .unwrap()
        .into_inner();
    assert_eq!(response.transaction["type"], "0x71");
    assert_eq!(response.receipt["l1BatchNumber"], "0x3");
}

#[tokio::test]
async fn test_invalid_hash_is_bad_request() {
    let test_state = crate::test_utils::empty_app_state();
    let state = State::from(&test_state);

    for raw in ["0x1234", "not-a-hash", ""] {
        let (status, _) = get_gas_fee_eth(state, raw, quota()).await.unwrap_err();
        assert_eq!(status, Status::BadRequest, "hash {raw:?}");
    }
}

#[tokio::test]
async fn test_rpc_failure_is_500_with_details_in_development() {
    let chain = Arc::new(MockChainReader::default());
    chain.fail_with("connection refused");
    let test_state = test_app_state(chain, Arc::new(MockExplorer::default()), Some(token()));

    let (status, body) = get_gas_fee_eth(State::from(&test_state), UNKNOWN_HASH, quota())
        .await
        .unwrap_err();
    assert_eq!(status, Status::InternalServerError);
    assert!(
        body.details
            .as_deref()
            .unwrap()
            .contains("connection refused")
    );
}

#[tokio::test]
async fn test_rpc_failure_details_hidden_in_production() {
    let chain = Arc::new(MockChainReader::default());
    chain.fail_with("connection refused");
    let mut test_state = test_app_state(chain, Arc::new(MockExplorer::default()), None);
    test_state.environment = zkpay::config::AppEnvironment::Production;

    let (status, body) = get_token_transaction(State::from(&test_state), UNKNOWN_HASH, quota())
        .await
        .unwrap_err();
    assert_eq!(status, Status::InternalServerError);
    assert_eq!(body.details.as_deref(), Some(GENERIC_ERROR_DETAILS));
}
