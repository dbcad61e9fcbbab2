use alloy::primitives::{Address, U256};
use alloy::sol_types::{SolCall, SolValue};
use std::fs;

use crate::test_utils::MockZkChain;
use zkpay::Error;
use zkpay::cli;
use zkpay::logger::{ERROR_CHANNEL, RunLog};
use zkpay::routes::{IFidToken, IZkMessages};
use zkpay::services::paymaster::{
    APPROVAL_ALLOWANCE, DEFAULT_MESSAGE, GAS_PER_PUBDATA, MINIMAL_ALLOWANCE, PRIORITY_FEE_PER_GAS,
    PaymasterDriver, SponsoredMessage, approval_based_input,
};
use zkpay::services::zksync::CallTarget;

const EXPLORER: &str = "https://sepolia.explorer.zksync.io";

fn request() -> SponsoredMessage {
    SponsoredMessage {
        token: Address::repeat_byte(0x0f),
        messages: Address::repeat_byte(0x0e),
        paymaster: Address::repeat_byte(0x0d),
        text: DEFAULT_MESSAGE.to_string(),
    }
}

fn chain_returning(message: &str) -> MockZkChain {
    let chain = MockZkChain::default();
    chain.set_call_result(
        IZkMessages::getLastMessageCall::SELECTOR,
        (message.to_string(),).abi_encode_params(),
    );
    chain
}

#[tokio::test]
async fn test_sponsored_message_carries_paymaster_params() {
    let dir = tempfile::tempdir().unwrap();
    let log = RunLog::new(dir.path());
    let chain = chain_returning(DEFAULT_MESSAGE);
    let request = request();

    let driver = PaymasterDriver::new(&chain, EXPLORER, log.channel("paymaster-transaction"));
    let summary = driver.send_sponsored_message(&request).await.unwrap();

    let sent = chain.sent();
    assert_eq!(sent.len(), 1, "exactly one transaction");
    let call = &sent[0];

    match &call.target {
        CallTarget::Contract { to, data } => {
            assert_eq!(*to, request.messages);
            let decoded = IZkMessages::sendMessageCall::abi_decode(data).unwrap();
            assert_eq!(decoded.message, DEFAULT_MESSAGE);
        }
        other => panic!("expected a contract call, got {other:?}"),
    }

    let paymaster = call.paymaster.as_ref().unwrap();
    assert_eq!(paymaster.paymaster, request.paymaster);
    assert_eq!(
        paymaster.paymaster_input,
        approval_based_input(request.token, MINIMAL_ALLOWANCE)
    );
    assert_eq!(call.gas_per_pubdata, Some(GAS_PER_PUBDATA));

    let fees = call.fees.unwrap();
    assert_eq!(fees.max_fee_per_gas, chain.gas_price + PRIORITY_FEE_PER_GAS);
    assert_eq!(fees.max_priority_fee_per_gas, PRIORITY_FEE_PER_GAS);
    assert_eq!(call.gas_limit, Some(chain.gas_estimate));

    // estimated with the same paymaster params, before a limit was set
    let estimated = chain.estimated();
    assert_eq!(estimated.len(), 1);
    assert!(estimated[0].paymaster.is_some());
    assert!(estimated[0].gas_limit.is_none());

    assert_eq!(summary.gas_used, chain.gas_used);
    assert_eq!(
        summary.fee_in_token,
        U256::from(chain.gas_used) * U256::from(chain.gas_price + PRIORITY_FEE_PER_GAS)
    );
    assert_eq!(summary.last_message, DEFAULT_MESSAGE);
    assert_eq!(
        summary.explorer_url,
        format!("{EXPLORER}/tx/{}", summary.transaction_hash)
    );
}

#[tokio::test]
async fn test_approval_is_encoded_for_the_paymaster() {
    let dir = tempfile::tempdir().unwrap();
    let log = RunLog::new(dir.path());
    let chain = chain_returning("hi");
    let request = request();

    let summary = PaymasterDriver::new(&chain, EXPLORER, log.channel("paymaster-transaction"))
        .send_sponsored_message(&request)
        .await
        .unwrap();

    let approval = IFidToken::approveCall::abi_decode(&summary.approval_data).unwrap();
    assert_eq!(approval.spender, request.paymaster);
    assert_eq!(approval.amount, APPROVAL_ALLOWANCE);
}

#[tokio::test]
async fn test_fee_is_logged_in_token_units() {
    let dir = tempfile::tempdir().unwrap();
    let log = RunLog::new(dir.path());
    let chain = chain_returning("hi");

    PaymasterDriver::new(&chain, EXPLORER, log.channel("paymaster-transaction"))
        .send_sponsored_message(&request())
        .await
        .unwrap();

    let content = fs::read_to_string(log.path_for("paymaster-transaction")).unwrap();
    assert!(content.contains("Total Fee Paid in FidToken:"));
    assert!(content.contains(" FID\n"));
    assert!(content.contains("Last message: hi"));
    assert!(content.contains("Block Explorer URL: https://sepolia.explorer.zksync.io/tx/0x"));
}

#[tokio::test]
async fn test_send_failure_is_reported_once_and_not_retried() {
    let dir = tempfile::tempdir().unwrap();
    let log = RunLog::new(dir.path());
    let chain = chain_returning("hi");
    chain.fail_send(0, "insufficient allowance");

    let err = PaymasterDriver::new(&chain, EXPLORER, log.channel("paymaster-transaction"))
        .send_sponsored_message(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Network(_)));
    assert_eq!(chain.sent().len(), 1);

    cli::report_failure(&log, "paymaster-transaction", &err);

    let content = fs::read_to_string(log.path_for("paymaster-transaction")).unwrap();
    assert_eq!(
        content
            .matches("Error: Network error: insufficient allowance")
            .count(),
        1
    );
    assert!(!content.contains("Last message"));

    let errors = fs::read_to_string(log.path_for(ERROR_CHANNEL)).unwrap();
    assert_eq!(errors.matches("insufficient allowance").count(), 1);
}

#[tokio::test]
async fn test_failed_read_back_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let log = RunLog::new(dir.path());
    let chain = MockZkChain::default();

    let err = PaymasterDriver::new(&chain, EXPLORER, log.channel("paymaster-transaction"))
        .send_sponsored_message(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Network(_)));
    // the transaction itself went through
    assert_eq!(chain.sent().len(), 1);
}
