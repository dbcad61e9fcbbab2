//! Paymaster-sponsored message transaction.
//!
//! One transaction to the messages contract whose fee is paid in FidToken through an
//! approval-based paymaster. No step is retried: resubmitting with stale gas parameters risks
//! nonce conflicts.

use alloy::primitives::utils::{format_ether, format_units};
use alloy::primitives::{Address, B256, Bytes, U256};
use alloy::sol_types::SolCall;
use alloy_zksync::network::unsigned_tx::eip712::PaymasterParams;

use crate::error::{Error, Result};
use crate::logger::Channel;
use crate::routes::{IFidToken, IPaymasterFlow, IZkMessages};
use crate::services::zksync::{FeeParams, ZkCall, ZkChain};

const ONE_TOKEN: u64 = 1_000_000_000_000_000_000;

/// Allowance the paymaster may pull: 5 tokens.
pub const APPROVAL_ALLOWANCE: U256 = U256::from_limbs([5 * ONE_TOKEN, 0, 0, 0]);
/// Minimal allowance named in the paymaster input: 1 token.
pub const MINIMAL_ALLOWANCE: U256 = U256::from_limbs([ONE_TOKEN, 0, 0, 0]);
/// 0.1 gwei on top of the network gas price.
pub const PRIORITY_FEE_PER_GAS: u128 = 100_000_000;
pub const GAS_PER_PUBDATA: u64 = 50_000;
pub const DEFAULT_MESSAGE: &str = "This message's fees were paid in FidToken!";

/// What to send and through which contracts.
#[derive(Debug, Clone)]
pub struct SponsoredMessage {
    pub token: Address,
    pub messages: Address,
    pub paymaster: Address,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceiptSummary {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub max_fee_per_gas: u128,
    /// `gas_used * max_fee_per_gas`, in the token's smallest unit.
    pub fee_in_token: U256,
    pub explorer_url: String,
    pub last_message: String,
    pub approval_data: Bytes,
}

/// `approvalBased(token, minAllowance, "")` paymaster input.
pub fn approval_based_input(token: Address, minimal_allowance: U256) -> Bytes {
    IPaymasterFlow::approvalBasedCall {
        token,
        minAllowance: minimal_allowance,
        innerInput: Bytes::new(),
    }
    .abi_encode()
    .into()
}

/// Renders `wei` in a named unit ("gwei", "ether", ...).
pub fn format_amount(wei: U256, unit: &str) -> Result<String> {
    format_units(wei, unit).map_err(|e| Error::UnitConversion(format!("{wei} to {unit}: {e}")))
}

pub struct PaymasterDriver<'a> {
    chain: &'a dyn ZkChain,
    explorer_url: &'a str,
    log: Channel<'a>,
}

impl<'a> PaymasterDriver<'a> {
    pub fn new(chain: &'a dyn ZkChain, explorer_url: &'a str, log: Channel<'a>) -> Self {
        Self {
            chain,
            explorer_url,
            log,
        }
    }

    /// Sends the message with its fee sponsored by the paymaster. Any failing step aborts the
    /// rest; the error is returned unchanged for the caller to report.
    pub async fn send_sponsored_message(
        &self,
        request: &SponsoredMessage,
    ) -> Result<TransactionReceiptSummary> {
        self.log.log(format!(
            "Sending sponsored message from {} to {}",
            self.chain.signer_address(),
            request.messages
        ))?;

        let approval_data: Bytes = IFidToken::approveCall {
            spender: request.paymaster,
            amount: APPROVAL_ALLOWANCE,
        }
        .abi_encode()
        .into();
        self.log.log(format!(
            "Encoded approval of {} FID for paymaster {}",
            format_ether(APPROVAL_ALLOWANCE),
            request.paymaster
        ))?;

        let message_data: Bytes = IZkMessages::sendMessageCall {
            message: request.text.clone(),
        }
        .abi_encode()
        .into();

        let gas_price = self.chain.gas_price().await?;
        let fees = FeeParams {
            max_fee_per_gas: gas_price + PRIORITY_FEE_PER_GAS,
            max_priority_fee_per_gas: PRIORITY_FEE_PER_GAS,
        };

        let paymaster = PaymasterParams {
            paymaster: request.paymaster,
            paymaster_input: approval_based_input(request.token, MINIMAL_ALLOWANCE),
        };

        let call = ZkCall::contract(request.messages, message_data)
            .with_paymaster(paymaster, GAS_PER_PUBDATA)
            .with_fees(fees);
        let gas_limit = self.chain.estimate_gas(&call).await?;
        self.log
            .log(format!("Estimated gas limit with paymaster: {gas_limit}"))?;

        let sent = self.chain.send(call.with_gas_limit(gas_limit)).await?;
        let explorer_url = format!("{}/tx/{}", self.explorer_url, sent.hash);
        self.log.log("Transaction Details:")?;
        self.log.log("-------------------")?;
        self.log.log(format!("Transaction Hash: {}", sent.hash))?;
        self.log.log(format!("Block Explorer URL: {explorer_url}"))?;

        let fee_in_token = U256::from(sent.gas_used) * U256::from(fees.max_fee_per_gas);
        self.log.log("Fee Details:")?;
        self.log.log("------------")?;
        self.log.log(format!("Gas Used: {}", sent.gas_used))?;
        self.log.log(format!(
            "Effective Gas Price: {} gwei",
            format_amount(U256::from(fees.max_fee_per_gas), "gwei")?
        ))?;
        self.log.log(format!(
            "Total Fee Paid in FidToken: {} FID",
            format_ether(fee_in_token)
        ))?;

        let returned = self
            .chain
            .call(
                request.messages,
                IZkMessages::getLastMessageCall {}.abi_encode().into(),
            )
            .await?;
        let last_message = IZkMessages::getLastMessageCall::abi_decode_returns(&returned)
            .map_err(|e| Error::Network(format!("Undecodable getLastMessage result: {e}")))?;
        self.log.log(format!("Last message: {last_message}"))?;

        Ok(TransactionReceiptSummary {
            transaction_hash: sent.hash,
            block_number: sent.block_number,
            gas_used: sent.gas_used,
            max_fee_per_gas: fees.max_fee_per_gas,
            fee_in_token,
            explorer_url,
            last_message,
            approval_data,
        })
    }
}
