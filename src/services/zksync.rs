//! Signing chain client for zkSync Era.
//!
//! Everything that sends a transaction (deployments, the sponsored message, minting) goes
//! through [`ZkChain`]. The live implementation delegates EIP-712 signing, paymaster
//! metadata and contract-deployer encoding to `alloy-zksync`.

use alloy::network::{ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, B256, Bytes, U256};
use alloy::providers::Provider;
use alloy::signers::local::PrivateKeySigner;
use alloy_zksync::contracts::l2::contract_deployer::CONTRACT_DEPLOYER_ADDRESS;
use alloy_zksync::network::Zksync;
use alloy_zksync::network::transaction_request::TransactionRequest;
use alloy_zksync::network::unsigned_tx::eip712::PaymasterParams;
use alloy_zksync::provider::zksync_provider;
use alloy_zksync::wallet::ZksyncWallet;
use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Inputs of a contract-deployer `create` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateParams {
    pub bytecode: Vec<u8>,
    pub constructor_args: Vec<u8>,
    pub factory_deps: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallTarget {
    Contract { to: Address, data: Bytes },
    Create(CreateParams),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeParams {
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

/// One transaction to estimate or send.
#[derive(Debug, Clone)]
pub struct ZkCall {
    pub target: CallTarget,
    pub paymaster: Option<PaymasterParams>,
    pub gas_per_pubdata: Option<u64>,
    pub fees: Option<FeeParams>,
    pub gas_limit: Option<u64>,
}

impl ZkCall {
    pub fn contract(to: Address, data: impl Into<Bytes>) -> Self {
        Self::new(CallTarget::Contract {
            to,
            data: data.into(),
        })
    }

    pub fn create(params: CreateParams) -> Self {
        Self::new(CallTarget::Create(params))
    }

    fn new(target: CallTarget) -> Self {
        Self {
            target,
            paymaster: None,
            gas_per_pubdata: None,
            fees: None,
            gas_limit: None,
        }
    }

    pub fn with_paymaster(mut self, paymaster: PaymasterParams, gas_per_pubdata: u64) -> Self {
        self.paymaster = Some(paymaster);
        self.gas_per_pubdata = Some(gas_per_pubdata);
        self
    }

    pub fn with_fees(mut self, fees: FeeParams) -> Self {
        self.fees = Some(fees);
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    pub fn is_create(&self) -> bool {
        matches!(self.target, CallTarget::Create(_))
    }

    fn into_request(self, from: Address) -> Result<TransactionRequest> {
        let mut tx = match self.target {
            CallTarget::Contract { to, data } => TransactionRequest::default()
                .with_to(to)
                .with_input(data),
            CallTarget::Create(params) => TransactionRequest::default()
                .with_to(CONTRACT_DEPLOYER_ADDRESS)
                .with_create_params(
                    params.bytecode,
                    params.constructor_args,
                    params.factory_deps,
                )
                .map_err(|e| Error::Artifact(format!("Invalid deployment bytecode: {e}")))?,
        };
        tx.set_from(from);

        if let Some(paymaster) = self.paymaster {
            tx.set_paymaster_params(paymaster);
        }
        if let Some(gas_per_pubdata) = self.gas_per_pubdata {
            tx.set_gas_per_pubdata(U256::from(gas_per_pubdata));
        }
        if let Some(fees) = self.fees {
            tx.set_max_fee_per_gas(fees.max_fee_per_gas);
            tx.set_max_priority_fee_per_gas(fees.max_priority_fee_per_gas);
        }
        if let Some(gas_limit) = self.gas_limit {
            tx.set_gas_limit(gas_limit);
        }
        Ok(tx)
    }
}

/// Confirmed outcome of a sent transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentTransaction {
    pub hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub contract_address: Option<Address>,
}

#[async_trait]
pub trait ZkChain: Send + Sync {
    fn signer_address(&self) -> Address;
    async fn balance(&self, address: Address) -> Result<U256>;
    async fn gas_price(&self) -> Result<u128>;
    async fn estimate_gas(&self, call: &ZkCall) -> Result<u64>;
    /// Signs, submits and waits for the receipt. A reverted transaction is an error.
    async fn send(&self, call: ZkCall) -> Result<SentTransaction>;
    /// Read-only `eth_call`.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;
}

pub struct ZksyncChain<P> {
    provider: P,
    signer_address: Address,
}

/// Connects a signing client for `signer` to the zkSync node at `rpc_url`.
pub fn connect(rpc_url: &str, signer: PrivateKeySigner) -> Result<Arc<dyn ZkChain>> {
    let url = rpc_url
        .parse()
        .map_err(|e| Error::Configuration(format!("Invalid RPC URL '{rpc_url}': {e}")))?;
    let signer_address = signer.address();
    let provider = zksync_provider()
        .with_recommended_fillers()
        .wallet(ZksyncWallet::from(signer))
        .connect_http(url);

    tracing::info!("zkSync client configured:");
    tracing::info!("  - Address: {:?}", signer_address);
    tracing::info!("  - RPC URL: {}", rpc_url);

    Ok(Arc::new(ZksyncChain {
        provider,
        signer_address,
    }))
}

#[async_trait]
impl<P> ZkChain for ZksyncChain<P>
where
    P: Provider<Zksync> + Send + Sync + 'static,
{
    fn signer_address(&self) -> Address {
        self.signer_address
    }

    async fn balance(&self, address: Address) -> Result<U256> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| Error::Network(format!("Failed to get balance of {address}: {e}")))
    }

    async fn gas_price(&self) -> Result<u128> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| Error::Network(format!("Failed to get gas price: {e}")))
    }

    async fn estimate_gas(&self, call: &ZkCall) -> Result<u64> {
        let tx = call.clone().into_request(self.signer_address)?;
        self.provider
            .estimate_gas(tx)
            .await
            .map_err(|e| Error::Network(format!("Gas estimation failed: {e}")))
    }

    async fn send(&self, call: ZkCall) -> Result<SentTransaction> {
        let tx = call.into_request(self.signer_address)?;
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| Error::Network(format!("Failed to send transaction: {e}")))?;

        let hash = *pending.tx_hash();
        tracing::info!("Transaction sent: {}", hash);

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| Error::Network(format!("Failed to get receipt for {hash}: {e}")))?;

        if !receipt.status() {
            return Err(Error::Reverted(hash));
        }

        Ok(SentTransaction {
            hash,
            block_number: receipt.block_number(),
            gas_used: receipt.gas_used(),
            contract_address: receipt.contract_address(),
        })
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let tx = TransactionRequest::default()
            .with_from(self.signer_address)
            .with_to(to)
            .with_input(data);
        self.provider
            .call(tx)
            .await
            .map_err(|e| Error::Network(format!("eth_call to {to} failed: {e}")))
    }
}
