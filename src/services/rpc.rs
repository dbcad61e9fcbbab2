use alloy::primitives::{Address, B256, Bytes, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::Log;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Fields of a transaction the API exposes, parsed from the raw JSON-RPC object.
///
/// zkSync returns EIP-712 (type 0x71) transactions that the Ethereum network types reject, so
/// lookups go through raw requests and only the common fields are read.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub hash: B256,
    pub from: Address,
    #[serde(default)]
    pub to: Option<Address>,
    #[serde(default)]
    pub value: U256,
    #[serde(with = "alloy::serde::quantity")]
    pub nonce: u64,
    #[serde(default)]
    pub gas: Option<U256>,
    #[serde(default)]
    pub gas_price: Option<U256>,
    #[serde(default)]
    pub input: Bytes,
    #[serde(default, with = "alloy::serde::quantity::opt")]
    pub chain_id: Option<u64>,
    #[serde(default, with = "alloy::serde::quantity::opt")]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub block_hash: Option<B256>,
    /// The node's response, untouched.
    #[serde(skip)]
    pub raw: Value,
}

impl TransactionView {
    pub fn from_json(raw: Value) -> Result<Self> {
        let mut view: Self = serde_json::from_value(raw.clone())?;
        view.raw = raw;
        Ok(view)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptView {
    pub transaction_hash: B256,
    #[serde(default, with = "alloy::serde::quantity::opt")]
    pub block_number: Option<u64>,
    pub gas_used: U256,
    pub effective_gas_price: U256,
    #[serde(default)]
    pub logs: Vec<Log>,
    #[serde(skip)]
    pub raw: Value,
}

impl ReceiptView {
    pub fn from_json(raw: Value) -> Result<Self> {
        let mut view: Self = serde_json::from_value(raw.clone())?;
        view.raw = raw;
        Ok(view)
    }

    /// Fee charged in the native unit.
    pub fn gas_fee(&self) -> U256 {
        self.gas_used.saturating_mul(self.effective_gas_price)
    }
}

#[derive(Debug, Deserialize)]
struct BlockHeaderView {
    #[serde(with = "alloy::serde::quantity")]
    timestamp: u64,
}

/// Read-only chain access used by the HTTP API.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn get_transaction(&self, hash: B256) -> Result<Option<TransactionView>>;
    async fn get_receipt(&self, hash: B256) -> Result<Option<ReceiptView>>;
    async fn get_balance(&self, address: Address) -> Result<U256>;
    async fn get_block_timestamp(&self, number: u64) -> Result<Option<u64>>;
}

/// JSON-RPC backed reader. Built once at startup and shared by every request.
pub struct RpcChainReader {
    provider: DynProvider,
}

impl RpcChainReader {
    pub fn connect(rpc_url: &str) -> Result<Self> {
        let url = rpc_url
            .parse()
            .map_err(|e| Error::Configuration(format!("Invalid RPC URL '{rpc_url}': {e}")))?;
        let provider = ProviderBuilder::new().connect_http(url).erased();
        Ok(Self { provider })
    }

    async fn raw_lookup(&self, method: &'static str, hash: B256) -> Result<Option<Value>> {
        let value: Option<Value> = self
            .provider
            .raw_request(method.into(), (hash,))
            .await
            .map_err(|e| Error::Network(format!("{method} failed for {hash}: {e}")))?;
        Ok(value.filter(|v| !v.is_null()))
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn get_transaction(&self, hash: B256) -> Result<Option<TransactionView>> {
        self.raw_lookup("eth_getTransactionByHash", hash)
            .await?
            .map(TransactionView::from_json)
            .transpose()
    }

    async fn get_receipt(&self, hash: B256) -> Result<Option<ReceiptView>> {
        self.raw_lookup("eth_getTransactionReceipt", hash)
            .await?
            .map(ReceiptView::from_json)
            .transpose()
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| Error::Network(format!("eth_getBalance failed for {address}: {e}")))
    }

    async fn get_block_timestamp(&self, number: u64) -> Result<Option<u64>> {
        let block: Option<Value> = self
            .provider
            .raw_request(
                "eth_getBlockByNumber".into(),
                (format!("0x{number:x}"), false),
            )
            .await
            .map_err(|e| Error::Network(format!("eth_getBlockByNumber failed for {number}: {e}")))?;

        match block.filter(|v| !v.is_null()) {
            Some(value) => {
                let header: BlockHeaderView = serde_json::from_value(value)?;
                Ok(Some(header.timestamp))
            }
            None => Ok(None),
        }
    }
}
