use alloy::primitives::utils::{format_ether, parse_ether};
use alloy::primitives::{Address, B256, U256};
use alloy::sol_types::SolCall;

use crate::error::{Error, Result};
use crate::logger::Channel;
use crate::routes::IFidToken;
use crate::services::zksync::{ZkCall, ZkChain};

pub const DEFAULT_MINT_AMOUNT: &str = "10";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintOutcome {
    pub transaction_hash: B256,
    pub amount: U256,
    pub balance: U256,
}

/// Mints `amount` whole tokens (18 decimals) to `receiver` and reads back its balance.
pub async fn mint_tokens(
    chain: &dyn ZkChain,
    token: Address,
    receiver: Address,
    amount: &str,
    log: &Channel<'_>,
) -> Result<MintOutcome> {
    let amount = parse_ether(amount)
        .map_err(|e| Error::Configuration(format!("Invalid token amount '{amount}': {e}")))?;

    log.log(format!(
        "Minting {} FID to {receiver} from {}",
        format_ether(amount),
        chain.signer_address()
    ))?;

    let data = IFidToken::mintCall {
        to: receiver,
        amount,
    }
    .abi_encode();
    let sent = chain.send(ZkCall::contract(token, data)).await?;
    log.log(format!(
        "Mint transaction {} confirmed in block {}",
        sent.hash,
        sent.block_number
            .map(|n| n.to_string())
            .unwrap_or_else(|| "pending".to_string())
    ))?;

    let returned = chain
        .call(token, IFidToken::balanceOfCall { account: receiver }.abi_encode().into())
        .await?;
    let balance = IFidToken::balanceOfCall::abi_decode_returns(&returned)
        .map_err(|e| Error::Network(format!("Undecodable balanceOf result: {e}")))?;
    log.log(format!("Balance of {receiver}: {} FID", format_ether(balance)))?;

    Ok(MintOutcome {
        transaction_hash: sent.hash,
        amount,
        balance,
    })
}
