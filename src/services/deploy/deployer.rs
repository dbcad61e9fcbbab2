use alloy::primitives::utils::format_ether;
use alloy::primitives::{Address, U256};
use chrono::Utc;

use super::artifact::ArtifactStore;
use crate::error::{Error, Result};
use crate::logger::Channel;
use crate::models::{ContractName, DeploymentRecord};
use crate::services::zksync::{CreateParams, ZkCall, ZkChain};

/// Result of one deployment.
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    pub address: Address,
    /// Estimated fee in wei, logged before sending.
    pub fee_estimate: U256,
    pub record: DeploymentRecord,
}

/// Deploys one compiled contract through the zkSync contract deployer.
pub struct ContractDeployer<'a> {
    chain: &'a dyn ZkChain,
    artifacts: &'a ArtifactStore,
    log: Channel<'a>,
}

impl<'a> ContractDeployer<'a> {
    pub fn new(chain: &'a dyn ZkChain, artifacts: &'a ArtifactStore, log: Channel<'a>) -> Self {
        Self {
            chain,
            artifacts,
            log,
        }
    }

    pub fn chain(&self) -> &'a dyn ZkChain {
        self.chain
    }

    /// Estimates, checks funds, sends and waits for the deployment.
    pub async fn deploy(&self, contract: ContractName, args: &[String]) -> Result<DeployOutcome> {
        let artifact = self.artifacts.load(contract.as_str())?;
        let constructor_args = artifact.encode_constructor_args(args)?;
        let call = ZkCall::create(CreateParams {
            bytecode: artifact.bytecode,
            constructor_args,
            factory_deps: artifact.factory_deps,
        });

        let gas = self.chain.estimate_gas(&call).await?;
        let gas_price = self.chain.gas_price().await?;
        let fee_estimate = U256::from(gas) * U256::from(gas_price);
        self.log.log(format!(
            "{contract} deployment estimated to cost {} ETH",
            format_ether(fee_estimate)
        ))?;

        let deployer = self.chain.signer_address();
        let balance = self.chain.balance(deployer).await?;
        self.log.log(format!(
            "Deployer {deployer} balance before {contract}: {} ETH",
            format_ether(balance)
        ))?;
        if balance.is_zero() {
            return Err(Error::InsufficientFunds { address: deployer });
        }

        let sent = self.chain.send(call).await.map_err(|e| match e {
            Error::Network(reason) => Error::Deployment { contract, reason },
            other => other,
        })?;
        let address = sent.contract_address.ok_or_else(|| Error::Deployment {
            contract,
            reason: format!("receipt of {} carries no contract address", sent.hash),
        })?;

        self.log
            .log(format!("{contract} was deployed to {address}"))?;

        Ok(DeployOutcome {
            address,
            fee_estimate,
            record: DeploymentRecord {
                contract_name: contract,
                address,
                deployed_at: Utc::now(),
                block_number: sent.block_number,
                transaction_hash: Some(sent.hash),
            },
        })
    }
}
