use alloy::primitives::utils::format_ether;
use chrono::Utc;
use std::path::PathBuf;

use super::deployer::ContractDeployer;
use crate::error::{Error, Result};
use crate::logger::Channel;
use crate::models::{AddressMap, ContractName, DeploymentRecord};
use crate::services::propagation::AddressBook;

/// A constructor argument: a literal coerced through the ABI, or the address of a contract
/// deployed earlier in the same plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructorArg {
    Literal(String),
    AddressOf(ContractName),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployStep {
    pub contract: ContractName,
    pub args: Vec<ConstructorArg>,
}

impl DeployStep {
    pub fn dependencies(&self) -> impl Iterator<Item = ContractName> + '_ {
        self.args.iter().filter_map(|arg| match arg {
            ConstructorArg::AddressOf(name) => Some(*name),
            ConstructorArg::Literal(_) => None,
        })
    }
}

/// FidToken first, then zkMessages which takes the token's address.
pub fn default_plan() -> Vec<DeployStep> {
    vec![
        DeployStep {
            contract: ContractName::FidToken,
            args: vec![
                ConstructorArg::Literal("FidToken".to_string()),
                ConstructorArg::Literal("FID".to_string()),
            ],
        },
        DeployStep {
            contract: ContractName::ZkMessages,
            args: vec![ConstructorArg::AddressOf(ContractName::FidToken)],
        },
    ]
}

/// Renders a step's arguments. A dependency without a known address is an error.
pub fn resolve_args(step: &DeployStep, known: &AddressMap) -> Result<Vec<String>> {
    step.args
        .iter()
        .map(|arg| match arg {
            ConstructorArg::Literal(value) => Ok(value.clone()),
            ConstructorArg::AddressOf(dependency) => known
                .get(dependency)
                .map(|address| address.to_string())
                .ok_or(Error::MissingDependency {
                    contract: step.contract,
                    dependency: *dependency,
                }),
        })
        .collect()
}

/// Every contract address after a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutcome {
    pub addresses: AddressMap,
    pub deployed: Vec<DeploymentRecord>,
    pub skipped: Vec<ContractName>,
}

/// Runs a plan step by step, recording each deployment in the address book as soon as it
/// confirms. A failure stops the run; contracts deployed before it stay deployed.
pub struct DeploymentPipeline<'a> {
    deployer: ContractDeployer<'a>,
    address_book: PathBuf,
    log: Channel<'a>,
}

impl<'a> DeploymentPipeline<'a> {
    pub fn new(deployer: ContractDeployer<'a>, address_book: PathBuf, log: Channel<'a>) -> Self {
        Self {
            deployer,
            address_book,
            log,
        }
    }

    /// With `resume`, contracts already in the address book are not deployed again.
    pub async fn run(&self, plan: &[DeployStep], resume: bool) -> Result<PipelineOutcome> {
        let mut outcome = PipelineOutcome::default();

        if resume {
            let book = AddressBook::load(&self.address_book)?;
            for step in plan {
                if let Some(address) = book.address(step.contract) {
                    self.log.log(format!(
                        "Resuming: {} already deployed at {}",
                        step.contract, address
                    ))?;
                    outcome.addresses.insert(step.contract, address);
                    outcome.skipped.push(step.contract);
                }
            }
        }

        for step in plan {
            if outcome.addresses.contains_key(&step.contract) {
                continue;
            }
            if let Err(e) = self.deploy_step(step, &mut outcome).await {
                self.log_partial_failure(step.contract, &outcome, &e)?;
                return Err(e);
            }
        }

        self.log_summary(&outcome)?;
        Ok(outcome)
    }

    async fn deploy_step(&self, step: &DeployStep, outcome: &mut PipelineOutcome) -> Result<()> {
        let args = resolve_args(step, &outcome.addresses)?;
        self.log.log(format!(
            "Deploying {} with arguments [{}]",
            step.contract,
            args.join(", ")
        ))?;

        let deployed = self.deployer.deploy(step.contract, &args).await?;
        tracing::info!(
            "{} deployed at {} (estimated fee {} ETH)",
            step.contract,
            deployed.address,
            format_ether(deployed.fee_estimate)
        );

        let mut book = AddressBook::load(&self.address_book)?;
        book.record_deployment(deployed.record.clone());
        book.save(&self.address_book)?;

        outcome.addresses.insert(step.contract, deployed.address);
        outcome.deployed.push(deployed.record);
        Ok(())
    }

    fn log_partial_failure(
        &self,
        failed: ContractName,
        outcome: &PipelineOutcome,
        error: &Error,
    ) -> Result<()> {
        self.log
            .log(format!("Deployment of {failed} failed: {error}"))?;
        if outcome.addresses.is_empty() {
            self.log.log("No contracts were deployed")?;
            return Ok(());
        }
        for (name, address) in &outcome.addresses {
            self.log
                .log(format!("Already deployed and kept: {name} at {address}"))?;
        }
        self.log.log(format!(
            "Recorded in {}; re-run with --resume to continue from {failed}",
            self.address_book.display()
        ))?;
        Ok(())
    }

    fn log_summary(&self, outcome: &PipelineOutcome) -> Result<()> {
        self.log.log("Deployment Summary:")?;
        self.log.log("-------------------")?;
        for (name, address) in &outcome.addresses {
            self.log.log(format!("{name}: {address}"))?;
        }

        let info = serde_json::json!({
            "deployer": self.deployer.chain().signer_address().to_string(),
            "contracts": outcome.addresses,
            "deployedAt": Utc::now().to_rfc3339(),
        });
        self.log
            .log(format!("Deployment info: {}", serde_json::to_string(&info)?))?;
        Ok(())
    }
}
