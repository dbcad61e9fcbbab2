use alloy::primitives::Address;
use alloy::primitives::utils::format_ether;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use zkpay::cli;
use zkpay::config::Config;
use zkpay::logger::RunLog;
use zkpay::models::{AddressMap, ContractName};
use zkpay::services::deploy::{ArtifactStore, ContractDeployer, DeploymentPipeline, default_plan};
use zkpay::services::paymaster::{DEFAULT_MESSAGE, PaymasterDriver, SponsoredMessage};
use zkpay::services::propagation::{AddressPropagator, EnvFile, PropagationTarget};
use zkpay::services::wallet::WalletProvisioner;
use zkpay::services::zksync;
use zkpay::{Error, Result};

const CHANNEL: &str = "deploy";
const PAYMASTER_CHANNEL: &str = "paymaster-transaction";

/// Deploys FidToken and zkMessages, propagates their addresses and sends one sponsored message.
#[derive(Parser)]
#[command(name = "deploy")]
struct Args {
    /// Skip contracts already recorded in the address book.
    #[arg(long)]
    resume: bool,

    /// Do not run the sponsored message transaction after deploying.
    #[arg(long)]
    skip_paymaster: bool,

    /// Script file whose address constants are rewritten. Repeatable.
    #[arg(long = "constants-file", value_name = "PATH")]
    constants_files: Vec<PathBuf>,

    /// Message sent through the paymaster after deploying.
    #[arg(long, default_value = DEFAULT_MESSAGE)]
    message: String,
}

async fn run(args: &Args, config: &Config, log: &RunLog) -> Result<()> {
    let channel = log.channel(CHANNEL);
    if !args.resume {
        channel.clear()?;
    }
    channel.log("Starting deployment process...")?;

    let rpc_url = config.require_rpc_url()?;
    let credential = WalletProvisioner::new(
        config.private_key.clone(),
        EnvFile::new(config.env_file.clone()),
        channel,
    )
    .get_or_create_wallet()?;

    let chain = zksync::connect(rpc_url, credential.into_signer())?;
    let deployer_address = chain.signer_address();
    let balance = chain.balance(deployer_address).await?;
    channel.log(format!("Deployer address: {deployer_address}"))?;
    channel.log(format!("Deployer balance: {} ETH", format_ether(balance)))?;

    let artifacts = ArtifactStore::new(config.artifacts_dir.clone());
    let deployer = ContractDeployer::new(chain.as_ref(), &artifacts, channel);
    let pipeline = DeploymentPipeline::new(deployer, config.address_book.clone(), channel);
    let outcome = pipeline.run(&default_plan(), args.resume).await?;

    let mut targets = vec![
        PropagationTarget::AddressBook(config.address_book.clone()),
        PropagationTarget::EnvFile(config.env_file.clone()),
    ];
    targets.extend(
        args.constants_files
            .iter()
            .cloned()
            .map(PropagationTarget::SourceConstants),
    );
    AddressPropagator::new(targets, channel).propagate(&outcome.addresses)?;

    if args.skip_paymaster {
        channel.log("Skipping paymaster transaction")?;
    } else {
        let message = SponsoredMessage {
            token: contract(&outcome.addresses, ContractName::FidToken)?,
            messages: contract(&outcome.addresses, ContractName::ZkMessages)?,
            paymaster: config.paymaster_address,
            text: args.message.clone(),
        };
        let driver = PaymasterDriver::new(
            chain.as_ref(),
            &config.explorer_url,
            log.channel(PAYMASTER_CHANNEL),
        );
        // Contracts stay deployed and propagated; the failure is reported on its own channel
        if let Err(e) = driver.send_sponsored_message(&message).await {
            cli::report_failure(log, PAYMASTER_CHANNEL, &e);
            channel.log(format!(
                "Paymaster transaction failed, see {}",
                log.path_for(PAYMASTER_CHANNEL).display()
            ))?;
        }
    }

    channel.log("Deployment completed successfully")?;
    Ok(())
}

fn contract(addresses: &AddressMap, name: ContractName) -> Result<Address> {
    addresses
        .get(&name)
        .copied()
        .ok_or_else(|| Error::NotFound(format!("{name} address missing after deployment")))
}

#[tokio::main]
async fn main() -> ExitCode {
    let _sentry = cli::init_tracing();
    let args = Args::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => return cli::finish(&RunLog::default(), CHANNEL, Err(e)),
    };
    let log = RunLog::new(config.log_dir.clone());

    let result = run(&args, &config, &log).await;
    cli::finish(&log, CHANNEL, result)
}
