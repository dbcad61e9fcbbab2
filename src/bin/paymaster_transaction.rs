use alloy::primitives::utils::format_ether;
use clap::Parser;
use std::process::ExitCode;

use zkpay::Result;
use zkpay::cli;
use zkpay::config::Config;
use zkpay::logger::RunLog;
use zkpay::models::ContractName;
use zkpay::services::paymaster::{DEFAULT_MESSAGE, PaymasterDriver, SponsoredMessage};
use zkpay::services::wallet::parse_private_key;
use zkpay::services::zksync;

const CHANNEL: &str = "paymaster-transaction";

/// Sends one message to zkMessages with its fee paid in FidToken through the paymaster.
#[derive(Parser)]
#[command(name = "paymaster-transaction")]
struct Args {
    #[arg(long, default_value = DEFAULT_MESSAGE)]
    message: String,
}

async fn run(args: &Args, config: &Config, log: &RunLog) -> Result<()> {
    let channel = log.channel(CHANNEL);
    channel.clear()?;

    let rpc_url = config.require_rpc_url()?;
    let signer = parse_private_key(config.require_private_key()?)?;
    let token = cli::require_contract_address(config, ContractName::FidToken)?;
    let messages = cli::require_contract_address(config, ContractName::ZkMessages)?;

    let chain = zksync::connect(rpc_url, signer)?;
    let balance = chain.balance(chain.signer_address()).await?;
    channel.log(format!(
        "Sender {} has {} ETH",
        chain.signer_address(),
        format_ether(balance)
    ))?;

    let driver = PaymasterDriver::new(chain.as_ref(), &config.explorer_url, channel);
    let summary = driver
        .send_sponsored_message(&SponsoredMessage {
            token,
            messages,
            paymaster: config.paymaster_address,
            text: args.message.clone(),
        })
        .await?;

    channel.log(format!(
        "Paymaster transaction {} confirmed in block {}",
        summary.transaction_hash,
        summary
            .block_number
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    ))?;
    Ok(())
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
