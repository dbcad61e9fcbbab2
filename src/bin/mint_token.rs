use clap::Parser;
use std::process::ExitCode;

use zkpay::Result;
use zkpay::cli;
use zkpay::config::Config;
use zkpay::logger::RunLog;
use zkpay::models::{ContractName, parse_address};
use zkpay::services::token::{DEFAULT_MINT_AMOUNT, mint_tokens};
use zkpay::services::wallet::parse_private_key;
use zkpay::services::zksync;

const CHANNEL: &str = "mint-token";

/// Mints FidToken to a receiver.
#[derive(Parser)]
#[command(name = "mint-token")]
struct Args {
    /// Receiving address.
    receiver: String,

    /// Whole tokens to mint.
    #[arg(default_value = DEFAULT_MINT_AMOUNT)]
    amount: String,
}

async fn run(args: &Args, config: &Config, log: &RunLog) -> Result<()> {
    let channel = log.channel(CHANNEL);
    let receiver = parse_address(&args.receiver)?;

    let rpc_url = config.require_rpc_url()?;
    let signer = parse_private_key(config.require_private_key()?)?;
    let token = cli::require_contract_address(config, ContractName::FidToken)?;

    let chain = zksync::connect(rpc_url, signer)?;
    mint_tokens(chain.as_ref(), token, receiver, &args.amount, &channel).await?;
    channel.log("Tokens minted successfully!")?;
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
