use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use zkpay::Result;
use zkpay::cli;
use zkpay::config::Config;
use zkpay::logger::RunLog;
use zkpay::services::propagation::{
    AddressPropagator, PropagationTarget, extract_addresses_from_log,
};

const CHANNEL: &str = "update-addresses";

/// Re-reads the last deployment summary from the deploy log and propagates its addresses.
#[derive(Parser)]
#[command(name = "update-addresses")]
struct Args {
    /// Deploy log to read. Defaults to `<LOG_DIR>/deploy.log`.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Script file whose address constants are rewritten. Repeatable.
    #[arg(long = "constants-file", value_name = "PATH")]
    constants_files: Vec<PathBuf>,
}

fn run(args: &Args, config: &Config, log: &RunLog) -> Result<()> {
    let channel = log.channel(CHANNEL);
    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(|| log.path_for("deploy"));
    channel.log(format!("Reading addresses from {}", log_file.display()))?;

    let content = fs::read_to_string(&log_file)?;
    let addresses = extract_addresses_from_log(&content)?;
    for (name, address) in &addresses {
        channel.log(format!("Found {name}: {address}"))?;
    }

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

    AddressPropagator::new(targets, channel).update_contract_addresses(&addresses)?;
    channel.log("Contract addresses updated successfully!")?;
    Ok(())
}

fn main() -> ExitCode {
    let _sentry = cli::init_tracing();
    let args = Args::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => return cli::finish(&RunLog::default(), CHANNEL, Err(e)),
    };
    let log = RunLog::new(config.log_dir.clone());

    let result = run(&args, &config, &log);
    cli::finish(&log, CHANNEL, result)
}
