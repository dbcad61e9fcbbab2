use std::process::ExitCode;

use zkpay::cli;
use zkpay::config::Config;
use zkpay::create_rocket;

#[rocket::main]
async fn main() -> ExitCode {
    let _sentry = cli::init_tracing();
    tracing::info!("Starting the zkpay API server...");

    let rocket = match Config::from_env().and_then(|config| create_rocket(&config)) {
        Ok(rocket) => rocket,
        Err(e) => {
            tracing::error!("Failed to start: {}", e);
            sentry::capture_message(&format!("Failed to start: {e}"), sentry::Level::Error);
            return ExitCode::FAILURE;
        }
    };

    match rocket.launch().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
