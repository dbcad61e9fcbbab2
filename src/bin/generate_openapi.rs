//! Prints the OpenAPI document without starting the server.
//!
//! Usage: cargo run --bin generate_openapi > openapi.json

use rocket_okapi::settings::OpenApiSettings;
use std::process::ExitCode;

use zkpay::routes;

fn main() -> ExitCode {
    let settings = OpenApiSettings::new();
    let (_routes, openapi_spec) = routes::api_routes(&settings);

    match serde_json::to_string_pretty(&openapi_spec) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to serialize OpenAPI spec: {e}");
            ExitCode::FAILURE
        }
    }
}
