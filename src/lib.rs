use rocket::{Build, Rocket};
use rocket_okapi::settings::OpenApiSettings;
use rocket_okapi::swagger_ui::{SwaggerUIConfig, make_swagger_ui};
use std::sync::Arc;

pub mod cli;
pub mod config;
pub mod error;
pub mod fairings;
pub mod guards;
pub mod logger;
pub mod models;
pub mod routes;
pub mod services;

pub use error::{Error, Result};

use crate::config::Config;
use crate::guards::RateLimiter;
use crate::models::{AppState, ContractName};
use crate::services::explorer::HttpExplorer;
use crate::services::rpc::RpcChainReader;

/// Builds the API server from configuration. A missing `RPC_URL` is fatal.
pub fn create_rocket(config: &Config) -> Result<Rocket<Build>> {
    let rpc_url = config.require_rpc_url()?;
    let chain = RpcChainReader::connect(rpc_url)?;
    let explorer = HttpExplorer::new(config.explorer_api_url.clone());
    let token_address = cli::resolve_contract_address(config, ContractName::FidToken)?;

    tracing::info!("API configured:");
    tracing::info!("  - RPC URL: {}", rpc_url);
    tracing::info!("  - Explorer: {}", config.explorer_url);
    tracing::info!("  - Environment: {:?}", config.environment);
    match token_address {
        Some(token) => tracing::info!("  - FidToken: {}", token),
        None => tracing::warn!("FIDTOKEN_ADDRESS not configured, gas fee in FID is unavailable"),
    }

    let app_state = AppState {
        chain: Arc::new(chain),
        explorer: Arc::new(explorer),
        token_address,
        explorer_url: config.explorer_url.clone(),
        environment: config.environment,
        rate_limiter: Arc::new(RateLimiter::new(
            config.rate_limit_max,
            config.rate_limit_window,
        )),
    };

    Ok(build_rocket(app_state, config.api_port))
}

/// Mounts routes, docs, catchers and fairings around an already built state.
pub fn build_rocket(app_state: AppState, port: u16) -> Rocket<Build> {
    let settings = OpenApiSettings::default();
    let (api_routes, openapi_spec) = routes::api_routes(&settings);

    let figment = rocket::Config::figment().merge(("port", port));

    rocket::custom(figment)
        .manage(app_state)
        .mount("/", api_routes)
        .mount(
            "/api",
            vec![rocket_okapi::get_openapi_route(openapi_spec, &settings)],
        )
        .mount(
            "/api-docs",
            make_swagger_ui(&SwaggerUIConfig {
                url: "/api/openapi.json".to_owned(),
                ..Default::default()
            }),
        )
        .mount("/", rocket::routes![fairings::cors_preflight])
        .register(
            "/",
            rocket::catchers![
                fairings::not_found,
                fairings::too_many_requests,
                fairings::internal_error
            ],
        )
        .attach(fairings::RequestLogger)
        .attach(fairings::PanicCatcher)
        .attach(fairings::Cors)
}
