use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{Data, Request, Response};

use crate::models::{AppState, ErrorBody};
use crate::routes::GENERIC_ERROR_DETAILS;

/// Logs incoming requests and outgoing responses.
pub struct RequestLogger;

#[rocket::async_trait]
impl Fairing for RequestLogger {
    fn info(&self) -> Info {
        Info {
            name: "Request/Response Logger",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        let remote = request
            .client_ip()
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        tracing::info!(
            "Incoming request: {} {} from {}",
            request.method(),
            request.uri(),
            remote
        );
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let method = request.method();
        let uri = request.uri();
        let status = response.status();

        tracing::info!("Response: {} {} - Status: {}", method, uri, status);

        if status.class().is_server_error() {
            tracing::error!("Error response: {} {} returned {}", method, uri, status);
        } else if !status.class().is_success() {
            tracing::warn!("Non-success response: {} {} returned {}", method, uri, status);
        }
    }
}

/// Reports 500 responses to Sentry.
pub struct PanicCatcher;

#[rocket::async_trait]
impl Fairing for PanicCatcher {
    fn info(&self) -> Info {
        Info {
            name: "Panic Catcher",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        if response.status() == Status::InternalServerError {
            let method = request.method();
            let uri = request.uri();

            tracing::error!(
                "Internal Server Error detected for {} {} - possible panic or unhandled error",
                method,
                uri
            );

            sentry::capture_message(
                &format!("Internal Server Error: {method} {uri}"),
                sentry::Level::Error,
            );
        }
    }
}

/// Permissive CORS headers on every response.
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, PATCH, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

/// Answers CORS preflight requests for any path.
#[rocket::options("/<_..>")]
pub fn cors_preflight() -> Status {
    Status::NoContent
}

#[rocket::catch(404)]
pub fn not_found(request: &Request<'_>) -> Json<ErrorBody> {
    Json(ErrorBody {
        error: "Not found".to_string(),
        details: Some(format!("No route for {} {}", request.method(), request.uri())),
    })
}

#[rocket::catch(429)]
pub fn too_many_requests() -> Json<ErrorBody> {
    Json(ErrorBody {
        error: "Too many requests, please try again later.".to_string(),
        details: None,
    })
}

#[rocket::catch(500)]
pub fn internal_error(request: &Request<'_>) -> Json<ErrorBody> {
    let development = request
        .rocket()
        .state::<AppState>()
        .map(|state| state.environment.is_development())
        .unwrap_or(false);

    let details = if development {
        format!("Unhandled error in {} {}", request.method(), request.uri())
    } else {
        GENERIC_ERROR_DETAILS.to_string()
    };
    Json(ErrorBody {
        error: "Internal server error".to_string(),
        details: Some(details),
    })
}
