use crate::models::AppState;
use rocket::{Request, State, http::Status, request::FromRequest, request::Outcome};
use rocket_okapi::{
    r#gen::OpenApiGenerator,
    request::{OpenApiFromRequest, RequestHeaderInput},
};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct QuotaWindow {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter per client IP.
///
/// Requests without a known client address share one bucket.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    clients: Mutex<HashMap<Option<IpAddr>, QuotaWindow>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Clients with an open window.
    pub fn tracked_clients(&self) -> usize {
        self.clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Counts one request. Returns the remaining quota, or `None` once the client is over it.
    pub fn check(&self, client: Option<IpAddr>) -> Option<u32> {
        self.check_at(client, Instant::now())
    }

    pub fn check_at(&self, client: Option<IpAddr>, now: Instant) -> Option<u32> {
        let mut clients = self
            .clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Expired windows are dropped so idle clients do not accumulate
        let length = self.window;
        clients.retain(|_, window| now.duration_since(window.started) < length);

        let window = clients.entry(client).or_insert(QuotaWindow {
            started: now,
            count: 0,
        });
        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }

        if window.count >= self.max_requests {
            return None;
        }
        window.count += 1;
        Some(self.max_requests - window.count)
    }
}

/// Request guard enforcing the per-client quota. Rejected requests never reach the handler.
pub struct ClientQuota(pub u32);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ClientQuota {
    type Error = String;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let state = request.guard::<&State<AppState>>().await;
        match state {
            Outcome::Success(state) => {
                let client = request.client_ip();
                match state.rate_limiter.check(client) {
                    Some(remaining) => Outcome::Success(ClientQuota(remaining)),
                    None => {
                        let client = client
                            .map(|ip| ip.to_string())
                            .unwrap_or_else(|| "unknown".to_string());
                        tracing::warn!(
                            "Rate limit exceeded for {} on {}",
                            client,
                            request.uri()
                        );
                        Outcome::Error((
                            Status::TooManyRequests,
                            format!("Rate limit exceeded for {client}"),
                        ))
                    }
                }
            }
            _ => {
                tracing::error!("Application state not available for: {}", request.uri());
                sentry::capture_message(
                    "Application state not available in ClientQuota guard",
                    sentry::Level::Error,
                );
                Outcome::Error((
                    Status::InternalServerError,
                    "Application state not available".to_string(),
                ))
            }
        }
    }
}

impl<'r> OpenApiFromRequest<'r> for ClientQuota {
    fn from_request_input(
        _gen: &mut OpenApiGenerator,
        _name: String,
        _required: bool,
    ) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(RequestHeaderInput::None)
    }
}
