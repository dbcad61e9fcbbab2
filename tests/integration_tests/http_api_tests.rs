use alloy::primitives::Address;
use rocket::http::{Method, Status};
use rocket::local::asynchronous::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::test_utils::{
    MockChainReader, MockExplorer, UNKNOWN_HASH, hash, receipt_json, test_app_state,
    transfer_log_json,
};
use zkpay::build_rocket;
use zkpay::guards::RateLimiter;
use zkpay::models::AppState;

async fn client_for(state: AppState) -> Client {
    Client::tracked(build_rocket(state, 8080))
        .await
        .expect("valid rocket instance")
}

#[tokio::test]
async fn test_health_with_cors_headers() {
    let client = client_for(crate::test_utils::empty_app_state()).await;

    let response = client.get("/health").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.headers().get_one("Access-Control-Allow-Origin"),
        Some("*")
    );
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body, serde_json::json!({"status": "healthy"}));
}

#[tokio::test]
async fn test_preflight_is_answered() {
    let client = client_for(crate::test_utils::empty_app_state()).await;

    let response = client
        .req(Method::Options, "/api/token/tx/gasfeefid/0x00")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NoContent);
    assert!(
        response
            .headers()
            .get_one("Access-Control-Allow-Methods")
            .unwrap()
            .contains("GET")
    );
}

#[tokio::test]
async fn test_fee_in_fid_over_http() {
    let chain = Arc::new(MockChainReader::default());
    let token = Address::repeat_byte(0x0f);
    let tx = hash(0x41);
    chain.insert_receipt(
        tx,
        receipt_json(
            tx,
            21_000,
            25_000_000,
            vec![
                transfer_log_json(token, Address::repeat_byte(1), Address::repeat_byte(2), 100),
                transfer_log_json(token, Address::repeat_byte(1), Address::repeat_byte(2), 250),
            ],
        ),
    );
    let client = client_for(test_app_state(chain, Arc::new(MockExplorer::default()), Some(token))).await;

    let response = client
        .get(format!("/api/token/tx/gasfeefid/{tx}"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body, serde_json::json!({"feePaidInFidToken": "350"}));
}

#[tokio::test]
async fn test_missing_receipt_is_json_404() {
    let client = client_for(crate::test_utils::empty_app_state()).await;

    for path in ["/api/token/tx/gasfeeeth/", "/api/token/tx/gasfeefid/"] {
        let response = client.get(format!("{path}{UNKNOWN_HASH}")).dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
        let body: serde_json::Value = response.into_json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }
}

#[tokio::test]
async fn test_unknown_route_uses_json_catcher() {
    let client = client_for(crate::test_utils::empty_app_state()).await;

    let response = client.get("/api/nothing/here").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn test_rate_limit_rejects_over_quota_but_not_health() {
    let mut state = crate::test_utils::empty_app_state();
    state.rate_limiter = Arc::new(RateLimiter::new(2, Duration::from_secs(900)));
    let client = client_for(state).await;
    let path = format!("/api/token/tx/gasfeeeth/{UNKNOWN_HASH}");

    for _ in 0..2 {
        let response = client.get(path.as_str()).dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
    }

    let response = client.get(path.as_str()).dispatch().await;
    assert_eq!(response.status(), Status::TooManyRequests);
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Too many requests"));

    let response = client.get("/health").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let client = client_for(crate::test_utils::empty_app_state()).await;

    let response = client.get("/api/openapi.json").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert!(body["paths"]["/api/wallet/balance/{address}"].is_object());
    assert!(body["paths"]["/health"].is_object());

    let response = client.get("/api-docs/index.html").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
}
