//! Integration tests for the REST API feature.

#![cfg(feature = "api")]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use ev_fleet_sim::api::{AppState, router};
use ev_fleet_sim::config::{REFERENCE_ARRIVAL_PCT, SimulationConfig};
use ev_fleet_sim::sim::types::DayBoundary;

fn build_app() -> Router {
    router(Arc::new(AppState::new(SimulationConfig {
        days: 7,
        day_boundary: DayBoundary::Calendar,
        ..SimulationConfig::default()
    })))
}

fn run_body(name: &str, chargers: usize) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "chargers": [
            {"id": "ac-11", "count": chargers, "power": 11.0},
            {"id": "dc-50", "power": 50.0}
        ],
        "arrivalProbabilities": REFERENCE_ARRIVAL_PCT.to_vec(),
        "energyConsumption": 18.0
    })
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn post(body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/simulations")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn posted_run_is_listed_and_retrievable() {
    let app = build_app();

    let (status, created) = send(&app, post(&run_body("first", 4))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "COMPLETED");
    assert_eq!(created["results"].as_array().map(Vec::len), Some(7));

    let id = created["id"].as_u64().unwrap();
    let (status, fetched) = send(&app, get(&format!("/simulations/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let total: f64 = fetched["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["energyConsumedKwh"].as_f64().unwrap())
        .sum();
    let reported = fetched["totalConsumedEnergy"].as_f64().unwrap();
    assert!((total - reported).abs() < 1e-6);
    assert!(fetched["totalMaxPowerKw"].as_f64().unwrap() <= 94.0);
}

#[tokio::test]
async fn list_is_newest_first_without_results() {
    let app = build_app();
    send(&app, post(&run_body("first", 2))).await;
    send(&app, post(&run_body("second", 3))).await;

    let (status, list) = send(&app, get("/simulations")).await;
    assert_eq!(status, StatusCode::OK);

    let runs = list.as_array().unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0]["name"], "second");
    assert_eq!(runs[0]["chargers"], 4);
    assert_eq!(runs[1]["name"], "first");
    assert!(runs.iter().all(|r| r.get("results").is_none()));
}

#[tokio::test]
async fn identical_requests_give_identical_results() {
    let app = build_app();
    let (_, a) = send(&app, post(&run_body("a", 5))).await;
    let (_, b) = send(&app, post(&run_body("a", 5))).await;

    assert_ne!(a["id"], b["id"]);
    assert_eq!(a["results"], b["results"]);
    assert_eq!(a["totalConsumedEnergy"], b["totalConsumedEnergy"]);
}

#[tokio::test]
async fn invalid_request_is_rejected_and_not_recorded() {
    let app = build_app();
    let mut body = run_body("bad", 2);
    body["energyConsumption"] = serde_json::json!(0.0);
    body["chargers"][0]["power"] = serde_json::json!(-11.0);

    let (status, err) = send(&app, post(&body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = err["error"].as_str().unwrap();
    assert!(message.contains("ev_consumption"));
    assert!(message.contains("power_kw"));

    let (_, list) = send(&app, get("/simulations")).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn oversized_fleet_is_rejected_before_allocation() {
    let app = build_app();
    let mut body = run_body("huge", 2);
    body["chargers"][0]["count"] = serde_json::json!(10_000_000_000_u64);

    let (status, err) = send(&app, post(&body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["error"].as_str().unwrap().contains("chargers[0].count"));
}

#[tokio::test]
async fn missing_run_returns_404() {
    let app = build_app();
    let (status, err) = send(&app, get("/simulations/42")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(err.get("error").is_some());
}
