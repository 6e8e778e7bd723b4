//! HTTP behaviour of the prediction client against a mock service, and the
//! engine's fallback to the local estimator.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use household_energy_analytics::billing::{EstimationEngine, LocalEstimator, ServiceStatus};
use household_energy_analytics::domain::{
    ApplianceEntry, ApplianceInventory, BudgetStatus, EstimateSource, HouseholdProfile,
    IncomeLevel, Region,
};
use household_energy_analytics::prediction::{
    PredictionClient, PredictionError, PredictionRequest, RemoteEstimator, ServiceState,
};

fn inventory() -> ApplianceInventory {
    ApplianceInventory::from_entries(vec![
        ApplianceEntry::new("Refrigerator", 150.0, 8.0, 1, 30).unwrap(),
        ApplianceEntry::new("TV", 100.0, 5.0, 1, 30).unwrap(),
    ])
    .unwrap()
}

fn household() -> HouseholdProfile {
    HouseholdProfile::new(Region::Kigali, IncomeLevel::High, 5, 8_000.0).unwrap()
}

fn prediction_body() -> serde_json::Value {
    json!({
        "total_kwh": 50.0,
        "total_bill": 7050.0,
        "tariff_bracket": "21-50 kWh",
        "budget_status": "within_budget",
        "budget_difference": 950.0,
        "message": "Prediction generated",
        "breakdown": [
            {"appliance": "Refrigerator", "estimated_kwh": 35.0, "estimated_bill": 4935.0, "percentage": 70.0, "power_watts": 150.0},
            {"appliance": "TV", "estimated_kwh": 15.0, "estimated_bill": 2115.0, "percentage": 30.0}
        ]
    })
}

async fn healthy_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "healthy", "model_loaded": true})),
        )
        .mount(&server)
        .await;
    server
}

fn client(server: &MockServer, timeout: Duration) -> PredictionClient {
    PredictionClient::new(server.uri(), timeout).unwrap()
}

#[tokio::test]
async fn health_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "degraded", "model_loaded": false})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let health = client(&server, Duration::from_secs(2)).health().await.unwrap();
    assert_eq!(health.status, ServiceState::Degraded);
    assert!(!health.is_ready());
}

#[tokio::test]
async fn predict_posts_wire_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(body_partial_json(json!({
            "household_info": {"region": "Kigali", "income_level": "High", "appliances_count": 2, "budget": 8000.0}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(prediction_body()))
        .expect(1)
        .mount(&server)
        .await;

    let request = PredictionRequest::new(&inventory(), &household());
    assert_eq!(request.appliances[0].power_unit, "W");
    let response = client(&server, Duration::from_secs(2)).predict(&request).await.unwrap();
    assert_eq!(response.total_kwh, 50.0);
    assert_eq!(response.budget_status, BudgetStatus::WithinBudget);
    assert_eq!(response.breakdown.len(), 2);
    assert_eq!(response.breakdown[1].power_watts, 0.0);
}

#[tokio::test]
async fn http_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(503).set_body_string("model not loaded"))
        .mount(&server)
        .await;

    let request = PredictionRequest::new(&inventory(), &household());
    let err = client(&server, Duration::from_secs(2)).predict(&request).await.unwrap_err();
    assert_eq!(
        err,
        PredictionError::Http { status: 503, body: "model not loaded".into() }
    );
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": "lots"})))
        .mount(&server)
        .await;

    let request = PredictionRequest::new(&inventory(), &household());
    let err = client(&server, Duration::from_secs(2)).predict(&request).await.unwrap_err();
    assert!(matches!(err, PredictionError::Decode(_)));
}

#[tokio::test]
async fn slow_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "healthy", "model_loaded": true}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let timeout = Duration::from_millis(200);
    let err = client(&server, timeout).health().await.unwrap_err();
    assert_eq!(err, PredictionError::Timeout(timeout));
}

#[tokio::test]
async fn engine_uses_healthy_service() {
    let server = healthy_server().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(prediction_body()))
        .mount(&server)
        .await;

    let timeout = Duration::from_secs(2);
    let engine = EstimationEngine::with_remote(
        LocalEstimator::default(),
        Arc::new(client(&server, timeout)),
        timeout,
        true,
    );
    let outcome = engine.estimate(&inventory(), &household()).await.unwrap();
    assert_eq!(outcome.service, ServiceStatus::Used);
    let estimate = outcome.estimate;
    assert_eq!(estimate.source, EstimateSource::Remote);
    assert_eq!(estimate.total_consumption_kwh, 50.0);
    assert_eq!(estimate.rate_per_kwh, 141.0);
    assert_eq!(estimate.message.as_deref(), Some("Prediction generated"));
    assert_eq!(estimate.budget_status, BudgetStatus::WithinBudget);
    assert!((estimate.budget_delta - 950.0).abs() < 1e-9);
}

#[tokio::test]
async fn engine_falls_back_on_server_error() {
    let server = healthy_server().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let timeout = Duration::from_secs(2);
    let engine = EstimationEngine::with_remote(
        LocalEstimator::default(),
        Arc::new(client(&server, timeout)),
        timeout,
        true,
    );
    let outcome = engine.estimate(&inventory(), &household()).await.unwrap();
    assert!(matches!(outcome.service, ServiceStatus::Unavailable { .. }));
    // 36 kWh + 15 kWh = 51 kWh in the open bracket.
    let estimate = outcome.estimate;
    assert_eq!(estimate.source, EstimateSource::Local);
    assert!((estimate.total_consumption_kwh - 51.0).abs() < 1e-9);
    assert_eq!(estimate.tariff_bracket, "50+ kWh");
    assert!((estimate.estimated_bill - 51.0 * 171.0).abs() < 1e-6);
    assert_eq!(estimate.budget_status, BudgetStatus::OverBudget);
}

#[tokio::test]
async fn engine_falls_back_when_service_is_down() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let timeout = Duration::from_secs(2);
    let engine = EstimationEngine::with_remote(
        LocalEstimator::default(),
        Arc::new(PredictionClient::new(uri, timeout).unwrap()),
        timeout,
        true,
    );
    let outcome = engine.estimate(&inventory(), &household()).await.unwrap();
    assert_eq!(outcome.estimate.source, EstimateSource::Local);
}
