// ABOUTME: HTTP-level integration tests for the full router with an in-memory database
// ABOUTME: Exercises auth, ownership, prediction ingestion, recommendations, reports and stats
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]

mod common;
mod helpers;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Router;
use common::{
    create_test_patient, create_test_resources, create_test_user, feature_payload_json,
    seed_templates, MockScorer,
};
use helpers::axum_test::AxumTestRequest;
use heartcare_server::{external::RiskScorer, resources::ServerResources, server::build_router};
use serde_json::{json, Value};

async fn setup(scorer: Arc<dyn RiskScorer>) -> (Arc<ServerResources>, Router) {
    let resources = create_test_resources(scorer).await.unwrap();
    let app = build_router(Arc::clone(&resources));
    (resources, app)
}

async fn setup_with_user(scorer: Arc<dyn RiskScorer>) -> (Arc<ServerResources>, Router, String) {
    let (resources, app) = setup(scorer).await;
    let (_, token) = create_test_user(&resources, "doctor@clinic.test").await.unwrap();
    (resources, app, token)
}

async fn create_patient(app: &Router, token: &str, name: &str) -> i64 {
    let body: Value = AxumTestRequest::post("/api/patients")
        .bearer(token)
        .json(&json!({"name": name, "gender": 1, "dob": "1965-03-20"}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    body["id"].as_i64().unwrap()
}

async fn predict(app: &Router, token: &str, patient_id: i64) -> Value {
    AxumTestRequest::post(&format!("/api/patients/{patient_id}/predict"))
        .bearer(token)
        .json(&feature_payload_json())
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json()
}

fn item_names(plan: &Value) -> Vec<String> {
    plan["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap().to_owned())
        .collect()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_and_ready() {
    let (_, app) = setup(Arc::new(MockScorer::failing())).await;

    let health: Value = AxumTestRequest::get("/health")
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(health["status"], "healthy");

    let ready: Value = AxumTestRequest::get("/ready")
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(ready["status"], "ready");
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_register_login_and_me() {
    let (_, app) = setup(Arc::new(MockScorer::failing())).await;
    let credentials = json!({"email": "New.Doctor@Clinic.test", "password": "secret123"});

    let registered: Value = AxumTestRequest::post("/api/auth/register")
        .json(&credentials)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(registered["user"]["email"], "new.doctor@clinic.test");
    assert!(registered["user"].get("password_hash").is_none());
    assert!(registered["token"].as_str().is_some());

    AxumTestRequest::post("/api/auth/register")
        .json(&credentials)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CONFLICT);

    let login: Value = AxumTestRequest::post("/api/auth/login")
        .json(&credentials)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    let token = login["access_token"].as_str().unwrap().to_owned();

    let me: Value = AxumTestRequest::get("/api/users/me")
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(me["email"], "new.doctor@clinic.test");
}

#[tokio::test]
async fn test_auth_rejections() {
    let (_, app) = setup(Arc::new(MockScorer::failing())).await;

    AxumTestRequest::post("/api/auth/register")
        .json(&json!({"email": "short@clinic.test", "password": "123"}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::post("/api/auth/login")
        .json(&json!({"email": "nobody@clinic.test", "password": "whatever"}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    AxumTestRequest::get("/api/patients")
        .send(app.clone())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    AxumTestRequest::get("/api/patients")
        .bearer("not-a-jwt")
        .send(app)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Patients
// ============================================================================

#[tokio::test]
async fn test_error_body_carries_request_id() {
    let (_, app, token) = setup_with_user(Arc::new(MockScorer::failing())).await;

    let response = AxumTestRequest::get("/api/patients/999")
        .bearer(&token)
        .header("x-request-id", "req-from-client")
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.header("x-request-id"), Some("req-from-client"));
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "RESOURCE_NOT_FOUND");
    assert_eq!(body["error"]["request_id"], "req-from-client");

    let response = AxumTestRequest::get("/api/patients/999")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    let generated = response.header("x-request-id").unwrap().to_owned();
    assert!(generated.starts_with("req_"));
    let body: Value = response.json();
    assert_eq!(body["error"]["request_id"], generated.as_str());

    let response = AxumTestRequest::get("/health")
        .header("x-request-id", "req-ok")
        .send(app)
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(response.header("x-request-id"), Some("req-ok"));
    let body: Value = response.json();
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_patient_crud() {
    let (_, app, token) = setup_with_user(Arc::new(MockScorer::failing())).await;
    let id = create_patient(&app, &token, "Ada Lovelace").await;

    let fetched: Value = AxumTestRequest::get(&format!("/api/patients/{id}"))
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(fetched["name"], "Ada Lovelace");
    assert_eq!(fetched["gender"], 1);
    assert_eq!(fetched["dob"], "1965-03-20");

    let updated: Value = AxumTestRequest::put(&format!("/api/patients/{id}"))
        .bearer(&token)
        .json(&json!({"name": "Ada King", "gender": 2}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(updated["name"], "Ada King");
    assert_eq!(updated["gender"], 2);
    assert_eq!(updated["dob"], "1965-03-20");

    let list: Value = AxumTestRequest::get("/api/patients")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(list["patients"].as_array().unwrap().len(), 1);
    assert!(list["patients"][0].get("latest_prediction").is_none());

    AxumTestRequest::delete(&format!("/api/patients/{id}"))
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    AxumTestRequest::get(&format!("/api/patients/{id}"))
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patient_validation() {
    let (_, app, token) = setup_with_user(Arc::new(MockScorer::failing())).await;

    for body in [
        json!({"name": "", "gender": 1, "dob": "1970-01-01"}),
        json!({"name": "Bob", "gender": 9, "dob": "1970-01-01"}),
        json!({"name": "Bob", "gender": 1, "dob": "01/01/1970"}),
    ] {
        AxumTestRequest::post("/api/patients")
            .bearer(&token)
            .json(&body)
            .send(app.clone())
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_other_users_patient_is_forbidden() {
    let (resources, app, token) = setup_with_user(Arc::new(MockScorer::returning(0.9, "high"))).await;
    let (intruder, intruder_token) = create_test_user(&resources, "intruder@clinic.test")
        .await
        .unwrap();
    let id = create_patient(&app, &token, "Private Patient").await;

    for uri in [
        format!("/api/patients/{id}"),
        format!("/api/patients/{id}/predictions"),
        format!("/api/patients/{id}/recommendations"),
        format!("/api/patients/{id}/report"),
    ] {
        AxumTestRequest::get(&uri)
            .bearer(&intruder_token)
            .send(app.clone())
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    AxumTestRequest::post(&format!("/api/patients/{id}/predict"))
        .bearer(&intruder_token)
        .json(&feature_payload_json())
        .send(app.clone())
        .await
        .assert_status(StatusCode::FORBIDDEN);

    AxumTestRequest::get("/api/patients/999999")
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let own = resources
        .database
        .patients()
        .list_patients(intruder.id, None, None, None)
        .await
        .unwrap();
    assert!(own.is_empty());
}

#[tokio::test]
async fn test_risk_filter_on_patient_list() {
    let (_, app, token) = setup_with_user(Arc::new(MockScorer::returning(0.81, "High"))).await;
    let scored = create_patient(&app, &token, "Scored").await;
    let unscored = create_patient(&app, &token, "Unscored").await;
    predict(&app, &token, scored).await;

    let ids = |body: &Value| -> Vec<i64> {
        body["patients"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_i64().unwrap())
            .collect()
    };

    let high: Value = AxumTestRequest::get("/api/patients?risk=high")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(ids(&high), vec![scored]);
    assert_eq!(high["patients"][0]["latest_prediction"]["risk_label"], "High");

    let none: Value = AxumTestRequest::get("/api/patients?risk=none")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(ids(&none), vec![unscored]);

    let low: Value = AxumTestRequest::get("/api/patients?risk=low")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert!(ids(&low).is_empty());

    AxumTestRequest::get("/api/patients?risk=severe")
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Predictions and Recommendations
// ============================================================================

#[tokio::test]
async fn test_predict_returns_prediction_and_plan() {
    let (resources, app, token) =
        setup_with_user(Arc::new(MockScorer::returning(0.77, "high"))).await;
    seed_templates(
        &resources.database,
        &[("Brisk walking", "high"), ("Jogging", "low"), ("Yoga", "")],
    )
    .await
    .unwrap();
    let id = create_patient(&app, &token, "Alan").await;

    let body = predict(&app, &token, id).await;

    assert_eq!(body["prediction"]["patient_id"], id);
    assert_eq!(body["prediction"]["risk_label"], "high");
    assert_eq!(body["prediction"]["raw_features"]["cholesterol"], 3);
    assert_eq!(item_names(&body["recommendation"]), vec!["Brisk walking", "Yoga"]);

    let list: Value = AxumTestRequest::get(&format!("/api/patients/{id}/predictions"))
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(list["predictions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_payload_never_reaches_scorer() {
    let scorer = Arc::new(MockScorer::returning(0.3, "low"));
    let (_, app, token) = setup_with_user(Arc::clone(&scorer) as Arc<dyn RiskScorer>).await;
    let id = create_patient(&app, &token, "Katherine").await;

    let mut payload = feature_payload_json();
    payload["gender"] = json!(7);

    AxumTestRequest::post(&format!("/api/patients/{id}/predict"))
        .bearer(&token)
        .json(&payload)
        .send(app)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(scorer.calls(), 0);
}

#[tokio::test]
async fn test_scorer_failure_returns_bad_gateway() {
    let (resources, app, token) = setup_with_user(Arc::new(MockScorer::failing())).await;
    let id = create_patient(&app, &token, "Margaret").await;

    AxumTestRequest::post(&format!("/api/patients/{id}/predict"))
        .bearer(&token)
        .json(&feature_payload_json())
        .send(app)
        .await
        .assert_status(StatusCode::BAD_GATEWAY);

    let stored = resources
        .database
        .predictions()
        .list_by_patient(id, None, None)
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_plan_storage_failure_still_returns_plan() {
    let (resources, app, token) =
        setup_with_user(Arc::new(MockScorer::returning(0.45, "medium"))).await;
    seed_templates(&resources.database, &[("Cycling", "medium")])
        .await
        .unwrap();
    let id = create_patient(&app, &token, "Radia").await;

    sqlx::query("DROP TABLE exercise_recommendations")
        .execute(resources.database.pool())
        .await
        .unwrap();

    let body = predict(&app, &token, id).await;
    assert_eq!(item_names(&body["recommendation"]), vec!["Cycling"]);
    assert_eq!(body["prediction"]["risk_label"], "medium");
}

#[tokio::test]
async fn test_recommendations_follow_catalog_drift() {
    let (resources, app, token) =
        setup_with_user(Arc::new(MockScorer::returning(0.9, "high"))).await;
    let templates = seed_templates(
        &resources.database,
        &[("Walking", "high"), ("Swimming", "high"), ("Rowing", "high")],
    )
    .await
    .unwrap();
    let id = create_patient(&app, &token, "Frances").await;
    predict(&app, &token, id).await;

    AxumTestRequest::delete(&format!("/api/exercise-templates/{}", templates[1].id))
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    AxumTestRequest::put(&format!("/api/exercise-templates/{}", templates[0].id))
        .bearer(&token)
        .json(&json!({
            "name": "Power walking",
            "intensity": "moderate",
            "duration_min": 45,
            "freq_per_week": 4,
            "target_risk_level": "high"
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);

    let body: Value = AxumTestRequest::get(&format!("/api/patients/{id}/recommendations"))
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();

    let recommendations = body["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 1);
    let plan = &recommendations[0]["plan"];
    assert_eq!(item_names(plan), vec!["Power walking", "Rowing"]);
    assert_eq!(plan["items"][0]["duration_min"], 45);
}

// ============================================================================
// Exercise Templates
// ============================================================================

#[tokio::test]
async fn test_exercise_template_admin() {
    let (_, app, token) = setup_with_user(Arc::new(MockScorer::failing())).await;

    let created: Value = AxumTestRequest::post("/api/exercise-templates")
        .bearer(&token)
        .json(&json!({
            "name": "  Tai chi ",
            "intensity": "light",
            "duration_min": 20,
            "freq_per_week": 2,
            "target_risk_level": "HIGH",
            "tags": ["balance"]
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(created["name"], "Tai chi");
    assert_eq!(created["target_risk_level"], "high");
    let id = created["id"].as_i64().unwrap();

    AxumTestRequest::post("/api/exercise-templates")
        .bearer(&token)
        .json(&json!({
            "name": " ",
            "intensity": "light",
            "duration_min": 20,
            "freq_per_week": 2
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let list: Value = AxumTestRequest::get("/api/exercise-templates")
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(list["templates"].as_array().unwrap().len(), 1);

    AxumTestRequest::delete(&format!("/api/exercise-templates/{id}"))
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    AxumTestRequest::delete(&format!("/api/exercise-templates/{id}"))
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

// ============================================================================
// Reports and Stats
// ============================================================================

#[tokio::test]
async fn test_report_json_and_html() {
    let (resources, app, token) =
        setup_with_user(Arc::new(MockScorer::returning(0.826, "high"))).await;
    seed_templates(&resources.database, &[("Walking", "high")])
        .await
        .unwrap();
    let id = create_patient(&app, &token, "<b>Ann</b>").await;
    predict(&app, &token, id).await;

    let report: Value = AxumTestRequest::get(&format!("/api/patients/{id}/report"))
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(report["clinic_name"], "Test Clinic");
    assert_eq!(report["latest_prediction"]["probability_pct"], 83);
    assert_eq!(report["latest_prediction"]["label"], "High risk");
    assert!(!report["latest_prediction"]["risk_factors"]
        .as_array()
        .unwrap()
        .is_empty());
    assert_eq!(report["patient"]["age_years"], 54);
    assert_eq!(report["patient"]["bmi"], 30.3);
    assert_eq!(item_names(&report["exercise_plan"]), vec!["Walking"]);
    assert_eq!(report["history"].as_array().unwrap().len(), 1);

    let response = AxumTestRequest::get(&format!("/api/patients/{id}/report.html"))
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::OK);
    assert!(response
        .content_type()
        .is_some_and(|ct| ct.starts_with("text/html")));
    let html = response.text();
    assert!(html.contains("&lt;b&gt;Ann&lt;/b&gt;"));
    assert!(!html.contains("<b>Ann</b>"));
    assert!(html.contains("Walking"));
}

#[tokio::test]
async fn test_report_plan_matches_latest_recommendation_after_drift() {
    let (resources, app, token) =
        setup_with_user(Arc::new(MockScorer::returning(0.9, "high"))).await;
    let templates = seed_templates(
        &resources.database,
        &[
            ("Walking", "high"),
            ("Swimming", "high"),
            ("Rowing", "high"),
            ("Cycling", "high"),
        ],
    )
    .await
    .unwrap();
    let id = create_patient(&app, &token, "Grace").await;

    let first = predict(&app, &token, id).await;
    assert_eq!(
        item_names(&first["recommendation"]),
        vec!["Walking", "Swimming", "Rowing"]
    );

    AxumTestRequest::delete(&format!("/api/exercise-templates/{}", templates[0].id))
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let second = predict(&app, &token, id).await;
    assert_eq!(
        item_names(&second["recommendation"]),
        vec!["Swimming", "Rowing", "Cycling"]
    );

    AxumTestRequest::delete(&format!("/api/exercise-templates/{}", templates[2].id))
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);
    AxumTestRequest::put(&format!("/api/exercise-templates/{}", templates[1].id))
        .bearer(&token)
        .json(&json!({
            "name": "Open water swim",
            "intensity": "vigorous",
            "duration_min": 40,
            "freq_per_week": 2,
            "target_risk_level": "high"
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK);

    let listing: Value = AxumTestRequest::get(&format!("/api/patients/{id}/recommendations"))
        .bearer(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    let newest = &listing["recommendations"][0];
    assert_eq!(newest["prediction_id"], second["prediction"]["id"]);
    assert_eq!(item_names(&newest["plan"]), vec!["Open water swim", "Cycling"]);

    let report: Value = AxumTestRequest::get(&format!("/api/patients/{id}/report"))
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(report["exercise_plan"], newest["plan"]);
    assert_eq!(report["history"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_report_without_predictions() {
    let (_, app, token) = setup_with_user(Arc::new(MockScorer::failing())).await;
    let id = create_patient(&app, &token, "Fresh Patient").await;

    let report: Value = AxumTestRequest::get(&format!("/api/patients/{id}/report"))
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert!(report.get("latest_prediction").is_none());
    assert!(report.get("exercise_plan").is_none());
    assert!(report["history"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_stats_are_scoped_to_user() {
    let (resources, app, token) =
        setup_with_user(Arc::new(MockScorer::returning(0.9, "High"))).await;
    let first = create_patient(&app, &token, "One").await;
    create_patient(&app, &token, "Two").await;
    predict(&app, &token, first).await;
    predict(&app, &token, first).await;

    let (other, _) = create_test_user(&resources, "other@clinic.test").await.unwrap();
    create_test_patient(&resources.database, &other, "Someone else")
        .await
        .unwrap();

    let stats: Value = AxumTestRequest::get("/api/stats")
        .bearer(&token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(stats["total_patients"], 2);
    assert_eq!(stats["total_predictions"], 2);
    assert_eq!(
        stats["risk_counts"],
        json!([{"risk_label": "high", "count": 1}])
    );
}
