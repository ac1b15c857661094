//! Client tests against a mocked service.

use std::collections::BTreeMap;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use beef_chart_client::{
    BeefChartClient, BulkEditRequest, ClientError, ClientOptions, SaveCutRequest,
};
use beef_chart_core::{BulkEditEntry, BulkStatus, Scalar};

fn admin_client(server: &MockServer) -> BeefChartClient {
    BeefChartClient::with_options(server.uri(), ClientOptions::with_admin_key("admin-key"))
        .unwrap()
}

#[tokio::test]
async fn nonce_then_series() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/nonce"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "nonce": "abc123", "action": "beef_chart", "expires_in": 86400 }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/cuts/series"))
        .and(body_json(json!({ "nonce": "abc123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                { "name": "Queue", "value": 15.0 },
                { "name": "Filet", "value": 95.0 }
            ]
        })))
        .mount(&server)
        .await;

    let client = BeefChartClient::new(server.uri()).unwrap();
    let token = client.nonce().await.unwrap();
    assert_eq!(token.nonce, "abc123");

    let points = client.fetch_series(&token.nonce).await.unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[1].name, "Filet");
    assert!((points[1].value - 95.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn fetch_cuts_parses_records() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/cuts/fetch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{ "id": 1, "name": "Queue", "price": 15.0, "available": true }]
        })))
        .mount(&server)
        .await;

    let client = BeefChartClient::new(server.uri()).unwrap();
    let cuts = client.fetch_cuts("abc123").await.unwrap();
    assert_eq!(cuts.len(), 1);
    assert_eq!(cuts[0].id.get(), 1);
    assert_eq!(cuts[0].price.cents(), 1500);
}

#[tokio::test]
async fn error_envelope_becomes_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/cuts/fetch"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "success": false,
            "data": "Security check failed"
        })))
        .mount(&server)
        .await;

    let client = BeefChartClient::new(server.uri()).unwrap();
    let err = client.fetch_cuts("stale").await.unwrap_err();

    assert_eq!(err.status(), Some(403));
    match err {
        ClientError::Api { message, .. } => assert_eq!(message, "Security check failed"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_keeps_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/nonce"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = BeefChartClient::new(server.uri()).unwrap();
    let err = client.nonce().await.unwrap_err();
    assert_eq!(err.status(), Some(502));
}

#[tokio::test]
async fn save_cut_sends_admin_key_and_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/cuts/save"))
        .and(header("x-admin-key", "admin-key"))
        .and(body_json(json!({
            "nonce": "tok",
            "id": 2,
            "price": 42.5,
            "available": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "message": "Data updated successfully",
                "cut": { "id": 2, "name": "Langue", "price": 42.5, "available": true }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = admin_client(&server);
    let response = client
        .save_cut(
            "tok",
            &SaveCutRequest {
                id: 2,
                price: 42.5,
                available: true,
            },
        )
        .await
        .unwrap();

    assert_eq!(response.message, "Data updated successfully");
    assert_eq!(response.cut.unwrap().price.cents(), 4250);
}

#[tokio::test]
async fn bulk_failure_still_returns_report() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/admin/cuts/bulk"))
        .and(header("x-admin-key", "admin-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "data": {
                "status": "failure",
                "updated": 0,
                "errors": ["Enregistrement avec ID 99 n'existe pas"],
                "message": "Aucune donnée n'a été mise à jour Erreurs: Enregistrement avec ID 99 n'existe pas"
            }
        })))
        .mount(&server)
        .await;

    let client = admin_client(&server);
    let request = BulkEditRequest {
        nonce: "tok".into(),
        entries: BTreeMap::from([(
            "99".to_string(),
            BulkEditEntry {
                price: Some(Scalar::from("10")),
                available: true,
            },
        )]),
    };

    let report = client.bulk_update(&request).await.unwrap();
    assert_eq!(report.status, BulkStatus::Failure);
    assert_eq!(report.updated, 0);
    assert_eq!(report.errors.len(), 1);
}

#[tokio::test]
async fn admin_listing_and_reset() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/admin/cuts"))
        .and(header("x-admin-key", "admin-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "cuts": [{ "id": 1, "name": "Queue", "price": 15.0, "available": false }],
                "count": 1,
                "expected": 29,
                "tokens": { "beef_chart": "a", "bulk_update": "b", "reset": "c" }
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/admin/cuts/reset"))
        .and(body_json(json!({ "nonce": "c" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "inserted": 29,
                "message": "Données réinitialisées avec succès ! 29 enregistrements créés."
            }
        })))
        .mount(&server)
        .await;

    let client = admin_client(&server);
    let listing = client.admin_cuts().await.unwrap();
    assert_eq!(listing.count, 1);
    assert!(!listing.cuts[0].available);

    let reset = client.reset(&listing.tokens.reset).await.unwrap();
    assert_eq!(reset.inserted, 29);
}
