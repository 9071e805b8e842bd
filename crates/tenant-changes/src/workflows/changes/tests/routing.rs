use super::common::*;
use crate::workflows::changes::router::change_router;
use crate::workflows::changes::service::ChangeRequestService;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

#[tokio::test]
async fn estimate_endpoint_prices_items() {
    let (service, _, _) = service();
    let app = change_router(service);

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/estimate",
            json!({ "items": [{ "code": "EL-003", "qty": 3 }, { "description": "Malowanie" }] }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["subtotal"], json!(660.0));
    assert_eq!(body["vat"], json!(151.8));
    assert_eq!(body["total"], json!(811.8));
    assert_eq!(body["manualCount"], json!(1));
    assert_eq!(body["rows"][0]["unitPrice"], json!(220.0));
    assert_eq!(body["rows"][0]["unit"], json!("szt."));
    assert_eq!(body["rows"][1]["manual"], json!(true));
    assert_eq!(body["rows"][1]["lineTotal"], Value::Null);
}

#[tokio::test]
async fn estimate_endpoint_rejects_non_list_items() {
    let (service, _, _) = service();
    let app = change_router(service);

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/estimate",
            json!({ "items": { "code": "EL-003" } }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn price_list_endpoint_filters_by_branch() {
    let (service, _, _) = service();
    let app = change_router(service);

    let response = app
        .clone()
        .oneshot(empty_request(Method::GET, "/api/price-list/Instalacja%20CO"))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let entries = body.as_array().expect("list of entries");
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0]["code"], json!("SA-002"));

    let unknown = app
        .oneshot(empty_request(Method::GET, "/api/price-list/Ogrody"))
        .await
        .expect("router responds");
    assert_eq!(unknown.status(), StatusCode::OK);
    assert_eq!(json_body(unknown).await, json!([]));
}

#[tokio::test]
async fn submission_returns_created_and_lists_on_dashboard() {
    let (service, _, _) = service();
    let app = change_router(service);

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/requests",
            json!({
                "buyerName": "Anna Nowak",
                "unitNumber": "B2/14",
                "email": "anna.nowak@example.pl",
                "items": "[{\"code\":\"EL-003\",\"qty\":\"3\"}]"
            }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["request"]["status"], json!("nowy"));
    assert_eq!(body["request"]["estimatedCost"]["total"], json!(811.8));
    let id = body["request"]["id"].as_str().expect("id").to_string();

    let listing = app
        .clone()
        .oneshot(empty_request(Method::GET, "/api/dashboard/requests"))
        .await
        .expect("router responds");
    let listing = json_body(listing).await;
    assert_eq!(listing[0]["id"], json!(id));

    let stats = app
        .oneshot(empty_request(Method::GET, "/api/dashboard/stats"))
        .await
        .expect("router responds");
    let stats = json_body(stats).await;
    assert_eq!(stats["total"], json!(1));
    assert_eq!(stats["nowy"], json!(1));
}

#[tokio::test]
async fn unknown_request_is_not_found() {
    let (service, _, _) = service();
    let app = change_router(service);

    let response = app
        .oneshot(empty_request(Method::GET, "/api/dashboard/requests/123-missing"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_update_accepts_polish_labels() {
    let (service, _, _) = service();
    let id = service.submit(change_request()).expect("stored").request.id;
    let app = change_router(service);

    let response = app
        .oneshot(json_request(
            Method::POST,
            &format!("/api/dashboard/requests/{id}/status"),
            json!({ "status": "w trakcie", "notes": "Do wyceny" }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], json!("w trakcie"));
    assert_eq!(body["notes"], json!("Do wyceny"));
}

#[tokio::test]
async fn department_messages_default_signature() {
    let (service, _, _) = service();
    let id = service.submit(change_request()).expect("stored").request.id;
    let app = change_router(service);

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/dashboard/requests/{id}/messages"),
            json!({ "content": "Prosimy o rzut kuchni." }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["messages"][0]["authorName"], json!("Dział Techniczny"));
    assert_eq!(body["messages"][0]["author"], json!("technical_department"));

    let blank = app
        .oneshot(json_request(
            Method::POST,
            &format!("/api/dashboard/requests/{id}/messages"),
            json!({ "content": "  " }),
        ))
        .await
        .expect("router responds");
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn client_flow_through_quote_acceptance() {
    let (service, _, notifier) = service();
    let id = service.submit(change_request()).expect("stored").request.id;
    let app = change_router(service);

    let token_response = app
        .clone()
        .oneshot(empty_request(
            Method::POST,
            &format!("/api/dashboard/requests/{id}/client-token"),
        ))
        .await
        .expect("router responds");
    assert_eq!(token_response.status(), StatusCode::OK);
    let access = json_body(token_response).await;
    let token = access["token"].as_str().expect("token").to_string();
    assert!(notifier.events().is_empty());

    let early = app
        .clone()
        .oneshot(empty_request(Method::POST, &format!("/api/client/{token}/accept")))
        .await
        .expect("router responds");
    assert_eq!(early.status(), StatusCode::CONFLICT);

    let quote = app
        .clone()
        .oneshot(empty_request(
            Method::POST,
            &format!("/api/dashboard/requests/{id}/send-quote"),
        ))
        .await
        .expect("router responds");
    let quote = json_body(quote).await;
    assert_eq!(quote["request"]["status"], json!("oczekuje na akceptację klienta"));
    assert_eq!(quote["request"]["clientToken"], json!(token));

    let view = app
        .clone()
        .oneshot(empty_request(Method::GET, &format!("/api/client/{token}")))
        .await
        .expect("router responds");
    assert_eq!(view.status(), StatusCode::OK);

    let accepted = app
        .oneshot(empty_request(Method::POST, &format!("/api/client/{token}/accept")))
        .await
        .expect("router responds");
    assert_eq!(accepted.status(), StatusCode::OK);
    let accepted = json_body(accepted).await;
    assert_eq!(accepted["status"], json!("zaakceptowany"));
    assert_eq!(notifier.events().len(), 1);
}

#[tokio::test]
async fn unknown_client_token_is_not_found() {
    let (service, _, _) = service();
    let app = change_router(service);

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/client/nope/messages",
            json!({ "content": "Dzień dobry" }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn storage_outage_maps_to_server_error() {
    let service = ChangeRequestService::new(
        Arc::new(UnavailableRepository),
        Arc::new(MemoryNotifier::default()),
        BASE_URL,
    );
    let app = change_router(Arc::new(service));

    let response = app
        .oneshot(empty_request(Method::GET, "/api/dashboard/stats"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
