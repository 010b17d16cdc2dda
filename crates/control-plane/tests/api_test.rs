// Router tests for the Gatherly API over in-memory storage
//
// Run with: cargo test -p gatherly-control-plane --test api_test

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use gatherly_control_plane::auth::{AdminConfig, AuthConfig, AuthMode};
use gatherly_control_plane::{Gatherly, ServerConfig};
use gatherly_core::{NewServiceProvider, ServiceKind};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

async fn dev_app() -> Gatherly {
    Gatherly::init(&ServerConfig::default(), AuthConfig::default())
        .await
        .unwrap()
}

async fn full_auth_app() -> Gatherly {
    let mut auth = AuthConfig::with_mode(AuthMode::Full);
    auth.admin = Some(AdminConfig {
        email: "admin@gatherly.test".to_string(),
        password: "admin-secret".to_string(),
    });
    Gatherly::init(&ServerConfig::default(), auth).await.unwrap()
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn seed_provider(app: &Gatherly, name: &str, category: ServiceKind) -> Uuid {
    app.backend
        .create_provider(NewServiceProvider {
            owner_id: Uuid::now_v7(),
            business_name: name.to_string(),
            category,
            description: None,
            location: "Mumbai".to_string(),
            price_from: Some(30000.0),
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_intake_flow_over_http() {
    let app = dev_app().await;
    let router = app.router();

    let (status, view) = send(&router, Method::POST, "/v1/intake", None, None).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = view["id"].as_str().unwrap().to_string();
    assert_eq!(view["pointer"], 0);
    assert_eq!(view["total_steps"], 10);
    assert_eq!(view["current_step"]["kind"], "single_choice");

    // Rejected answer keeps the pointer
    let (status, reply) = send(
        &router,
        Method::POST,
        &format!("/v1/intake/{id}/answer"),
        Some(json!({ "step_index": 0, "value": "Gala" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(reply["session"]["pointer"], 0);
    assert!(reply["error"].is_string());

    for (index, value) in ["Wedding", "2025-06-01", "Mumbai", "100-200"].iter().enumerate() {
        let (status, reply) = send(
            &router,
            Method::POST,
            &format!("/v1/intake/{id}/answer"),
            Some(json!({ "step_index": index, "value": value })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK, "step {index}: {reply}");
    }

    for option in ["Photographer", "Venue"] {
        let (status, reply) = send(
            &router,
            Method::POST,
            &format!("/v1/intake/{id}/toggle"),
            Some(json!({ "option": option })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["selected"], true);
    }
    let (status, reply) = send(
        &router,
        Method::POST,
        &format!("/v1/intake/{id}/confirm"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["session"]["pointer"], 5);

    for (index, value) in [(5, "500000"), (6, "Rustic"), (7, "Asha Rao"), (8, "asha@example.com")] {
        let (status, _) = send(
            &router,
            Method::POST,
            &format!("/v1/intake/{id}/answer"),
            Some(json!({ "step_index": index, "value": value })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    // Skipping the optional phone completes the flow and writes once
    let (status, reply) = send(
        &router,
        Method::POST,
        &format!("/v1/intake/{id}/skip"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["session"]["complete"], true);
    assert_eq!(reply["session"]["submit_state"]["state"], "submitted");
    assert_eq!(reply["toasts"][0]["severity"], "success");

    // The session closes once stored, so a second submit finds nothing
    let (status, _) = send(
        &router,
        Method::POST,
        &format!("/v1/intake/{id}/submit"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.intake_service.session_count(), 0);

    let (status, list) = send(&router, Method::GET, "/v1/admin/requirements", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let data = list["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["email"], "asha@example.com");
    assert_eq!(data[0]["phone"], "");
    assert_eq!(data[0]["services"], json!(["photographer", "venue"]));
    assert_eq!(data[0]["status"], "new");
}

#[tokio::test]
async fn test_unknown_intake_session_is_404() {
    let app = dev_app().await;
    let router = app.router();
    let (status, body) = send(
        &router,
        Method::GET,
        &format!("/v1/intake/{}", Uuid::now_v7()),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_admin_event_reaches_live_feed() {
    let app = dev_app().await;
    let router = app.router();

    let start = chrono::Utc::now() + chrono::Duration::days(3);
    let (status, created) = send(
        &router,
        Method::POST,
        "/v1/admin/events",
        Some(json!({
            "title": "Sunburn Arena",
            "start_time": start,
            "location": "Goa",
            "category": "Music"
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let event_id = created["id"].as_str().unwrap().to_string();

    let (status, upcoming) = send(&router, Method::GET, "/v1/events", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(upcoming["data"][0]["title"], "Sunburn Arena");

    // The feed applies the pushed insert in the background
    let mut live = Value::Null;
    for _ in 0..50 {
        let (_, snapshot) = send(&router, Method::GET, "/v1/events/live", None, None).await;
        if snapshot["events"].as_array().is_some_and(|e| !e.is_empty()) {
            live = snapshot;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(live["loading"], false);
    assert_eq!(live["events"][0]["id"], event_id.as_str());

    let (status, _) = send(
        &router,
        Method::DELETE,
        &format!("/v1/admin/events/{event_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &router,
        Method::DELETE,
        &format!("/v1/admin/events/{event_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_event_title_rejected() {
    let app = dev_app().await;
    let router = app.router();
    let (status, _) = send(
        &router,
        Method::POST,
        "/v1/admin/events",
        Some(json!({
            "title": "  ",
            "start_time": chrono::Utc::now(),
            "location": "Pune"
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_provider_approval_and_search() {
    let app = dev_app().await;
    let router = app.router();
    let lens = seed_provider(&app, "Lens Craft", ServiceKind::Photographer).await;
    seed_provider(&app, "Royal Lawns", ServiceKind::Venue).await;

    // Pending providers are not listed
    let (status, found) = send(&router, Method::GET, "/v1/providers", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(found["data"].as_array().unwrap().is_empty());

    let (status, pending) = send(
        &router,
        Method::GET,
        "/v1/admin/providers?status=pending",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending["data"].as_array().unwrap().len(), 2);

    let (status, approved) = send(
        &router,
        Method::POST,
        &format!("/v1/admin/providers/{lens}/approve"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["data"]["status"], "approved");
    assert_eq!(approved["toasts"][0]["severity"], "success");
    assert_eq!(approved["toasts"][0]["title"], "Provider approved");

    let (_, found) = send(
        &router,
        Method::GET,
        "/v1/providers?category=photographer&search=lens",
        None,
        None,
    )
    .await;
    let data = found["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["business_name"], "Lens Craft");

    let (_, categories) = send(&router, Method::GET, "/v1/categories", None, None).await;
    let photographer = categories["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["kind"] == "photographer")
        .cloned()
        .unwrap();
    assert_eq!(photographer["provider_count"], 1);

    let (status, _) = send(
        &router,
        Method::POST,
        &format!("/v1/admin/providers/{}/reject", Uuid::now_v7()),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wrong_password_is_unsuccessful_outcome() {
    let app = full_auth_app().await;
    let router = app.router();

    let (status, outcome) = send(
        &router,
        Method::POST,
        "/v1/auth/sign-in",
        Some(json!({ "email": "admin@gatherly.test", "password": "wrong" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(outcome["success"], false);
    assert_eq!(outcome["message"], "Invalid login credentials");
}

#[tokio::test]
async fn test_admin_routes_require_admin_role() {
    let app = full_auth_app().await;
    let router = app.router();

    let (status, _) = send(&router, Method::GET, "/v1/admin/requirements", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, outcome) = send(
        &router,
        Method::POST,
        "/v1/auth/sign-up",
        Some(json!({
            "email": "asha@example.com",
            "password": "secret1",
            "metadata": { "full_name": "Asha Rao", "role": "admin" }
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(outcome["session"]["role"], "customer");
    let customer_token = outcome["session"]["access_token"].as_str().unwrap().to_string();

    let (status, _) = send(
        &router,
        Method::GET,
        "/v1/admin/requirements",
        None,
        Some(&customer_token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, outcome) = send(
        &router,
        Method::POST,
        "/v1/auth/sign-in",
        Some(json!({ "email": "admin@gatherly.test", "password": "admin-secret" })),
        None,
    )
    .await;
    assert_eq!(outcome["success"], true);
    let admin_token = outcome["session"]["access_token"].as_str().unwrap().to_string();

    let (status, _) = send(
        &router,
        Method::GET,
        "/v1/admin/requirements",
        None,
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Signed-out tokens stop working
    let (status, _) = send(
        &router,
        Method::POST,
        "/v1/auth/sign-out",
        None,
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &router,
        Method::GET,
        "/v1/admin/requirements",
        None,
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
