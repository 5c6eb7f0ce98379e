// tests/api_flow.rs
// Fluxos completos pela API HTTP, com armazenamento em memória.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use terreiro_backend::{config::AppState, routes::build_router};

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
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

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn signup(app: &Router, email: &str) -> (String, String) {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({
            "terreiroName": "Tenda Pena Branca",
            "ownerName": "Mãe Maria",
            "email": email,
            "password": "axe123"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let token = body["token"].as_str().unwrap().to_string();
    let client_id = body["user"]["clientId"].as_str().unwrap().to_string();
    (token, client_id)
}

#[tokio::test]
async fn health_and_permissions_are_public() {
    let app = build_router(AppState::in_memory());

    let (status, _) = call(&app, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, Method::GET, "/api/permissions", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().iter().any(|p| p["slug"] == "members:read"));
}

#[tokio::test]
async fn tenant_routes_require_a_token() {
    let app = build_router(AppState::in_memory());

    let (status, body) = call(&app, Method::GET, "/api/members", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = call(&app, Method::GET, "/api/members", Some("lixo"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signup_then_manage_members() {
    let app = build_router(AppState::in_memory());
    let (token, _) = signup(&app, "mae@pena.com").await;

    let (status, me) = call(&app, Method::GET, "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["role"], "ADMIN");
    assert!(me.get("passwordHash").is_none());

    let (status, member) = call(
        &app,
        Method::POST,
        "/api/members",
        Some(&token),
        Some(json!({ "name": "Ana de Oxum", "isMedium": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{member}");
    assert_eq!(member["status"], "ACTIVE");

    let (status, invalid) = call(
        &app,
        Method::POST,
        "/api/members",
        Some(&token),
        Some(json!({ "name": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(invalid["details"]["name"].is_array());

    let (status, list) = call(&app, Method::GET, "/api/members", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let payment_uri = format!("/api/members/{}/payments", member["id"].as_str().unwrap());
    let (status, paid) = call(
        &app,
        Method::PUT,
        &payment_uri,
        Some(&token),
        Some(json!({ "month": "2024-05", "status": "PAID" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["monthlyPayments"]["2024-05"], "PAID");

    let (status, report) =
        call(&app, Method::GET, "/api/finance/report?month=2024-05", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK, "{report}");
    assert_eq!(report["month"], "2024-05");

    let (status, _) =
        call(&app, Method::GET, "/api/finance/report?month=maio", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn operators_cannot_read_finance() {
    let app = build_router(AppState::in_memory());
    let (admin_token, _) = signup(&app, "admin@casa.com").await;

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/users",
        Some(&admin_token),
        Some(json!({
            "email": "secretaria@casa.com",
            "name": "Secretaria",
            "password": "axe123",
            "role": "OPERATOR"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, login) = call(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "secretaria@casa.com", "password": "axe123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let operator_token = login["token"].as_str().unwrap();

    let (status, _) =
        call(&app, Method::GET, "/api/events", Some(operator_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &app,
        Method::GET,
        "/api/finance/report?month=2024-05",
        Some(operator_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn master_blocks_and_releases_a_terreiro() {
    let state = AppState::in_memory();
    state
        .auth_service
        .bootstrap_master("root@saas.com", "segredo")
        .await
        .unwrap();
    let app = build_router(state);

    let (admin_token, client_id) = signup(&app, "dono@casa.com").await;

    let (status, login) = call(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "root@saas.com", "password": "segredo" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let master_token = login["token"].as_str().unwrap();

    // Admin de terreiro não entra no painel master
    let (status, _) =
        call(&app, Method::GET, "/api/master/clients", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, clients) =
        call(&app, Method::GET, "/api/master/clients", Some(master_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(clients.as_array().unwrap().len(), 1);

    let status_uri = format!("/api/master/clients/{client_id}/status");
    let (status, blocked) = call(
        &app,
        Method::PATCH,
        &status_uri,
        Some(master_token),
        Some(json!({ "status": "BLOCKED" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(blocked["status"], "BLOCKED");

    let (status, _) = call(&app, Method::GET, "/api/members", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &app,
        Method::PATCH,
        &status_uri,
        Some(master_token),
        Some(json!({ "status": "ACTIVE" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, Method::GET, "/api/members", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn event_cannot_end_before_it_starts() {
    let app = build_router(AppState::in_memory());
    let (token, _) = signup(&app, "pai@tenda.com").await;

    let event = |end: &str| {
        json!({
            "title": "Gira de Caboclos",
            "kind": "GIRA",
            "date": "2024-05-18",
            "startTime": "20:00:00",
            "endTime": end
        })
    };

    let (status, body) =
        call(&app, Method::POST, "/api/events", Some(&token), Some(event("19:30:00"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["__all__"].is_array());

    let (status, _) =
        call(&app, Method::POST, "/api/events", Some(&token), Some(event("22:00:00"))).await;
    assert_eq!(status, StatusCode::OK);
}
