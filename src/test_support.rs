use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use crate::{app::build_app, state::AppState};

pub const TEST_PASSWORD: &str = "Password1!";

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::fake();
        let router = build_app(state.clone()).expect("router builds");
        Self { state, router }
    }
}

/// Sends one request through the full router and returns status and body text.
pub async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, String) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, token);
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => req.body(Body::empty()),
    }
    .unwrap();

    let res = app.router.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

pub fn user_payload(email: &str, is_business: bool, is_admin: bool) -> Value {
    json!({
        "name": { "first": "Noa", "last": "Levi" },
        "phone": "052-1234567",
        "email": email,
        "password": TEST_PASSWORD,
        "isBusiness": is_business,
        "isAdmin": is_admin,
        "address": {
            "country": "Israel",
            "city": "Tel Aviv",
            "street": "Herzl",
            "houseNumber": 10
        }
    })
}

pub fn card_payload(title: &str) -> Value {
    json!({
        "title": title,
        "subtitle": "Open every day",
        "description": "Fresh food near the beach",
        "phone": "03-1234567",
        "email": "shop@example.com",
        "web": "https://shop.example.com",
        "image": { "url": "https://images.example.com/shop.png", "alt": "shop" },
        "address": {
            "country": "Israel",
            "city": "Tel Aviv",
            "street": "Dizengoff",
            "houseNumber": 5
        }
    })
}

/// Registers a user and returns its id and token.
pub async fn register_user(
    app: &TestApp,
    email: &str,
    is_business: bool,
    is_admin: bool,
) -> (Uuid, String) {
    let (status, token) = send(
        app,
        "POST",
        "/api/users/register",
        None,
        Some(user_payload(email, is_business, is_admin)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {token}");
    let user = app
        .state
        .users
        .find_by_email(&email.to_lowercase())
        .await
        .unwrap()
        .expect("registered user");
    (user.id, token)
}
