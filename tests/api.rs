use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use vendorbuddy::{
    app_state::AppState,
    config::{Config, CorsConfig, DatabaseConfig, ServerConfig, SessionConfig},
    data_seeder,
    models::{OrderTracking, TrackingStatus},
    routes::create_router,
};

async fn test_app() -> (Router, AppState) {
    let config = Config {
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        session: SessionConfig {
            secret: "test-secret".to_string(),
            ttl_secs: 3600,
        },
        cors: CorsConfig {
            allowed_origins: Vec::new(),
        },
        seed_demo_data: false,
    };

    let state = AppState::new(config).await.unwrap();
    (create_router(state.clone()), state)
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    cookie: Option<&str>,
) -> (StatusCode, Value, Option<String>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let session_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.to_string());

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body, session_cookie)
}

fn signup_body(email: &str, user_type: &str, business_name: &str) -> Value {
    json!({
        "email": email,
        "fullName": "Meera Patil",
        "businessName": business_name,
        "phone": "+91 90000 00001",
        "location": "Pune",
        "password": "secret-pass",
        "userType": user_type,
    })
}

#[tokio::test]
async fn signup_signin_me_flow() {
    let (app, _state) = test_app().await;

    let (status, body, _) = request(
        &app,
        "POST",
        "/signup",
        Some(signup_body("meera@example.com", "vendor", "Meera's Snacks")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "meera@example.com");
    // The password hash must never be serialized.
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["user"].get("password_hash").is_none());

    // Duplicate email creates nothing and reports 400.
    let (status, body, _) = request(
        &app,
        "POST",
        "/signup",
        Some(signup_body("meera@example.com", "vendor", "Meera's Snacks")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User already exists");

    let (status, _, _) = request(
        &app,
        "POST",
        "/signin",
        Some(json!({ "email": "meera@example.com", "password": "wrong" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = request(
        &app,
        "POST",
        "/signin",
        Some(json!({ "email": "nobody@example.com", "password": "secret-pass" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body, cookie) = request(
        &app,
        "POST",
        "/signin",
        Some(json!({ "email": "meera@example.com", "password": "secret-pass" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "meera@example.com");
    let cookie = cookie.expect("signin must set a session cookie");
    assert!(cookie.starts_with("session="));

    let (status, body, _) = request(&app, "GET", "/me", None, Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "meera@example.com");
    assert_eq!(body["supplierId"], Value::Null);

    let (status, _, _) = request(&app, "GET", "/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn supplier_signup_and_products() {
    let (app, _state) = test_app().await;

    let (status, body, _) = request(
        &app,
        "POST",
        "/signup",
        Some(signup_body("acme@example.com", "supplier", "Acme Traders")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let user_id = body["user"]["id"].as_str().unwrap().to_string();
    let supplier_id = body["user"]["supplierId"].as_str().unwrap().to_string();

    let (status, body, _) = request(
        &app,
        "POST",
        "/supplier/add-product",
        Some(json!({
            "name": "Basmati Rice",
            "category": "Grains",
            "price": 95.0,
            "unit": "kg",
            "stock": 120,
            "status": "available",
            "supplierId": user_id,
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["product"]["supplierId"], supplier_id.as_str());

    // Missing required fields
    let (status, _, _) = request(
        &app,
        "POST",
        "/supplier/add-product",
        Some(json!({ "name": "Ghost Product" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A vendor account has no linked supplier
    let (_, body, _) = request(
        &app,
        "POST",
        "/signup",
        Some(signup_body("vendor@example.com", "vendor", "")),
        None,
    )
    .await;
    let vendor_id = body["user"]["id"].as_str().unwrap().to_string();

    let (status, body, _) = request(
        &app,
        "POST",
        "/supplier/add-product",
        Some(json!({
            "name": "Paneer",
            "category": "Dairy",
            "price": 320.0,
            "unit": "kg",
            "stock": 10,
            "status": "low_stock",
            "supplierId": vendor_id,
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User is not a supplier");

    let (status, body, _) = request(
        &app,
        "GET",
        &format!("/supplier/{}/products", supplier_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"].as_array().unwrap().len(), 1);
    assert_eq!(body["products"][0]["name"], "Basmati Rice");

    let (status, _, _) = request(&app, "GET", "/supplier/missing/products", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body, _) = request(&app, "GET", "/suppliers", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Acme Traders");
}

#[tokio::test]
async fn group_order_join_until_full() {
    let (app, _state) = test_app().await;

    let (_, body, _) = request(
        &app,
        "POST",
        "/signup",
        Some(signup_body("acme@example.com", "supplier", "Acme Traders")),
        None,
    )
    .await;
    let supplier_id = body["user"]["supplierId"].as_str().unwrap().to_string();

    let (status, body, _) = request(
        &app,
        "POST",
        "/group-orders",
        Some(json!({
            "title": "Rice bulk",
            "totalItems": 40,
            "maxMembers": 3,
            "deadline": "2025-08-20",
            "savings": "15%",
            "supplierId": supplier_id,
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["currentMembers"], 0);
    assert_eq!(body["maxMembers"], 3);
    let order_id = body["id"].as_str().unwrap().to_string();

    for expected in 1..=3 {
        let (status, body, _) = request(
            &app,
            "POST",
            &format!("/group-orders/{}/join", order_id),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["currentMembers"], expected);
    }

    let (status, body, _) = request(
        &app,
        "POST",
        &format!("/group-orders/{}/join", order_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Group is already full");

    let (status, _, _) = request(&app, "POST", "/group-orders/missing/join", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Creating against an unknown supplier is a validation failure.
    let (status, _, _) = request(
        &app,
        "POST",
        "/group-orders",
        Some(json!({
            "title": "Orphan order",
            "totalItems": 1,
            "maxMembers": 2,
            "deadline": "2025-08-20",
            "savings": "5%",
            "supplierId": "missing",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body, _) = request(&app, "GET", "/group-orders/active", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["supplier"], "Acme Traders");
    assert_eq!(orders[0]["currentMembers"], 3);
}

#[tokio::test]
async fn dashboards() {
    let (app, _state) = test_app().await;

    let (status, _, _) = request(&app, "GET", "/vendor/dashboard-data", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    request(
        &app,
        "POST",
        "/signup",
        Some(signup_body("vendor@example.com", "vendor", "")),
        None,
    )
    .await;
    let (_, _, cookie) = request(
        &app,
        "POST",
        "/signin",
        Some(json!({ "email": "vendor@example.com", "password": "secret-pass" })),
        None,
    )
    .await;
    let cookie = cookie.unwrap();

    let (status, body, _) = request(
        &app,
        "GET",
        "/vendor/dashboard-data",
        None,
        Some(&cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["groupOrders"].is_array());
    assert!(body["suppliers"].is_array());
    assert_eq!(body["savedThisMonth"], 0.0);

    let (status, body, _) = request(&app, "GET", "/supplier/dashboard-data", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["products"].is_array());
    assert!(body["groupOrderRequests"].is_array());
    assert_eq!(body["vendorCount"], 1);
}

#[tokio::test]
async fn order_tracking_read_model() {
    let (app, state) = test_app().await;

    let (status, _, _) = request(&app, "GET", "/order-tracking/missing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let detail = state
        .db
        .create_order_tracking(
            OrderTracking {
                id: "track-1".to_string(),
                title: "Bulk Rice Order".to_string(),
                supplier: "Acme Traders".to_string(),
                status: TrackingStatus::Preparing,
                order_date: "2025-08-01".to_string(),
                estimated_delivery: "2025-08-09".to_string(),
                supplier_phone: "+91 98765 43210".to_string(),
                supplier_address: "14 Market Road, Pune".to_string(),
                total_amount: 9500.0,
            },
            vec![
                ("Basmati Rice".to_string(), 80.0, "kg".to_string(), 95.0),
                ("Turmeric Powder".to_string(), 5.0, "kg".to_string(), 180.0),
            ],
        )
        .await
        .unwrap();
    assert_eq!(detail.items.len(), 2);

    let (status, body, _) = request(&app, "GET", "/order-tracking/track-1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Bulk Rice Order");
    assert_eq!(body["status"], "preparing");
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn demo_seed_is_idempotent() {
    let (app, state) = test_app().await;

    data_seeder::seed_demo_data(&state.db).await.unwrap();
    data_seeder::seed_demo_data(&state.db).await.unwrap();

    let (status, body, _) = request(&app, "GET", "/suppliers", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, body, _) = request(&app, "GET", "/group-orders", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let requests = body.as_array().unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[0]["supplier"]["name"].is_string());
}
