// REST surface for the group purchasing API. Handlers stay thin: decode,
// validate, call the database or the group order service, encode.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::{
    app_state::AppState,
    auth::SESSION_COOKIE,
    error::{AppError, AppResult},
    models::{
        ActiveGroupOrder, GroupOrder, GroupOrderRequestWithSupplier, NewGroupOrder, NewProduct,
        NewSupplier, NewUser, ProductStatus, Supplier, User, UserType,
    },
};

// API request types
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignupRequest {
    email: String,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    business_name: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    location: String,
    password: String,
    user_type: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SigninRequest {
    email: String,
    password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddProductRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    price: f64,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    stock: i64,
    #[serde(default)]
    status: String,
    /// The *user* id of the supplier account, not the supplier row id.
    #[serde(default)]
    supplier_id: String,
}

/// Resolve the caller from the session cookie.
async fn current_user(state: &AppState, jar: &CookieJar) -> AppResult<User> {
    let cookie = jar
        .get(SESSION_COOKIE)
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

    let claims = state.auth.validate_token(cookie.value())?;

    state
        .db
        .get_user_by_id(&claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "vendorbuddy"
    }))
}

async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> AppResult<impl IntoResponse> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }
    let user_type = UserType::parse(&request.user_type).ok_or_else(|| {
        AppError::Validation(format!("Unknown user type: {}", request.user_type))
    })?;

    if state.db.get_user_by_email(&request.email).await?.is_some() {
        return Err(AppError::Validation("User already exists".to_string()));
    }

    let password_hash = state.auth.hash_password(&request.password)?;

    // Supplier accounts get a supplier record created up front and linked.
    let supplier_id = match user_type {
        UserType::Supplier => {
            let supplier = state
                .db
                .create_supplier(NewSupplier::from_business_name(&request.business_name))
                .await?;
            Some(supplier.id)
        }
        UserType::Vendor => None,
    };

    let user = state
        .db
        .create_user(NewUser {
            email: request.email,
            full_name: request.full_name,
            business_name: request.business_name,
            phone: request.phone,
            location: request.location,
            password_hash,
            user_type,
            supplier_id,
        })
        .await?;

    info!("Created {} account for {}", user.user_type.as_str(), user.email);

    let message = match user.user_type {
        UserType::Supplier => "New supplier user created",
        UserType::Vendor => "New user created",
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": message, "user": user })),
    ))
}

async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<SigninRequest>,
) -> AppResult<impl IntoResponse> {
    let user = state
        .db
        .get_user_by_email(&request.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !state
        .auth
        .verify_password(&request.password, &user.password_hash)?
    {
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    let token = state.auth.issue_token(&user.id, &user.email)?;
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .build();

    info!("User {} signed in", user.email);

    Ok((
        jar.add(cookie),
        Json(json!({ "message": "Signed in successfully", "user": user })),
    ))
}

async fn me(State(state): State<AppState>, jar: CookieJar) -> AppResult<Json<Value>> {
    let user = current_user(&state, &jar).await?;
    let supplier_id = user.supplier_id.clone();

    Ok(Json(json!({ "user": user, "supplierId": supplier_id })))
}

async fn vendor_dashboard(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<Json<Value>> {
    let user = current_user(&state, &jar).await?;

    let group_orders = state.db.list_group_orders().await?;
    let suppliers = state.db.list_suppliers().await?;

    Ok(Json(json!({
        "groupOrders": group_orders,
        "suppliers": suppliers,
        "savedThisMonth": user.saved_this_month,
    })))
}

async fn supplier_dashboard(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let products = state.db.list_products().await?;
    let group_order_requests = state.db.list_group_order_requests().await?;
    let total_savings = state.db.total_saved_this_month().await?;
    let vendor_count = state.db.count_vendors().await?;

    Ok(Json(json!({
        "products": products,
        "groupOrderRequests": group_order_requests,
        "totalSavings": total_savings,
        "vendorCount": vendor_count,
    })))
}

async fn add_product(
    State(state): State<AppState>,
    Json(request): Json<AddProductRequest>,
) -> AppResult<impl IntoResponse> {
    if request.name.trim().is_empty()
        || request.category.trim().is_empty()
        || request.unit.trim().is_empty()
        || request.status.trim().is_empty()
        || request.supplier_id.trim().is_empty()
    {
        return Err(AppError::Validation("Missing required fields".to_string()));
    }
    let status = ProductStatus::parse(&request.status).ok_or_else(|| {
        AppError::Validation(format!("Unknown product status: {}", request.status))
    })?;

    let supplier_id = state
        .db
        .get_user_by_id(&request.supplier_id)
        .await?
        .and_then(|user| user.supplier_id)
        .ok_or_else(|| AppError::BadRequest("User is not a supplier".to_string()))?;

    let product = state
        .db
        .create_product(NewProduct {
            name: request.name,
            category: request.category,
            price: request.price,
            unit: request.unit,
            stock: request.stock,
            status,
            supplier_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Product added successfully", "product": product })),
    ))
}

async fn supplier_products(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    if state.db.get_supplier(&id).await?.is_none() {
        return Err(AppError::NotFound("Supplier not found".to_string()));
    }

    let products = state.db.products_for_supplier(&id).await?;
    Ok(Json(json!({ "products": products })))
}

async fn list_group_order_requests(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<GroupOrderRequestWithSupplier>>> {
    Ok(Json(state.db.list_group_order_requests_with_supplier().await?))
}

async fn list_active_group_orders(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ActiveGroupOrder>>> {
    Ok(Json(state.group_orders.list_active().await?))
}

async fn create_group_order(
    State(state): State<AppState>,
    Json(request): Json<NewGroupOrder>,
) -> AppResult<impl IntoResponse> {
    let order = state.group_orders.create(request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn join_group_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<GroupOrder>> {
    let order = state.group_orders.join(&id).await?;
    info!(
        "Join on group order {}: {}/{} members",
        order.id, order.current_members, order.max_members
    );
    Ok(Json(order))
}

async fn list_suppliers(State(state): State<AppState>) -> AppResult<Json<Vec<Supplier>>> {
    Ok(Json(state.db.list_suppliers().await?))
}

async fn order_tracking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let order = state
        .db
        .get_order_tracking(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    Ok(Json(order))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/me", get(me))
        .route("/vendor/dashboard-data", get(vendor_dashboard))
        .route("/supplier/dashboard-data", get(supplier_dashboard))
        .route("/supplier/add-product", post(add_product))
        .route("/supplier/{id}/products", get(supplier_products))
        .route(
            "/group-orders",
            get(list_group_order_requests).post(create_group_order),
        )
        .route("/group-orders/active", get(list_active_group_orders))
        .route("/group-orders/{id}/join", post(join_group_order))
        .route("/suppliers", get(list_suppliers))
        .route("/order-tracking/{id}", get(order_tracking))
        .with_state(state)
}
