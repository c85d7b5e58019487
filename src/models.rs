// Domain entities for the group purchasing platform.
// Everything that crosses the wire serializes as camelCase to match the
// frontend contract; enum values are stored in the database via as_str.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Vendor,
    Supplier,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Vendor => "vendor",
            UserType::Supplier => "supplier",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "vendor" => Some(UserType::Vendor),
            "supplier" => Some(UserType::Supplier),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Available,
    LowStock,
    OutOfStock,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Available => "available",
            ProductStatus::LowStock => "low_stock",
            ProductStatus::OutOfStock => "out_of_stock",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(ProductStatus::Available),
            "low_stock" => Some(ProductStatus::LowStock),
            "out_of_stock" => Some(ProductStatus::OutOfStock),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Open,
    Closed,
    Completed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Open => "open",
            RequestStatus::Closed => "closed",
            RequestStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(RequestStatus::Open),
            "closed" => Some(RequestStatus::Closed),
            "completed" => Some(RequestStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingStatus {
    Confirmed,
    Preparing,
    Ready,
    Delivered,
}

impl TrackingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingStatus::Confirmed => "confirmed",
            TrackingStatus::Preparing => "preparing",
            TrackingStatus::Ready => "ready",
            TrackingStatus::Delivered => "delivered",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(TrackingStatus::Confirmed),
            "preparing" => Some(TrackingStatus::Preparing),
            "ready" => Some(TrackingStatus::Ready),
            "delivered" => Some(TrackingStatus::Delivered),
            _ => None,
        }
    }
}

/// Account record. The password hash never leaves the process.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub business_name: String,
    pub phone: String,
    pub location: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub user_type: UserType,
    pub supplier_id: Option<String>,
    pub saved_this_month: f64,
    pub created: i64,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub business_name: String,
    pub phone: String,
    pub location: String,
    pub password_hash: String,
    pub user_type: UserType,
    pub supplier_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub distance: String,
    pub rating: f64,
    pub verified: bool,
    pub specialties: Vec<String>,
    pub created: i64,
}

#[derive(Debug, Clone)]
pub struct NewSupplier {
    pub name: String,
    pub distance: String,
    pub rating: f64,
    pub verified: bool,
    pub specialties: Vec<String>,
}

impl NewSupplier {
    /// Defaults used at signup time; profile enrichment happens later.
    pub fn from_business_name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            distance: String::new(),
            rating: 0.0,
            verified: false,
            specialties: Vec::new(),
        }
    }
}

/// Bounded-capacity pooled purchase. Invariant held by the storage layer:
/// 0 <= current_members <= max_members after every mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupOrder {
    pub id: String,
    pub title: String,
    pub total_items: i64,
    pub current_members: i64,
    pub max_members: i64,
    pub deadline: String,
    pub savings: String,
    pub supplier_id: String,
    pub created: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGroupOrder {
    pub title: String,
    pub total_items: i64,
    pub max_members: i64,
    pub deadline: String,
    pub savings: String,
    pub supplier_id: String,
}

/// Listing projection of a group order with the supplier name resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveGroupOrder {
    pub id: String,
    pub title: String,
    pub supplier: String,
    pub total_items: i64,
    pub current_members: i64,
    pub max_members: i64,
    pub deadline: String,
    pub savings: String,
}

/// A vendor-initiated request for a bulk deal. Distinct from GroupOrder:
/// requests are browsed by suppliers, group orders are joined by vendors.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupOrderRequest {
    pub id: String,
    pub title: String,
    pub requested_by: String,
    pub item_count: i64,
    pub total_value: f64,
    pub participants: i64,
    pub status: RequestStatus,
    pub deadline: String,
    pub supplier_id: Option<String>,
    pub created: i64,
}

#[derive(Debug, Clone)]
pub struct NewGroupOrderRequest {
    pub title: String,
    pub requested_by: String,
    pub item_count: i64,
    pub total_value: f64,
    pub participants: i64,
    pub status: RequestStatus,
    pub deadline: String,
    pub supplier_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupOrderRequestWithSupplier {
    #[serde(flatten)]
    pub request: GroupOrderRequest,
    pub supplier: Option<Supplier>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub unit: String,
    pub stock: i64,
    pub status: ProductStatus,
    pub supplier_id: String,
    pub created: i64,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub unit: String,
    pub stock: i64,
    pub status: ProductStatus,
    pub supplier_id: String,
}

/// Read model for the order tracking page. Rows originate from seeding;
/// there is no write path through the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTracking {
    pub id: String,
    pub title: String,
    pub supplier: String,
    pub status: TrackingStatus,
    pub order_date: String,
    pub estimated_delivery: String,
    pub supplier_phone: String,
    pub supplier_address: String,
    pub total_amount: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub tracking_id: String,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTrackingDetail {
    #[serde(flatten)]
    pub order: OrderTracking,
    pub items: Vec<OrderItem>,
}
