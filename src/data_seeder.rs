// Demo fixtures for the read-only surfaces (group order requests and order
// tracking have no write path through the API). Idempotent: a database that
// already has suppliers is left alone.

use tracing::info;
use uuid::Uuid;

use crate::database::Database;
use crate::error::AppResult;
use crate::models::{
    NewGroupOrder, NewGroupOrderRequest, NewProduct, NewSupplier, OrderTracking, ProductStatus,
    RequestStatus, TrackingStatus,
};

pub async fn seed_demo_data(db: &Database) -> AppResult<()> {
    if db.count_suppliers().await? > 0 {
        info!("Demo data already present, skipping seed");
        return Ok(());
    }

    info!("Seeding demo data...");

    let fresh_farms = db
        .create_supplier(NewSupplier {
            name: "Fresh Farms Co.".to_string(),
            distance: "2.1 km".to_string(),
            rating: 4.6,
            verified: true,
            specialties: vec!["Vegetables".to_string(), "Fruits".to_string()],
        })
        .await?;

    let spice_garden = db
        .create_supplier(NewSupplier {
            name: "Spice Garden Traders".to_string(),
            distance: "3.8 km".to_string(),
            rating: 4.3,
            verified: true,
            specialties: vec!["Spices".to_string(), "Grains".to_string()],
        })
        .await?;

    let dairy_direct = db
        .create_supplier(NewSupplier {
            name: "Dairy Direct".to_string(),
            distance: "5.0 km".to_string(),
            rating: 4.1,
            verified: false,
            specialties: vec!["Dairy".to_string()],
        })
        .await?;

    let products = vec![
        ("Tomatoes", "Vegetables", 28.0, "kg", 120, ProductStatus::Available, &fresh_farms),
        ("Onions", "Vegetables", 22.0, "kg", 40, ProductStatus::LowStock, &fresh_farms),
        ("Basmati Rice", "Grains", 95.0, "kg", 300, ProductStatus::Available, &spice_garden),
        ("Turmeric Powder", "Spices", 180.0, "kg", 0, ProductStatus::OutOfStock, &spice_garden),
        ("Paneer", "Dairy", 320.0, "kg", 25, ProductStatus::LowStock, &dairy_direct),
    ];

    for (name, category, price, unit, stock, status, supplier) in products {
        db.create_product(NewProduct {
            name: name.to_string(),
            category: category.to_string(),
            price,
            unit: unit.to_string(),
            stock,
            status,
            supplier_id: supplier.id.clone(),
        })
        .await?;
    }

    db.create_group_order(NewGroupOrder {
        title: "Bulk Rice Order".to_string(),
        total_items: 200,
        max_members: 10,
        deadline: "2025-08-20".to_string(),
        savings: "18%".to_string(),
        supplier_id: spice_garden.id.clone(),
    })
    .await?;

    db.create_group_order(NewGroupOrder {
        title: "Weekly Vegetable Pool".to_string(),
        total_items: 80,
        max_members: 6,
        deadline: "2025-08-12".to_string(),
        savings: "12%".to_string(),
        supplier_id: fresh_farms.id.clone(),
    })
    .await?;

    db.create_group_order_request(NewGroupOrderRequest {
        title: "Festival Spice Pack".to_string(),
        requested_by: "Ravi's Chaat Corner".to_string(),
        item_count: 12,
        total_value: 5400.0,
        participants: 4,
        status: RequestStatus::Open,
        deadline: "2025-08-18".to_string(),
        supplier_id: Some(spice_garden.id.clone()),
    })
    .await?;

    db.create_group_order_request(NewGroupOrderRequest {
        title: "Morning Dairy Run".to_string(),
        requested_by: "Sunrise Tea Stall".to_string(),
        item_count: 5,
        total_value: 2100.0,
        participants: 7,
        status: RequestStatus::Completed,
        deadline: "2025-08-05".to_string(),
        supplier_id: Some(dairy_direct.id.clone()),
    })
    .await?;

    db.create_order_tracking(
        OrderTracking {
            id: Uuid::new_v4().to_string(),
            title: "Bulk Rice Order".to_string(),
            supplier: spice_garden.name.clone(),
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
            ("Red Chilli".to_string(), 6.0, "kg".to_string(), 160.0),
        ],
    )
    .await?;

    info!("Demo data seeded");
    Ok(())
}
