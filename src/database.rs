use anyhow::Result;
use chrono::Utc;
use sqlx::{
    sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow},
    Row,
};
use uuid::Uuid;

use crate::models::{
    ActiveGroupOrder, GroupOrder, GroupOrderRequest, GroupOrderRequestWithSupplier, NewGroupOrder,
    NewGroupOrderRequest, NewProduct, NewSupplier, NewUser, OrderItem, OrderTracking,
    OrderTrackingDetail, Product, ProductStatus, RequestStatus, Supplier, TrackingStatus, User,
    UserType,
};

// Async database layer with SQLx connection pool. All invariants that need
// storage-level serialization (the group order capacity check) live here as
// single conditional statements.
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Database { pool })
    }

    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS suppliers (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                distance TEXT NOT NULL,
                rating REAL NOT NULL,
                verified INTEGER NOT NULL,
                specialties TEXT NOT NULL,
                created INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                full_name TEXT NOT NULL,
                business_name TEXT NOT NULL,
                phone TEXT NOT NULL,
                location TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                user_type TEXT NOT NULL,
                supplier_id TEXT REFERENCES suppliers(id),
                saved_this_month REAL NOT NULL DEFAULT 0,
                created INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS products (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                category TEXT NOT NULL,
                price REAL NOT NULL,
                unit TEXT NOT NULL,
                stock INTEGER NOT NULL,
                status TEXT NOT NULL,
                supplier_id TEXT NOT NULL REFERENCES suppliers(id),
                created INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS group_orders (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                total_items INTEGER NOT NULL,
                current_members INTEGER NOT NULL DEFAULT 0,
                max_members INTEGER NOT NULL,
                deadline TEXT NOT NULL,
                savings TEXT NOT NULL,
                supplier_id TEXT NOT NULL REFERENCES suppliers(id),
                created INTEGER NOT NULL,
                CHECK (current_members >= 0 AND current_members <= max_members)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS group_order_requests (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                requested_by TEXT NOT NULL,
                item_count INTEGER NOT NULL,
                total_value REAL NOT NULL,
                participants INTEGER NOT NULL,
                status TEXT NOT NULL,
                deadline TEXT NOT NULL,
                supplier_id TEXT REFERENCES suppliers(id),
                created INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS order_tracking (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                supplier TEXT NOT NULL,
                status TEXT NOT NULL,
                order_date TEXT NOT NULL,
                estimated_delivery TEXT NOT NULL,
                supplier_phone TEXT NOT NULL,
                supplier_address TEXT NOT NULL,
                total_amount REAL NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS order_items (
                id TEXT PRIMARY KEY,
                tracking_id TEXT NOT NULL REFERENCES order_tracking(id),
                name TEXT NOT NULL,
                quantity REAL NOT NULL,
                unit TEXT NOT NULL,
                price REAL NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_products_supplier ON products(supplier_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_group_orders_created ON group_orders(created)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_requests_created ON group_order_requests(created)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_order_items_tracking ON order_items(tracking_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // ---- users ----

    pub async fn create_user(&self, new: NewUser) -> Result<User> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();

        sqlx::query(
            "INSERT INTO users (id, email, full_name, business_name, phone, location,
                password_hash, user_type, supplier_id, saved_this_month, created)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(&id)
        .bind(&new.email)
        .bind(&new.full_name)
        .bind(&new.business_name)
        .bind(&new.phone)
        .bind(&new.location)
        .bind(&new.password_hash)
        .bind(new.user_type.as_str())
        .bind(&new.supplier_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(User {
            id,
            email: new.email,
            full_name: new.full_name,
            business_name: new.business_name,
            phone: new.phone,
            location: new.location,
            password_hash: new.password_hash,
            user_type: new.user_type,
            supplier_id: new.supplier_id,
            saved_this_month: 0.0,
            created: now,
        })
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| map_user(&r)).transpose()
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| map_user(&r)).transpose()
    }

    pub async fn count_vendors(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) FROM users WHERE user_type = ?")
            .bind(UserType::Vendor.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get(0))
    }

    pub async fn total_saved_this_month(&self) -> Result<f64> {
        let row = sqlx::query("SELECT COALESCE(SUM(saved_this_month), 0) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get(0))
    }

    // ---- suppliers ----

    pub async fn create_supplier(&self, new: NewSupplier) -> Result<Supplier> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();
        let specialties = serde_json::to_string(&new.specialties)?;

        sqlx::query(
            "INSERT INTO suppliers (id, name, distance, rating, verified, specialties, created)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&new.name)
        .bind(&new.distance)
        .bind(new.rating)
        .bind(new.verified)
        .bind(&specialties)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Supplier {
            id,
            name: new.name,
            distance: new.distance,
            rating: new.rating,
            verified: new.verified,
            specialties: new.specialties,
            created: now,
        })
    }

    pub async fn get_supplier(&self, id: &str) -> Result<Option<Supplier>> {
        let row = sqlx::query("SELECT * FROM suppliers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| map_supplier(&r)).transpose()
    }

    pub async fn list_suppliers(&self) -> Result<Vec<Supplier>> {
        let rows = sqlx::query("SELECT * FROM suppliers ORDER BY created DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_supplier).collect()
    }

    pub async fn count_suppliers(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) FROM suppliers")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get(0))
    }

    // ---- products ----

    pub async fn create_product(&self, new: NewProduct) -> Result<Product> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();

        sqlx::query(
            "INSERT INTO products (id, name, category, price, unit, stock, status, supplier_id, created)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&new.name)
        .bind(&new.category)
        .bind(new.price)
        .bind(&new.unit)
        .bind(new.stock)
        .bind(new.status.as_str())
        .bind(&new.supplier_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Product {
            id,
            name: new.name,
            category: new.category,
            price: new.price,
            unit: new.unit,
            stock: new.stock,
            status: new.status,
            supplier_id: new.supplier_id,
            created: now,
        })
    }

    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query("SELECT * FROM products ORDER BY created DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_product).collect()
    }

    pub async fn products_for_supplier(&self, supplier_id: &str) -> Result<Vec<Product>> {
        let rows = sqlx::query("SELECT * FROM products WHERE supplier_id = ? ORDER BY created DESC")
            .bind(supplier_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_product).collect()
    }

    // ---- group orders ----

    pub async fn create_group_order(&self, new: NewGroupOrder) -> Result<GroupOrder> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();

        sqlx::query(
            "INSERT INTO group_orders (id, title, total_items, current_members, max_members,
                deadline, savings, supplier_id, created)
             VALUES (?, ?, ?, 0, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&new.title)
        .bind(new.total_items)
        .bind(new.max_members)
        .bind(&new.deadline)
        .bind(&new.savings)
        .bind(&new.supplier_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(GroupOrder {
            id,
            title: new.title,
            total_items: new.total_items,
            current_members: 0,
            max_members: new.max_members,
            deadline: new.deadline,
            savings: new.savings,
            supplier_id: new.supplier_id,
            created: now,
        })
    }

    pub async fn get_group_order(&self, id: &str) -> Result<Option<GroupOrder>> {
        let row = sqlx::query("SELECT * FROM group_orders WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| map_group_order(&r)).transpose()
    }

    pub async fn list_group_orders(&self) -> Result<Vec<GroupOrder>> {
        let rows = sqlx::query("SELECT * FROM group_orders ORDER BY created DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_group_order).collect()
    }

    pub async fn list_group_orders_with_supplier(&self) -> Result<Vec<ActiveGroupOrder>> {
        let rows = sqlx::query(
            "SELECT g.id, g.title, s.name AS supplier, g.total_items, g.current_members,
                    g.max_members, g.deadline, g.savings
             FROM group_orders g
             JOIN suppliers s ON s.id = g.supplier_id
             ORDER BY g.created DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| ActiveGroupOrder {
                id: row.get("id"),
                title: row.get("title"),
                supplier: row.get("supplier"),
                total_items: row.get("total_items"),
                current_members: row.get("current_members"),
                max_members: row.get("max_members"),
                deadline: row.get("deadline"),
                savings: row.get("savings"),
            })
            .collect())
    }

    /// Conditional atomic increment of the member count. The capacity check
    /// and the write are one statement so concurrent joins cannot both pass
    /// the check and over-fill the order. Returns the number of rows updated:
    /// 0 means the order is missing or already full.
    pub async fn try_join_group_order(&self, id: &str) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE group_orders SET current_members = current_members + 1
             WHERE id = ? AND current_members < max_members",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    // ---- group order requests ----

    pub async fn create_group_order_request(
        &self,
        new: NewGroupOrderRequest,
    ) -> Result<GroupOrderRequest> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();

        sqlx::query(
            "INSERT INTO group_order_requests (id, title, requested_by, item_count, total_value,
                participants, status, deadline, supplier_id, created)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&new.title)
        .bind(&new.requested_by)
        .bind(new.item_count)
        .bind(new.total_value)
        .bind(new.participants)
        .bind(new.status.as_str())
        .bind(&new.deadline)
        .bind(&new.supplier_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(GroupOrderRequest {
            id,
            title: new.title,
            requested_by: new.requested_by,
            item_count: new.item_count,
            total_value: new.total_value,
            participants: new.participants,
            status: new.status,
            deadline: new.deadline,
            supplier_id: new.supplier_id,
            created: now,
        })
    }

    pub async fn list_group_order_requests(&self) -> Result<Vec<GroupOrderRequest>> {
        let rows = sqlx::query("SELECT * FROM group_order_requests ORDER BY created DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(map_request).collect()
    }

    pub async fn list_group_order_requests_with_supplier(
        &self,
    ) -> Result<Vec<GroupOrderRequestWithSupplier>> {
        let rows = sqlx::query(
            "SELECT r.*, s.id AS s_id, s.name AS s_name, s.distance AS s_distance,
                    s.rating AS s_rating, s.verified AS s_verified,
                    s.specialties AS s_specialties, s.created AS s_created
             FROM group_order_requests r
             LEFT JOIN suppliers s ON s.id = r.supplier_id
             ORDER BY r.created DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let request = map_request(row)?;
                let supplier = match row.get::<Option<String>, _>("s_id") {
                    Some(id) => Some(Supplier {
                        id,
                        name: row.get("s_name"),
                        distance: row.get("s_distance"),
                        rating: row.get("s_rating"),
                        verified: row.get("s_verified"),
                        specialties: parse_specialties(row.get("s_specialties")),
                        created: row.get("s_created"),
                    }),
                    None => None,
                };
                Ok(GroupOrderRequestWithSupplier { request, supplier })
            })
            .collect()
    }

    // ---- order tracking ----

    /// Insert a tracking record and its items atomically.
    pub async fn create_order_tracking(
        &self,
        order: OrderTracking,
        items: Vec<(String, f64, String, f64)>,
    ) -> Result<OrderTrackingDetail> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO order_tracking (id, title, supplier, status, order_date,
                estimated_delivery, supplier_phone, supplier_address, total_amount)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&order.id)
        .bind(&order.title)
        .bind(&order.supplier)
        .bind(order.status.as_str())
        .bind(&order.order_date)
        .bind(&order.estimated_delivery)
        .bind(&order.supplier_phone)
        .bind(&order.supplier_address)
        .bind(order.total_amount)
        .execute(&mut *tx)
        .await?;

        let mut detail_items = Vec::with_capacity(items.len());
        for (name, quantity, unit, price) in items {
            let item_id = Uuid::new_v4().to_string();
            sqlx::query(
                "INSERT INTO order_items (id, tracking_id, name, quantity, unit, price)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&item_id)
            .bind(&order.id)
            .bind(&name)
            .bind(quantity)
            .bind(&unit)
            .bind(price)
            .execute(&mut *tx)
            .await?;

            detail_items.push(OrderItem {
                id: item_id,
                tracking_id: order.id.clone(),
                name,
                quantity,
                unit,
                price,
            });
        }

        tx.commit().await?;

        Ok(OrderTrackingDetail {
            order,
            items: detail_items,
        })
    }

    pub async fn get_order_tracking(&self, id: &str) -> Result<Option<OrderTrackingDetail>> {
        let row = sqlx::query("SELECT * FROM order_tracking WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let order = map_order_tracking(&row)?;

        let item_rows = sqlx::query("SELECT * FROM order_items WHERE tracking_id = ?")
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        let items = item_rows
            .iter()
            .map(|r| OrderItem {
                id: r.get("id"),
                tracking_id: r.get("tracking_id"),
                name: r.get("name"),
                quantity: r.get("quantity"),
                unit: r.get("unit"),
                price: r.get("price"),
            })
            .collect();

        Ok(Some(OrderTrackingDetail { order, items }))
    }
}

// ---- row mapping ----

fn map_user(row: &SqliteRow) -> Result<User> {
    let user_type: String = row.get("user_type");
    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        full_name: row.get("full_name"),
        business_name: row.get("business_name"),
        phone: row.get("phone"),
        location: row.get("location"),
        password_hash: row.get("password_hash"),
        user_type: UserType::parse(&user_type)
            .ok_or_else(|| anyhow::anyhow!("Unknown user type: {}", user_type))?,
        supplier_id: row.get("supplier_id"),
        saved_this_month: row.get("saved_this_month"),
        created: row.get("created"),
    })
}

fn map_supplier(row: &SqliteRow) -> Result<Supplier> {
    Ok(Supplier {
        id: row.get("id"),
        name: row.get("name"),
        distance: row.get("distance"),
        rating: row.get("rating"),
        verified: row.get("verified"),
        specialties: parse_specialties(row.get("specialties")),
        created: row.get("created"),
    })
}

fn parse_specialties(raw: Option<String>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

fn map_product(row: &SqliteRow) -> Result<Product> {
    let status: String = row.get("status");
    Ok(Product {
        id: row.get("id"),
        name: row.get("name"),
        category: row.get("category"),
        price: row.get("price"),
        unit: row.get("unit"),
        stock: row.get("stock"),
        status: ProductStatus::parse(&status)
            .ok_or_else(|| anyhow::anyhow!("Unknown product status: {}", status))?,
        supplier_id: row.get("supplier_id"),
        created: row.get("created"),
    })
}

fn map_group_order(row: &SqliteRow) -> Result<GroupOrder> {
    Ok(GroupOrder {
        id: row.get("id"),
        title: row.get("title"),
        total_items: row.get("total_items"),
        current_members: row.get("current_members"),
        max_members: row.get("max_members"),
        deadline: row.get("deadline"),
        savings: row.get("savings"),
        supplier_id: row.get("supplier_id"),
        created: row.get("created"),
    })
}

fn map_request(row: &SqliteRow) -> Result<GroupOrderRequest> {
    let status: String = row.get("status");
    Ok(GroupOrderRequest {
        id: row.get("id"),
        title: row.get("title"),
        requested_by: row.get("requested_by"),
        item_count: row.get("item_count"),
        total_value: row.get("total_value"),
        participants: row.get("participants"),
        status: RequestStatus::parse(&status)
            .ok_or_else(|| anyhow::anyhow!("Unknown request status: {}", status))?,
        deadline: row.get("deadline"),
        supplier_id: row.get("supplier_id"),
        created: row.get("created"),
    })
}

fn map_order_tracking(row: &SqliteRow) -> Result<OrderTracking> {
    let status: String = row.get("status");
    Ok(OrderTracking {
        id: row.get("id"),
        title: row.get("title"),
        supplier: row.get("supplier"),
        status: TrackingStatus::parse(&status)
            .ok_or_else(|| anyhow::anyhow!("Unknown tracking status: {}", status))?,
        order_date: row.get("order_date"),
        estimated_delivery: row.get("estimated_delivery"),
        supplier_phone: row.get("supplier_phone"),
        supplier_address: row.get("supplier_address"),
        total_amount: row.get("total_amount"),
    })
}
