// GroupOrderService - lifecycle of bounded-capacity pooled purchases.
// The join path is the one operation with a real invariant: the member
// count must never pass max_members, even under concurrent joins.

use std::sync::Arc;

use crate::database::Database;
use crate::error::{AppError, AppResult};
use crate::models::{ActiveGroupOrder, GroupOrder, NewGroupOrder};

#[derive(Clone)]
pub struct GroupOrderService {
    db: Arc<Database>,
}

impl GroupOrderService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn create(&self, new: NewGroupOrder) -> AppResult<GroupOrder> {
        if new.title.trim().is_empty() {
            return Err(AppError::Validation("Title must not be empty".to_string()));
        }
        if new.total_items < 0 {
            return Err(AppError::Validation(
                "totalItems must not be negative".to_string(),
            ));
        }
        if new.max_members <= 0 {
            return Err(AppError::Validation(
                "maxMembers must be positive".to_string(),
            ));
        }
        if self.db.get_supplier(&new.supplier_id).await?.is_none() {
            return Err(AppError::Validation(format!(
                "Supplier {} does not exist",
                new.supplier_id
            )));
        }

        let order = self.db.create_group_order(new).await?;
        tracing::info!("Created group order {} ({})", order.id, order.title);
        Ok(order)
    }

    /// All group orders with the supplier name resolved, newest first.
    /// Deadlines are display strings and not enforced, so "active" means
    /// every row.
    pub async fn list_active(&self) -> AppResult<Vec<ActiveGroupOrder>> {
        Ok(self.db.list_group_orders_with_supplier().await?)
    }

    /// Join a group order. The capacity check and the increment are a single
    /// conditional UPDATE at the storage layer; when it affects no row the
    /// cause is classified by a follow-up read. Two concurrent joins can
    /// never both pass the check for the last free slot.
    pub async fn join(&self, order_id: &str) -> AppResult<GroupOrder> {
        let affected = self.db.try_join_group_order(order_id).await?;

        if affected == 0 {
            return match self.db.get_group_order(order_id).await? {
                None => Err(AppError::NotFound("Group order not found".to_string())),
                Some(_) => Err(AppError::CapacityExceeded(
                    "Group is already full".to_string(),
                )),
            };
        }

        self.db
            .get_group_order(order_id)
            .await?
            .ok_or_else(|| AppError::Internal("Group order missing after join".to_string()))
    }
}
