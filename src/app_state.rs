use std::sync::Arc;

use crate::{
    auth::SessionAuth, config::Config, database::Database, services::GroupOrderService,
};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub group_orders: GroupOrderService,
    pub auth: SessionAuth,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Initialize database
        let database = Database::new(&config.database.url, config.database.max_connections).await?;
        database.init().await?;
        let db = Arc::new(database);

        let group_orders = GroupOrderService::new(db.clone());
        let auth = SessionAuth::new(&config.session.secret, config.session.ttl_secs);

        Ok(Self {
            db,
            group_orders,
            auth,
            config,
        })
    }
}
