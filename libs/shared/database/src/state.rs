use std::sync::Arc;

use shared_config::AppConfig;

use crate::allocator::SequentialIdAllocator;
use crate::client::DatabaseClient;
use crate::error::DatabaseError;
use crate::gateway::SqlGatewayClient;

/// Shared by every router. One allocator per process keeps per-family locking meaningful.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Arc<dyn DatabaseClient>,
    pub allocator: Arc<SequentialIdAllocator>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, DatabaseError> {
        let db: Arc<dyn DatabaseClient> = Arc::new(SqlGatewayClient::new(&config)?);
        Ok(Self::with_client(config, db))
    }

    pub fn with_client(config: AppConfig, db: Arc<dyn DatabaseClient>) -> Self {
        let allocator = Arc::new(SequentialIdAllocator::new(
            db.clone(),
            config.id_allocation_attempts,
        ));

        Self {
            config: Arc::new(config),
            db,
            allocator,
        }
    }
}
