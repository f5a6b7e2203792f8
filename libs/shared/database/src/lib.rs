pub mod allocator;
pub mod client;
pub mod error;
pub mod gateway;
pub mod result_set;
pub mod state;
pub mod statement;

pub use allocator::SequentialIdAllocator;
pub use client::DatabaseClient;
#[cfg(any(test, feature = "mock"))]
pub use client::MockDatabaseClient;
pub use error::DatabaseError;
pub use gateway::SqlGatewayClient;
pub use result_set::{ResultSet, Row};
pub use state::AppState;
pub use statement::{like_pattern, Statement};
