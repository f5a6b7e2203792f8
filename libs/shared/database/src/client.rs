use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::result_set::ResultSet;
use crate::statement::Statement;

/// Row-oriented access to the hospital database.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Runs a SELECT. The header row comes first.
    async fn query(&self, statement: &Statement) -> Result<ResultSet, DatabaseError>;

    /// Runs an INSERT, UPDATE or DELETE. `true` when at least one row changed.
    async fn execute(&self, statement: &Statement) -> Result<bool, DatabaseError>;
}
