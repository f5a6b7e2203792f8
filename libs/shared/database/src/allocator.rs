use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use shared_models::identifier::IdFamily;

use crate::client::DatabaseClient;
use crate::error::DatabaseError;
use crate::statement::Statement;

/// Hands out the next identifier of a family and inserts the row that uses it.
///
/// Lookup and insert for one family are serialized inside the process, and a
/// duplicate-key rejection from the store (another process won the race)
/// triggers a fresh lookup.
pub struct SequentialIdAllocator {
    db: Arc<dyn DatabaseClient>,
    max_attempts: u32,
    locks: Mutex<HashMap<&'static str, Arc<Mutex<()>>>>,
}

impl SequentialIdAllocator {
    pub fn new(db: Arc<dyn DatabaseClient>, max_attempts: u32) -> Self {
        Self {
            db,
            max_attempts: max_attempts.max(1),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Greatest well-formed stored identifier: longest first, so `his10000`
    /// beats `his9999`. Rows that do not have the family's shape are skipped.
    pub fn max_id_statement(family: &IdFamily) -> Statement {
        Statement::new(format!(
            "SELECT {column} AS max_id FROM {table} WHERE {column} REGEXP ? \
             ORDER BY LENGTH({column}) DESC, {column} DESC LIMIT 1",
            column = family.column,
            table = family.table,
        ))
        .bind(family.shape_pattern())
    }

    /// Current maximum, or `None` when there is none or the lookup failed.
    pub async fn current_max(&self, family: &IdFamily) -> Option<String> {
        match self.db.query(&Self::max_id_statement(family)).await {
            Ok(result) => {
                let current = result.first_value().map(str::to_string);
                if current.is_none() {
                    debug!(family = family.name, "No existing identifiers");
                }
                current
            }
            Err(err) => {
                warn!(family = family.name, "Max-ID lookup failed, treating as empty: {}", err);
                None
            }
        }
    }

    pub async fn next_id(&self, family: &IdFamily) -> String {
        let current = self.current_max(family).await;
        family.next_id(current.as_deref())
    }

    async fn family_lock(&self, family: &IdFamily) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(family.name).or_default().clone()
    }

    /// Allocates the next identifier, builds the insert with it and runs it.
    ///
    /// Returns the identifier that was written.
    pub async fn insert_with_next_id<F>(
        &self,
        family: &IdFamily,
        build: F,
    ) -> Result<String, DatabaseError>
    where
        F: Fn(&str) -> Statement + Send + Sync,
    {
        let lock = self.family_lock(family).await;
        let _guard = lock.lock().await;

        let mut attempt = 1;
        loop {
            let id = self.next_id(family).await;
            debug!(family = family.name, attempt, "Inserting with identifier {}", id);

            match self.db.execute(&build(&id)).await {
                Ok(true) => return Ok(id),
                Ok(false) => return Err(DatabaseError::NotApplied),
                Err(DatabaseError::DuplicateKey(msg)) if attempt < self.max_attempts => {
                    warn!(
                        family = family.name,
                        attempt,
                        "Identifier {} already taken, retrying: {}", id, msg
                    );
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
