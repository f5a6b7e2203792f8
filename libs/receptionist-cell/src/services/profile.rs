use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use shared_database::{AppState, DatabaseClient, Statement};

use crate::models::{ReceptionistContext, ReceptionistError, ReceptionistProfile};

const PROFILE_QUERY: &str = "SELECT r.user_id, r.first_name, r.last_name, r.nic, r.gender, r.contact_no, \
     r.address, u.user_name, u.email \
     FROM receptionist r JOIN sys_user u ON u.user_id = r.user_id \
     WHERE r.user_id = ?";

pub struct ProfileService {
    db: Arc<dyn DatabaseClient>,
}

impl ProfileService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
        }
    }

    pub async fn get_profile(&self, ctx: &ReceptionistContext) -> Result<ReceptionistProfile> {
        debug!("Fetching receptionist profile for user: {}", ctx.user_id);

        let result = self
            .db
            .query(&Statement::new(PROFILE_QUERY).bind(ctx.user_id.as_str()))
            .await?;

        result.deserialize_first::<ReceptionistProfile>()?.ok_or_else(|| {
            ReceptionistError::NotFound(format!("Receptionist profile for user {} not found", ctx.user_id)).into()
        })
    }
}
