//! Groups service interface.
//!
//! The groups module owns membership storage and its query engine; the core
//! consumes it through this injected interface, never by following object
//! references. The default implementation reads the membership projection
//! tables the groups module maintains in the shared database.

use std::collections::HashSet;
use std::future::Future;

use sea_orm::DatabaseConnection;

use crate::data::groups::GroupsRepository;
use crate::error::Error;

/// Membership and profile reads the synchronizer depends on.
pub trait GroupsService: Send + Sync {
    /// IDs of the active groups the user belongs to.
    fn active_group_ids(
        &self,
        user_id: i32,
    ) -> impl Future<Output = Result<HashSet<String>, Error>> + Send;

    /// The user's main character, when one is set.
    fn main_character_id(
        &self,
        user_id: i32,
    ) -> impl Future<Output = Result<Option<i32>, Error>> + Send;
}

/// Groups service over the shared-database membership projection.
#[derive(Clone)]
pub struct DbGroupsService {
    db: DatabaseConnection,
}

impl DbGroupsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl GroupsService for DbGroupsService {
    async fn active_group_ids(&self, user_id: i32) -> Result<HashSet<String>, Error> {
        let ids = GroupsRepository::new(&self.db)
            .active_group_ids(user_id)
            .await?;

        Ok(ids.into_iter().collect())
    }

    async fn main_character_id(&self, user_id: i32) -> Result<Option<i32>, Error> {
        Ok(GroupsRepository::new(&self.db)
            .main_character_id(user_id)
            .await?)
    }
}
