//! Read-only projections owned by external modules.
//!
//! The groups module owns membership storage; the user module owns profiles.
//! Both project their state into tables this repository only ever reads.

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect};

/// Read-side access to the groups and user-profile projections.
pub struct GroupsRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> GroupsRepository<'a> {
    /// Creates a new instance of [`GroupsRepository`].
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// IDs of the active groups a user belongs to.
    pub async fn active_group_ids(&self, user_id: i32) -> Result<Vec<String>, DbErr> {
        entity::prelude::UserGroupMembership::find()
            .select_only()
            .column(entity::user_group_membership::Column::GroupId)
            .filter(entity::user_group_membership::Column::UserId.eq(user_id))
            .filter(entity::user_group_membership::Column::IsActive.eq(true))
            .into_tuple::<String>()
            .all(self.db)
            .await
    }

    /// The user's main character, when one is set.
    pub async fn main_character_id(&self, user_id: i32) -> Result<Option<i32>, DbErr> {
        let profile = entity::prelude::UserProfile::find()
            .filter(entity::user_profile::Column::UserId.eq(user_id))
            .one(self.db)
            .await?;

        Ok(profile.and_then(|p| p.main_character_id))
    }
}
