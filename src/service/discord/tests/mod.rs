mod guild_sync;
mod user_sync;

use heimdall_test_utils::prelude::*;

use crate::cache::CacheService;
use crate::service::groups::DbGroupsService;

/// Common table set for synchronizer tests.
pub(super) fn sync_tables() -> TestBuilder {
    TestBuilder::new()
        .with_table(entity::prelude::Character)
        .with_table(entity::prelude::DiscordUser)
        .with_table(entity::prelude::DiscordGuildConfig)
        .with_table(entity::prelude::DiscordRoleMapping)
        .with_table(entity::prelude::DiscordSyncStatus)
        .with_table(entity::prelude::UserGroupMembership)
        .with_table(entity::prelude::UserProfile)
}

pub(super) struct SyncHarness {
    pub test: TestSetup,
    pub cache: CacheService,
    pub groups: DbGroupsService,
}

impl SyncHarness {
    pub async fn new() -> Result<Self, TestError> {
        let test = sync_tables().build().await?;
        let cache = CacheService::in_memory();
        let groups = DbGroupsService::new(test.db.clone());

        Ok(Self {
            test,
            cache,
            groups,
        })
    }

    pub fn sync(&self) -> super::RoleSyncService<'_, DbGroupsService> {
        super::RoleSyncService::new(
            &self.test.db,
            &self.test.discord_client,
            &self.test.esi_client,
            &self.cache,
            &self.test.cipher,
            &self.groups,
        )
    }
}
