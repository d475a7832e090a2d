pub use sea_orm_migration::prelude::*;

mod m20260710_000001_create_characters_table;
mod m20260710_000002_create_character_attributes_table;
mod m20260710_000003_create_character_skills_table;
mod m20260710_000004_create_character_skill_queues_table;
mod m20260710_000005_create_character_corporation_history_table;
mod m20260710_000006_create_character_clones_table;
mod m20260710_000007_create_character_implants_table;
mod m20260710_000008_create_discord_users_table;
mod m20260710_000009_create_discord_guild_configs_table;
mod m20260710_000010_create_discord_role_mappings_table;
mod m20260710_000011_create_discord_sync_status_table;
mod m20260710_000012_create_discord_oauth_states_table;
mod m20260710_000013_create_user_group_membership_table;
mod m20260710_000014_create_user_profiles_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260710_000001_create_characters_table::Migration),
            Box::new(m20260710_000002_create_character_attributes_table::Migration),
            Box::new(m20260710_000003_create_character_skills_table::Migration),
            Box::new(m20260710_000004_create_character_skill_queues_table::Migration),
            Box::new(m20260710_000005_create_character_corporation_history_table::Migration),
            Box::new(m20260710_000006_create_character_clones_table::Migration),
            Box::new(m20260710_000007_create_character_implants_table::Migration),
            Box::new(m20260710_000008_create_discord_users_table::Migration),
            Box::new(m20260710_000009_create_discord_guild_configs_table::Migration),
            Box::new(m20260710_000010_create_discord_role_mappings_table::Migration),
            Box::new(m20260710_000011_create_discord_sync_status_table::Migration),
            Box::new(m20260710_000012_create_discord_oauth_states_table::Migration),
            Box::new(m20260710_000013_create_user_group_membership_table::Migration),
            Box::new(m20260710_000014_create_user_profiles_table::Migration),
        ]
    }
}
