pub mod character;
pub mod character_attributes;
pub mod character_clones;
pub mod character_corporation_history;
pub mod character_implants;
pub mod character_skill_queue;
pub mod character_skills;
pub mod discord_guild_config;
pub mod discord_oauth_state;
pub mod discord_role_mapping;
pub mod discord_sync_status;
pub mod discord_user;
pub mod user_group_membership;
pub mod user_profile;

pub mod prelude {
    pub use super::character::Entity as Character;
    pub use super::character_attributes::Entity as CharacterAttributes;
    pub use super::character_clones::Entity as CharacterClones;
    pub use super::character_corporation_history::Entity as CharacterCorporationHistory;
    pub use super::character_implants::Entity as CharacterImplants;
    pub use super::character_skill_queue::Entity as CharacterSkillQueue;
    pub use super::character_skills::Entity as CharacterSkills;
    pub use super::discord_guild_config::Entity as DiscordGuildConfig;
    pub use super::discord_oauth_state::Entity as DiscordOauthState;
    pub use super::discord_role_mapping::Entity as DiscordRoleMapping;
    pub use super::discord_sync_status::Entity as DiscordSyncStatus;
    pub use super::discord_user::Entity as DiscordUser;
    pub use super::user_group_membership::Entity as UserGroupMembership;
    pub use super::user_profile::Entity as UserProfile;
}
