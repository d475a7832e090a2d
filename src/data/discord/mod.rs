//! Discord binding-state repositories.
//!
//! These repositories own the binding metadata between internal users and
//! Discord: linked accounts with encrypted tokens, operator-configured
//! guilds, group-to-role mappings, one-time OAuth states, and sync run
//! history.

pub mod guild;
pub mod oauth_state;
pub mod role_mapping;
pub mod sync_status;
pub mod user;

pub use guild::GuildConfigRepository;
pub use oauth_state::OAuthStateRepository;
pub use role_mapping::RoleMappingRepository;
pub use sync_status::SyncStatusRepository;
pub use user::DiscordUserRepository;
