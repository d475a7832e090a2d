//! Discord REST v10 response types.
//!
//! Snowflake identifiers stay as strings, matching Discord's wire encoding.
//! Unknown fields are ignored throughout.

use serde::Deserialize;

/// Guild summary.
#[derive(Clone, Debug, Deserialize)]
pub struct Guild {
    pub id: String,
    pub name: String,
    pub owner_id: Option<String>,
}

/// Role within a guild.
#[derive(Clone, Debug, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub managed: bool,
    #[serde(default)]
    pub position: i32,
    /// Permission bit set, serialized by Discord as a decimal string.
    pub permissions: Option<String>,
}

/// Identity of a Discord user, from `/users/@me` or embedded in a member.
#[derive(Clone, Debug, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub global_name: Option<String>,
    pub avatar: Option<String>,
}

/// Guild member with current role ids and nickname.
#[derive(Clone, Debug, Deserialize)]
pub struct Member {
    pub user: Option<User>,
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// The bot's own user identity, used for token validation.
#[derive(Clone, Debug, Deserialize)]
pub struct BotUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub bot: bool,
}

/// Outcome of the auto-join PUT.
///
/// Discord answers 201 when the user was added to the guild and 204 when the
/// user was already a member (in which case the requested roles were applied
/// to the existing membership).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddMemberOutcome {
    /// HTTP 201 - the user joined the guild with the requested roles.
    Joined,
    /// HTTP 204 - the user was already a member; roles were updated.
    AlreadyMember,
}
