//! Heimdall: identity federation and role reconciliation core.
//!
//! Heimdall maintains a two-way binding between an internal identity graph
//! (users, groups, EVE Online characters) and two external ecosystems: EVE
//! Online's ESI API, which publishes character, corporation, and alliance
//! state, and Discord, which hosts guilds with assignable roles and managed
//! membership. The crate provides the character affiliation reconciler, the
//! cache-tiered character data service, and the Discord role synchronizer,
//! together with the upstream clients, persistence repositories, and periodic
//! scheduling they require. HTTP routing, session handling, and the groups
//! module's storage engine are external collaborators.

pub mod cache;
pub mod client;
pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod scheduler;
pub mod service;
pub mod startup;
pub mod util;
