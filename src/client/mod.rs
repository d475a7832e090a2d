//! Upstream API clients.
//!
//! This module contains the two REST clients the core drives: the ESI client
//! for EVE Online character data and the Discord client for guild, member,
//! and role state. Both wrap a shared `reqwest` stack; the Discord client
//! additionally enforces per-endpoint-family pacing and rate-limit header
//! feedback.

pub mod discord;
pub mod esi;
pub mod rate_limit;
