//! Data access layer repositories.
//!
//! This module contains all database repository implementations for the core.
//! Repositories provide an abstraction layer over SeaORM operations,
//! organized by domain: character documents and their per-character scoped
//! collections, Discord binding state, and read-only projections owned by
//! the groups module.
//!
//! Every repository follows the same discipline: writes are upserts keyed by
//! the natural business key, the update path advances `updated_at`, the
//! insert path additionally sets `created_at`, and a lookup that finds
//! nothing returns `None` rather than an error.

pub mod character;
pub mod character_data;
pub mod discord;
pub mod groups;

#[cfg(test)]
mod tests;
