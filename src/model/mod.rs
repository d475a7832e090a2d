//! Data transfer types.
//!
//! This module contains the typed records exchanged with the two upstream
//! ecosystems (ESI and Discord) plus the report types produced by the
//! reconciler and synchronizer. Upstream DTOs are decoded tolerantly: unknown
//! fields are ignored and numeric fields accept either integer or
//! floating-point JSON tokens.

pub mod discord;
pub mod esi;
pub mod sync;
