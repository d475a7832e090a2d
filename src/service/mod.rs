//! Service layer.
//!
//! Services compose the repositories, cache, and upstream clients into the
//! three core subsystems: the cache-tiered character data service, the
//! character affiliation reconciler, and the Discord role synchronizer (with
//! its OAuth orchestrator and mapping lifecycle side effects). The groups
//! module and the static-data catalog are consumed through injected service
//! interfaces rather than object references.

pub mod affiliation;
pub mod character;
pub mod corporation;
pub mod discord;
pub mod groups;
pub mod retry;
pub mod static_data;
