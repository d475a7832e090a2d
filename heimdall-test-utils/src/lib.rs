//! Shared test utilities for the Heimdall workspace.
//!
//! Provides an in-memory SQLite database with schema built from the entity
//! definitions, a mockito server wired into both upstream clients, fixture
//! factories for common rows, and canned mockito endpoints for ESI and
//! Discord.

pub mod builder;
pub mod constant;
pub mod discord;
pub mod error;
pub mod esi;
pub mod fixtures;
pub mod stub;

pub mod prelude {
    pub use crate::builder::{TestBuilder, TestSetup};
    pub use crate::constant::*;
    pub use crate::error::TestError;
    pub use crate::stub::StubStaticData;
    pub use crate::{discord, esi, fixtures};
}
