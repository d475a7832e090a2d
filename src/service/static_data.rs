//! Static-data service interface.
//!
//! The static-data module (type, station, and group catalogs) is an external
//! collaborator. The core only needs fixed-station lookups for clone
//! location enrichment, consumed through this injected interface.

use std::future::Future;

use crate::error::Error;

/// A fixed NPC station from the static-data catalog.
#[derive(Clone, Debug)]
pub struct Station {
    pub station_id: i64,
    pub name: String,
    pub type_id: i32,
}

/// Fixed-station lookups.
pub trait StaticDataService: Send + Sync {
    /// Resolves a station by id; `Ok(None)` when the catalog has no entry.
    fn station(
        &self,
        station_id: i64,
    ) -> impl Future<Output = Result<Option<Station>, Error>> + Send;
}

/// Catalog-less implementation resolving nothing.
///
/// Location enrichment failure is never fatal, so deployments without a
/// static-data catalog degrade to clone entries with empty location names.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoStaticData;

impl StaticDataService for NoStaticData {
    async fn station(&self, _station_id: i64) -> Result<Option<Station>, Error> {
        Ok(None)
    }
}
