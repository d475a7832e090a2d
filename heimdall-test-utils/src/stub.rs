//! Stub implementations of the injected service interfaces.

use std::collections::HashMap;

use heimdall::error::Error;
use heimdall::service::static_data::{StaticDataService, Station};

/// Static-data stub with a fixed station catalog.
#[derive(Clone, Debug, Default)]
pub struct StubStaticData {
    stations: HashMap<i64, Station>,
}

impl StubStaticData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_station(mut self, station_id: i64, name: &str, type_id: i32) -> Self {
        self.stations.insert(
            station_id,
            Station {
                station_id,
                name: name.to_string(),
                type_id,
            },
        );
        self
    }
}

impl StaticDataService for StubStaticData {
    async fn station(&self, station_id: i64) -> Result<Option<Station>, Error> {
        Ok(self.stations.get(&station_id).cloned())
    }
}
