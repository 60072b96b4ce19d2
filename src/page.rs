//! One mounted page: the three widgets side by side
//!
//! The widgets share nothing, so each sits behind its own lock and a slow
//! request in one never blocks the others.

use tokio::sync::Mutex;

use crate::config::PlaceMapConfig;
use crate::map::TileLayer;
use crate::widgets::{DistanceProbe, LocationForm, NearbySearch};

#[derive(Debug)]
pub struct Page {
    pub form: Mutex<LocationForm>,
    pub probe: Mutex<DistanceProbe>,
    pub nearby: Mutex<NearbySearch>,
}

impl Page {
    #[must_use]
    pub fn new(config: &PlaceMapConfig) -> Self {
        let tiles = TileLayer::from(&config.map);
        Self {
            form: Mutex::new(LocationForm::new(tiles.clone())),
            probe: Mutex::new(DistanceProbe::new(tiles.clone())),
            nearby: Mutex::new(NearbySearch::new(tiles, config.defaults.search_radius_km)),
        }
    }
}
