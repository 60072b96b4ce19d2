//! Location models for map clicks and new places

use serde::{Deserialize, Serialize};

/// A point on the map, typically produced by a click
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Point {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Point {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Format point as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Payload sent to the backend when a new place is created
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NewPlace {
    pub name: String,
    #[serde(rename = "type")]
    pub place_type: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl NewPlace {
    /// Where the place sits on the map
    #[must_use]
    pub fn point(&self) -> Point {
        Point::new(self.latitude, self.longitude)
    }
}
