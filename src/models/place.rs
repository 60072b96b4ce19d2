//! Places returned by the backend search endpoints

use serde::{Deserialize, Serialize};

use super::Point;

/// A place as reported by `/nearby_places` and `/nearest_place`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlaceResult {
    pub id: i64,
    pub name: String,
    /// The backend stores the type in a nullable column
    #[serde(rename = "type", default)]
    pub place_type: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Distance from the queried point, rounded by the backend
    pub distance_km: f64,
}

impl PlaceResult {
    #[must_use]
    pub fn point(&self) -> Point {
        Point::new(self.latitude, self.longitude)
    }

    /// Type label for display, empty when the backend has none
    #[must_use]
    pub fn type_label(&self) -> &str {
        self.place_type.as_deref().unwrap_or("")
    }

    /// Format distance with unit
    #[must_use]
    pub fn format_distance(&self) -> String {
        format!("{} km", self.distance_km)
    }
}
