//! Places backend
//!
//! Everything spatial (distances, radius and nearest-neighbour search,
//! persistence) happens in an external HTTP service. This module describes
//! that service as a trait so widgets can be driven by the real client or a
//! test double.

use async_trait::async_trait;

use crate::Result;
use crate::models::{NewPlace, PlaceResult, Point};

pub mod http;

pub use http::HttpPlacesBackend;

#[async_trait]
pub trait PlacesBackend: Send + Sync {
    /// `POST /insert_place`; returns the backend's confirmation message
    async fn insert_place(&self, place: &NewPlace) -> Result<String>;

    /// `GET /distance`; great-circle distance in kilometers
    async fn distance(&self, from: Point, to: Point) -> Result<f64>;

    /// `GET /nearby_places`; every place within `radius_km` of `center`
    async fn nearby_places(&self, center: Point, radius_km: f64) -> Result<Vec<PlaceResult>>;

    /// `GET /nearest_place`; the single closest place, whatever the distance
    async fn nearest_place(&self, center: Point) -> Result<PlaceResult>;

    /// `POST /insert_bulk_places`; loads the backend's demo catalogue
    async fn insert_bulk_places(&self) -> Result<String>;
}
