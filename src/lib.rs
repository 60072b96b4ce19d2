//! `PlaceMap` - map UI for a places service
//!
//! This library provides the widget state machines behind the page (add a
//! place, measure a distance, search around a point), the HTTP client for the
//! places backend that does all spatial work, and the web server that hosts
//! the page.

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod map;
pub mod models;
pub mod notify;
pub mod page;
pub mod telemetry;
pub mod web;
pub mod widgets;

// Re-export core types for public API
pub use backend::{HttpPlacesBackend, PlacesBackend};
pub use config::PlaceMapConfig;
pub use error::PlaceMapError;
pub use models::{NewPlace, PlaceResult, Point};
pub use page::Page;
pub use widgets::{DistanceProbe, LocationForm, NearbySearch};

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, PlaceMapError>;
