//! Data models for the PlaceMap application
//!
//! This module contains the transient UI-side domain models:
//! - Location: map points and the payload for a new place
//! - Place: places returned by the backend search endpoints

pub mod location;
pub mod place;

// Re-export all public types for convenient access
pub use location::{NewPlace, Point};
pub use place::PlaceResult;
