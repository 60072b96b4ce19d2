//! Two-click distance measurement

use serde::Serialize;
use tracing::{debug, info, warn};

use super::{Generation, Ticket};
use crate::Result;
use crate::backend::PlacesBackend;
use crate::map::{MapView, Marker, TileLayer};
use crate::models::Point;

const FAILURE_FALLBACK: &str = "Failed to calculate distance.";
const PROMPT: &str = "Click two locations on the map";

const MAP_CENTER: Point = Point {
    latitude: 20.0,
    longitude: 0.0,
};
const MAP_ZOOM: u8 = 2;

/// Outcome of the distance request for a completed pair
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Measurement {
    Pending,
    Measured { distance_km: f64 },
    Failed { message: String },
}

/// Where the probe is in its click sequence
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeState {
    AwaitingFirst,
    AwaitingSecond {
        first: Point,
    },
    /// Both points are fixed; further clicks are ignored until reset
    Resolved {
        first: Point,
        second: Point,
        measurement: Measurement,
    },
}

/// The single request a completed pair produces
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceQuery {
    pub ticket: Ticket,
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistanceProbeView {
    /// Number of points placed so far (0, 1 or 2)
    pub clicks: usize,
    pub measurement: Option<Measurement>,
    /// Line shown under the map
    pub caption: String,
    pub map: MapView,
}

#[derive(Debug)]
pub struct DistanceProbe {
    state: ProbeState,
    generation: Generation,
    map: MapView,
}

impl DistanceProbe {
    #[must_use]
    pub fn new(tiles: TileLayer) -> Self {
        Self {
            state: ProbeState::AwaitingFirst,
            generation: Generation::default(),
            map: MapView::new(tiles, MAP_CENTER, MAP_ZOOM),
        }
    }

    #[must_use]
    pub fn state(&self) -> &ProbeState {
        &self.state
    }

    /// Register a map click. Returns the request to send when this click
    /// completes the pair; every other click returns `None`.
    pub fn click(&mut self, point: Point) -> Option<DistanceQuery> {
        match self.state {
            ProbeState::AwaitingFirst => {
                self.state = ProbeState::AwaitingSecond { first: point };
                None
            }
            ProbeState::AwaitingSecond { first } => {
                self.state = ProbeState::Resolved {
                    first,
                    second: point,
                    measurement: Measurement::Pending,
                };
                Some(DistanceQuery {
                    ticket: self.generation.ticket(),
                    from: first,
                    to: point,
                })
            }
            ProbeState::Resolved { .. } => {
                debug!("Ignoring click at ({}), pair already complete", point.format_coordinates());
                None
            }
        }
    }

    /// Record the backend's answer. Returns false when the answer belongs to
    /// a pair that has since been reset.
    pub fn resolve(&mut self, ticket: Ticket, outcome: Result<f64>) -> bool {
        if !self.generation.is_current(ticket) {
            debug!("Discarding distance for a pair that was reset");
            return false;
        }
        let ProbeState::Resolved { measurement, .. } = &mut self.state else {
            return false;
        };

        *measurement = match outcome {
            Ok(distance_km) => {
                info!("Measured distance: {} km", distance_km);
                Measurement::Measured { distance_km }
            }
            Err(err) => {
                warn!("Error fetching distance: {}", err);
                Measurement::Failed {
                    message: err.server_message().unwrap_or(FAILURE_FALLBACK).to_string(),
                }
            }
        };
        true
    }

    /// Back to zero points, dropping markers, distance and any request in flight
    pub fn reset(&mut self) {
        self.state = ProbeState::AwaitingFirst;
        self.generation.advance();
    }

    /// Click, and when that completes the pair, measure it
    pub async fn click_and_measure(&mut self, backend: &dyn PlacesBackend, point: Point) {
        if let Some(query) = self.click(point) {
            let outcome = backend.distance(query.from, query.to).await;
            self.resolve(query.ticket, outcome);
        }
    }

    #[must_use]
    pub fn points(&self) -> Vec<Point> {
        match &self.state {
            ProbeState::AwaitingFirst => Vec::new(),
            ProbeState::AwaitingSecond { first } => vec![*first],
            ProbeState::Resolved { first, second, .. } => vec![*first, *second],
        }
    }

    #[must_use]
    pub fn measurement(&self) -> Option<&Measurement> {
        match &self.state {
            ProbeState::Resolved { measurement, .. } => Some(measurement),
            _ => None,
        }
    }

    #[must_use]
    pub fn view(&self) -> DistanceProbeView {
        let points = self.points();
        let caption = match self.measurement() {
            Some(Measurement::Measured { distance_km }) => format!("Distance: {distance_km} km"),
            Some(Measurement::Failed { message }) => message.clone(),
            Some(Measurement::Pending) | None => PROMPT.to_string(),
        };

        DistanceProbeView {
            clicks: points.len(),
            measurement: self.measurement().cloned(),
            caption,
            map: self
                .map
                .with_markers(points.into_iter().map(Marker::plain).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlaceMapError;
    use crate::backend::fake::{Call, FakeBackend};
    use crate::config::MapConfig;

    fn probe() -> DistanceProbe {
        DistanceProbe::new(TileLayer::from(&MapConfig::default()))
    }

    const BANGALORE: Point = Point {
        latitude: 12.97,
        longitude: 77.59,
    };
    const CHENNAI: Point = Point {
        latitude: 13.08,
        longitude: 80.27,
    };

    #[tokio::test]
    async fn test_two_clicks_fire_one_request_in_click_order() {
        let backend = FakeBackend::default();
        backend.answer_distance(Ok(290.17));
        let mut probe = probe();

        probe.click_and_measure(&backend, BANGALORE).await;
        assert!(backend.calls().is_empty());
        assert!(matches!(probe.state(), ProbeState::AwaitingSecond { .. }));

        probe.click_and_measure(&backend, CHENNAI).await;
        assert_eq!(backend.calls(), vec![Call::Distance(BANGALORE, CHENNAI)]);

        let view = probe.view();
        assert_eq!(view.clicks, 2);
        assert_eq!(view.caption, "Distance: 290.17 km");
        assert_eq!(
            view.measurement,
            Some(Measurement::Measured { distance_km: 290.17 })
        );
    }

    #[tokio::test]
    async fn test_third_click_is_ignored() {
        let backend = FakeBackend::default();
        backend.answer_distance(Ok(290.17));
        let mut probe = probe();
        probe.click_and_measure(&backend, BANGALORE).await;
        probe.click_and_measure(&backend, CHENNAI).await;

        probe.click_and_measure(&backend, Point::new(0.0, 0.0)).await;

        assert_eq!(backend.calls().len(), 1);
        assert_eq!(probe.points(), vec![BANGALORE, CHENNAI]);
        assert_eq!(probe.view().map.markers.len(), 2);
    }

    #[test]
    fn test_reset_clears_markers_and_distance() {
        let mut probe = probe();
        probe.click(BANGALORE);
        let query = probe.click(CHENNAI).unwrap();
        assert!(probe.resolve(query.ticket, Ok(290.17)));

        probe.reset();

        assert_eq!(probe.state(), &ProbeState::AwaitingFirst);
        let view = probe.view();
        assert_eq!(view.clicks, 0);
        assert!(view.map.markers.is_empty());
        assert_eq!(view.measurement, None);
        assert_eq!(view.caption, PROMPT);
    }

    #[test]
    fn test_answer_after_reset_is_discarded() {
        let mut probe = probe();
        probe.click(BANGALORE);
        let stale = probe.click(CHENNAI).unwrap();

        probe.reset();
        probe.click(Point::new(1.0, 1.0));
        let fresh = probe.click(Point::new(2.0, 2.0)).unwrap();

        assert!(!probe.resolve(stale.ticket, Ok(290.17)));
        assert_eq!(probe.measurement(), Some(&Measurement::Pending));
        assert!(probe.resolve(fresh.ticket, Ok(157.25)));
        assert_eq!(
            probe.measurement(),
            Some(&Measurement::Measured { distance_km: 157.25 })
        );
    }

    #[test]
    fn test_failure_is_shown_to_the_user() {
        let mut probe = probe();
        probe.click(BANGALORE);
        let query = probe.click(CHENNAI).unwrap();

        probe.resolve(query.ticket, Err(PlaceMapError::invalid_response("eof")));

        assert_eq!(probe.view().caption, FAILURE_FALLBACK);
        assert_eq!(probe.points().len(), 2);
    }

    #[test]
    fn test_pending_pair_keeps_prompt() {
        let mut probe = probe();
        probe.click(BANGALORE);
        probe.click(CHENNAI);
        let view = probe.view();
        assert_eq!(view.measurement, Some(Measurement::Pending));
        assert_eq!(view.caption, PROMPT);
    }
}
