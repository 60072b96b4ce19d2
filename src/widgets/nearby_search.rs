//! Radius and nearest-place search around a clicked point

use serde::Serialize;
use tracing::{debug, info, warn};

use super::{Generation, Ticket};
use crate::Result;
use crate::backend::PlacesBackend;
use crate::map::{MapView, Marker, MarkerIcon, Popup, TileLayer};
use crate::models::{PlaceResult, Point};

const PLACES_FALLBACK: &str = "Failed to fetch nearby places.";
const NEAREST_FALLBACK: &str = "Failed to fetch nearest place.";
const INVALID_RADIUS: &str = "Radius must be a positive number.";
const SELECTED_LABEL: &str = "Selected Location";

const MAP_CENTER: Point = Point {
    latitude: 20.0,
    longitude: 78.0,
};
const MAP_ZOOM: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacesQuery {
    pub ticket: Ticket,
    pub center: Point,
    pub radius_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestQuery {
    pub ticket: Ticket,
    pub center: Point,
}

#[derive(Debug, Clone, Serialize)]
pub struct NearbySearchView {
    pub selected: Option<Point>,
    pub radius: String,
    /// Whether the two search buttons are enabled
    pub can_search: bool,
    pub places: Vec<PlaceResult>,
    pub nearest: Option<PlaceResult>,
    pub error: Option<String>,
    pub map: MapView,
}

#[derive(Debug)]
pub struct NearbySearch {
    selected: Option<Point>,
    radius: String,
    places: Vec<PlaceResult>,
    nearest: Option<PlaceResult>,
    error: Option<String>,
    /// Advanced on every new selection and every issued request, so only the
    /// latest request of each kind can land
    places_requests: Generation,
    nearest_requests: Generation,
    map: MapView,
}

impl NearbySearch {
    #[must_use]
    pub fn new(tiles: TileLayer, default_radius_km: f64) -> Self {
        Self {
            selected: None,
            radius: default_radius_km.to_string(),
            places: Vec::new(),
            nearest: None,
            error: None,
            places_requests: Generation::default(),
            nearest_requests: Generation::default(),
            map: MapView::new(tiles, MAP_CENTER, MAP_ZOOM),
        }
    }

    #[must_use]
    pub fn selected(&self) -> Option<Point> {
        self.selected
    }

    #[must_use]
    pub fn radius(&self) -> &str {
        &self.radius
    }

    #[must_use]
    pub fn places(&self) -> &[PlaceResult] {
        &self.places
    }

    #[must_use]
    pub fn nearest(&self) -> Option<&PlaceResult> {
        self.nearest.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Both searches need a selected point
    #[must_use]
    pub fn can_search(&self) -> bool {
        self.selected.is_some()
    }

    /// The latest click replaces any earlier selection
    pub fn select(&mut self, point: Point) {
        debug!("Selected ({})", point.format_coordinates());
        self.selected = Some(point);
        self.places_requests.advance();
        self.nearest_requests.advance();
    }

    pub fn set_radius<S: Into<String>>(&mut self, raw: S) {
        self.radius = raw.into();
    }

    /// The radius request to send, if a point is selected and the radius is usable
    pub fn prepare_places(&mut self) -> Option<PlacesQuery> {
        let center = self.selected?;
        let Some(radius_km) = parse_radius(&self.radius) else {
            self.error = Some(INVALID_RADIUS.to_string());
            return None;
        };

        self.places_requests.advance();
        Some(PlacesQuery {
            ticket: self.places_requests.ticket(),
            center,
            radius_km,
        })
    }

    /// Replace the result list, or set the error and keep the old list
    pub fn apply_places(&mut self, ticket: Ticket, outcome: Result<Vec<PlaceResult>>) -> bool {
        if !self.places_requests.is_current(ticket) {
            debug!("Discarding superseded nearby places answer");
            return false;
        }

        match outcome {
            Ok(places) => {
                info!("Showing {} nearby places", places.len());
                self.places = places;
                self.error = None;
            }
            Err(err) => {
                warn!("Error fetching places: {}", err);
                self.error = Some(err.server_message().unwrap_or(PLACES_FALLBACK).to_string());
            }
        }
        true
    }

    pub fn prepare_nearest(&mut self) -> Option<NearestQuery> {
        let center = self.selected?;
        self.nearest_requests.advance();
        Some(NearestQuery {
            ticket: self.nearest_requests.ticket(),
            center,
        })
    }

    pub fn apply_nearest(&mut self, ticket: Ticket, outcome: Result<PlaceResult>) -> bool {
        if !self.nearest_requests.is_current(ticket) {
            debug!("Discarding superseded nearest place answer");
            return false;
        }

        match outcome {
            Ok(place) => {
                info!("Nearest place is {}", place.name);
                self.nearest = Some(place);
                self.error = None;
            }
            Err(err) => {
                warn!("Error fetching nearest place: {}", err);
                self.error = Some(err.server_message().unwrap_or(NEAREST_FALLBACK).to_string());
            }
        }
        true
    }

    /// Every place within the radius of the selected point; no-op without one
    pub async fn find_places(&mut self, backend: &dyn PlacesBackend) {
        if let Some(query) = self.prepare_places() {
            let outcome = backend.nearby_places(query.center, query.radius_km).await;
            self.apply_places(query.ticket, outcome);
        }
    }

    /// The single closest place to the selected point; no-op without one
    pub async fn find_nearest(&mut self, backend: &dyn PlacesBackend) {
        if let Some(query) = self.prepare_nearest() {
            let outcome = backend.nearest_place(query.center).await;
            self.apply_nearest(query.ticket, outcome);
        }
    }

    #[must_use]
    pub fn view(&self) -> NearbySearchView {
        let selected = self
            .selected
            .map(|point| Marker::with_popup(point, MarkerIcon::Selected, Popup::titled(SELECTED_LABEL)));
        let places = self
            .places
            .iter()
            .map(|place| Marker::with_popup(place.point(), MarkerIcon::Place, Popup::for_place(place)));
        let nearest = self
            .nearest
            .iter()
            .map(|place| Marker::with_popup(place.point(), MarkerIcon::Nearest, Popup::for_place(place)));

        NearbySearchView {
            selected: self.selected,
            radius: self.radius.clone(),
            can_search: self.can_search(),
            places: self.places.clone(),
            nearest: self.nearest.clone(),
            error: self.error.clone(),
            map: self
                .map
                .with_markers(selected.into_iter().chain(places).chain(nearest).collect()),
        }
    }
}

fn parse_radius(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|radius| radius.is_finite() && *radius > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlaceMapError;
    use crate::backend::fake::{Call, FakeBackend};
    use crate::config::MapConfig;
    use rstest::rstest;

    const CLICK: Point = Point {
        latitude: 12.9,
        longitude: 77.6,
    };

    fn search() -> NearbySearch {
        NearbySearch::new(TileLayer::from(&MapConfig::default()), 5.0)
    }

    fn park() -> PlaceResult {
        PlaceResult {
            id: 1,
            name: "Park".to_string(),
            place_type: Some("park".to_string()),
            latitude: 12.91,
            longitude: 77.61,
            distance_km: 1.2,
        }
    }

    #[tokio::test]
    async fn test_searches_are_disabled_without_selection() {
        let backend = FakeBackend::default();
        let mut search = search();
        assert!(!search.can_search());

        search.find_places(&backend).await;
        search.find_nearest(&backend).await;

        assert!(backend.calls().is_empty());
        assert!(!search.view().can_search);

        search.select(CLICK);
        assert!(search.can_search());
        assert!(search.view().can_search);
    }

    #[tokio::test]
    async fn test_radius_search_renders_one_marker_per_place() {
        let backend = FakeBackend::default();
        backend.answer_nearby(Ok(vec![park()]));
        let mut search = search();
        assert_eq!(search.radius(), "5");

        search.select(CLICK);
        search.find_places(&backend).await;

        assert_eq!(backend.calls(), vec![Call::Nearby(CLICK, 5.0)]);
        let view = search.view();
        let place_markers: Vec<_> = view.map.markers_with(MarkerIcon::Place).collect();
        assert_eq!(place_markers.len(), 1);
        let text = place_markers[0].popup.as_ref().unwrap().text();
        assert!(text.contains("Park"));
        assert!(text.contains("park"));
        assert!(text.contains("1.2"));

        let selected: Vec<_> = view.map.markers_with(MarkerIcon::Selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].position, CLICK);
    }

    #[tokio::test]
    async fn test_failed_search_keeps_previous_places() {
        let backend = FakeBackend::default();
        backend
            .answer_nearby(Ok(vec![park()]))
            .answer_nearby(Err(PlaceMapError::invalid_response("eof")));
        let mut search = search();
        search.select(CLICK);

        search.find_places(&backend).await;
        search.find_places(&backend).await;

        assert_eq!(search.error(), Some(PLACES_FALLBACK));
        assert_eq!(search.places(), &[park()]);
    }

    #[tokio::test]
    async fn test_success_clears_error() {
        let backend = FakeBackend::default();
        backend
            .answer_nearest(Err(PlaceMapError::rejected(
                404,
                Some("No places found.".to_string()),
            )))
            .answer_nearest(Ok(park()));
        let mut search = search();
        search.select(CLICK);

        search.find_nearest(&backend).await;
        assert_eq!(search.error(), Some("No places found."));

        search.find_nearest(&backend).await;
        assert_eq!(search.error(), None);
        assert_eq!(search.nearest(), Some(&park()));
        assert_eq!(search.view().map.markers_with(MarkerIcon::Nearest).count(), 1);
    }

    #[tokio::test]
    async fn test_nearest_ignores_radius() {
        let backend = FakeBackend::default();
        backend.answer_nearest(Ok(park()));
        let mut search = search();
        search.set_radius("not a number");
        search.select(CLICK);

        search.find_nearest(&backend).await;

        assert_eq!(backend.calls(), vec![Call::Nearest(CLICK)]);
    }

    #[rstest]
    #[case("")]
    #[case("-3")]
    #[case("0")]
    #[case("abc")]
    #[tokio::test]
    async fn test_unusable_radius_sets_error_without_request(#[case] raw: &str) {
        let backend = FakeBackend::default();
        let mut search = search();
        search.select(CLICK);
        search.set_radius(raw);

        search.find_places(&backend).await;

        assert!(backend.calls().is_empty());
        assert_eq!(search.error(), Some(INVALID_RADIUS));
    }

    #[test]
    fn test_answer_for_superseded_selection_is_discarded() {
        let mut search = search();
        search.select(CLICK);
        let stale = search.prepare_places().unwrap();

        search.select(Point::new(40.7, -74.0));

        assert!(!search.apply_places(stale.ticket, Ok(vec![park()])));
        assert!(search.places().is_empty());
        assert_eq!(search.selected(), Some(Point::new(40.7, -74.0)));
    }

    #[test]
    fn test_nearest_answer_for_superseded_selection_is_discarded() {
        let mut search = search();
        search.select(CLICK);
        let stale = search.prepare_nearest().unwrap();

        search.select(Point::new(40.7, -74.0));

        assert!(!search.apply_nearest(stale.ticket, Ok(park())));
        assert_eq!(search.nearest(), None);
        assert_eq!(search.view().map.markers_with(MarkerIcon::Nearest).count(), 0);
    }

    #[test]
    fn test_late_answer_for_earlier_radius_is_discarded() {
        let mut search = search();
        search.select(CLICK);
        let narrow = search.prepare_places().unwrap();
        search.set_radius("50");
        let wide = search.prepare_places().unwrap();
        assert_eq!(wide.radius_km, 50.0);

        assert!(search.apply_places(wide.ticket, Ok(vec![park()])));
        assert!(!search.apply_places(narrow.ticket, Ok(Vec::new())));

        assert_eq!(search.places(), &[park()]);
    }

    #[test]
    fn test_places_and_nearest_requests_do_not_cancel_each_other() {
        let mut search = search();
        search.select(CLICK);
        let places = search.prepare_places().unwrap();
        let nearest = search.prepare_nearest().unwrap();

        assert!(search.apply_nearest(nearest.ticket, Ok(park())));
        assert!(search.apply_places(places.ticket, Ok(vec![park()])));
        assert_eq!(search.places().len(), 1);
        assert_eq!(search.nearest(), Some(&park()));
    }

    #[test]
    fn test_new_selection_overwrites_previous() {
        let mut search = search();
        search.select(CLICK);
        search.select(Point::new(1.0, 2.0));
        let view = search.view();
        assert_eq!(view.map.markers_with(MarkerIcon::Selected).count(), 1);
        assert_eq!(view.selected, Some(Point::new(1.0, 2.0)));
    }
}
