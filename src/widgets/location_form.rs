//! Form for adding a new place, with an inline preview map

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{info, warn};

use crate::backend::PlacesBackend;
use crate::map::{Marker, MapView, TileLayer};
use crate::models::{NewPlace, Point};
use crate::notify::{Level, Notification, Notifications};
use crate::{PlaceMapError, Result};

const SUCCESS_TOAST: &str = "Location added successfully!";
const SUCCESS_MESSAGE: &str = "Place added successfully!";
const REJECTED_FALLBACK: &str = "Failed to add location";
const TRANSPORT_FALLBACK: &str = "Something went wrong. Please try again.";

const PREVIEW_CENTER: Point = Point {
    latitude: 20.0,
    longitude: 78.0,
};
const PREVIEW_ZOOM: u8 = 4;

/// One input of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Type,
    Latitude,
    Longitude,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Type, Field::Latitude, Field::Longitude];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Type => "type",
            Field::Latitude => "latitude",
            Field::Longitude => "longitude",
        }
    }

    fn required_message(self) -> &'static str {
        match self {
            Field::Name => "Place name is required!",
            Field::Type => "Place type is required!",
            Field::Latitude => "Latitude is required!",
            Field::Longitude => "Longitude is required!",
        }
    }

    fn not_a_number_message(self) -> &'static str {
        match self {
            Field::Latitude => "Latitude must be a number!",
            Field::Longitude => "Longitude must be a number!",
            Field::Name | Field::Type => "Must be a number!",
        }
    }
}

impl FromStr for Field {
    type Err = PlaceMapError;

    fn from_str(s: &str) -> Result<Self> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| PlaceMapError::validation(format!("unknown form field '{s}'")))
    }
}

/// Field name to message, one entry per invalid field
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    fn insert(&mut self, field: Field, message: &str) {
        self.0.insert(field, message.to_string());
    }

    fn clear(&mut self, field: Field) {
        self.0.remove(&field);
    }
}

/// Outcome line shown under the form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerMessage {
    pub level: Level,
    pub text: String,
}

#[derive(Debug, Default)]
struct FormValues {
    name: String,
    place_type: String,
    latitude: String,
    longitude: String,
}

impl FormValues {
    fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Type => &self.place_type,
            Field::Latitude => &self.latitude,
            Field::Longitude => &self.longitude,
        }
    }

    fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Type => &mut self.place_type,
            Field::Latitude => &mut self.latitude,
            Field::Longitude => &mut self.longitude,
        }
    }
}

/// Everything the page needs to draw the form
#[derive(Debug, Clone, Serialize)]
pub struct LocationFormView {
    pub name: String,
    #[serde(rename = "type")]
    pub place_type: String,
    pub latitude: String,
    pub longitude: String,
    pub errors: ValidationErrors,
    pub server_message: Option<ServerMessage>,
    pub toasts: Vec<Notification>,
    pub map: MapView,
}

#[derive(Debug)]
pub struct LocationForm {
    values: FormValues,
    errors: ValidationErrors,
    server_message: Option<ServerMessage>,
    marker: Option<Point>,
    toasts: Notifications,
    map: MapView,
}

impl LocationForm {
    #[must_use]
    pub fn new(tiles: TileLayer) -> Self {
        Self {
            values: FormValues::default(),
            errors: ValidationErrors::default(),
            server_message: None,
            marker: None,
            toasts: Notifications::default(),
            map: MapView::new(tiles, PREVIEW_CENTER, PREVIEW_ZOOM),
        }
    }

    #[must_use]
    pub fn value(&self, field: Field) -> &str {
        self.values.get(field)
    }

    #[must_use]
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    #[must_use]
    pub fn server_message(&self) -> Option<&ServerMessage> {
        self.server_message.as_ref()
    }

    /// Preview marker, present only after a confirmed insert
    #[must_use]
    pub fn marker(&self) -> Option<Point> {
        self.marker
    }

    /// Edit one input. Clears that field's error and the last server message.
    pub fn set_field<S: Into<String>>(&mut self, field: Field, value: S) {
        *self.values.get_mut(field) = value.into();
        self.errors.clear(field);
        self.server_message = None;
    }

    /// Recompute every field error. Returns true when the form can be submitted.
    pub fn validate(&mut self) -> bool {
        self.prepare_submission().is_some()
    }

    /// Validate and build the payload; `None` leaves the errors on display.
    pub fn prepare_submission(&mut self) -> Option<NewPlace> {
        match self.check() {
            Ok(place) => {
                self.errors = ValidationErrors::default();
                Some(place)
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }

    fn check(&self) -> std::result::Result<NewPlace, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        for field in Field::ALL {
            if self.values.get(field).is_empty() {
                errors.insert(field, field.required_message());
            }
        }

        let latitude = parse_coordinate(&self.values.latitude);
        let longitude = parse_coordinate(&self.values.longitude);
        for (field, parsed) in [(Field::Latitude, latitude), (Field::Longitude, longitude)] {
            if parsed.is_none() && errors.get(field).is_none() {
                errors.insert(field, field.not_a_number_message());
            }
        }

        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) if errors.is_empty() => Ok(NewPlace {
                name: self.values.name.clone(),
                place_type: self.values.place_type.clone(),
                latitude,
                longitude,
            }),
            _ => Err(errors),
        }
    }

    /// Fold the backend's answer for `submitted` into the form
    pub fn apply_submission(&mut self, submitted: &NewPlace, outcome: Result<String>) {
        match outcome {
            Ok(_) => {
                info!("Added place '{}'", submitted.name);
                self.toasts.success(SUCCESS_TOAST);
                self.server_message = Some(ServerMessage {
                    level: Level::Success,
                    text: SUCCESS_MESSAGE.to_string(),
                });
                self.marker = Some(submitted.point());
                self.values = FormValues::default();
            }
            Err(err) => {
                warn!("Failed to add place '{}': {}", submitted.name, err);
                let text = match &err {
                    PlaceMapError::Rejected { .. } => err
                        .server_message()
                        .unwrap_or(REJECTED_FALLBACK)
                        .to_string(),
                    _ => TRANSPORT_FALLBACK.to_string(),
                };
                self.toasts.error(text.clone());
                self.server_message = Some(ServerMessage {
                    level: Level::Error,
                    text,
                });
            }
        }
    }

    /// Validate, then create the place. Returns true once the backend confirms.
    pub async fn submit(&mut self, backend: &dyn PlacesBackend) -> bool {
        let Some(place) = self.prepare_submission() else {
            return false;
        };
        let outcome = backend.insert_place(&place).await;
        let accepted = outcome.is_ok();
        self.apply_submission(&place, outcome);
        accepted
    }

    /// Current view; pending toasts are handed out once
    pub fn view(&mut self) -> LocationFormView {
        let markers = self.marker.map(Marker::plain).into_iter().collect();
        LocationFormView {
            name: self.values.name.clone(),
            place_type: self.values.place_type.clone(),
            latitude: self.values.latitude.clone(),
            longitude: self.values.longitude.clone(),
            errors: self.errors.clone(),
            server_message: self.server_message.clone(),
            toasts: self.toasts.drain(),
            map: self.map.with_markers(markers),
        }
    }
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::{Call, FakeBackend};
    use crate::config::MapConfig;
    use rstest::rstest;

    fn form() -> LocationForm {
        LocationForm::new(TileLayer::from(&MapConfig::default()))
    }

    fn filled() -> LocationForm {
        let mut form = form();
        form.set_field(Field::Name, "Cubbon Park");
        form.set_field(Field::Type, "park");
        form.set_field(Field::Latitude, "12.9763");
        form.set_field(Field::Longitude, "77.5929");
        form
    }

    #[rstest]
    #[case::name(&[Field::Name])]
    #[case::type_only(&[Field::Type])]
    #[case::coordinates(&[Field::Latitude, Field::Longitude])]
    #[case::everything(&Field::ALL)]
    #[tokio::test]
    async fn test_empty_fields_block_submission(#[case] empty: &[Field]) {
        let backend = FakeBackend::default();
        let mut form = filled();
        for field in empty {
            form.set_field(*field, "");
        }

        assert!(!form.submit(&backend).await);

        let flagged: Vec<Field> = form.errors().fields().collect();
        let mut expected = empty.to_vec();
        expected.sort();
        assert_eq!(flagged, expected);
        for field in empty {
            assert_eq!(form.errors().get(*field), Some(field.required_message()));
        }
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_successful_submit_resets_form_and_places_marker() {
        let backend = FakeBackend::default();
        backend.answer_insert(Ok("Place added successfully!".to_string()));
        let mut form = filled();

        assert!(form.submit(&backend).await);

        assert_eq!(
            backend.calls(),
            vec![Call::Insert(NewPlace {
                name: "Cubbon Park".to_string(),
                place_type: "park".to_string(),
                latitude: 12.9763,
                longitude: 77.5929,
            })]
        );
        for field in Field::ALL {
            assert_eq!(form.value(field), "");
        }
        assert_eq!(form.marker(), Some(Point::new(12.9763, 77.5929)));

        let view = form.view();
        assert_eq!(view.map.markers.len(), 1);
        assert_eq!(view.map.markers[0].position, Point::new(12.9763, 77.5929));
        assert_eq!(view.toasts.len(), 1);
        assert_eq!(view.toasts[0].text, SUCCESS_TOAST);
        assert_eq!(
            view.server_message.map(|m| m.text),
            Some(SUCCESS_MESSAGE.to_string())
        );
        assert!(form.view().toasts.is_empty());
    }

    #[tokio::test]
    async fn test_rejection_keeps_values_and_shows_server_text() {
        let backend = FakeBackend::default();
        backend.answer_insert(Err(PlaceMapError::rejected(
            400,
            Some("Missing required fields".to_string()),
        )));
        let mut form = filled();

        assert!(!form.submit(&backend).await);

        assert_eq!(form.value(Field::Name), "Cubbon Park");
        assert_eq!(form.marker(), None);
        let message = form.server_message().unwrap();
        assert_eq!(message.level, Level::Error);
        assert_eq!(message.text, "Missing required fields");
    }

    #[rstest]
    #[case::rejected_without_text(PlaceMapError::rejected(500, None), REJECTED_FALLBACK)]
    #[case::unreadable_body(PlaceMapError::invalid_response("eof"), TRANSPORT_FALLBACK)]
    fn test_failure_fallback_messages(#[case] err: PlaceMapError, #[case] expected: &str) {
        let mut form = filled();
        let place = form.prepare_submission().unwrap();

        form.apply_submission(&place, Err(err));

        assert_eq!(form.server_message().unwrap().text, expected);
        let view = form.view();
        assert_eq!(view.toasts[0].level, Level::Error);
        assert_eq!(view.toasts[0].text, expected);
    }

    #[test]
    fn test_editing_clears_that_field_error_and_server_message() {
        let mut form = form();
        assert!(!form.validate());
        assert_eq!(form.errors().len(), 4);

        form.set_field(Field::Name, "Lalbagh");

        assert_eq!(form.errors().get(Field::Name), None);
        assert_eq!(form.errors().len(), 3);
        assert!(form.server_message().is_none());
    }

    #[test]
    fn test_non_numeric_coordinate_is_rejected() {
        let mut form = filled();
        form.set_field(Field::Latitude, "north");

        assert!(form.prepare_submission().is_none());
        assert_eq!(
            form.errors().get(Field::Latitude),
            Some("Latitude must be a number!")
        );
        assert_eq!(form.errors().len(), 1);
    }

    #[test]
    fn test_field_names_round_trip() {
        for field in Field::ALL {
            assert_eq!(field.as_str().parse::<Field>().unwrap(), field);
        }
        assert!("elevation".parse::<Field>().is_err());
    }
}
