//! Renderer-independent map view model
//!
//! Widgets describe what their map should show with these types; the browser
//! page turns them into Leaflet layers.

use serde::{Deserialize, Serialize};

use crate::config::MapConfig;
use crate::models::{PlaceResult, Point};

/// Which marker style the renderer should use
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MarkerIcon {
    /// Plain pin, used for clicks and the form preview
    Default,
    /// The point a search is anchored on
    Selected,
    /// A place from a radius search
    Place,
    /// The single nearest place
    Nearest,
}

/// Label text attached to a marker
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Popup {
    pub title: String,
    pub lines: Vec<String>,
}

impl Popup {
    #[must_use]
    pub fn titled<S: Into<String>>(title: S) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    /// Name, type and distance of a search result
    #[must_use]
    pub fn for_place(place: &PlaceResult) -> Self {
        Self {
            title: place.name.clone(),
            lines: vec![
                format!("Type: {}", place.type_label()),
                format!("Distance: {}", place.format_distance()),
            ],
        }
    }

    /// Plain-text rendering, one line per entry
    #[must_use]
    pub fn text(&self) -> String {
        std::iter::once(self.title.as_str())
            .chain(self.lines.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Marker {
    pub position: Point,
    pub icon: MarkerIcon,
    pub popup: Option<Popup>,
}

impl Marker {
    #[must_use]
    pub fn plain(position: Point) -> Self {
        Self {
            position,
            icon: MarkerIcon::Default,
            popup: None,
        }
    }

    #[must_use]
    pub fn with_popup(position: Point, icon: MarkerIcon, popup: Popup) -> Self {
        Self {
            position,
            icon,
            popup: Some(popup),
        }
    }
}

/// Third-party raster tiles drawn under the markers
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TileLayer {
    /// URL template with `{s}`, `{z}`, `{x}` and `{y}` placeholders
    pub url_template: String,
    pub attribution: String,
}

impl From<&MapConfig> for TileLayer {
    fn from(config: &MapConfig) -> Self {
        Self {
            url_template: config.tile_url.clone(),
            attribution: config.attribution.clone(),
        }
    }
}

/// Everything needed to draw one map widget
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MapView {
    pub center: Point,
    pub zoom: u8,
    pub tiles: TileLayer,
    pub markers: Vec<Marker>,
}

impl MapView {
    #[must_use]
    pub fn new(tiles: TileLayer, center: Point, zoom: u8) -> Self {
        Self {
            center,
            zoom,
            tiles,
            markers: Vec::new(),
        }
    }

    /// Same viewport, different markers
    #[must_use]
    pub fn with_markers(&self, markers: Vec<Marker>) -> Self {
        Self {
            markers,
            ..self.clone()
        }
    }

    /// Markers drawn with the given icon
    pub fn markers_with(&self, icon: MarkerIcon) -> impl Iterator<Item = &Marker> {
        self.markers.iter().filter(move |marker| marker.icon == icon)
    }
}
