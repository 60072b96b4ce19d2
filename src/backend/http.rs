use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use super::PlacesBackend;
use crate::config::BackendConfig;
use crate::models::{NewPlace, PlaceResult, Point};
use crate::{PlaceMapError, Result};

/// reqwest client for the places service
#[derive(Debug, Clone)]
pub struct HttpPlacesBackend {
    client: Client,
    base_url: String,
}

/// Body of every non-success answer
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DistanceBody {
    distance_km: f64,
}

#[derive(Debug, Deserialize)]
struct NearbyBody {
    places: Vec<PlaceResult>,
}

#[derive(Debug, Deserialize)]
struct NearestBody {
    place: PlaceResult,
}

impl HttpPlacesBackend {
    /// Create a new client. No timeout is set unless configured.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("placemap/", env!("CARGO_PKG_VERSION")));
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Turn a response into `T`, or into `Rejected` carrying the `{error}` text
    async fn read<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(rejection(response).await);
        }

        response.json::<T>().await.map_err(|e| {
            warn!("Failed to parse {} response: {}", what, e);
            PlaceMapError::invalid_response(format!("{what}: {e}"))
        })
    }
}

async fn rejection(response: Response) -> PlaceMapError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.error);

    warn!(status, body = %text, "Places backend rejected request");
    PlaceMapError::rejected(status, message)
}

#[async_trait]
impl PlacesBackend for HttpPlacesBackend {
    #[instrument(skip(self, place), fields(name = %place.name))]
    async fn insert_place(&self, place: &NewPlace) -> Result<String> {
        let url = self.endpoint("insert_place");
        debug!("Places API request URL: {}", url);

        let response = self.client.post(url).json(place).send().await?;
        // A success status with an unreadable body is still a failure
        let body: MessageBody = Self::read(response, "insert_place").await?;
        let message = body
            .message
            .unwrap_or_else(|| "Place added successfully!".to_string());

        info!("Inserted place at {}", place.point().format_coordinates());
        Ok(message)
    }

    #[instrument(skip(self))]
    async fn distance(&self, from: Point, to: Point) -> Result<f64> {
        let start_time = Instant::now();
        let url = self.endpoint("distance");
        debug!("Places API request URL: {}", url);

        let response = self
            .client
            .get(url)
            .query(&[
                ("lat1", from.latitude),
                ("lon1", from.longitude),
                ("lat2", to.latitude),
                ("lon2", to.longitude),
            ])
            .send()
            .await?;
        let body: DistanceBody = Self::read(response, "distance").await?;

        info!(
            "Distance {} km retrieved in {:.3}s",
            body.distance_km,
            start_time.elapsed().as_secs_f64()
        );
        Ok(body.distance_km)
    }

    #[instrument(skip(self))]
    async fn nearby_places(&self, center: Point, radius_km: f64) -> Result<Vec<PlaceResult>> {
        let url = self.endpoint("nearby_places");
        debug!("Places API request URL: {}", url);

        let response = self
            .client
            .get(url)
            .query(&[
                ("lat", center.latitude),
                ("lon", center.longitude),
                ("radius", radius_km),
            ])
            .send()
            .await?;
        let body: NearbyBody = Self::read(response, "nearby places").await?;

        info!(
            "Found {} places within {}km of ({})",
            body.places.len(),
            radius_km,
            center.format_coordinates()
        );
        Ok(body.places)
    }

    #[instrument(skip(self))]
    async fn nearest_place(&self, center: Point) -> Result<PlaceResult> {
        let url = self.endpoint("nearest_place");
        debug!("Places API request URL: {}", url);

        let response = self
            .client
            .get(url)
            .query(&[("lat", center.latitude), ("lon", center.longitude)])
            .send()
            .await?;
        let body: NearestBody = Self::read(response, "nearest place").await?;

        info!(
            "Nearest place to ({}) is {} at {} km",
            center.format_coordinates(),
            body.place.name,
            body.place.distance_km
        );
        Ok(body.place)
    }

    #[instrument(skip(self))]
    async fn insert_bulk_places(&self) -> Result<String> {
        let url = self.endpoint("insert_bulk_places");
        debug!("Places API request URL: {}", url);

        let response = self.client.post(url).send().await?;
        let body: MessageBody = Self::read(response, "bulk insert").await?;
        Ok(body
            .message
            .unwrap_or_else(|| "Places added successfully!".to_string()))
    }
}
