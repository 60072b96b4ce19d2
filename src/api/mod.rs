//! JSON endpoints the page calls for each widget interaction
//!
//! Every handler locks only the widget it touches, and never across a backend
//! call: prepare under the lock, release, await the backend, re-lock, apply.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::json;

use crate::PlaceMapError;
use crate::models::Point;
use crate::page::Page;
use crate::web::AppState;
use crate::widgets::{DistanceProbeView, Field, LocationFormView, NearbySearchView};

pub mod session;

pub use session::{SessionId, SessionStore};

type ApiResult<T> = Result<Json<T>, PlaceMapError>;

#[derive(Debug, Deserialize)]
pub struct FieldEdit {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct RadiusEdit {
    pub radius: String,
}

impl IntoResponse for PlaceMapError {
    fn into_response(self) -> Response {
        let status = match &self {
            PlaceMapError::SessionNotFound { .. } => StatusCode::NOT_FOUND,
            PlaceMapError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PlaceMapError::Rejected { .. }
            | PlaceMapError::Transport { .. }
            | PlaceMapError::InvalidResponse { .. } => StatusCode::BAD_GATEWAY,
            PlaceMapError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.user_message() }))).into_response()
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions/{id}", delete(unmount))
        .route("/sessions/{id}/form", get(form_view))
        .route("/sessions/{id}/form/field", post(form_field))
        .route("/sessions/{id}/form/submit", post(form_submit))
        .route("/sessions/{id}/distance", get(distance_view))
        .route("/sessions/{id}/distance/click", post(distance_click))
        .route("/sessions/{id}/distance/reset", post(distance_reset))
        .route("/sessions/{id}/nearby", get(nearby_view))
        .route("/sessions/{id}/nearby/select", post(nearby_select))
        .route("/sessions/{id}/nearby/radius", post(nearby_radius))
        .route("/sessions/{id}/nearby/places", post(nearby_places))
        .route("/sessions/{id}/nearby/nearest", post(nearby_nearest))
}

async fn page(state: &AppState, id: &str) -> Result<Arc<Page>, PlaceMapError> {
    let session: SessionId = id.parse()?;
    state
        .sessions
        .get(session)
        .await
        .ok_or_else(|| PlaceMapError::session_not_found(id))
}

async fn unmount(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, PlaceMapError> {
    let session: SessionId = id.parse()?;
    if state.sessions.unmount(session).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(PlaceMapError::session_not_found(id))
    }
}

async fn form_view(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<LocationFormView> {
    let page = page(&state, &id).await?;
    let view = page.form.lock().await.view();
    Ok(Json(view))
}

async fn form_field(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(edit): Json<FieldEdit>,
) -> ApiResult<LocationFormView> {
    let field: Field = edit.field.parse()?;
    let page = page(&state, &id).await?;
    let mut form = page.form.lock().await;
    form.set_field(field, edit.value);
    Ok(Json(form.view()))
}

async fn form_submit(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<LocationFormView> {
    let page = page(&state, &id).await?;
    let prepared = page.form.lock().await.prepare_submission();

    if let Some(place) = prepared {
        let outcome = state.backend.insert_place(&place).await;
        page.form.lock().await.apply_submission(&place, outcome);
    }

    let view = page.form.lock().await.view();
    Ok(Json(view))
}

async fn distance_view(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<DistanceProbeView> {
    let page = page(&state, &id).await?;
    let view = page.probe.lock().await.view();
    Ok(Json(view))
}

async fn distance_click(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(point): Json<Point>,
) -> ApiResult<DistanceProbeView> {
    let page = page(&state, &id).await?;
    let query = page.probe.lock().await.click(point);

    if let Some(query) = query {
        let outcome = state.backend.distance(query.from, query.to).await;
        page.probe.lock().await.resolve(query.ticket, outcome);
    }

    let view = page.probe.lock().await.view();
    Ok(Json(view))
}

async fn distance_reset(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<DistanceProbeView> {
    let page = page(&state, &id).await?;
    let mut probe = page.probe.lock().await;
    probe.reset();
    Ok(Json(probe.view()))
}

async fn nearby_view(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<NearbySearchView> {
    let page = page(&state, &id).await?;
    let view = page.nearby.lock().await.view();
    Ok(Json(view))
}

async fn nearby_select(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(point): Json<Point>,
) -> ApiResult<NearbySearchView> {
    let page = page(&state, &id).await?;
    let mut nearby = page.nearby.lock().await;
    nearby.select(point);
    Ok(Json(nearby.view()))
}

async fn nearby_radius(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(edit): Json<RadiusEdit>,
) -> ApiResult<NearbySearchView> {
    let page = page(&state, &id).await?;
    let mut nearby = page.nearby.lock().await;
    nearby.set_radius(edit.radius);
    Ok(Json(nearby.view()))
}

async fn nearby_places(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<NearbySearchView> {
    let page = page(&state, &id).await?;
    let query = page.nearby.lock().await.prepare_places();

    if let Some(query) = query {
        let outcome = state.backend.nearby_places(query.center, query.radius_km).await;
        page.nearby.lock().await.apply_places(query.ticket, outcome);
    }

    let view = page.nearby.lock().await.view();
    Ok(Json(view))
}

async fn nearby_nearest(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<NearbySearchView> {
    let page = page(&state, &id).await?;
    let query = page.nearby.lock().await.prepare_nearest();

    if let Some(query) = query {
        let outcome = state.backend.nearest_place(query.center).await;
        page.nearby.lock().await.apply_nearest(query.ticket, outcome);
    }

    let view = page.nearby.lock().await.view();
    Ok(Json(view))
}
