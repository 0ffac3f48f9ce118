//! Request handlers for the `/flight` routes.
//!
//! Handlers translate requests into [`FlightService`] calls and run them on
//! the blocking pool, since every service call performs store I/O.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::flight::{CheapFlight, Flight, FlightPatch, NewFlight};
use crate::query::{CheapestArrivalSearch, FlightSearch};
use crate::service::FlightService;

use super::AppState;

/// Body returned by a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Confirmation text.
    pub message: String,
}

/// Run a service call on the blocking pool.
async fn run_blocking<T, F>(service: &Arc<FlightService>, f: F) -> Result<T>
where
    F: FnOnce(&FlightService) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let service = Arc::clone(service);
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| Error::internal(format!("blocking task failed: {e}")))?
}

/// A path segment that is not an integer names no flight.
fn parse_id(raw: &str) -> Result<i64> {
    raw.parse().map_err(|_| Error::not_found(raw))
}

fn query_params<T>(query: std::result::Result<Query<T>, QueryRejection>) -> Result<T> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| Error::invalid_input(rejection.body_text()))
}

fn json_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| Error::invalid_input(rejection.body_text()))
}

/// `GET /flight`
pub(super) async fn list_flights(
    State(state): State<AppState>,
    query: std::result::Result<Query<FlightSearch>, QueryRejection>,
) -> Result<Json<Vec<Flight>>> {
    let search = query_params(query)?;
    info!(?search, "GET /flight");

    let flights = if search.is_empty() {
        run_blocking(&state.service, FlightService::list_all).await?
    } else {
        run_blocking(&state.service, move |service| service.search(&search)).await?
    };
    debug!("Returning {} flights", flights.len());
    Ok(Json(flights))
}

/// `GET /flight/getCheapFlight`
pub(super) async fn cheapest_arrival(
    State(state): State<AppState>,
    query: std::result::Result<Query<CheapestArrivalSearch>, QueryRejection>,
) -> Result<Json<Option<CheapFlight>>> {
    let search = query_params(query)?;
    info!(?search, "GET /flight/getCheapFlight");

    let cheapest =
        run_blocking(&state.service, move |service| service.cheapest_arrival(&search)).await?;
    Ok(Json(cheapest))
}

/// `GET /flight/:id`
pub(super) async fn get_flight(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Flight>> {
    info!("GET /flight/{}", raw_id);
    let id = parse_id(&raw_id)?;

    let flight = run_blocking(&state.service, move |service| service.get(id)).await?;
    Ok(Json(flight))
}

/// `POST /flight`
pub(super) async fn create_flight(
    State(state): State<AppState>,
    body: std::result::Result<Json<NewFlight>, JsonRejection>,
) -> Result<(StatusCode, Json<Flight>)> {
    let request = json_body(body)?;
    info!(
        "POST /flight to create flight {} from {} -> {}",
        request.name, request.start_destination, request.end_destination
    );

    let flight = run_blocking(&state.service, move |service| service.create(request)).await?;
    debug!("Flight created with id: {}", flight.id);
    Ok((StatusCode::CREATED, Json(flight)))
}

/// `PUT /flight/:id`
pub(super) async fn update_flight(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: std::result::Result<Json<FlightPatch>, JsonRejection>,
) -> Result<Json<Flight>> {
    info!("PUT /flight/{}", raw_id);
    let id = parse_id(&raw_id)?;
    let patch = json_body(body)?;

    let flight = run_blocking(&state.service, move |service| service.update(id, &patch)).await?;
    Ok(Json(flight))
}

/// `DELETE /flight/:id`
pub(super) async fn delete_flight(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    info!("DELETE /flight/{}", raw_id);
    let id = parse_id(&raw_id)?;

    run_blocking(&state.service, move |service| service.delete(id)).await?;
    Ok(Json(DeleteResponse {
        message: format!("Flight {id} deleted"),
    }))
}

/// `GET /health`
pub(super) async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
