//! HTTP surface for flightcatalog.
//!
//! Builds the axum router over a shared [`FlightService`] and runs it until
//! shutdown is requested.

mod error;
mod handlers;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::ErrorResponse;
pub use handlers::DeleteResponse;

use crate::error::Result;
use crate::service::FlightService;

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    service: Arc<FlightService>,
}

impl AppState {
    /// Wrap a service handle for the router.
    #[must_use]
    pub fn new(service: Arc<FlightService>) -> Self {
        Self { service }
    }
}

/// Build the router for all flight routes.
#[must_use]
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/flight",
            get(handlers::list_flights).post(handlers::create_flight),
        )
        .route("/flight/getCheapFlight", get(handlers::cheapest_arrival))
        .route(
            "/flight/:id",
            get(handlers::get_flight)
                .put(handlers::update_flight)
                .delete(handlers::delete_flight),
        )
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve `router` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the address can't be bound or the server fails.
pub async fn serve<F>(addr: SocketAddr, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Starting HTTP server on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("HTTP server has been shut down");
    Ok(())
}

/// Resolves when the process receives Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Starting graceful shutdown...");
}
