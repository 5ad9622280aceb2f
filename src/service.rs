//! HTTP endpoint serving the collected metrics.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::collector::{Collector, DeviceSource};
use crate::encoding;

/// Builds a router that runs one collection per `GET` on `path`.
pub fn router<S>(collector: Arc<Collector<S>>, path: &str) -> Router
where
    S: DeviceSource + 'static,
{
    Router::new()
        .route(path, get(metrics::<S>))
        .with_state(collector)
}

async fn metrics<S>(State(collector): State<Arc<Collector<S>>>) -> Response
where
    S: DeviceSource + 'static,
{
    let samples = collector.collect().await;
    match encoding::encode_to_string(collector.describe(), &samples) {
        Ok(body) => ([(header::CONTENT_TYPE, encoding::CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!("failed to serve metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("An error has occurred while serving metrics:\n\n{}", e),
            )
                .into_response()
        }
    }
}

/// Serves `router` on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    info!("serving metrics on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
