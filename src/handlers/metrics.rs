//! Metrics endpoint handler for Prometheus scraping.
//!
//! This module provides the `/metrics` endpoint handler. Every request runs a
//! full collection pass before the registry is rendered; nothing is cached
//! between requests.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use tracing::{debug, error, instrument};

use crate::process::SystemProbe;
use crate::state::AppState;

/// Buffer capacity for metrics encoding.
const BUFFER_CAP: usize = 64 * 1024;

/// Error type for metrics endpoint failures.
#[derive(Debug)]
pub enum MetricsError {
    EncodingFailed,
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to encode metrics",
        )
            .into_response()
    }
}

/// Handler for the /metrics endpoint.
#[instrument(skip(state))]
pub async fn metrics_handler<P>(
    State(state): State<Arc<AppState<P>>>,
) -> Result<impl IntoResponse, MetricsError>
where
    P: SystemProbe + 'static,
{
    debug!("Processing /metrics request");

    // Serialize scrapes: collect and render must not interleave with another pass
    let guard = Arc::clone(&state.scrape_lock).lock_owned().await;

    // The guard travels with the pass, so a dropped request cannot release the
    // lock while its collection is still running.
    let sampler = Arc::clone(&state.sampler);
    let pass = tokio::task::spawn_blocking(move || {
        let summary = sampler.collect();
        (summary, guard)
    });
    let _guard = match pass.await {
        Ok((summary, guard)) => {
            debug!(
                "Collection pass exported {} processes as {} series",
                summary.exported, summary.series
            );
            guard
        }
        Err(e) => {
            error!("Collection pass failed, serving last published state: {}", e);
            Arc::clone(&state.scrape_lock).lock_owned().await
        }
    };

    let encoder = TextEncoder::new();
    let metric_families = state.registry.gather();
    let mut buffer = Vec::with_capacity(BUFFER_CAP);
    encoder.encode(&metric_families, &mut buffer).map_err(|e| {
        error!("Failed to encode metrics: {}", e);
        MetricsError::EncodingFailed
    })?;

    let body = String::from_utf8(buffer).map_err(|e| {
        error!("Encoded metrics are not valid UTF-8: {}", e);
        MetricsError::EncodingFailed
    })?;

    Ok((
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        body,
    ))
}
