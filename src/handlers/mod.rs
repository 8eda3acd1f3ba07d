//! HTTP endpoint handlers for the exporter.
//!
//! - `/metrics`: Prometheus metrics endpoint

pub mod metrics;

// Re-export handlers
pub use metrics::{metrics_handler, MetricsError};

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::process::SystemProbe;
use crate::state::AppState;

/// Builds the HTTP router. Paths other than `/metrics` get axum's default 404.
pub fn router<P>(state: Arc<AppState<P>>) -> Router
where
    P: SystemProbe + 'static,
{
    Router::new()
        .route("/metrics", get(metrics_handler::<P>))
        .with_state(state)
}
