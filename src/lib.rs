//! process-scout library
//!
//! Samples per-process CPU and memory usage from `/proc`, classifies processes
//! into runtime categories and exposes the results as Prometheus gauges.
//!
//! # Usage
//!
//! ```no_run
//! use process_scout::{handlers, AppState, Config, ProcFs};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::default();
//! let bind = config.bind_address();
//! let state = Arc::new(AppState::new(config, ProcFs::default())?);
//!
//! let listener = tokio::net::TcpListener::bind(bind).await?;
//! axum::serve(listener, handlers::router(state)).await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod process;
pub mod sampler;
pub mod state;
pub mod system;

// Re-export main types for convenience
pub use config::{load_config, Config, LabelConfig, LabelKind};
pub use error::{ConfigError, ProbeError};
pub use metrics::ExporterMetrics;
pub use process::{ProcFs, ProcessCategory, ProcessHandle, SystemProbe};
pub use sampler::{PassSummary, ProcessSample, Sampler};
pub use state::{AppState, SharedState};
