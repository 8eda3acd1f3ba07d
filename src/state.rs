//! Application state management for the exporter.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers.

use prometheus::Registry;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::metrics::ExporterMetrics;
use crate::process::{ProcFs, SystemProbe};
use crate::sampler::Sampler;

/// Type alias for shared application state.
pub type SharedState<P = ProcFs> = Arc<AppState<P>>;

/// State shared across requests.
pub struct AppState<P: SystemProbe = ProcFs> {
    pub registry: Registry,
    pub config: Arc<Config>,
    pub sampler: Arc<Sampler<P>>,
    /// Held across collect + render so each response reflects exactly one pass.
    /// Shared so the guard can outlive a cancelled request.
    pub scrape_lock: Arc<Mutex<()>>,
}

impl<P: SystemProbe> AppState<P> {
    /// Builds the registry, registers all metrics and wires the sampler.
    pub fn new(config: Config, probe: P) -> prometheus::Result<Self> {
        let registry = Registry::new();
        let config = Arc::new(config);
        let metrics = ExporterMetrics::new(&registry, &config.label_names())?;
        let sampler = Arc::new(Sampler::new(probe, Arc::clone(&config), metrics));

        Ok(Self {
            registry,
            config,
            sampler,
            scrape_lock: Arc::new(Mutex::new(())),
        })
    }
}
