//! Prometheus metrics definitions for process-scout.
//!
//! Host gauges are ordinary registered gauges. The two per-process gauge
//! vectors are built fresh on every collection pass and published as a unit
//! through [`ProcessMetrics`], so a scrape never sees a half-cleared set.

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Gauge, GaugeVec, Opts, Registry};
use std::sync::{Arc, PoisonError, RwLock};

pub const PROCESS_MEMORY_MB: &str = "process_memory_mb";
pub const PROCESS_CPU_PERCENT: &str = "process_cpu_percent";
pub const SERVER_TOTAL_MEMORY_MB: &str = "server_total_memory_mb";
pub const SERVER_AVAILABLE_MEMORY_MB: &str = "server_available_memory_mb";
pub const SERVER_TOTAL_CPU_CORES: &str = "server_total_cpu_cores";
pub const SERVER_AVAILABLE_CPU_CORES: &str = "server_available_cpu_cores";

/// One generation of per-process gauges.
#[derive(Clone)]
pub struct ProcessGauges {
    pub memory_mb: GaugeVec,
    pub cpu_percent: GaugeVec,
}

impl ProcessGauges {
    pub fn new(label_names: &[&str]) -> prometheus::Result<Self> {
        let memory_mb = GaugeVec::new(Opts::new(PROCESS_MEMORY_MB, "Memory usage in MB"), label_names)?;
        let cpu_percent =
            GaugeVec::new(Opts::new(PROCESS_CPU_PERCENT, "CPU usage percent"), label_names)?;
        Ok(Self {
            memory_mb,
            cpu_percent,
        })
    }

    /// Sets both gauges for a label tuple. An existing tuple is overwritten.
    pub fn record(&self, labels: &[String], memory_mb: f64, cpu_percent: f64) {
        let values: Vec<&str> = labels.iter().map(String::as_str).collect();
        self.memory_mb
            .with_label_values(values.as_slice())
            .set(memory_mb);
        self.cpu_percent
            .with_label_values(values.as_slice())
            .set(cpu_percent);
    }
}

/// Registry-facing collector for the per-process gauges.
///
/// `describe` keeps an unused generation for the registry's descriptors;
/// `collect` reads whichever generation was published last.
#[derive(Clone)]
pub struct ProcessMetrics {
    label_names: Vec<&'static str>,
    describe: ProcessGauges,
    published: Arc<RwLock<ProcessGauges>>,
}

impl ProcessMetrics {
    pub fn new(label_names: &[&'static str]) -> prometheus::Result<Self> {
        let describe = ProcessGauges::new(label_names)?;
        let published = ProcessGauges::new(label_names)?;
        Ok(Self {
            label_names: label_names.to_vec(),
            describe,
            published: Arc::new(RwLock::new(published)),
        })
    }

    /// A new, empty generation with the registered label schema.
    pub fn fresh(&self) -> prometheus::Result<ProcessGauges> {
        ProcessGauges::new(&self.label_names)
    }

    /// Replaces the published generation.
    pub fn publish(&self, gauges: ProcessGauges) {
        *self
            .published
            .write()
            .unwrap_or_else(PoisonError::into_inner) = gauges;
    }

    pub fn current(&self) -> ProcessGauges {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Collector for ProcessMetrics {
    fn desc(&self) -> Vec<&Desc> {
        let mut descs = self.describe.memory_mb.desc();
        descs.extend(self.describe.cpu_percent.desc());
        descs
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let gauges = self.current();
        let mut families = gauges.memory_mb.collect();
        families.extend(gauges.cpu_percent.collect());
        families
    }
}

/// All gauges exported by process-scout.
#[derive(Clone)]
pub struct ExporterMetrics {
    pub server_total_memory_mb: Gauge,
    pub server_available_memory_mb: Gauge,
    pub server_total_cpu_cores: Gauge,
    pub server_available_cpu_cores: Gauge,
    pub scrape_duration: Gauge,
    pub processes_exported: Gauge,
    pub processes: ProcessMetrics,
}

impl ExporterMetrics {
    /// Creates and registers all metrics with the registry.
    pub fn new(registry: &Registry, label_names: &[&'static str]) -> prometheus::Result<Self> {
        let server_total_memory_mb =
            Gauge::new(SERVER_TOTAL_MEMORY_MB, "Total server memory in MB")?;
        let server_available_memory_mb = Gauge::new(
            SERVER_AVAILABLE_MEMORY_MB,
            "Available (free + cached) memory in MB",
        )?;
        let server_total_cpu_cores =
            Gauge::new(SERVER_TOTAL_CPU_CORES, "Total number of logical CPU cores")?;
        let server_available_cpu_cores = Gauge::new(
            SERVER_AVAILABLE_CPU_CORES,
            "Estimated number of free CPU cores (based on idle %)",
        )?;
        let scrape_duration = Gauge::new(
            "process_scout_scrape_duration_seconds",
            "Time spent sampling the host for the last /metrics request",
        )?;
        let processes_exported = Gauge::new(
            "process_scout_processes_exported",
            "Number of processes exported by the last collection pass",
        )?;
        let processes = ProcessMetrics::new(label_names)?;

        registry.register(Box::new(server_total_memory_mb.clone()))?;
        registry.register(Box::new(server_available_memory_mb.clone()))?;
        registry.register(Box::new(server_total_cpu_cores.clone()))?;
        registry.register(Box::new(server_available_cpu_cores.clone()))?;
        registry.register(Box::new(scrape_duration.clone()))?;
        registry.register(Box::new(processes_exported.clone()))?;
        registry.register(Box::new(processes.clone()))?;

        Ok(Self {
            server_total_memory_mb,
            server_available_memory_mb,
            server_total_cpu_cores,
            server_available_cpu_cores,
            scrape_duration,
            processes_exported,
            processes,
        })
    }
}
