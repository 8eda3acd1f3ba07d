//! Collection pass: host gauges plus the per-process sample set.
//!
//! Every step is best-effort. Failures are logged and replaced by a degraded
//! value; nothing here aborts a pass.

use ahash::AHashSet as HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{Config, LabelKind};
use crate::metrics::ExporterMetrics;
use crate::process::{
    bytes_to_mb, classify, extract_labels, ProcessCategory, ProcessHandle, SystemProbe,
};

/// One exported process from a single pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSample {
    pub pid: u32,
    pub category: ProcessCategory,
    /// Values of the enabled labels, in canonical order.
    pub labels: Vec<String>,
    pub memory_mb: f64,
    pub cpu_percent: f64,
}

/// Counters describing one pass, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub seen: usize,
    pub exported: usize,
    /// Not in `include_types`.
    pub filtered: usize,
    /// Memory could not be read.
    pub failed: usize,
    /// Distinct label tuples published.
    pub series: usize,
}

/// Collects samples from a [`SystemProbe`] into [`ExporterMetrics`].
pub struct Sampler<P: SystemProbe> {
    probe: P,
    config: Arc<Config>,
    enabled_labels: Vec<LabelKind>,
    metrics: ExporterMetrics,
}

impl<P: SystemProbe> Sampler<P> {
    pub fn new(probe: P, config: Arc<Config>, metrics: ExporterMetrics) -> Self {
        let enabled_labels = config.enabled_labels();
        Self {
            probe,
            config,
            enabled_labels,
            metrics,
        }
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn metrics(&self) -> &ExporterMetrics {
        &self.metrics
    }

    /// Runs one full pass and publishes its results.
    #[instrument(skip(self))]
    pub fn collect(&self) -> PassSummary {
        let start = Instant::now();

        self.sample_host();
        let (samples, mut summary) = self.sample_processes();

        match self.metrics.processes.fresh() {
            Ok(gauges) => {
                for sample in &samples {
                    gauges.record(&sample.labels, sample.memory_mb, sample.cpu_percent);
                }
                summary.series = samples
                    .iter()
                    .map(|s| s.labels.as_slice())
                    .collect::<HashSet<_>>()
                    .len();
                self.metrics.processes.publish(gauges);
            }
            Err(e) => {
                error!("Failed to build per-process gauges, keeping previous set: {}", e);
            }
        }

        let elapsed = start.elapsed().as_secs_f64();
        self.metrics.scrape_duration.set(elapsed);
        self.metrics.processes_exported.set(summary.exported as f64);

        info!(
            "Collection pass finished in {:.3}s: {} processes seen, {} exported, {} filtered, {} failed",
            elapsed, summary.seen, summary.exported, summary.filtered, summary.failed
        );
        summary
    }

    /// Updates host-wide memory and CPU gauges.
    pub fn sample_host(&self) {
        match self.probe.host_memory() {
            Ok(mem) => {
                self.metrics
                    .server_total_memory_mb
                    .set(bytes_to_mb(mem.total_bytes));
                self.metrics
                    .server_available_memory_mb
                    .set(bytes_to_mb(mem.available_bytes));
            }
            Err(e) => warn!("Failed to read host memory: {}", e),
        }

        let cores = match self.probe.logical_cores() {
            Ok(cores) => {
                self.metrics.server_total_cpu_cores.set(cores as f64);
                Some(cores)
            }
            Err(e) => {
                warn!("Failed to read logical CPU count: {}", e);
                None
            }
        };

        // A failed busy probe leaves server_available_cpu_cores at its last value.
        match (self.probe.cpu_busy_percent(), cores) {
            (Ok(busy), Some(cores)) => {
                let free_cores = (100.0 - busy) / 100.0 * cores as f64;
                self.metrics.server_available_cpu_cores.set(free_cores);
            }
            (Err(e), _) => {
                warn!("Failed to read CPU utilization, available cores not updated: {}", e);
            }
            (Ok(_), None) => {
                debug!("Core count unknown, available cores not updated");
            }
        }
    }

    /// Enumerates, classifies and measures processes. Samples are returned in
    /// enumeration order.
    pub fn sample_processes(&self) -> (Vec<ProcessSample>, PassSummary) {
        let mut summary = PassSummary::default();

        let processes = match self.probe.processes() {
            Ok(p) => p,
            Err(e) => {
                warn!("Failed to enumerate processes: {}", e);
                return (Vec::new(), summary);
            }
        };

        let mut samples = Vec::with_capacity(processes.len());
        for process in &processes {
            summary.seen += 1;
            match self.sample_process(process) {
                SampleOutcome::Exported(sample) => {
                    summary.exported += 1;
                    samples.push(sample);
                }
                SampleOutcome::Filtered => summary.filtered += 1,
                SampleOutcome::Failed => summary.failed += 1,
            }
        }

        (samples, summary)
    }

    fn sample_process(&self, process: &P::Process) -> SampleOutcome {
        let pid = process.pid();
        let category = classify(process);
        if !self.config.includes(category) {
            return SampleOutcome::Filtered;
        }

        let labels = extract_labels(process, category, &self.enabled_labels);

        let rss_bytes = match process.rss_bytes() {
            Ok(v) => v,
            Err(e) => {
                debug!("Skipping pid {} ({}): {}", pid, category, e);
                return SampleOutcome::Failed;
            }
        };

        let cpu_percent = match process.cpu_percent() {
            Ok(v) => v,
            Err(e) => {
                debug!("CPU percent unavailable for pid {}: {}", pid, e);
                0.0
            }
        };

        SampleOutcome::Exported(ProcessSample {
            pid,
            category,
            labels,
            memory_mb: bytes_to_mb(rss_bytes),
            cpu_percent,
        })
    }
}

enum SampleOutcome {
    Exported(ProcessSample),
    Filtered,
    Failed,
}
