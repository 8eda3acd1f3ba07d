//! Abstractions over the operating system's process table.
//!
//! The sampler only talks to these traits. `ProcFs` is the Linux
//! implementation; tests drive the sampler with in-memory fakes.

use crate::error::ProbeError;
use std::path::PathBuf;

/// Host-wide memory statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostMemory {
    pub total_bytes: u64,
    pub available_bytes: u64,
}

/// Read access to a single running process.
///
/// Every accessor is fallible and independent: a process can exit or deny
/// access between two calls.
pub trait ProcessHandle {
    fn pid(&self) -> u32;

    /// Short process name as reported by the kernel.
    fn name(&self) -> Option<String>;

    /// Raw contents of the process cgroup descriptor.
    fn cgroup(&self) -> Option<String>;

    /// Command-line arguments, `argv[0]` first.
    fn cmdline(&self) -> Option<Vec<String>>;

    /// Current working directory.
    fn cwd(&self) -> Option<PathBuf>;

    /// Name of the owning (real) user.
    fn username(&self) -> Option<String>;

    /// Resident set size in bytes.
    fn rss_bytes(&self) -> Result<u64, ProbeError>;

    /// CPU utilization in percent of one core.
    fn cpu_percent(&self) -> Result<f64, ProbeError>;
}

/// Source of host statistics and the process table.
pub trait SystemProbe: Send + Sync {
    type Process: ProcessHandle;

    fn host_memory(&self) -> Result<HostMemory, ProbeError>;

    /// Number of logical CPU cores.
    fn logical_cores(&self) -> Result<usize, ProbeError>;

    /// Host-wide CPU busy percent (0-100) since the previous call.
    fn cpu_busy_percent(&self) -> Result<f64, ProbeError>;

    /// Snapshot of all processes, in enumeration order.
    fn processes(&self) -> Result<Vec<Self::Process>, ProbeError>;
}
