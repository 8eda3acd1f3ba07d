//! System-wide metrics collection from /proc filesystem.
//!
//! This module reads host memory, per-core CPU counters and uptime from a
//! proc root (normally `/proc`), and tracks host CPU busy percent between
//! calls.

use std::fs;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use crate::error::ProbeError;
use crate::process::HostMemory;

/// Parses `/proc/meminfo` content into total and available bytes.
///
/// Kernels without `MemAvailable` (< 3.14) fall back to free + buffers + cached.
pub fn parse_meminfo(content: &str) -> Option<HostMemory> {
    let mut total_kb: Option<u64> = None;
    let mut available_kb: Option<u64> = None;
    let mut free_kb = 0u64;
    let mut buffers_kb = 0u64;
    let mut cached_kb = 0u64;

    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let Ok(kb) = value.parse::<u64>() else {
            continue;
        };
        match key {
            "MemTotal:" => total_kb = Some(kb),
            "MemAvailable:" => available_kb = Some(kb),
            "MemFree:" => free_kb = kb,
            "Buffers:" => buffers_kb = kb,
            "Cached:" => cached_kb = kb,
            _ => {}
        }
    }

    let total_kb = total_kb?;
    let available_kb = available_kb.unwrap_or(free_kb + buffers_kb + cached_kb);

    Some(HostMemory {
        total_bytes: total_kb * 1024,
        available_bytes: available_kb * 1024,
    })
}

/// Reads host memory from `<root>/meminfo`.
pub fn read_memory_info(root: &Path) -> Result<HostMemory, ProbeError> {
    let path = root.join("meminfo");
    let content = fs::read_to_string(&path).map_err(|e| ProbeError::io(&path, e))?;
    parse_meminfo(&content).ok_or_else(|| ProbeError::parse(&path, "MemTotal not found"))
}

/// CPU time counters (in ticks) from one `cpu` line of /proc/stat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuStat {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuStat {
    /// Calculate total CPU time (all fields).
    pub fn total(&self) -> u64 {
        self.user
            + self.nice
            + self.system
            + self.idle
            + self.iowait
            + self.irq
            + self.softirq
            + self.steal
    }

    /// Calculate non-active time (idle + iowait).
    pub fn idle_total(&self) -> u64 {
        self.idle + self.iowait
    }
}

/// Aggregate CPU counters plus the number of per-core lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTimes {
    pub aggregate: CpuStat,
    pub logical_cores: usize,
}

fn parse_cpu_line(parts: &[&str]) -> CpuStat {
    let field = |i: usize| parts.get(i).and_then(|v| v.parse::<u64>().ok()).unwrap_or(0);
    CpuStat {
        user: field(1),
        nice: field(2),
        system: field(3),
        idle: field(4),
        iowait: field(5),
        irq: field(6),
        softirq: field(7),
        steal: field(8),
    }
}

/// Parses `/proc/stat` content.
///
/// The `cpu` line is the aggregate over all cores; `cpuN` lines are counted
/// as logical cores.
pub fn parse_cpu_times(content: &str) -> Option<CpuTimes> {
    let mut aggregate: Option<CpuStat> = None;
    let mut logical_cores = 0usize;

    for line in content.lines() {
        if !line.starts_with("cpu") {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 5 {
            continue;
        }
        if parts[0] == "cpu" {
            aggregate = Some(parse_cpu_line(&parts));
        } else if parts[0][3..].chars().all(|c| c.is_ascii_digit()) {
            logical_cores += 1;
        }
    }

    aggregate.map(|aggregate| CpuTimes {
        aggregate,
        logical_cores,
    })
}

/// Reads CPU counters from `<root>/stat`.
pub fn read_cpu_times(root: &Path) -> Result<CpuTimes, ProbeError> {
    let path = root.join("stat");
    let content = fs::read_to_string(&path).map_err(|e| ProbeError::io(&path, e))?;
    parse_cpu_times(&content).ok_or_else(|| ProbeError::parse(&path, "no aggregate cpu line"))
}

/// Reads system uptime in seconds from `<root>/uptime`.
///
/// Format: "<uptime_seconds> <idle_seconds>"
pub fn read_uptime(root: &Path) -> Result<f64, ProbeError> {
    let path = root.join("uptime");
    let content = fs::read_to_string(&path).map_err(|e| ProbeError::io(&path, e))?;

    content
        .split_whitespace()
        .next()
        .and_then(|v| v.parse::<f64>().ok())
        .ok_or_else(|| ProbeError::parse(&path, "invalid uptime format"))
}

#[derive(Debug, Default)]
struct BusyState {
    previous: Option<CpuStat>,
    last_busy_percent: f64,
}

/// Host CPU busy percent calculated from deltas between calls.
///
/// The first call measures since boot. If no ticks elapsed since the previous
/// call, the previous result is repeated.
#[derive(Debug, Default)]
pub struct CpuStatsCache {
    state: RwLock<BusyState>,
}

impl CpuStatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Busy percent (0-100) between the previous and the current counters.
    pub fn busy_percent(&self, current: CpuStat) -> f64 {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let previous = state.previous.unwrap_or_default();

        let delta_total = current.total().saturating_sub(previous.total());
        let delta_idle = current.idle_total().saturating_sub(previous.idle_total());

        let busy = if delta_total > 0 {
            let busy_ticks = delta_total.saturating_sub(delta_idle);
            (busy_ticks as f64 / delta_total as f64 * 100.0).clamp(0.0, 100.0)
        } else {
            state.last_busy_percent
        };

        state.previous = Some(current);
        state.last_busy_percent = busy;
        busy
    }
}
