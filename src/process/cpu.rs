//! CPU statistics parsing for process metrics.
//!
//! This module parses CPU time information from `/proc/<pid>/stat` and keeps a
//! per-pid cache of the previous sample for delta calculations.

use ahash::AHashMap as HashMap;
use ahash::AHashSet as HashSet;
use once_cell::sync::Lazy;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock as StdRwLock};
use std::time::Instant;
use tracing::debug;

use crate::error::ProbeError;
use crate::system;

/// Get system clock ticks per second (usually 100, but can vary).
fn get_clk_tck() -> f64 {
    #[cfg(unix)]
    {
        // SAFETY: sysconf is safe to call with _SC_CLK_TCK
        // Returns -1 on error, 0 if undefined - both are handled by the > 0 check
        unsafe {
            let tck = libc::sysconf(libc::_SC_CLK_TCK);
            if tck > 0 {
                return tck as f64;
            }
        }
    }
    // Fallback to common default for error cases or non-Unix platforms
    100.0
}

/// System clock ticks per second (for CPU time calculation).
pub static CLK_TCK: Lazy<f64> = Lazy::new(get_clk_tck);

/// CPU-related fields of `/proc/<pid>/stat`, in clock ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcCpuTimes {
    /// utime + stime
    pub busy_ticks: u64,
    /// Start time after boot.
    pub start_ticks: u64,
}

impl ProcCpuTimes {
    pub fn busy_seconds(&self) -> f64 {
        self.busy_ticks as f64 / *CLK_TCK
    }

    pub fn start_seconds(&self) -> f64 {
        self.start_ticks as f64 / *CLK_TCK
    }
}

/// Parses the content of `/proc/<pid>/stat`.
///
/// The command name (field 2) may contain spaces and parentheses, so fields are
/// counted from the last `)`.
pub fn parse_stat(content: &str) -> Option<ProcCpuTimes> {
    let rest = &content[content.rfind(')')? + 1..];
    let fields: Vec<&str> = rest.split_whitespace().collect();

    // fields[0] is the state (field 3); utime is field 14, stime 15, starttime 22
    if fields.len() <= 19 {
        return None;
    }

    let utime: u64 = fields[11].parse().ok()?;
    let stime: u64 = fields[12].parse().ok()?;
    let start_ticks: u64 = fields[19].parse().ok()?;

    Some(ProcCpuTimes {
        busy_ticks: utime + stime,
        start_ticks,
    })
}

/// Reads and parses `<proc_path>/stat`.
pub fn read_cpu_times(proc_path: &Path) -> Result<ProcCpuTimes, ProbeError> {
    let stat_path = proc_path.join("stat");
    let content = fs::read_to_string(&stat_path).map_err(|e| ProbeError::io(&stat_path, e))?;
    parse_stat(&content).ok_or_else(|| ProbeError::parse(&stat_path, "invalid stat format"))
}

/// Cache entry with timestamp for delta-based CPU calculation.
#[derive(Debug, Clone, Copy)]
pub struct CpuEntry {
    pub busy_seconds: f64,
    pub last_updated: Instant,
}

/// Per-process CPU percent tracker.
///
/// The first sample of a pid reports its lifetime average; later samples
/// report usage since the previous sample.
#[derive(Debug)]
pub struct CpuTracker {
    proc_root: PathBuf,
    cache: StdRwLock<HashMap<u32, CpuEntry>>,
}

impl CpuTracker {
    pub fn new(proc_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
            cache: StdRwLock::new(HashMap::new()),
        }
    }

    /// CPU percent of one core for `pid`, whose `/proc` directory is `proc_path`.
    pub fn percent(&self, pid: u32, proc_path: &Path) -> Result<f64, ProbeError> {
        let now = Instant::now();
        let times = read_cpu_times(proc_path)?;
        let busy_seconds = times.busy_seconds();

        let previous = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&pid)
            .copied();

        let cpu_percent = match previous {
            Some(entry) => {
                let dt = now.duration_since(entry.last_updated).as_secs_f64();
                let delta_cpu = busy_seconds - entry.busy_seconds;
                if dt > 0.0 && delta_cpu > 0.0 {
                    (delta_cpu / dt) * 100.0
                } else {
                    0.0
                }
            }
            None => self.lifetime_percent(pid, &times),
        };

        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                pid,
                CpuEntry {
                    busy_seconds,
                    last_updated: now,
                },
            );

        Ok(cpu_percent)
    }

    fn lifetime_percent(&self, pid: u32, times: &ProcCpuTimes) -> f64 {
        let uptime = match system::read_uptime(&self.proc_root) {
            Ok(v) => v,
            Err(e) => {
                debug!("Failed to read uptime for pid {}: {}", pid, e);
                return 0.0;
            }
        };

        let elapsed = uptime - times.start_seconds();
        if elapsed > 0.0 {
            (times.busy_seconds() / elapsed) * 100.0
        } else {
            0.0
        }
    }

    /// Drops cache entries for pids that are no longer running.
    pub fn retain(&self, live: &HashSet<u32>) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|pid, _| live.contains(pid));
    }

    pub fn tracked(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // Typical /proc/<pid>/stat format:
    // pid (comm) state ppid pgrp session tty_nr tpgid flags minflt cminflt majflt cmajflt utime stime ...
    const STAT: &str = "1234 (test_process) S 1 1234 1234 0 -1 4194304 100 0 0 0 1000 500 0 0 20 0 1 0 12345 12345678 1234 18446744073709551615 4194304 4238788 140736466511168 0 0 0 0 0 0 0 0 0 17 1 0 0 0 0 0";

    #[test]
    fn test_parse_stat() {
        let times = parse_stat(STAT).expect("stat should parse");
        assert_eq!(times.busy_ticks, 1500);
        assert_eq!(times.start_ticks, 12345);
    }

    #[test]
    fn test_parse_stat_comm_with_spaces() {
        let stat = STAT.replace("(test_process)", "(Web Content (x))");
        let times = parse_stat(&stat).expect("stat should parse");
        assert_eq!(times.busy_ticks, 1500);
        assert_eq!(times.start_ticks, 12345);
    }

    #[test]
    fn test_parse_stat_invalid() {
        assert!(parse_stat("1234 (test) S 1 2 3").is_none());
        assert!(parse_stat("garbage without parens").is_none());
    }

    #[test]
    fn test_read_cpu_times_missing_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let err = read_cpu_times(dir.path()).expect_err("missing stat must fail");
        assert!(matches!(err, ProbeError::Io { .. }));
    }

    #[test]
    fn test_first_sample_is_lifetime_average() {
        let root = tempdir().expect("Failed to create temp dir");
        let proc_path = root.path().join("1234");
        std::fs::create_dir(&proc_path).unwrap();

        // busy = 1500 ticks, started at 0 ticks, host up for (1500 / CLK_TCK) * 4 seconds
        let stat = STAT.replace(" 12345 12345678", " 0 12345678");
        std::fs::write(proc_path.join("stat"), stat).unwrap();
        let uptime = (1500.0 / *CLK_TCK) * 4.0;
        std::fs::write(root.path().join("uptime"), format!("{uptime:.2} 0.00\n")).unwrap();

        let tracker = CpuTracker::new(root.path());
        let pct = tracker.percent(1234, &proc_path).expect("percent");
        assert!((pct - 25.0).abs() < 0.5, "Expected ~25%, got {pct}");
        assert_eq!(tracker.tracked(), 1);
    }

    #[test]
    fn test_unchanged_times_give_zero_delta() {
        let root = tempdir().expect("Failed to create temp dir");
        let proc_path = root.path().join("1234");
        std::fs::create_dir(&proc_path).unwrap();
        std::fs::write(proc_path.join("stat"), STAT).unwrap();
        std::fs::write(root.path().join("uptime"), "100000.00 0.00\n").unwrap();

        let tracker = CpuTracker::new(root.path());
        tracker.percent(1234, &proc_path).expect("first sample");
        let second = tracker.percent(1234, &proc_path).expect("second sample");
        assert_eq!(second, 0.0);
    }

    #[test]
    fn test_retain_prunes_exited_pids() {
        let root = tempdir().expect("Failed to create temp dir");
        let tracker = CpuTracker::new(root.path());
        for pid in [1u32, 2, 3] {
            let proc_path = root.path().join(pid.to_string());
            std::fs::create_dir(&proc_path).unwrap();
            std::fs::write(proc_path.join("stat"), STAT).unwrap();
            tracker.percent(pid, &proc_path).expect("sample");
        }
        assert_eq!(tracker.tracked(), 3);

        let live: HashSet<u32> = [2u32].into_iter().collect();
        tracker.retain(&live);
        assert_eq!(tracker.tracked(), 1);
    }
}
