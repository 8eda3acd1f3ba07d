//! In-memory process and host fakes for unit tests.

use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::ProbeError;
use crate::process::probe::{HostMemory, ProcessHandle, SystemProbe};

#[derive(Debug, Clone, Default)]
pub struct FakeProcess {
    pub pid: u32,
    pub name: Option<String>,
    pub cgroup: Option<String>,
    pub cmdline: Option<Vec<String>>,
    pub cwd: Option<PathBuf>,
    pub user: Option<String>,
    pub rss_bytes: Option<u64>,
    pub cpu_percent: Option<f64>,
}

impl FakeProcess {
    pub fn new(pid: u32, name: &str) -> Self {
        Self {
            pid,
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn unnamed(pid: u32) -> Self {
        Self {
            pid,
            ..Self::default()
        }
    }

    pub fn with_cgroup(mut self, cgroup: &str) -> Self {
        self.cgroup = Some(cgroup.to_string());
        self
    }

    pub fn with_cmdline(mut self, args: &[&str]) -> Self {
        self.cmdline = Some(args.iter().map(|a| a.to_string()).collect());
        self
    }

    pub fn with_cwd(mut self, cwd: &str) -> Self {
        self.cwd = Some(PathBuf::from(cwd));
        self
    }

    pub fn with_user(mut self, user: &str) -> Self {
        self.user = Some(user.to_string());
        self
    }

    pub fn with_usage(mut self, rss_bytes: u64, cpu_percent: f64) -> Self {
        self.rss_bytes = Some(rss_bytes);
        self.cpu_percent = Some(cpu_percent);
        self
    }
}

impl ProcessHandle for FakeProcess {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    fn cgroup(&self) -> Option<String> {
        self.cgroup.clone()
    }

    fn cmdline(&self) -> Option<Vec<String>> {
        self.cmdline.clone()
    }

    fn cwd(&self) -> Option<PathBuf> {
        self.cwd.clone()
    }

    fn username(&self) -> Option<String> {
        self.user.clone()
    }

    fn rss_bytes(&self) -> Result<u64, ProbeError> {
        self.rss_bytes
            .ok_or_else(|| ProbeError::parse(format!("/proc/{}/statm", self.pid), "gone"))
    }

    fn cpu_percent(&self) -> Result<f64, ProbeError> {
        self.cpu_percent
            .ok_or_else(|| ProbeError::parse(format!("/proc/{}/stat", self.pid), "gone"))
    }
}

/// Host fake with a fixed process table and scriptable CPU readings.
#[derive(Debug, Default)]
pub struct FakeSystem {
    pub memory: Option<HostMemory>,
    pub cores: Option<usize>,
    /// Busy percent readings, consumed front to back; `None` entries fail.
    pub busy: Mutex<Vec<Option<f64>>>,
    pub processes: Vec<FakeProcess>,
}

impl FakeSystem {
    pub fn new(processes: Vec<FakeProcess>) -> Self {
        Self {
            memory: Some(HostMemory {
                total_bytes: 8 * 1024 * 1024 * 1024,
                available_bytes: 2 * 1024 * 1024 * 1024,
            }),
            cores: Some(4),
            busy: Mutex::new(vec![Some(25.0)]),
            processes,
        }
    }

    pub fn with_busy_readings(self, readings: Vec<Option<f64>>) -> Self {
        *self.busy.lock().unwrap() = readings;
        self
    }
}

impl SystemProbe for FakeSystem {
    type Process = FakeProcess;

    fn host_memory(&self) -> Result<HostMemory, ProbeError> {
        self.memory
            .ok_or_else(|| ProbeError::parse("/proc/meminfo", "unavailable"))
    }

    fn logical_cores(&self) -> Result<usize, ProbeError> {
        self.cores
            .ok_or_else(|| ProbeError::parse("/proc/stat", "unavailable"))
    }

    fn cpu_busy_percent(&self) -> Result<f64, ProbeError> {
        let mut busy = self.busy.lock().unwrap();
        let reading = if busy.len() > 1 {
            busy.remove(0)
        } else {
            busy.first().copied().flatten()
        };
        reading.ok_or_else(|| ProbeError::parse("/proc/stat", "unavailable"))
    }

    fn processes(&self) -> Result<Vec<FakeProcess>, ProbeError> {
        Ok(self.processes.clone())
    }
}
