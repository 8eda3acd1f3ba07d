//! `/proc`-backed implementation of the probe traits.

use ahash::AHashSet as HashSet;
use nix::unistd::{Uid, User};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::error::ProbeError;
use crate::process::cpu::CpuTracker;
use crate::process::memory::read_rss_bytes;
use crate::process::probe::{HostMemory, ProcessHandle, SystemProbe};
use crate::process::scanner::{
    collect_proc_entries, read_cgroup, read_cmdline, read_cwd, read_process_name, read_real_uid,
};
use crate::system::{self, CpuStatsCache};

pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Host probe reading a proc filesystem.
#[derive(Debug)]
pub struct ProcFs {
    root: PathBuf,
    cpu: Arc<CpuTracker>,
    host_cpu: CpuStatsCache,
}

impl ProcFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            cpu: Arc::new(CpuTracker::new(root.clone())),
            host_cpu: CpuStatsCache::new(),
            root,
        }
    }
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new(DEFAULT_PROC_ROOT)
    }
}

impl SystemProbe for ProcFs {
    type Process = ProcProcess;

    fn host_memory(&self) -> Result<HostMemory, ProbeError> {
        system::read_memory_info(&self.root)
    }

    fn logical_cores(&self) -> Result<usize, ProbeError> {
        let times = system::read_cpu_times(&self.root)?;
        if times.logical_cores == 0 {
            return Err(ProbeError::parse(self.root.join("stat"), "no per-core cpu lines"));
        }
        Ok(times.logical_cores)
    }

    fn cpu_busy_percent(&self) -> Result<f64, ProbeError> {
        let times = system::read_cpu_times(&self.root)?;
        Ok(self.host_cpu.busy_percent(times.aggregate))
    }

    fn processes(&self) -> Result<Vec<ProcProcess>, ProbeError> {
        let entries =
            collect_proc_entries(&self.root).map_err(|e| ProbeError::io(&self.root, e))?;

        let live: HashSet<u32> = entries.iter().map(|e| e.pid).collect();
        self.cpu.retain(&live);

        Ok(entries
            .into_iter()
            .map(|entry| ProcProcess {
                pid: entry.pid,
                proc_path: entry.proc_path,
                cpu: Arc::clone(&self.cpu),
            })
            .collect())
    }
}

/// A process directory under the proc root.
#[derive(Debug, Clone)]
pub struct ProcProcess {
    pid: u32,
    proc_path: PathBuf,
    cpu: Arc<CpuTracker>,
}

impl ProcessHandle for ProcProcess {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn name(&self) -> Option<String> {
        read_process_name(&self.proc_path)
    }

    fn cgroup(&self) -> Option<String> {
        read_cgroup(&self.proc_path)
    }

    fn cmdline(&self) -> Option<Vec<String>> {
        read_cmdline(&self.proc_path)
    }

    fn cwd(&self) -> Option<PathBuf> {
        read_cwd(&self.proc_path)
    }

    fn username(&self) -> Option<String> {
        let uid = read_real_uid(&self.proc_path)?;
        match User::from_uid(Uid::from_raw(uid)) {
            Ok(Some(user)) => Some(user.name),
            Ok(None) => {
                debug!("No user entry for uid {} (pid {})", uid, self.pid);
                None
            }
            Err(e) => {
                debug!("Failed to look up uid {} (pid {}): {}", uid, self.pid, e);
                None
            }
        }
    }

    fn rss_bytes(&self) -> Result<u64, ProbeError> {
        read_rss_bytes(&self.proc_path)
    }

    fn cpu_percent(&self) -> Result<f64, ProbeError> {
        self.cpu.percent(self.pid, &self.proc_path)
    }
}
