//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use axum::body::to_bytes;
use axum::response::IntoResponse;
use process_scout::process::HostMemory;
use process_scout::{Config, ProbeError, ProcessHandle, SystemProbe};

pub const MIB: u64 = 1024 * 1024;

/// Process with fixed attributes.
#[derive(Debug, Clone, Default)]
pub struct StaticProcess {
    pub pid: u32,
    pub name: Option<String>,
    pub cgroup: Option<String>,
    pub cmdline: Option<Vec<String>>,
    pub cwd: Option<PathBuf>,
    pub user: Option<String>,
    pub rss_bytes: u64,
    pub cpu_percent: f64,
}

impl StaticProcess {
    pub fn new(pid: u32, name: &str, rss_mb: u64, cpu_percent: f64) -> Self {
        Self {
            pid,
            name: Some(name.to_string()),
            rss_bytes: rss_mb * MIB,
            cpu_percent,
            ..Self::default()
        }
    }

    pub fn cwd(mut self, cwd: &str) -> Self {
        self.cwd = Some(PathBuf::from(cwd));
        self
    }

    pub fn user(mut self, user: &str) -> Self {
        self.user = Some(user.to_string());
        self
    }

    pub fn cmdline(mut self, args: &[&str]) -> Self {
        self.cmdline = Some(args.iter().map(|a| a.to_string()).collect());
        self
    }
}

impl ProcessHandle for StaticProcess {
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
        Ok(self.rss_bytes)
    }

    fn cpu_percent(&self) -> Result<f64, ProbeError> {
        Ok(self.cpu_percent)
    }
}

/// Host with 16 GiB of memory and 8 cores at 25% busy.
pub struct StaticHost {
    processes: Mutex<Vec<StaticProcess>>,
    broken: AtomicBool,
}

impl StaticHost {
    pub fn new(processes: Vec<StaticProcess>) -> Self {
        Self {
            processes: Mutex::new(processes),
            broken: AtomicBool::new(false),
        }
    }

    pub fn set_processes(&self, processes: Vec<StaticProcess>) {
        *self.processes.lock().unwrap() = processes;
    }

    /// Makes every host probe fail from now on.
    pub fn break_host(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), ProbeError> {
        if self.broken.load(Ordering::SeqCst) {
            Err(ProbeError::parse("/proc/stat", "host probe disabled"))
        } else {
            Ok(())
        }
    }
}

impl SystemProbe for StaticHost {
    type Process = StaticProcess;

    fn host_memory(&self) -> Result<HostMemory, ProbeError> {
        self.check()?;
        Ok(HostMemory {
            total_bytes: 16 * 1024 * MIB,
            available_bytes: 4 * 1024 * MIB,
        })
    }

    fn logical_cores(&self) -> Result<usize, ProbeError> {
        self.check()?;
        Ok(8)
    }

    fn cpu_busy_percent(&self) -> Result<f64, ProbeError> {
        self.check()?;
        Ok(25.0)
    }

    fn processes(&self) -> Result<Vec<StaticProcess>, ProbeError> {
        self.check()?;
        Ok(self.processes.lock().unwrap().clone())
    }
}

pub fn config_from_yaml(yaml: &str) -> Config {
    let mut config: Config = serde_yaml::from_str(yaml).unwrap();
    config.apply_defaults();
    config
}

/// Converts a handler response into its status, content type and body.
pub async fn into_parts(response: impl IntoResponse) -> (u16, String, String) {
    let response = response.into_response();
    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Sample lines for one metric, without HELP/TYPE comments.
pub fn samples<'a>(body: &'a str, metric: &str) -> Vec<&'a str> {
    body.lines()
        .filter(|line| !line.starts_with('#'))
        .filter(|line| {
            line.strip_prefix(metric)
                .is_some_and(|rest| rest.starts_with('{') || rest.starts_with(' '))
        })
        .collect()
}
