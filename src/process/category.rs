//! Process classification into runtime categories.
//!
//! Classification is a heuristic over the process name and, as a fallback,
//! the cgroup descriptor. It never fails: unreadable data is treated as
//! absence of evidence.

use std::fmt;

use crate::process::probe::ProcessHandle;

/// Category a process is exported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessCategory {
    Java,
    Python,
    Node,
    Docker,
    /// Process running inside a Docker container (detected via cgroup).
    DockerApp,
    /// Catch-all.
    System,
}

impl ProcessCategory {
    pub const ALL: [ProcessCategory; 6] = [
        ProcessCategory::Java,
        ProcessCategory::Python,
        ProcessCategory::Node,
        ProcessCategory::Docker,
        ProcessCategory::DockerApp,
        ProcessCategory::System,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProcessCategory::Java => "java",
            ProcessCategory::Python => "python",
            ProcessCategory::Node => "node",
            ProcessCategory::Docker => "docker",
            ProcessCategory::DockerApp => "docker_app",
            ProcessCategory::System => "system",
        }
    }

    /// Categories whose display name may come from `-D.system.id=`.
    pub fn is_language_runtime(self) -> bool {
        matches!(self, ProcessCategory::Java | ProcessCategory::Python)
    }
}

impl fmt::Display for ProcessCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies by name alone. Returns `None` when no name rule matches.
pub fn classify_name(name: &str) -> Option<ProcessCategory> {
    let name = name.to_lowercase();

    if name.contains("java") {
        Some(ProcessCategory::Java)
    } else if name.contains("python") {
        Some(ProcessCategory::Python)
    } else if name.contains("node") {
        Some(ProcessCategory::Node)
    } else if name.contains("docker") || name.contains("containerd") {
        Some(ProcessCategory::Docker)
    } else {
        None
    }
}

/// Classifies a process. First match wins: name rules, then the docker
/// cgroup probe, then `System`.
pub fn classify<P: ProcessHandle + ?Sized>(process: &P) -> ProcessCategory {
    let name = process.name().unwrap_or_default();
    if let Some(category) = classify_name(&name) {
        return category;
    }

    match process.cgroup() {
        Some(cgroup) if cgroup.contains("docker") => ProcessCategory::DockerApp,
        _ => ProcessCategory::System,
    }
}
