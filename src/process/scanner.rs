//! Process scanning utilities for discovering and reading process entries from /proc.
//!
//! This module provides functions to scan the /proc filesystem for process entries
//! and read per-process identity data: name, command line, cgroup, cwd and owner.

use std::fs;
use std::path::{Path, PathBuf};

/// Length of a truncated kernel command name (TASK_COMM_LEN - 1).
const COMM_MAX_LEN: usize = 15;

/// Process entry representing a directory in /proc filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcEntry {
    pub pid: u32,
    pub proc_path: PathBuf,
}

/// Scans the proc root for process entries with numeric PIDs, sorted by pid.
pub fn collect_proc_entries(root: &Path) -> std::io::Result<Vec<ProcEntry>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(root)?.flatten() {
        let p = entry.path();
        let name = match p.file_name().and_then(|s| s.to_str()) {
            Some(v) => v,
            None => continue,
        };
        if !name.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let pid: u32 = match name.parse() {
            Ok(v) => v,
            Err(_) => continue,
        };
        out.push(ProcEntry { pid, proc_path: p });
    }
    out.sort_by_key(|e| e.pid);
    Ok(out)
}

/// Splits raw `/proc/<pid>/cmdline` content into arguments.
pub fn split_cmdline(content: &[u8]) -> Vec<String> {
    content
        .split(|&b| b == 0u8)
        .filter(|s| !s.is_empty())
        .map(|s| String::from_utf8_lossy(s).into_owned())
        .collect()
}

/// Reads the command-line arguments of a process.
pub fn read_cmdline(proc_path: &Path) -> Option<Vec<String>> {
    fs::read(proc_path.join("cmdline"))
        .ok()
        .map(|content| split_cmdline(&content))
}

/// Reads process name from comm file or extracts from cmdline.
///
/// `comm` is truncated by the kernel; when it is at the truncation length and
/// the executable name from `argv[0]` extends it, the longer name is used.
pub fn read_process_name(proc_path: &Path) -> Option<String> {
    let comm = fs::read_to_string(proc_path.join("comm"))
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let exe = read_cmdline(proc_path).and_then(|args| executable_name(&args));

    match (comm, exe) {
        (Some(comm), Some(exe)) if comm.len() >= COMM_MAX_LEN && exe.starts_with(&comm) => {
            Some(exe)
        }
        (Some(comm), _) => Some(comm),
        (None, exe) => exe,
    }
}

/// File name of `argv[0]`.
fn executable_name(args: &[String]) -> Option<String> {
    let first = args.first()?;
    // Some processes rewrite argv[0] into a single space-separated string
    let first = first.split(' ').next().unwrap_or(first.as_str());
    Path::new(first)
        .file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.to_string())
}

/// Reads the cgroup descriptor of a process.
pub fn read_cgroup(proc_path: &Path) -> Option<String> {
    fs::read_to_string(proc_path.join("cgroup")).ok()
}

/// Resolves the working-directory link of a process.
pub fn read_cwd(proc_path: &Path) -> Option<PathBuf> {
    fs::read_link(proc_path.join("cwd")).ok()
}

/// Parses the real uid from the `Uid:` line of `/proc/<pid>/status`.
pub fn parse_real_uid(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("Uid:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|uid| uid.parse().ok())
}

/// Reads the real uid of a process.
pub fn read_real_uid(proc_path: &Path) -> Option<u32> {
    let status = fs::read_to_string(proc_path.join("status")).ok()?;
    parse_real_uid(&status)
}
