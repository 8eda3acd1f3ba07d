//! Process-related modules for discovery, classification, labels and resource usage.
//!
//! This module provides:
//! - `probe`: traits the sampler uses to talk to the host
//! - `procfs`: the /proc implementation of those traits
//! - `scanner`: process discovery and identity files
//! - `memory`: resident memory from /proc/<pid>/statm
//! - `cpu`: CPU time parsing and per-pid deltas
//! - `category`: process classification
//! - `labels`: per-process label values

pub mod category;
pub mod cpu;
pub mod labels;
pub mod memory;
pub mod probe;
pub mod procfs;
pub mod scanner;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use category::{classify, ProcessCategory};
pub use labels::extract_labels;
pub use memory::bytes_to_mb;
pub use probe::{HostMemory, ProcessHandle, SystemProbe};
pub use procfs::{ProcFs, ProcProcess, DEFAULT_PROC_ROOT};
