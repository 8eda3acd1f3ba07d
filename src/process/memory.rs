//! Resident memory parsing from `/proc/<pid>/statm`.

use once_cell::sync::Lazy;
use std::fs;
use std::path::Path;

use crate::error::ProbeError;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

fn get_page_size() -> u64 {
    #[cfg(unix)]
    {
        // SAFETY: sysconf is safe to call with _SC_PAGESIZE
        unsafe {
            let size = libc::sysconf(libc::_SC_PAGESIZE);
            if size > 0 {
                return size as u64;
            }
        }
    }
    4096
}

/// Memory page size in bytes.
pub static PAGE_SIZE: Lazy<u64> = Lazy::new(get_page_size);

/// Parses the resident page count (second field) of a statm line.
pub fn parse_statm_resident_pages(content: &str) -> Option<u64> {
    content.split_whitespace().nth(1)?.parse().ok()
}

/// Reads the resident set size of the process at `proc_path`, in bytes.
pub fn read_rss_bytes(proc_path: &Path) -> Result<u64, ProbeError> {
    let statm_path = proc_path.join("statm");
    let content = fs::read_to_string(&statm_path).map_err(|e| ProbeError::io(&statm_path, e))?;
    let pages = parse_statm_resident_pages(&content)
        .ok_or_else(|| ProbeError::parse(&statm_path, "missing resident field"))?;
    Ok(pages * *PAGE_SIZE)
}

/// Converts bytes to mebibytes, the unit of every memory gauge.
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}
