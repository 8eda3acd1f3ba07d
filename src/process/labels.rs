//! Per-process label extraction.
//!
//! Label values are produced in the canonical `LabelKind` order so they line
//! up with the label names the gauge vectors were registered with.

use crate::config::LabelKind;
use crate::process::category::ProcessCategory;
use crate::process::probe::ProcessHandle;

/// Returned for the `cwd` label when the working directory cannot be resolved.
pub const UNKNOWN_CWD: &str = "(unknown)";

/// Command-line flag carrying an explicit display name for JVM/Python services.
pub const SYSTEM_ID_PREFIX: &str = "-D.system.id=";

/// Working directory, or `(unknown)`.
pub fn working_directory<P: ProcessHandle + ?Sized>(process: &P) -> String {
    match process.cwd() {
        Some(path) => path.to_string_lossy().into_owned(),
        None => UNKNOWN_CWD.to_string(),
    }
}

/// Value of the first `-D.system.id=` argument, if any.
pub fn system_id(args: &[String]) -> Option<&str> {
    args.iter().find_map(|arg| arg.strip_prefix(SYSTEM_ID_PREFIX))
}

/// Display name: the `-D.system.id=` value for Java/Python, else the raw name.
pub fn display_name<P: ProcessHandle + ?Sized>(process: &P, category: ProcessCategory) -> String {
    if category.is_language_runtime() {
        if let Some(args) = process.cmdline() {
            if let Some(id) = system_id(&args) {
                return id.to_string();
            }
        }
    }
    process.name().unwrap_or_default()
}

/// Owning user name, or an empty string.
pub fn user_name<P: ProcessHandle + ?Sized>(process: &P) -> String {
    process.username().unwrap_or_default()
}

/// Values for the enabled labels, in the order given by `enabled`.
pub fn extract_labels<P: ProcessHandle + ?Sized>(
    process: &P,
    category: ProcessCategory,
    enabled: &[LabelKind],
) -> Vec<String> {
    enabled
        .iter()
        .map(|kind| match kind {
            LabelKind::Cwd => working_directory(process),
            LabelKind::ProcessName => display_name(process, category),
            LabelKind::Type => category.as_str().to_string(),
            LabelKind::User => user_name(process),
        })
        .collect()
}
