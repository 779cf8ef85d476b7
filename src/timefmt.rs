//! Timestamp formatting shared by archive and dump filenames.
//!
//! The format (`2024-07-01_16-45-09`) is lexicographically sortable and has
//! second granularity, which is collision-resistant enough given that the
//! pipeline never runs twice on the same bucket within one second.

use chrono::Local;

/// Format used in archive and dump filenames.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// The current local time, formatted for embedding in a filename.
pub fn current_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

// ─── Tests ────────────────────────────────────────────────────────────────────
