//! Human-readable byte counts.

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Format a byte count using binary units, e.g. `1.50 KB`.
///
/// Counts below 1 KB are printed exactly (`512 B`); larger counts use two
/// decimals. GB is the largest unit.
///
/// ```
/// assert_eq!(pardd::format_bytes(1000), "1000 B");
/// assert_eq!(pardd::format_bytes(1536), "1.50 KB");
/// ```
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
