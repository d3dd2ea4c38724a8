//! Text formatting utilities for the trace viewer.
//!
//! This module provides helper functions for formatting values in a human-readable way.

use sysinfo::{Pid, ProcessRefreshKind, RefreshKind, System};

/// Formats a duration given in milliseconds with a unit that fits its size.
///
/// # Examples
/// ```ignore
/// assert_eq!(format_duration_ms(0.25), "250.0 µs");
/// assert_eq!(format_duration_ms(12.5), "12.50 ms");
/// assert_eq!(format_duration_ms(2500.0), "2.50 s");
/// ```
pub fn format_duration_ms(ms: f64) -> String {
    if ms.abs() >= 1000.0 {
        format!("{:.2} s", ms / 1000.0)
    } else if ms.abs() >= 1.0 {
        format!("{:.2} ms", ms)
    } else {
        format!("{:.1} µs", ms * 1000.0)
    }
}

/// Formats a byte count using binary units.
pub fn format_bytes(bytes: f64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes;
    let mut unit = 0;
    while value.abs() >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{:.0} {}", value, UNITS[unit])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Formats a plotted value in the unit its panel declares.
pub fn format_value(value: f64, unit: &str) -> String {
    match unit {
        "ms" => format_duration_ms(value),
        "B" => format_bytes(value),
        "%" => format!("{:.1}%", value),
        other => format!("{:.1} {}", value, other),
    }
}

/// Gets the current process memory usage in megabytes.
///
/// Returns 0.0 if the process information cannot be retrieved.
pub fn get_current_memory_mb() -> f64 {
    let mut sys = System::new_with_specifics(
        RefreshKind::new().with_processes(ProcessRefreshKind::new().with_memory()),
    );
    sys.refresh_processes_specifics(ProcessRefreshKind::new().with_memory());

    if let Some(process) = sys.process(Pid::from_u32(std::process::id())) {
        process.memory() as f64 / (1024.0 * 1024.0)
    } else {
        0.0
    }
}

/// Formats memory usage in MB as a human-readable string.
pub fn format_memory_mb(memory_mb: f64) -> String {
    if memory_mb > 1024.0 {
        format!("Memory: {:.2} GB", memory_mb / 1024.0)
    } else {
        format!("Memory: {:.1} MB", memory_mb)
    }
}
