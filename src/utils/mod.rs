//! Utility modules for the trace viewer.

pub mod formatting;

// Re-export commonly used functions
pub use formatting::{format_duration_ms, format_memory_mb, format_value, get_current_memory_mb};
