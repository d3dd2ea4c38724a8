//! Rendering subsystem for drawing panel contents
//!
//! This module contains the low-level painting used by the panel views:
//! - Plot rendering (line and bar charts with annotations)
//! - Flamegraph rendering (frames by depth and time)
//! - Text utilities (label fitting)

pub mod flame_renderer;
pub mod plot_renderer;
pub mod text_utils;
