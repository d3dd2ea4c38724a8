//! UI panel rendering subsystem
//!
//! This module contains all UI rendering logic for the trace viewer:
//! - Top bar (file controls, active group, theme selector)
//! - Panel toolbar (one button per registered panel, drag sources)
//! - Tiling view (tabsets, dividers, drop feedback)
//! - Panel template and views (panel chrome and bodies)
//! - Status bar (memory and group summary)
//! - Panel manager (panel orchestration and layout)

pub mod panel_buttons;
pub mod panel_manager;
pub mod panel_template;
pub mod panel_views;
pub mod status_bar;
pub mod tiling_view;
pub mod top_bar;
