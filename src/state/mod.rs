//! State management modules for the trace viewer.
//!
//! This module contains state-only logic (no UI concerns):
//! - Theme state (theme manager, current theme)
//! - Drag state (synthetic drag session, drop container)

mod drag_state;
mod theme_state;

pub use drag_state::{DragState, MovePayload, SpawnPayload};
pub use theme_state::ThemeState;
