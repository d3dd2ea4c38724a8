//! Application-level modules for the trace viewer.
//!
//! This module contains the application coordinators, the host adapter and
//! centralized state management.

mod app_state;
mod application_coordinator;
mod settings_coordinator;
mod theme_coordinator;
mod viewer_host;

pub use app_state::AppState;
pub use application_coordinator::ApplicationCoordinator;
pub use settings_coordinator::SettingsCoordinator;
pub use theme_coordinator::ThemeCoordinator;
pub use viewer_host::ViewerHost;
