//! Theme and styling state management.

use rzpl::{Theme, ThemeManager};

/// State related to visual theme and styling.
///
/// Responsibilities:
/// - Owning the theme manager
/// - Tracking the current theme selection
/// - Flagging selection changes that still need persisting
pub struct ThemeState {
    theme_manager: ThemeManager,
    /// Set when the user picks a theme, cleared once it is saved
    dirty: bool,
}

impl std::fmt::Debug for ThemeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeState")
            .field("current_theme_name", &self.current_theme_name())
            .finish_non_exhaustive()
    }
}

impl Default for ThemeState {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeState {
    /// Creates a new theme state with the default theme.
    pub fn new() -> Self {
        Self {
            theme_manager: ThemeManager::new(),
            dirty: false,
        }
    }

    /// Creates a new theme state with a specific theme, falling back to the
    /// default for unknown names.
    pub fn with_theme(theme_name: &str) -> Self {
        let mut state = Self::new();
        if let Err(e) = state.theme_manager.set_current_theme(theme_name) {
            log::warn!("{}, keeping default", e);
        }
        state
    }

    // ===== Theme Queries =====

    pub fn theme_manager(&self) -> &ThemeManager {
        &self.theme_manager
    }

    pub fn current_theme_name(&self) -> &str {
        self.theme_manager.current_theme_name()
    }

    pub fn current_theme(&self) -> Theme {
        self.theme_manager.current_theme()
    }

    // ===== Theme Mutations =====

    /// Sets the current theme by name.
    pub fn set_theme(&mut self, theme_name: &str) {
        if self.theme_manager.set_current_theme(theme_name).is_ok() {
            self.dirty = true;
        }
    }

    /// Returns true once after each theme change.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
