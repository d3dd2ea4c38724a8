//! Theme support for the trace viewer.
//!
//! Provides the Dark and Light palettes, a theme manager that applies them to
//! egui visuals, and the ordered series palette shared by every plot so that
//! the same series index gets the same color in all panels.
//!
//! # Examples
//!
//! ```
//! use rzpl::theme::{series_color, ThemeManager};
//!
//! let manager = ThemeManager::new();
//! let light = manager.get_theme("Light").unwrap();
//! println!("Light background: {:?}", light.colors.background);
//! println!("First series: {:?}", series_color(0, 2));
//! ```

use egui::Color32;
use std::collections::HashMap;

/// Plot series colors, used in order while a plot has at most 8 series.
pub const SERIES_PALETTE: [Color32; 8] = [
    Color32::from_rgb(0x00, 0xE5, 0x8D),
    Color32::from_rgb(0x00, 0x93, 0xE5),
    Color32::from_rgb(0xE5, 0x60, 0x00),
    Color32::from_rgb(0x00, 0x7F, 0x8C),
    Color32::from_rgb(0x15, 0x95, 0x00),
    Color32::from_rgb(0xDE, 0x11, 0x35),
    Color32::from_rgb(0x9E, 0x1F, 0xDA),
    Color32::from_rgb(0xE5, 0x97, 0x00),
];

/// Complete color palette for a theme
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Background colors
    pub background: Color32,
    pub panel_background: Color32,
    pub extreme_background: Color32,

    // Foreground colors
    pub text: Color32,
    pub text_dim: Color32,

    // Interactive colors
    pub selection: Color32,
    pub hover: Color32,
    pub border: Color32,

    // Drop highlight and tab strip
    pub drop_highlight: Color32,
    pub tab_active: Color32,

    // Plot emphasis
    pub hovered_point: Color32,
    pub selected_point: Color32,
    pub grid: Color32,

    pub red: Color32,
    pub orange: Color32,
}

/// A theme definition with metadata and color palette
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub description: String,
    pub colors: ThemeColors,
}

/// Centralized theme manager providing access to all available themes
pub struct ThemeManager {
    themes: HashMap<String, Theme>,
    current_theme_name: String,
}

impl ThemeManager {
    /// Creates a new ThemeManager initialized with the built-in themes
    pub fn new() -> Self {
        let mut themes = HashMap::new();
        themes.insert("Light".to_string(), light_theme());
        themes.insert("Dark".to_string(), dark_theme());

        Self {
            themes,
            current_theme_name: "Dark".to_string(),
        }
    }

    /// Retrieves a theme by name
    pub fn get_theme(&self, name: &str) -> Option<&Theme> {
        self.themes.get(name)
    }

    /// Returns a sorted list of all available theme names
    pub fn list_themes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.themes.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    pub fn current_theme_name(&self) -> &str {
        &self.current_theme_name
    }

    /// Gets the currently selected theme
    pub fn current_theme(&self) -> Theme {
        self.themes
            .get(&self.current_theme_name)
            .cloned()
            .unwrap_or_else(dark_theme)
    }

    /// Sets the current theme by name
    pub fn set_current_theme(&mut self, name: &str) -> Result<(), String> {
        if self.themes.contains_key(name) {
            self.current_theme_name = name.to_string();
            Ok(())
        } else {
            Err(format!("Theme '{}' not found", name))
        }
    }

    /// Applies a theme's colors to egui visuals
    pub fn apply_theme(&self, theme: &Theme, visuals: &mut egui::Visuals) {
        let colors = &theme.colors;

        visuals.panel_fill = colors.panel_background;
        visuals.window_fill = colors.panel_background;
        visuals.extreme_bg_color = colors.extreme_background;
        visuals.faint_bg_color = colors.hover;
        visuals.override_text_color = Some(colors.text);

        visuals.selection.bg_fill = colors.selection;
        visuals.widgets.noninteractive.bg_fill = colors.panel_background;
        visuals.widgets.noninteractive.bg_stroke.color = colors.border;
        visuals.widgets.inactive.bg_fill = colors.hover;
        visuals.widgets.hovered.bg_fill = colors.hover;
        visuals.widgets.active.bg_fill = colors.selection;

        visuals.error_fg_color = colors.red;
        visuals.warn_fg_color = colors.orange;
    }
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new()
    }
}

fn light_theme() -> Theme {
    Theme {
        name: "Light".to_string(),
        description: "Light background, dark text".to_string(),
        colors: ThemeColors {
            background: Color32::from_rgb(248, 248, 248),
            panel_background: Color32::from_rgb(248, 248, 248),
            extreme_background: Color32::from_rgb(255, 255, 255),

            text: Color32::from_rgb(0, 0, 0),
            text_dim: Color32::from_rgb(120, 120, 120),

            selection: Color32::from_rgb(180, 200, 255),
            hover: Color32::from_rgb(220, 220, 220),
            border: Color32::from_rgb(160, 160, 160),

            drop_highlight: with_alpha(hex_to_color32("#0093E5"), 60),
            tab_active: Color32::from_rgb(230, 236, 250),

            hovered_point: hex_to_color32("#E56000"),
            selected_point: hex_to_color32("#DE1135"),
            grid: Color32::from_rgb(225, 225, 225),

            red: Color32::from_rgb(200, 40, 40),
            orange: Color32::from_rgb(230, 120, 20),
        },
    }
}

fn dark_theme() -> Theme {
    Theme {
        name: "Dark".to_string(),
        description: "Dark background, light text".to_string(),
        colors: ThemeColors {
            background: Color32::from_rgb(39, 39, 39),
            panel_background: Color32::from_rgb(39, 39, 39),
            extreme_background: Color32::from_rgb(16, 16, 16),

            text: Color32::from_rgb(255, 255, 255),
            text_dim: Color32::from_rgb(160, 160, 160),

            selection: Color32::from_rgb(50, 80, 120),
            hover: Color32::from_rgb(70, 70, 70),
            border: Color32::from_rgb(100, 100, 100),

            drop_highlight: with_alpha(hex_to_color32("#0093E5"), 70),
            tab_active: Color32::from_rgb(60, 66, 80),

            hovered_point: hex_to_color32("#E59700"),
            selected_point: hex_to_color32("#DE1135"),
            grid: Color32::from_rgb(60, 60, 60),

            red: Color32::from_rgb(231, 76, 60),
            orange: Color32::from_rgb(243, 156, 18),
        },
    }
}

/// Color of series `index` in a plot with `total` series.
///
/// Up to 8 series use [`SERIES_PALETTE`]; larger plots spread hues evenly.
pub fn series_color(index: usize, total: usize) -> Color32 {
    if total <= SERIES_PALETTE.len() {
        return SERIES_PALETTE[index % SERIES_PALETTE.len()];
    }
    let hue = index as f32 / total as f32;
    egui::ecolor::Hsva::new(hue, 0.85, 0.9, 1.0).into()
}

/// Converts a hex color string (like "#282a36") to Color32
pub fn hex_to_color32(hex: &str) -> Color32 {
    let hex = hex.trim_start_matches('#');

    if hex.len() == 6 {
        let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
        let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
        let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
        Color32::from_rgb(r, g, b)
    } else {
        Color32::from_rgb(0, 0, 0)
    }
}

/// Sets the alpha channel of a color
pub fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_themes() {
        let mut manager = ThemeManager::new();
        assert_eq!(manager.list_themes(), vec!["Dark", "Light"]);
        assert_eq!(manager.current_theme().name, "Dark");
        assert!(manager.set_current_theme("Light").is_ok());
        assert!(manager.set_current_theme("Dracula").is_err());
        assert_eq!(manager.current_theme_name(), "Light");
    }

    #[test]
    fn test_series_palette_order() {
        assert_eq!(series_color(0, 3), hex_to_color32("#00E58D"));
        assert_eq!(series_color(9, 8), SERIES_PALETTE[1]);
        assert_ne!(series_color(0, 12), series_color(6, 12));
    }
}
