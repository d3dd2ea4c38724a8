//! Text measurement helpers shared by the painters.

use eframe::egui;

const ELLIPSIS: &str = "…";

fn text_width(painter: &egui::Painter, text: String, font_id: &egui::FontId) -> f32 {
    painter.layout_no_wrap(text, font_id.clone(), egui::Color32::WHITE).size().x
}

/// Shortens `text` with a trailing ellipsis so it fits in `max_width`.
///
/// Returns `None` when not even the ellipsis fits, so callers can skip the label.
pub fn fit_label(text: &str, max_width: f32, font_id: &egui::FontId, painter: &egui::Painter) -> Option<String> {
    if max_width <= 0.0 {
        return None;
    }
    if text_width(painter, text.to_string(), font_id) <= max_width {
        return Some(text.to_string());
    }
    if text_width(painter, ELLIPSIS.to_string(), font_id) > max_width {
        return None;
    }

    // Largest prefix (in chars) whose ellipsized form still fits
    let chars: Vec<char> = text.chars().collect();
    let (mut low, mut high) = (0usize, chars.len());
    while low < high {
        let mid = (low + high).div_ceil(2);
        let candidate: String = chars[..mid].iter().copied().chain(ELLIPSIS.chars()).collect();
        if text_width(painter, candidate, font_id) <= max_width {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    let mut label: String = chars[..low].iter().collect();
    label.push_str(ELLIPSIS);
    Some(label)
}
