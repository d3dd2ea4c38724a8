//! Flamegraph painting for the active group.
//!
//! Frames are laid out by depth (rows) and time (columns). Hovering an
//! operator frame publishes it to the bus so frame-linked plots annotate the
//! same operator; a click selects the frame.

use eframe::egui;
use egui::{Align2, FontId, Pos2, Rect, Sense, Stroke};
use rzpl::theme::{series_color, with_alpha};
use rzpl::trace::{normalize_op_name, FrameSpan};
use rzpl::{FrameRef, SyncBus, ThemeColors, TraceGroup};

use crate::rendering::text_utils::fit_label;
use crate::utils::format_duration_ms;

pub const ROW_HEIGHT: f32 = 18.0;
const ROW_GAP: f32 = 1.0;
const MIN_LABEL_WIDTH: f32 = 24.0;

/// Horizontal mapping from trace time to screen x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    start: f64,
    end: f64,
    left: f32,
    width: f32,
}

impl TimeScale {
    pub fn new((start, end): (f64, f64), left: f32, width: f32) -> Self {
        Self { start, end, left, width }
    }

    pub fn to_x(&self, t: f64) -> f32 {
        let span = self.end - self.start;
        if span <= 0.0 {
            return self.left;
        }
        self.left + ((t - self.start) / span) as f32 * self.width
    }

    /// Screen rectangle of `frame` in a canvas starting at `top`.
    pub fn frame_rect(&self, frame: &FrameSpan, top: f32) -> Rect {
        let x0 = self.to_x(frame.start);
        let x1 = self.to_x(frame.end).max(x0 + 1.0);
        let y0 = top + frame.depth as f32 * (ROW_HEIGHT + ROW_GAP);
        Rect::from_min_max(Pos2::new(x0, y0), Pos2::new(x1, y0 + ROW_HEIGHT))
    }
}

/// Deepest frame under `pos`, if any.
pub fn frame_at<'a>(frames: &[&'a FrameSpan], scale: &TimeScale, top: f32, pos: Pos2) -> Option<&'a FrameSpan> {
    frames
        .iter()
        .copied()
        .filter(|frame| scale.frame_rect(frame, top).contains(pos))
        .max_by_key(|frame| frame.depth)
}

fn frame_color(frame: &FrameSpan, colors: &ThemeColors) -> egui::Color32 {
    match &frame.op_type {
        Some(op_type) => {
            let slot = op_type.bytes().fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
            series_color(slot, 8)
        }
        None => with_alpha(colors.text_dim, 110),
    }
}

/// Paints the flamegraph of `group` and returns the frame clicked this frame.
pub fn render_flamegraph(
    ui: &mut egui::Ui,
    group: &TraceGroup,
    bus: &SyncBus,
    selected: Option<&FrameSpan>,
    colors: &ThemeColors,
) -> Option<FrameSpan> {
    let Some(extent) = group.time_extent() else {
        ui.label("This group has no frames");
        return None;
    };

    let frames = group.frames_in_call_order();
    let depth = frames.iter().map(|f| f.depth).max().unwrap_or(0) + 1;
    let height = (depth as f32 * (ROW_HEIGHT + ROW_GAP)).max(ui.available_height());
    let (rect, response) = ui.allocate_exact_size(egui::vec2(ui.available_width(), height), Sense::click());
    let painter = ui.painter_at(rect);

    let scale = TimeScale::new(extent, rect.left(), rect.width());
    let hovered_shared = bus.hovered_frame.get();
    let font = FontId::proportional(11.0);

    for frame in &frames {
        let frame_rect = scale.frame_rect(frame, rect.top());
        if !frame_rect.intersects(rect) {
            continue;
        }
        let is_selected = selected.is_some_and(|s| s == *frame);
        let fill = if is_selected { colors.selected_point } else { frame_color(frame, colors) };
        painter.rect_filled(frame_rect, 2.0, fill);

        let linked_hover = frame.is_op()
            && hovered_shared
                .as_ref()
                .is_some_and(|hovered| hovered.name == normalize_op_name(&frame.name));
        if linked_hover {
            painter.rect_stroke(frame_rect, 2.0, Stroke::new(2.0, colors.hovered_point), egui::StrokeKind::Inside);
        }

        if frame_rect.width() >= MIN_LABEL_WIDTH {
            if let Some(label) = fit_label(&frame.name, frame_rect.width() - 4.0, &font, &painter) {
                painter.text(
                    frame_rect.left_center() + egui::vec2(2.0, 0.0),
                    Align2::LEFT_CENTER,
                    label,
                    font.clone(),
                    colors.background,
                );
            }
        }
    }

    let under_pointer = response
        .hover_pos()
        .and_then(|pos| frame_at(&frames, &scale, rect.top(), pos));
    publish_hover(ui, response.id, bus, under_pointer);

    if let Some(frame) = under_pointer {
        let text = format!("{}\n{}", frame.name, format_duration_ms(frame.duration()));
        response.clone().on_hover_text_at_pointer(text);
    }

    if response.clicked() {
        return under_pointer.cloned();
    }
    None
}

/// Publishes the hovered operator frame, clearing it when the pointer leaves.
fn publish_hover(ui: &egui::Ui, id: egui::Id, bus: &SyncBus, frame: Option<&FrameSpan>) {
    let published = frame
        .filter(|frame| frame.is_op())
        .map(|frame| FrameRef::new(normalize_op_name(&frame.name)));
    let was_publishing = ui.data(|d| d.get_temp::<bool>(id)).unwrap_or(false);

    if published.is_some() {
        if bus.hovered_frame.get() != published {
            bus.hovered_frame.set(published);
        }
        ui.data_mut(|d| d.insert_temp(id, true));
    } else if was_publishing {
        bus.hovered_frame.set(None);
        ui.data_mut(|d| d.insert_temp(id, false));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(name: &str, start: f64, end: f64, depth: u32) -> FrameSpan {
        FrameSpan {
            name: name.to_string(),
            start,
            end,
            depth,
            op_type: None,
            args: Default::default(),
        }
    }

    #[test]
    fn test_time_scale_maps_extent_to_width() {
        let scale = TimeScale::new((10.0, 20.0), 100.0, 200.0);
        assert_eq!(scale.to_x(10.0), 100.0);
        assert_eq!(scale.to_x(15.0), 200.0);
        assert_eq!(scale.to_x(20.0), 300.0);
    }

    #[test]
    fn test_frame_at_prefers_deepest() {
        let root = frame("inference", 0.0, 10.0, 0);
        let op = frame("MODEL::conv_2d_0", 2.0, 4.0, 1);
        let frames = vec![&root, &op];
        let scale = TimeScale::new((0.0, 10.0), 0.0, 100.0);

        let inside_op = Pos2::new(30.0, ROW_HEIGHT + ROW_GAP + 2.0);
        assert_eq!(frame_at(&frames, &scale, 0.0, inside_op), Some(&op));

        let root_only = Pos2::new(80.0, 2.0);
        assert_eq!(frame_at(&frames, &scale, 0.0, root_only), Some(&root));
        assert_eq!(frame_at(&frames, &scale, 0.0, Pos2::new(80.0, 200.0)), None);
    }
}
