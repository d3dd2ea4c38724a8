//! Drag-and-drop state of the tiling area.

use std::time::Instant;

use eframe::egui::Pos2;
use rzpl::drag::{ContainerEvent, DragOutcome, DragPayload, DropContainer, SyntheticDrag};
use rzpl::{InstanceId, LayoutController};

/// Native egui payload carried when a panel button is dragged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnPayload(pub String);

/// Native egui payload carried when a tab is dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovePayload(pub InstanceId);

/// State related to ongoing drags.
///
/// Responsibilities:
/// - Running the pointer-driven drag of panel buttons
/// - Holding the drop container shared by both drag paths
/// - Remembering whether a native drag was over the layout last frame
#[derive(Debug, Default)]
pub struct DragState {
    pub synthetic: SyntheticDrag,
    pub container: DropContainer,
    native_inside: bool,
    files_hovering: bool,
}

impl DragState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records whether a native drag is over the layout; returns the previous
    /// value so callers can tell enter from over.
    pub fn set_native_inside(&mut self, inside: bool) -> bool {
        std::mem::replace(&mut self.native_inside, inside)
    }

    /// Same as [`DragState::set_native_inside`] for files dragged in from the OS.
    pub fn set_files_hovering(&mut self, hovering: bool) -> bool {
        std::mem::replace(&mut self.files_hovering, hovering)
    }

    /// Escape pressed during a pointer-driven drag.
    pub fn escape(&mut self, layout: &mut LayoutController, pos: Pos2, now: Instant) -> DragOutcome {
        let outcome = self.synthetic.key_escape();
        if let DragOutcome::Cancelled { title } = &outcome {
            self.abandon(layout, title.clone(), pos, now);
        }
        outcome
    }

    /// Leaves the container with the dragged panel and discards the layout
    /// preview. The highlight goes once the leave debounce expires.
    pub fn abandon(&mut self, layout: &mut LayoutController, title: String, pos: Pos2, now: Instant) {
        self.container.handle(ContainerEvent::Leave, DragPayload::Panel(title), pos, now);
        layout.cancel_preview();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2, Rect};
    use rzpl::layout::PreviewSource;
    use rzpl::drag::LEAVE_DEBOUNCE;

    #[test]
    fn test_inside_flag_reports_previous_value() {
        let mut drag = DragState::new();
        assert!(!drag.set_native_inside(true));
        assert!(drag.set_native_inside(true));
        assert!(drag.set_native_inside(false));
        assert!(!drag.set_files_hovering(true));
    }

    #[test]
    fn test_escape_discards_preview_and_releases_highlight() {
        let area = Rect::from_min_size(pos2(0.0, 100.0), vec2(400.0, 300.0));
        let grip = Rect::from_min_size(pos2(10.0, 10.0), vec2(16.0, 16.0));
        let now = Instant::now();
        let mut drag = DragState::new();
        let mut layout = LayoutController::new();

        drag.synthetic.begin("CPU load", grip.center(), grip);
        layout.begin_preview(PreviewSource::Spawn("CPU load".to_string()));
        let inside = pos2(200.0, 200.0);
        let event = drag.synthetic.pointer_moved(inside, area);
        assert_eq!(event, Some(ContainerEvent::Enter));
        drag.container.handle(ContainerEvent::Enter, DragPayload::Panel("CPU load".into()), inside, now);
        assert!(drag.container.is_highlighted());

        let outcome = drag.escape(&mut layout, inside, now);
        assert_eq!(outcome, DragOutcome::Cancelled { title: "CPU load".to_string() });
        assert!(layout.preview().is_none());
        assert!(!drag.synthetic.is_active());
        assert_eq!(drag.synthetic.listeners().count(), 0);

        assert!(drag.container.is_highlighted());
        assert!(drag.container.tick(now + LEAVE_DEBOUNCE));
        assert!(!drag.container.is_highlighted());
        assert!(layout.tree().is_empty());
    }

    #[test]
    fn test_escape_without_drag_is_ignored() {
        let mut drag = DragState::new();
        let mut layout = LayoutController::new();
        layout.begin_preview(PreviewSource::Spawn("CPU load".to_string()));
        assert_eq!(drag.escape(&mut layout, pos2(0.0, 0.0), Instant::now()), DragOutcome::Ignored);
        assert!(layout.preview().is_some());
    }
}
