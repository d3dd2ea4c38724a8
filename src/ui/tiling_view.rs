//! The tiling layout area.
//!
//! Paints every tabset with its tab strip and active panel, the split
//! dividers, and the drop feedback. Three kinds of drags end here: native
//! egui drags of panel buttons and tabs, files dragged in from the OS, and
//! the pointer-driven drag of a button grip. All of them feed the same drop
//! container and the controller's drag preview.

use std::path::PathBuf;
use std::time::Instant;

use eframe::egui;
use egui::{Align2, FontId, Id, LayerId, Order, Pos2, Rect, Sense, Stroke};
use rzpl::drag::{ContainerEvent, DragOutcome, DragPayload, DropAction};
use rzpl::layout::{DragPreview, NodeId, PreviewSource, SplitAxis};
use rzpl::theme::with_alpha;
use rzpl::{DropTarget, DropZone, InstanceId, Placement, SelectedNode, ThemeColors};

use crate::app::AppState;
use crate::rendering::text_utils::fit_label;
use crate::state::{MovePayload, SpawnPayload};
use crate::ui::panel_template::{self, TemplateInteraction};
use crate::ui::panel_views::{PanelViews, ViewInteraction};

const TAB_HEIGHT: f32 = 22.0;
const TAB_MAX_WIDTH: f32 = 180.0;
const BODY_MARGIN: f32 = 4.0;

/// Result of user interaction with the tiling area
pub enum TilingInteraction {
    /// A tab was clicked
    Activate(InstanceId),
    /// A divider was dragged by `delta`, a fraction of its split's `extent`
    Resize { split: NodeId, index: usize, delta: f32, extent: f32 },
    /// A panel's close button was clicked
    ClosePanel(InstanceId),
    /// Something was dropped on the layout; `target` is the layout position
    /// under the pointer
    Dropped { action: DropAction, target: Option<DropTarget> },
    /// A tab was dropped on the layout
    MovePanel { id: InstanceId, target: DropTarget },
    /// A drag ended without placing anything
    DragCancelled,
    /// A flamegraph frame was clicked
    FrameSelected(SelectedNode),
}

/// Renders the tiling area into the remaining space of `ui`.
pub fn render_tiling_view(
    ui: &mut egui::Ui,
    state: &mut AppState,
    views: &mut PanelViews,
    colors: &ThemeColors,
) -> Option<TilingInteraction> {
    let area = ui.available_rect_before_wrap();
    ui.allocate_rect(area, Sense::hover());
    let ctx = ui.ctx().clone();
    let now = Instant::now();
    let mut interaction = None;

    if state.layout.tree().is_empty() {
        ui.painter().text(
            area.center(),
            Align2::CENTER_CENTER,
            "Click a panel button or drag it here",
            FontId::proportional(14.0),
            colors.text_dim,
        );
    }

    // ===== Tabsets and dividers =====

    let (tabsets, dividers) = state.layout.tree().layout(area);
    for &(node, rect) in &tabsets {
        if let Some(result) = render_tabset(ui, state, views, node, rect, colors) {
            interaction = Some(result);
        }
    }

    for divider in &dividers {
        let response = ui.interact(
            divider.rect,
            ui.id().with(("divider", divider.split, divider.index)),
            Sense::drag(),
        );
        if response.hovered() || response.dragged() {
            ctx.set_cursor_icon(match divider.axis {
                SplitAxis::Horizontal => egui::CursorIcon::ResizeHorizontal,
                SplitAxis::Vertical => egui::CursorIcon::ResizeVertical,
            });
            ui.painter().rect_filled(divider.rect, 0.0, colors.selection);
        }
        if response.dragged() {
            let delta = match divider.axis {
                SplitAxis::Horizontal => response.drag_delta().x,
                SplitAxis::Vertical => response.drag_delta().y,
            };
            if delta != 0.0 {
                interaction = Some(TilingInteraction::Resize {
                    split: divider.split,
                    index: divider.index,
                    delta: delta / divider.extent.max(1.0),
                    extent: divider.extent,
                });
            }
        }
    }

    // ===== Drags =====

    for result in [
        handle_native_drag(&ctx, state, area, now),
        handle_file_drag(&ctx, state, area, now),
        handle_synthetic_drag(&ctx, state, area, now),
    ]
    .into_iter()
    .flatten()
    {
        interaction = Some(result);
    }

    if state.drag.container.tick(now) {
        log::debug!("Drop highlight expired");
    }
    if let Some(wait) = state.drag.container.pending_leave(now) {
        ctx.request_repaint_after(wait);
    }

    paint_drop_feedback(&ctx, state, area, &tabsets, colors);
    interaction
}

// ===== Tabsets =====

fn render_tabset(
    ui: &mut egui::Ui,
    state: &mut AppState,
    views: &mut PanelViews,
    node: NodeId,
    rect: Rect,
    colors: &ThemeColors,
) -> Option<TilingInteraction> {
    let mut interaction = None;
    let frame_rect = rect.shrink(1.0);
    ui.painter().rect_filled(frame_rect, 2.0, colors.panel_background);
    ui.painter()
        .rect_stroke(frame_rect, 2.0, Stroke::new(1.0, colors.border), egui::StrokeKind::Inside);

    // Tab strip
    let font = FontId::proportional(12.0);
    let tabs = state.layout.tree().tabs(node).to_vec();
    let active = state.layout.tree().active_tab(node);
    let mut x = frame_rect.left() + 2.0;
    for id in tabs {
        let title = state.layout.instance(id).map(|i| i.title().to_string()).unwrap_or_default();
        let text_width = ui
            .painter()
            .layout_no_wrap(title.clone(), font.clone(), colors.text)
            .size()
            .x;
        let width = (text_width + 16.0).min(TAB_MAX_WIDTH).min(frame_rect.right() - x);
        if width <= 8.0 {
            break;
        }
        let tab_rect = Rect::from_min_size(Pos2::new(x, frame_rect.top() + 1.0), egui::vec2(width, TAB_HEIGHT));
        x += width + 2.0;

        let response = ui.interact(tab_rect, ui.id().with(("tab", id)), Sense::click_and_drag());
        response.dnd_set_drag_payload(MovePayload(id));

        let floating = state.layout.placement(id) == Some(Placement::FloatingPreview);
        let fill = if floating {
            with_alpha(colors.tab_active, 90)
        } else if Some(id) == active {
            colors.tab_active
        } else if response.hovered() {
            colors.hover
        } else {
            colors.background
        };
        ui.painter().rect_filled(tab_rect, 2.0, fill);
        if let Some(label) = fit_label(&title, width - 8.0, &font, ui.painter()) {
            ui.painter().text(tab_rect.center(), Align2::CENTER_CENTER, label, font.clone(), colors.text);
        }
        if response.clicked() {
            interaction = Some(TilingInteraction::Activate(id));
        }
    }

    // Active panel
    let Some(id) = active else {
        return interaction;
    };
    let body = Rect::from_min_max(
        Pos2::new(frame_rect.left() + BODY_MARGIN, frame_rect.top() + TAB_HEIGHT + BODY_MARGIN),
        Pos2::new(frame_rect.right() - BODY_MARGIN, frame_rect.bottom() - BODY_MARGIN),
    );
    if body.width() <= 0.0 || body.height() <= 0.0 {
        return interaction;
    }
    let mut child = ui.new_child(egui::UiBuilder::new().max_rect(body).id_salt(("tabset", node)));
    child.set_clip_rect(body);

    let AppState {
        layout,
        panels,
        groups,
        bus,
        selected_node,
        ..
    } = state;
    let Some(instance) = layout.instance_mut(id) else {
        return interaction;
    };
    let Some(descriptor) = panels.get(instance.title()) else {
        return interaction;
    };

    match panel_template::render_panel_header(&mut child, instance, descriptor, groups) {
        Some(TemplateInteraction::CloseRequested) => interaction = Some(TilingInteraction::ClosePanel(id)),
        Some(TemplateInteraction::SelectionChanged) => child.ctx().request_repaint(),
        None => {}
    }
    child.separator();

    let instance = &*instance;
    if let Some(ViewInteraction::FrameSelected(node)) =
        views.render_body(&mut child, instance, descriptor, groups, bus, selected_node.as_ref(), colors)
    {
        interaction = Some(TilingInteraction::FrameSelected(node));
    }
    interaction
}

// ===== Drag handling =====

fn container_event(was_inside: bool, inside: bool) -> Option<ContainerEvent> {
    match (was_inside, inside) {
        (false, true) => Some(ContainerEvent::Enter),
        (true, true) => Some(ContainerEvent::Over),
        (true, false) => Some(ContainerEvent::Leave),
        (false, false) => None,
    }
}

/// Native egui drags of panel buttons (spawn) and tabs (move).
fn handle_native_drag(ctx: &egui::Context, state: &mut AppState, area: Rect, now: Instant) -> Option<TilingInteraction> {
    let source = if let Some(payload) = egui::DragAndDrop::payload::<SpawnPayload>(ctx) {
        PreviewSource::Spawn(payload.0.clone())
    } else if let Some(payload) = egui::DragAndDrop::payload::<MovePayload>(ctx) {
        PreviewSource::Existing(payload.0)
    } else {
        if state.drag.set_native_inside(false) {
            state.drag.container.handle(ContainerEvent::Leave, DragPayload::Unknown, area.center(), now);
        }
        if !state.drag.synthetic.is_active() && state.layout.preview().is_some() {
            state.layout.cancel_preview();
        }
        return None;
    };
    let pos = ctx.pointer_latest_pos()?;

    if state.layout.preview().map(|p| &p.source) != Some(&source) {
        state.layout.begin_preview(source.clone());
    }
    let payload = match &source {
        PreviewSource::Spawn(title) => DragPayload::Panel(title.clone()),
        PreviewSource::Existing(_) => DragPayload::Unknown,
    };

    let inside = area.contains(pos);
    let was_inside = state.drag.set_native_inside(inside);
    if let Some(event) = container_event(was_inside, inside) {
        state.drag.container.handle(event, payload.clone(), pos, now);
    }
    let target = state.layout.tree().hit_test(area, pos);
    state.layout.update_preview(target);

    if !ctx.input(|i| i.pointer.any_released()) {
        return None;
    }
    egui::DragAndDrop::clear_payload(ctx);
    state.drag.set_native_inside(false);
    if !inside {
        log::debug!("Native drag released outside of the layout");
        state.drag.container.handle(ContainerEvent::Leave, payload, pos, now);
        return Some(TilingInteraction::DragCancelled);
    }

    match source {
        PreviewSource::Spawn(_) => {
            let action = state.drag.container.handle(ContainerEvent::Drop, payload, pos, now)?;
            Some(TilingInteraction::Dropped { action, target })
        }
        PreviewSource::Existing(id) => match target {
            Some(target) => Some(TilingInteraction::MovePanel { id, target }),
            None => Some(TilingInteraction::DragCancelled),
        },
    }
}

/// Files dragged in from the OS. The pointer position is not reported
/// during such drags, so the whole window counts as inside.
fn handle_file_drag(ctx: &egui::Context, state: &mut AppState, area: Rect, now: Instant) -> Option<TilingInteraction> {
    let (hovered, dropped): (Vec<PathBuf>, Vec<PathBuf>) = ctx.input(|i| {
        (
            i.raw.hovered_files.iter().filter_map(|f| f.path.clone()).collect(),
            i.raw.dropped_files.iter().filter_map(|f| f.path.clone()).collect(),
        )
    });
    let pos = ctx.pointer_latest_pos().unwrap_or(area.center());

    let hovering = !hovered.is_empty();
    let was_hovering = state.drag.set_files_hovering(hovering);
    if let Some(event) = container_event(was_hovering, hovering) {
        state.drag.container.handle(event, DragPayload::Files(hovered), pos, now);
    }

    if dropped.is_empty() {
        return None;
    }
    state.drag.set_files_hovering(false);
    let action = state.drag.container.handle(ContainerEvent::Drop, DragPayload::Files(dropped), pos, now)?;
    Some(TilingInteraction::Dropped { action, target: None })
}

/// Pointer-driven drag started from a button grip.
fn handle_synthetic_drag(
    ctx: &egui::Context,
    state: &mut AppState,
    area: Rect,
    now: Instant,
) -> Option<TilingInteraction> {
    let title = state.drag.synthetic.dragged_button_title()?.to_string();
    let pos = ctx.pointer_latest_pos().unwrap_or(area.center());
    ctx.request_repaint();

    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        let outcome = state.drag.escape(&mut state.layout, pos, now);
        log::debug!("Escape during drag: {:?}", outcome);
        return Some(TilingInteraction::DragCancelled);
    }

    if state.layout.preview().is_none() {
        state.layout.begin_preview(PreviewSource::Spawn(title.clone()));
    }
    if let Some(event) = state.drag.synthetic.pointer_moved(pos, area) {
        state.drag.container.handle(event, DragPayload::Panel(title.clone()), pos, now);
    }
    let target = state.layout.tree().hit_test(area, pos);
    state.layout.update_preview(target);

    if !ctx.input(|i| i.pointer.any_released()) {
        return None;
    }
    match state.drag.synthetic.release(pos, area) {
        DragOutcome::Dropped { title, pos } => {
            let action = state.drag.container.handle(ContainerEvent::Drop, DragPayload::Panel(title), pos, now)?;
            Some(TilingInteraction::Dropped { action, target })
        }
        DragOutcome::Cancelled { title } => {
            state.drag.abandon(&mut state.layout, title, pos, now);
            Some(TilingInteraction::DragCancelled)
        }
        DragOutcome::Started | DragOutcome::Ignored => None,
    }
}

// ===== Feedback =====

fn preview_rect(preview: &DragPreview, area: Rect, empty: bool, tabsets: &[(NodeId, Rect)]) -> Option<Rect> {
    match preview.target? {
        DropTarget::Root if empty => Some(area),
        DropTarget::Root => Some(DropZone::Right.preview_rect(area)),
        DropTarget::Tabset { node, zone } => tabsets
            .iter()
            .find(|(id, _)| *id == node)
            .map(|(_, rect)| zone.preview_rect(*rect)),
    }
}

fn paint_drop_feedback(
    ctx: &egui::Context,
    state: &AppState,
    area: Rect,
    tabsets: &[(NodeId, Rect)],
    colors: &ThemeColors,
) {
    let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("tiling_drop_feedback")));
    if state.drag.container.is_highlighted() {
        painter.rect_stroke(area, 0.0, Stroke::new(2.0, colors.drop_highlight), egui::StrokeKind::Inside);
    }
    if let Some(rect) = state
        .layout
        .preview()
        .and_then(|preview| preview_rect(preview, area, state.layout.tree().is_empty(), tabsets))
    {
        painter.rect_filled(rect.shrink(2.0), 2.0, with_alpha(colors.drop_highlight, 60));
    }

    let floating = state
        .drag
        .synthetic
        .dragged_button_title()
        .zip(state.drag.synthetic.tooltip_pos())
        .map(|(title, pos)| (title.to_string(), pos))
        .or_else(|| {
            let payload = egui::DragAndDrop::payload::<SpawnPayload>(ctx)?;
            let pos = ctx.pointer_latest_pos()? + egui::vec2(12.0, 12.0);
            Some((payload.0.clone(), pos))
        });
    if let Some((title, pos)) = floating {
        egui::Area::new(Id::new("panel_drag_tooltip"))
            .order(Order::Tooltip)
            .fixed_pos(pos)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(title);
                });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_events_follow_inside_transitions() {
        assert_eq!(container_event(false, true), Some(ContainerEvent::Enter));
        assert_eq!(container_event(true, true), Some(ContainerEvent::Over));
        assert_eq!(container_event(true, false), Some(ContainerEvent::Leave));
        assert_eq!(container_event(false, false), None);
    }

    #[test]
    fn test_root_preview_on_populated_layout_is_right_half() {
        let area = Rect::from_min_size(Pos2::ZERO, egui::vec2(200.0, 100.0));
        let preview = DragPreview {
            source: PreviewSource::Spawn("X".to_string()),
            target: Some(DropTarget::Root),
        };
        assert_eq!(preview_rect(&preview, area, true, &[]), Some(area));
        let half = preview_rect(&preview, area, false, &[]).unwrap();
        assert_eq!(half.left(), 100.0);

        let untargeted = DragPreview {
            source: PreviewSource::Existing(1),
            target: None,
        };
        assert_eq!(preview_rect(&untargeted, area, false, &[]), None);
    }
}
