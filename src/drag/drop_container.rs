//! The layout area as a drop target.
//!
//! Native drags (panel payloads, hovered OS files) and synthetic drags feed
//! the same container events here. The container only highlights for
//! payloads it understands, keeps the highlight through brief leave events
//! (pointer crossing child tiles) and always clears it on drop.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use egui::Pos2;

/// Delay before a leave event removes the highlight.
pub const LEAVE_DEBOUNCE: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragPayload {
    /// Title of the panel whose button is dragged.
    Panel(String),
    Files(Vec<PathBuf>),
    Unknown,
}

impl DragPayload {
    pub fn is_recognized(&self) -> bool {
        match self {
            DragPayload::Panel(_) => true,
            DragPayload::Files(files) => !files.is_empty(),
            DragPayload::Unknown => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerEvent {
    Enter,
    Over,
    Leave,
    Drop,
}

/// What a drop asks the viewer to do.
#[derive(Debug, Clone, PartialEq)]
pub enum DropAction {
    SpawnPanel { title: String, pos: Pos2 },
    LoadFiles(Vec<PathBuf>),
}

#[derive(Debug, Default)]
pub struct DropContainer {
    highlighted: bool,
    leave_deadline: Option<Instant>,
    drop_in_progress: bool,
}

impl DropContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// True between a drop and [`DropContainer::finish_drop`].
    pub fn is_dropping(&self) -> bool {
        self.drop_in_progress
    }

    pub fn handle(&mut self, event: ContainerEvent, payload: DragPayload, pos: Pos2, now: Instant) -> Option<DropAction> {
        match event {
            ContainerEvent::Enter | ContainerEvent::Over => {
                if payload.is_recognized() {
                    self.highlighted = true;
                    self.leave_deadline = None;
                }
                None
            }
            ContainerEvent::Leave => {
                if self.highlighted {
                    self.leave_deadline = Some(now + LEAVE_DEBOUNCE);
                }
                None
            }
            ContainerEvent::Drop => {
                self.highlighted = false;
                self.leave_deadline = None;
                let action = match payload {
                    DragPayload::Panel(title) => Some(DropAction::SpawnPanel { title, pos }),
                    DragPayload::Files(files) if !files.is_empty() => Some(DropAction::LoadFiles(files)),
                    _ => {
                        log::debug!("Ignoring drop of an unrecognized payload");
                        None
                    }
                };
                self.drop_in_progress = action.is_some();
                action
            }
        }
    }

    /// Expires a pending leave. Returns true if the highlight was removed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.leave_deadline {
            Some(deadline) if now >= deadline => {
                self.leave_deadline = None;
                self.highlighted = false;
                true
            }
            _ => false,
        }
    }

    /// Time until the pending leave expires, for scheduling a repaint.
    pub fn pending_leave(&self, now: Instant) -> Option<Duration> {
        self.leave_deadline.map(|d| d.saturating_duration_since(now))
    }

    pub fn finish_drop(&mut self) {
        self.drop_in_progress = false;
    }
}
