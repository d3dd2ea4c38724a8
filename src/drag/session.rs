//! Pointer-driven drag of a panel button.
//!
//! Used where native drag-and-drop is unreliable: pressing a button's grip
//! starts a session, a tooltip follows the pointer, container enter/over/leave
//! events are synthesized from pointer motion, and releasing the pointer
//! drops (inside the container) or cancels (outside). Escape cancels.
//!
//! State machine: `Idle -> Dragging -> {Committing | Cancelling} -> Idle`.
//! Every exit path clears the session and removes the listeners it added.

use egui::{Pos2, Rect, Vec2};

use crate::drag::{ContainerEvent, ListenerId, ListenerKind, ListenerRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging,
    Committing,
    Cancelling,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub title: String,
    pub pointer_down: Pos2,
    pub grab_offset: Vec2,
    pub pointer: Pos2,
    pub inside_container: bool,
}

/// Result of feeding an input to the drag.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    Started,
    /// Pointer released inside the container; spawn `title` at `pos`.
    Dropped { title: String, pos: Pos2 },
    Cancelled { title: String },
    Ignored,
}

#[derive(Debug, Default)]
pub struct SyntheticDrag {
    phase: DragPhase,
    session: Option<DragSession>,
    listeners: ListenerRegistry,
    session_listeners: Vec<ListenerId>,
}

impl SyntheticDrag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn dragged_button_title(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.title.as_str())
    }

    /// Top-left corner of the floating tooltip, keeping the grab offset.
    pub fn tooltip_pos(&self) -> Option<Pos2> {
        self.session.as_ref().map(|s| s.pointer - s.grab_offset)
    }

    /// Grip of the button of `title` pressed at `pointer`. `grabbed` is the
    /// rect of the pressed widget; the tooltip keeps the pointer at the same
    /// point relative to it.
    ///
    /// Pressing again while a session is active ends it instead.
    pub fn begin(&mut self, title: &str, pointer: Pos2, grabbed: Rect) -> DragOutcome {
        if self.session.is_some() {
            log::debug!("Drag already in progress, toggling it off");
            return self.finish(DragPhase::Cancelling);
        }

        for kind in [ListenerKind::PointerMove, ListenerKind::PointerRelease, ListenerKind::KeyDown] {
            let id = self.listeners.add(kind);
            self.session_listeners.push(id);
        }
        self.session = Some(DragSession {
            title: title.to_string(),
            pointer_down: pointer,
            grab_offset: pointer - grabbed.min,
            pointer,
            inside_container: false,
        });
        self.phase = DragPhase::Dragging;
        log::debug!("Started dragging '{}'", title);
        DragOutcome::Started
    }

    /// Pointer moved; returns the container event this motion produces.
    pub fn pointer_moved(&mut self, pos: Pos2, container: Rect) -> Option<ContainerEvent> {
        if self.phase != DragPhase::Dragging {
            return None;
        }
        let session = self.session.as_mut()?;
        session.pointer = pos;
        let inside = container.contains(pos);
        let was_inside = std::mem::replace(&mut session.inside_container, inside);
        match (was_inside, inside) {
            (false, true) => Some(ContainerEvent::Enter),
            (true, true) => Some(ContainerEvent::Over),
            (true, false) => Some(ContainerEvent::Leave),
            (false, false) => None,
        }
    }

    /// Pointer released at `pos`: drop inside `container`, cancel outside.
    pub fn release(&mut self, pos: Pos2, container: Rect) -> DragOutcome {
        if self.phase != DragPhase::Dragging {
            return DragOutcome::Ignored;
        }
        if container.contains(pos) {
            if let Some(session) = self.session.as_mut() {
                session.pointer = pos;
            }
            self.finish(DragPhase::Committing)
        } else {
            log::debug!("Drop outside of the layout, cancelling");
            self.finish(DragPhase::Cancelling)
        }
    }

    pub fn key_escape(&mut self) -> DragOutcome {
        if self.phase != DragPhase::Dragging {
            return DragOutcome::Ignored;
        }
        self.finish(DragPhase::Cancelling)
    }

    fn finish(&mut self, phase: DragPhase) -> DragOutcome {
        self.phase = phase;
        for id in self.session_listeners.drain(..) {
            self.listeners.remove(id);
        }
        let session = self.session.take();
        self.phase = DragPhase::Idle;

        match (phase, session) {
            (DragPhase::Committing, Some(session)) => DragOutcome::Dropped {
                title: session.title,
                pos: session.pointer,
            },
            (_, Some(session)) => DragOutcome::Cancelled { title: session.title },
            (_, None) => DragOutcome::Ignored,
        }
    }
}
