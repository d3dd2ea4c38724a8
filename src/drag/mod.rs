//! Panel and file drag-and-drop.

mod drop_container;
mod listeners;
mod session;

pub use drop_container::{ContainerEvent, DragPayload, DropAction, DropContainer, LEAVE_DEBOUNCE};
pub use listeners::{ListenerId, ListenerKind, ListenerRegistry};
pub use session::{DragOutcome, DragPhase, DragSession, SyntheticDrag};
