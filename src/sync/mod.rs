mod bus;
pub mod linking;
mod mount;

pub use bus::{FrameRef, SyncBus, TimestampHover};
pub use mount::{ChartMount, LinkMode};
