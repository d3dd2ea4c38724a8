pub mod chart;
pub mod drag;
pub mod error;
pub mod host;
pub mod layout;
pub mod observable;
pub mod panels;
pub mod sync;
pub mod theme;
pub mod trace;

// Export the panel subsystem
pub use layout::{DropTarget, DropZone, LayoutController, LayoutSnapshot, Placement};
pub use panels::{
    ButtonState, GroupSelection, InstanceId, PanelData, PanelDescriptor, PanelInstance, PanelKind, PanelRegistry,
};

// Export synchronization
pub use observable::{Observable, Subscription, SubscriptionId};
pub use sync::{ChartMount, FrameRef, LinkMode, SyncBus, TimestampHover};

// Export trace data
pub use trace::{GroupRegistry, TraceGroup, VirtualTraceGenerator};

pub use error::RegistryError;
pub use host::{HostViewer, SelectedNode};
pub use theme::{Theme, ThemeColors, ThemeManager};
