//! Panel descriptors, their registry, live instances and data providers.

pub mod builtin;
mod data;
mod descriptor;
mod instance;
pub mod providers;
mod registry;

pub use data::{DataProvider, PanelData, PlotKind, Series};
pub use descriptor::{ButtonState, PanelDescriptor, PanelKind};
pub use instance::{GroupSelection, InstanceId, PanelInstance};
pub use registry::PanelRegistry;
