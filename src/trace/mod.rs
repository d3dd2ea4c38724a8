//! Trace groups: data model, registry, layer lookup, synthetic generation
//! and file I/O.

mod groups;
pub mod io;
pub mod layer;
mod model;
mod virtual_trace;

pub use groups::GroupRegistry;
pub use model::{
    is_op_frame_name, normalize_op_name, CpuLoadSample, FrameArgs, FrameSpan, MemorySample, ModelInfo,
    ModelIo, ModelOp, TempSample, TensorInfo, TraceGroup, MODEL_EVENT_NAME,
};
pub use virtual_trace::VirtualTraceGenerator;
