//! In-memory trace group data model.
//!
//! A [`TraceGroup`] is one independently loaded trace. It carries the
//! already-decoded series the panels plot: CPU load, die temperature,
//! execution frames (including model operator frames), the model description
//! used for operator sizes, and memory region usage.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Prefix of frames that represent model operator executions.
pub const MODEL_EVENT_NAME: &str = "MODEL";

/// One CPU load measurement, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuLoadSample {
    pub ts: f64,
    #[serde(default)]
    pub cpu: u32,
    pub load: f64,
}

/// One die temperature measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempSample {
    pub ts: f64,
    pub sensor: String,
    pub celsius: f64,
}

/// A named execution span on the call stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSpan {
    pub name: String,
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub depth: u32,
    /// Operator type tag for model operator frames.
    #[serde(default)]
    pub op_type: Option<String>,
    #[serde(default)]
    pub args: FrameArgs,
}

/// Arguments recorded with the begin and end events of a frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameArgs {
    #[serde(default)]
    pub begin: Map<String, Value>,
    #[serde(default)]
    pub end: Map<String, Value>,
}

impl FrameSpan {
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// True for frames named `MODEL::<instance>`.
    pub fn is_op(&self) -> bool {
        is_op_frame_name(&self.name)
    }
}

/// Returns true if `name` is a model operator frame name.
pub fn is_op_frame_name(name: &str) -> bool {
    name.strip_prefix(MODEL_EVENT_NAME)
        .is_some_and(|rest| rest.starts_with("::"))
}

/// Strips the `MODEL::` prefix so operators can be matched across panels.
pub fn normalize_op_name(name: &str) -> &str {
    name.strip_prefix(MODEL_EVENT_NAME)
        .and_then(|rest| rest.strip_prefix("::"))
        .unwrap_or(name)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorInfo {
    pub index: usize,
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub shape: Vec<usize>,
    #[serde(default)]
    pub dtype: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelIo {
    pub name: String,
    #[serde(default)]
    pub name_long: Option<String>,
}

impl ModelIo {
    pub fn tensor_name(&self) -> &str {
        self.name_long.as_deref().unwrap_or(&self.name)
    }
}

/// Operator entry of the model graph; `op_name` is the operator type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOp {
    pub op_name: String,
    #[serde(default)]
    pub inputs: Vec<usize>,
    #[serde(default)]
    pub outputs: Vec<usize>,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

/// Static model description recorded alongside the trace.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(default)]
    pub tensors: Vec<TensorInfo>,
    #[serde(default)]
    pub inputs: Vec<ModelIo>,
    #[serde(default)]
    pub outputs: Vec<ModelIo>,
    #[serde(default)]
    pub ops: Vec<ModelOp>,
}

/// Memory region usage at one point in time, in bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySample {
    pub ts: f64,
    pub region: String,
    pub used: u64,
    pub assigned: u64,
}

/// One loaded trace.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TraceGroup {
    pub name: String,
    #[serde(default)]
    pub cpu_load: Vec<CpuLoadSample>,
    #[serde(default)]
    pub die_temp: Vec<TempSample>,
    #[serde(default)]
    pub frames: Vec<FrameSpan>,
    #[serde(default)]
    pub model: Option<ModelInfo>,
    #[serde(default)]
    pub memory: Vec<MemorySample>,
}

impl TraceGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Returns the (start, end) time covered by the frames, if any.
    pub fn time_extent(&self) -> Option<(f64, f64)> {
        let start = self.frames.iter().map(|f| f.start).reduce(f64::min)?;
        let end = self.frames.iter().map(|f| f.end).reduce(f64::max)?;
        Some((start, end))
    }

    /// Frames in call order: by start time, parents before children.
    pub fn frames_in_call_order(&self) -> Vec<&FrameSpan> {
        let mut frames: Vec<&FrameSpan> = self.frames.iter().collect();
        frames.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.depth.cmp(&b.depth)));
        frames
    }

    /// Self time of every frame (duration minus direct children), in call order.
    pub fn self_times(&self) -> Vec<(&FrameSpan, f64)> {
        let frames = self.frames_in_call_order();
        let mut child_total = vec![0.0; frames.len()];
        let mut stack: Vec<usize> = Vec::new();

        for (i, frame) in frames.iter().enumerate() {
            while let Some(&top) = stack.last() {
                if frames[top].depth >= frame.depth || frames[top].end <= frame.start {
                    stack.pop();
                } else {
                    break;
                }
            }
            if let Some(&parent) = stack.last() {
                if frames[parent].depth + 1 == frame.depth {
                    child_total[parent] += frame.duration();
                }
            }
            stack.push(i);
        }

        frames
            .into_iter()
            .zip(child_total)
            .map(|(frame, children)| (frame, (frame.duration() - children).max(0.0)))
            .collect()
    }
}
