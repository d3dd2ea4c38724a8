//! Model layer behind an operator frame.
//!
//! Operator frames only carry an instance name and a type tag. The layer they
//! execute is found by pairing the model's operators, in graph order, with
//! the operator frames of the group in call order.

use serde_json::Value;

use crate::trace::{FrameSpan, ModelOp, TensorInfo, TraceGroup};

/// Frame arguments that are bookkeeping of the runtime, not of the layer.
const HIDDEN_ARGS: &[&str] = &["subgraph_idx", "op_idx", "tag", "runtime", "thread_id", "tag_len", "cpu_id"];

/// The layer an operator frame executed.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerInfo<'a> {
    pub op_type: &'a str,
    pub inputs: Vec<&'a TensorInfo>,
    pub outputs: Vec<&'a TensorInfo>,
    /// Parameter name and display value, in model order.
    pub parameters: Vec<(&'a str, String)>,
}

/// One row of the event argument table.
#[derive(Debug, Clone, PartialEq)]
pub struct EventArg<'a> {
    pub key: &'a str,
    pub start: String,
    pub end: Option<String>,
}

/// Pairs model operators with their executed instances.
///
/// Operators are matched in order against operator frames of the same type;
/// an operator without a later matching frame is skipped.
pub fn op_instances(group: &TraceGroup) -> Vec<(&FrameSpan, &ModelOp)> {
    let Some(model) = group.model.as_ref() else {
        return Vec::new();
    };
    let frames: Vec<&FrameSpan> = group
        .frames_in_call_order()
        .into_iter()
        .filter(|f| f.is_op())
        .collect();

    let mut offset = 0;
    let mut matched = Vec::new();
    for op in &model.ops {
        let Some(rest) = frames.get(offset..) else {
            break;
        };
        let Some(pos) = rest
            .iter()
            .position(|f| f.op_type.as_deref() == Some(op.op_name.as_str()))
        else {
            continue;
        };
        matched.push((rest[pos], op));
        offset += pos + 1;
    }
    matched
}

/// Resolves `frame` to the layer it executed, or `None` for frames that are
/// not operators of `group`'s model.
pub fn layer_info<'a>(group: &'a TraceGroup, frame: &FrameSpan) -> Option<LayerInfo<'a>> {
    let model = group.model.as_ref()?;
    let (_, op) = op_instances(group)
        .into_iter()
        .find(|(candidate, _)| *candidate == frame)?;

    let tensor = |index: &usize| model.tensors.iter().find(|t| t.index == *index);
    Some(LayerInfo {
        op_type: &op.op_name,
        inputs: op.inputs.iter().filter_map(tensor).collect(),
        outputs: op.outputs.iter().filter_map(tensor).collect(),
        parameters: op
            .parameters
            .iter()
            .map(|(name, value)| (name.as_str(), display_value(value)))
            .collect(),
    })
}

/// Arguments of the frame's begin event with their end values, without the
/// runtime bookkeeping keys.
pub fn event_args(frame: &FrameSpan) -> Vec<EventArg<'_>> {
    frame
        .args
        .begin
        .iter()
        .filter(|(key, _)| !HIDDEN_ARGS.contains(&key.as_str()))
        .map(|(key, value)| EventArg {
            key: key.as_str(),
            start: display_value(value),
            end: frame.args.end.get(key).map(display_value),
        })
        .collect()
}

/// Strings as they are, everything else as JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl TensorInfo {
    /// `name: [d0, d1] of dtype`.
    pub fn describe(&self) -> String {
        let shape = self
            .shape
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}: [{}] of {}", self.name, shape, self.dtype.as_deref().unwrap_or("?"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{FrameArgs, ModelInfo};
    use serde_json::json;

    fn op_frame(name: &str, op_type: &str, start: f64) -> FrameSpan {
        FrameSpan {
            name: format!("MODEL::{}", name),
            start,
            end: start + 1.0,
            depth: 1,
            op_type: Some(op_type.to_string()),
            args: FrameArgs::default(),
        }
    }

    fn tensor(index: usize, name: &str, shape: Vec<usize>) -> TensorInfo {
        TensorInfo {
            index,
            name: name.to_string(),
            size: None,
            shape,
            dtype: Some("int8".to_string()),
        }
    }

    fn group() -> TraceGroup {
        let mut group = TraceGroup::new("g");
        group.frames = vec![op_frame("pool_1", "POOL", 2.0), op_frame("conv_0", "CONV", 0.0)];
        let parameters = json!({"padding": "SAME", "stride": [2, 2]});
        group.model = Some(ModelInfo {
            tensors: vec![
                tensor(0, "input", vec![1, 8, 8, 3]),
                tensor(1, "conv/weights", vec![4, 3, 3, 3]),
                tensor(2, "conv/out", vec![1, 4, 4, 4]),
                tensor(3, "pool/out", vec![1, 2, 2, 4]),
            ],
            inputs: vec![],
            outputs: vec![],
            ops: vec![
                ModelOp {
                    op_name: "CONV".into(),
                    inputs: vec![0, 1],
                    outputs: vec![2],
                    parameters: parameters.as_object().cloned().unwrap_or_default(),
                },
                ModelOp {
                    op_name: "POOL".into(),
                    inputs: vec![2],
                    outputs: vec![3],
                    parameters: Default::default(),
                },
            ],
        });
        group
    }

    #[test]
    fn test_op_instances_follow_call_order() {
        let group = group();
        let names: Vec<&str> = op_instances(&group)
            .into_iter()
            .map(|(frame, op)| {
                assert_eq!(frame.op_type.as_deref(), Some(op.op_name.as_str()));
                frame.name.as_str()
            })
            .collect();
        assert_eq!(names, ["MODEL::conv_0", "MODEL::pool_1"]);
    }

    #[test]
    fn test_layer_info_lists_tensors_and_parameters() {
        let group = group();
        let selected = op_frame("conv_0", "CONV", 0.0);
        let layer = layer_info(&group, &selected).unwrap();

        assert_eq!(layer.op_type, "CONV");
        let inputs: Vec<String> = layer.inputs.iter().map(|t| t.describe()).collect();
        assert_eq!(inputs, ["input: [1, 8, 8, 3] of int8", "conv/weights: [4, 3, 3, 3] of int8"]);
        assert_eq!(layer.outputs[0].name, "conv/out");
        assert_eq!(
            layer.parameters,
            vec![("padding", "SAME".to_string()), ("stride", "[2,2]".to_string())]
        );

        let pool = layer_info(&group, &op_frame("pool_1", "POOL", 2.0)).unwrap();
        assert!(pool.parameters.is_empty());
        assert_eq!(pool.inputs[0].name, "conv/out");
    }

    #[test]
    fn test_layer_info_is_none_for_non_operator_frames() {
        let group = group();
        let mut inference = op_frame("conv_0", "CONV", 0.0);
        inference.name = "inference_0".to_string();
        assert_eq!(layer_info(&group, &inference), None);
        assert_eq!(layer_info(&TraceGroup::new("empty"), &op_frame("conv_0", "CONV", 0.0)), None);
    }

    #[test]
    fn test_event_args_hide_runtime_keys() {
        let mut frame = op_frame("conv_0", "CONV", 0.0);
        frame.args.begin = json!({"op_idx": 0, "cycles": 120, "mode": "fast"})
            .as_object()
            .cloned()
            .unwrap_or_default();
        frame.args.end = json!({"cycles": 980}).as_object().cloned().unwrap_or_default();

        let args = event_args(&frame);
        assert_eq!(args.len(), 2);
        assert_eq!(args[0], EventArg { key: "cycles", start: "120".into(), end: Some("980".into()) });
        assert_eq!(args[1], EventArg { key: "mode", start: "fast".into(), end: None });
    }
}
