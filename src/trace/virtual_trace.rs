//! Synthetic trace groups for demos and tests.
//!
//! Generates a deterministic group (for a given seed) that exercises every
//! panel: two CPUs of load samples, two die sensors, repeated inference runs
//! made of model operator frames, a model description with tensor sizes and
//! memory region usage.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map, Value};

use crate::trace::{
    CpuLoadSample, FrameArgs, FrameSpan, MemorySample, ModelInfo, ModelIo, ModelOp, TempSample, TensorInfo,
    TraceGroup, MODEL_EVENT_NAME,
};

const DEFAULT_INFERENCES: usize = 4;
const SAMPLE_PERIOD_MS: f64 = 5.0;

/// Operator types of the generated model, in graph order.
const OP_TYPES: &[&str] = &[
    "CONV_2D",
    "DEPTHWISE_CONV_2D",
    "CONV_2D",
    "AVERAGE_POOL_2D",
    "FULLY_CONNECTED",
    "SOFTMAX",
];

const MEMORY_REGIONS: &[(&str, u64)] = &[("SRAM", 256 * 1024), ("DTCM", 128 * 1024)];

pub struct VirtualTraceGenerator {
    inferences: usize,
    seed: u64,
}

impl Default for VirtualTraceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualTraceGenerator {
    pub fn new() -> Self {
        Self {
            inferences: DEFAULT_INFERENCES,
            seed: 42,
        }
    }

    pub fn with_config(inferences: usize, seed: u64) -> Self {
        Self {
            inferences: inferences.max(1),
            seed,
        }
    }

    pub fn generate(&self, name: &str) -> TraceGroup {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut group = TraceGroup::new(name);

        let mut t = 0.0;
        for run in 0..self.inferences {
            let run_start = t;
            let mut op_frames = Vec::with_capacity(OP_TYPES.len());
            t += rng.gen_range(0.5..2.0);
            for (i, op_type) in OP_TYPES.iter().enumerate() {
                let duration = rng.gen_range(2.0..12.0);
                let cycles = rng.gen_range(1_000..50_000u64);
                op_frames.push(FrameSpan {
                    name: format!("{}::{}_{}", MODEL_EVENT_NAME, op_type.to_lowercase(), i),
                    start: t,
                    end: t + duration,
                    depth: 1,
                    op_type: Some(op_type.to_string()),
                    args: FrameArgs {
                        begin: object(json!({"op_idx": i, "subgraph_idx": 0, "cycles": 0})),
                        end: object(json!({"cycles": cycles})),
                    },
                });
                t += duration + rng.gen_range(0.1..0.8);
            }
            group.frames.push(FrameSpan {
                name: format!("inference_{}", run),
                start: run_start,
                end: t,
                depth: 0,
                op_type: None,
                args: FrameArgs::default(),
            });
            group.frames.extend(op_frames);
            t += rng.gen_range(5.0..15.0);
        }
        let end = t;

        let mut ts = 0.0;
        while ts <= end {
            for cpu in 0..2 {
                group.cpu_load.push(CpuLoadSample {
                    ts,
                    cpu,
                    load: rng.gen_range(10.0..95.0),
                });
            }
            for (sensor, base) in [("die0", 45.0), ("die1", 52.0)] {
                group.die_temp.push(TempSample {
                    ts,
                    sensor: sensor.to_string(),
                    celsius: base + rng.gen_range(-3.0..8.0),
                });
            }
            for &(region, assigned) in MEMORY_REGIONS {
                group.memory.push(MemorySample {
                    ts,
                    region: region.to_string(),
                    used: rng.gen_range(assigned / 8..assigned),
                    assigned,
                });
            }
            ts += SAMPLE_PERIOD_MS;
        }

        group.model = Some(generate_model(&mut rng));
        group
    }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Chain model: tensor `2i` is op `i`'s weight, tensor `2i+1` its output.
fn generate_model(rng: &mut StdRng) -> ModelInfo {
    let mut tensors = vec![TensorInfo {
        index: 0,
        name: "input".to_string(),
        size: Some(3072),
        shape: vec![1, 32, 32, 3],
        dtype: Some("int8".to_string()),
    }];
    let mut ops = Vec::with_capacity(OP_TYPES.len());
    let mut previous_output = 0;

    for (i, op_type) in OP_TYPES.iter().enumerate() {
        let weight = tensors.len();
        tensors.push(TensorInfo {
            index: weight,
            name: format!("weights_{}", i),
            size: Some(rng.gen_range(256..16384)),
            shape: vec![8, 3, 3, rng.gen_range(1..16)],
            dtype: Some("int8".to_string()),
        });
        let output = tensors.len();
        tensors.push(TensorInfo {
            index: output,
            name: format!("activation_{}", i),
            size: Some(rng.gen_range(512..4096)),
            shape: vec![1, 16, 16, 8],
            dtype: Some("int8".to_string()),
        });
        ops.push(ModelOp {
            op_name: op_type.to_string(),
            inputs: vec![previous_output, weight],
            outputs: vec![output],
            parameters: object(json!({"fused_activation_function": "RELU", "stride": [1, 1]})),
        });
        previous_output = output;
    }

    let output_name = tensors[previous_output].name.clone();
    ModelInfo {
        tensors,
        inputs: vec![ModelIo {
            name: "input".to_string(),
            name_long: None,
        }],
        outputs: vec![ModelIo {
            name: output_name,
            name_long: None,
        }],
        ops,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_deterministic() {
        let a = VirtualTraceGenerator::with_config(2, 7).generate("a");
        let b = VirtualTraceGenerator::with_config(2, 7).generate("a");
        assert_eq!(a, b);
    }

    #[test]
    fn test_generated_group_covers_all_series() {
        let group = VirtualTraceGenerator::new().generate("demo");
        assert!(!group.cpu_load.is_empty());
        assert!(!group.die_temp.is_empty());
        assert!(!group.memory.is_empty());
        assert_eq!(
            group.frames.iter().filter(|f| f.is_op()).count(),
            DEFAULT_INFERENCES * OP_TYPES.len()
        );
        let model = group.model.as_ref().expect("model");
        assert_eq!(model.ops.len(), OP_TYPES.len());
    }

    #[test]
    fn test_first_run_resolves_to_layers() {
        let group = VirtualTraceGenerator::with_config(1, 3).generate("demo");
        for frame in group.frames.iter().filter(|f| f.is_op()) {
            let layer = crate::trace::layer::layer_info(&group, frame).expect("layer");
            assert_eq!(Some(layer.op_type), frame.op_type.as_deref());
            assert_eq!(layer.inputs.len(), 2);
            assert!(!layer.parameters.is_empty());
        }
    }
}
