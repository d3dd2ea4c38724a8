//! Data providers of the built-in plot panels.
//!
//! Each provider maps one group to the dataset of its panel, or `None` when
//! the group carries nothing the panel can show. Providers never mutate.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::chart::DataPoint;
use crate::panels::{PanelData, Series};
use crate::trace::layer::op_instances;
use crate::trace::{normalize_op_name, GroupRegistry};

fn round_ms(ts: f64) -> f64 {
    (ts * 1000.0).round() / 1000.0
}

fn ascending_bars(label: &str, mut values: Vec<(String, f64)>, unit: &'static str) -> Option<PanelData> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.1.total_cmp(&b.1));
    let points = values
        .into_iter()
        .enumerate()
        .map(|(i, (name, value))| DataPoint::named(value, i as f64, name))
        .collect();
    Some(PanelData::bars(
        Series {
            label: label.to_string(),
            points,
        },
        unit,
    ))
}

/// Load of every CPU over time, one series per CPU.
pub fn cpu_load(groups: &GroupRegistry, name: &str) -> Option<PanelData> {
    let group = groups.get(name)?;
    if group.cpu_load.is_empty() {
        return None;
    }
    let mut per_cpu: BTreeMap<u32, Vec<DataPoint>> = BTreeMap::new();
    for sample in &group.cpu_load {
        per_cpu
            .entry(sample.cpu)
            .or_default()
            .push(DataPoint::new(round_ms(sample.ts), sample.load));
    }
    let series = per_cpu
        .into_iter()
        .map(|(cpu, points)| Series {
            label: format!("CPU {}", cpu),
            points,
        })
        .collect();
    Some(PanelData::lines(series, "%", Some((0.0, 100.0))))
}

/// Die temperature over time, one series per sensor.
pub fn die_temperature(groups: &GroupRegistry, name: &str) -> Option<PanelData> {
    let group = groups.get(name)?;
    if group.die_temp.is_empty() {
        return None;
    }
    let mut per_sensor: BTreeMap<&str, Vec<DataPoint>> = BTreeMap::new();
    for sample in &group.die_temp {
        per_sensor
            .entry(sample.sensor.as_str())
            .or_default()
            .push(DataPoint::new(round_ms(sample.ts), sample.celsius));
    }
    let series = per_sensor
        .into_iter()
        .map(|(sensor, points)| Series {
            label: sensor.to_string(),
            points,
        })
        .collect();
    Some(PanelData::lines(series, "°C", None))
}

/// Total self time of every operator instance, ascending.
pub fn operator_execution(groups: &GroupRegistry, name: &str) -> Option<PanelData> {
    let group = groups.get(name)?;
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for (frame, self_time) in group.self_times() {
        if frame.is_op() {
            *totals.entry(normalize_op_name(&frame.name)).or_default() += self_time;
        }
    }
    let values = totals
        .into_iter()
        .map(|(op, total)| (op.to_string(), total))
        .collect();
    ascending_bars("Execution time", values, "ms")
}

/// Total self time per operator type, ascending.
pub fn operator_type_execution(groups: &GroupRegistry, name: &str) -> Option<PanelData> {
    let group = groups.get(name)?;
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for (frame, self_time) in group.self_times() {
        if let (true, Some(op_type)) = (frame.is_op(), frame.op_type.as_deref()) {
            *totals.entry(op_type).or_default() += self_time;
        }
    }
    let values = totals
        .into_iter()
        .map(|(op_type, total)| (op_type.to_string(), total))
        .collect();
    ascending_bars("Execution time", values, "ms")
}

/// Weight size of every operator instance, ascending.
///
/// Model inputs, model outputs and operator outputs are activations and do
/// not count; each weight tensor counts once.
pub fn operator_size(groups: &GroupRegistry, name: &str) -> Option<PanelData> {
    let group = groups.get(name)?;
    let model = group.model.as_ref()?;
    if !model.tensors.iter().any(|t| t.size.is_some()) {
        return None;
    }

    let size_of: HashMap<usize, u64> = model
        .tensors
        .iter()
        .filter_map(|t| t.size.map(|size| (t.index, size)))
        .collect();
    let index_of: HashMap<&str, usize> = model
        .tensors
        .iter()
        .map(|t| (t.name.as_str(), t.index))
        .collect();

    let mut activations: HashSet<usize> = model
        .inputs
        .iter()
        .chain(&model.outputs)
        .filter_map(|io| index_of.get(io.tensor_name()).copied())
        .collect();
    activations.extend(model.ops.iter().flat_map(|op| op.outputs.iter().copied()));

    let mut counted: HashSet<usize> = HashSet::new();
    let values: Vec<(String, f64)> = op_instances(group)
        .into_iter()
        .filter_map(|(frame, op)| {
            let size: u64 = op
                .inputs
                .iter()
                .filter(|i| !activations.contains(*i) && counted.insert(**i))
                .filter_map(|i| size_of.get(i))
                .sum();
            (size > 0).then(|| (normalize_op_name(&frame.name).to_string(), size as f64))
        })
        .collect();
    ascending_bars("Size", values, "B")
}

/// Percentage of assigned memory in use, one series per region.
pub fn memory_usage(groups: &GroupRegistry, name: &str) -> Option<PanelData> {
    let group = groups.get(name)?;
    let mut per_region: BTreeMap<&str, Vec<DataPoint>> = BTreeMap::new();
    for sample in group.memory.iter().filter(|s| s.assigned > 0) {
        let percent = sample.used as f64 / sample.assigned as f64 * 100.0;
        per_region
            .entry(sample.region.as_str())
            .or_default()
            .push(DataPoint::new(round_ms(sample.ts), percent));
    }
    if per_region.is_empty() {
        return None;
    }
    let series = per_region
        .into_iter()
        .map(|(region, points)| Series {
            label: region.to_string(),
            points,
        })
        .collect();
    Some(PanelData::lines(series, "%", Some((0.0, 100.0))))
}
