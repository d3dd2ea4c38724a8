//! Data handed from a descriptor's provider to its panel.

use std::rc::Rc;

use crate::chart::{ChartModel, DataPoint, PointMetric};
use crate::trace::GroupRegistry;

/// Pure, synchronous provider: group name to panel data, or `None` when the
/// group has nothing this panel can show.
pub type DataProvider = Rc<dyn Fn(&GroupRegistry, &str) -> Option<PanelData>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotKind {
    /// Time series; x is a timestamp in milliseconds.
    Lines,
    /// Horizontal bars; x is the value, y the bar index.
    Bars,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<DataPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelData {
    pub kind: PlotKind,
    pub series: Vec<Series>,
    pub unit: &'static str,
    pub y_domain: Option<(f64, f64)>,
}

impl PanelData {
    pub fn lines(series: Vec<Series>, unit: &'static str, y_domain: Option<(f64, f64)>) -> Self {
        Self {
            kind: PlotKind::Lines,
            series,
            unit,
            y_domain,
        }
    }

    pub fn bars(series: Series, unit: &'static str) -> Self {
        Self {
            kind: PlotKind::Bars,
            series: vec![series],
            unit,
            y_domain: None,
        }
    }

    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }

    /// Combines the datasets of several groups into one plot.
    ///
    /// Series labels are prefixed with the group name when more than one
    /// group contributes. Returns `None` for an empty input.
    pub fn merge(per_group: Vec<(String, PanelData)>) -> Option<PanelData> {
        let prefix = per_group.len() > 1;
        let mut iter = per_group.into_iter();
        let (first_group, mut merged) = iter.next()?;
        if prefix {
            for series in &mut merged.series {
                series.label = format!("{}: {}", first_group, series.label);
            }
        }
        for (group, data) in iter {
            merged.series.extend(data.series.into_iter().map(|mut s| {
                s.label = format!("{}: {}", group, s.label);
                s
            }));
        }
        Some(merged)
    }

    /// Builds the chart model the viewer paints and links.
    pub fn to_chart(&self) -> ChartModel {
        let metric = match self.kind {
            PlotKind::Lines => PointMetric::Normalized,
            PlotKind::Bars => PointMetric::Vertical,
        };
        ChartModel::new(
            self.series.iter().map(|s| s.points.clone()).collect(),
            self.series.iter().map(|s| s.label.clone()).collect(),
            metric,
            self.y_domain,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(label: &str) -> PanelData {
        PanelData::lines(
            vec![Series {
                label: label.to_string(),
                points: vec![DataPoint::new(0.0, 1.0)],
            }],
            "%",
            Some((0.0, 100.0)),
        )
    }

    #[test]
    fn test_merge_single_group_keeps_labels() {
        let merged = PanelData::merge(vec![("g1".into(), data("cpu0"))]).unwrap();
        assert_eq!(merged.series[0].label, "cpu0");
    }

    #[test]
    fn test_merge_prefixes_group_names() {
        let merged = PanelData::merge(vec![("g1".into(), data("cpu0")), ("g2".into(), data("cpu0"))])
            .unwrap();
        let labels: Vec<_> = merged.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["g1: cpu0", "g2: cpu0"]);
        assert_eq!(merged.point_count(), 2);
        assert!(PanelData::merge(vec![]).is_none());
    }

    #[test]
    fn test_chart_uses_fixed_domain() {
        let chart = data("cpu0").to_chart();
        assert_eq!(chart.y_domain(), (0.0, 100.0));
        assert_eq!(chart.labels(), &["cpu0".to_string()]);
    }
}
