//! Hover, timestamp and selection propagation between plots.
//!
//! Publishing functions run in the panel under the pointer; resolving
//! functions run in every subscribed panel when the shared value changes.
//! A panel that cannot resolve a shared identity simply shows no annotation.

use std::cell::RefCell;

use crate::chart::{ChartModel, DataPoint};
use crate::observable::SubscriptionId;
use crate::sync::{FrameRef, SyncBus, TimestampHover};
use crate::trace::normalize_op_name;

/// Pointer moved over (or left) a frame-linked plot.
///
/// The plot annotates the nearest point locally. When the plot shows the
/// active profile it also publishes the point's normalized name to
/// `hovered_frame`, skipping its own subscription `own`.
pub fn publish_frame_hover(
    chart: &RefCell<ChartModel>,
    bus: &SyncBus,
    linked: bool,
    pointer: Option<(f64, f64)>,
    own: Option<SubscriptionId>,
) {
    let closest = {
        let mut chart = chart.borrow_mut();
        chart.pop_annotation();
        match pointer {
            Some((x, y)) => {
                let closest = chart.find_closest_point(x, y).cloned();
                chart.add_annotation(closest.clone());
                closest
            }
            None => {
                chart.redraw();
                None
            }
        }
    };

    if !linked {
        return;
    }
    if pointer.is_none() {
        log::debug!("Missing coordinates, clearing hovered frame");
    }

    let frame = closest
        .and_then(|point| point.name)
        .map(|name| FrameRef::new(normalize_op_name(&name)));
    match own {
        Some(id) => bus.hovered_frame.set_except(frame, id),
        None => bus.hovered_frame.set(frame),
    }
}

/// Shared hovered frame changed: annotate the matching local point, if any.
pub fn resolve_frame_hover(chart: &mut ChartModel, hovered: Option<&FrameRef>, linked: bool) {
    chart.pop_annotation();

    if !linked {
        chart.redraw();
        return;
    }
    let Some(frame) = hovered else {
        chart.redraw();
        return;
    };

    match chart.find_named(&frame.name).cloned() {
        Some(point) => chart.add_annotation(Some(point)),
        None => chart.redraw(),
    }
}

/// Pointer moved over a time-synchronized plot: publish the shared timestamp.
pub fn publish_timestamp(chart: &RefCell<ChartModel>, bus: &SyncBus, pointer: Option<(f64, f64)>) {
    let hover = match pointer {
        Some((x, y)) => Some(TimestampHover::from_point(x, y, chart.borrow().y_domain())),
        None => {
            log::debug!("Missing coordinates, clearing hovered timestamp");
            None
        }
    };
    bus.hovered_timestamp.set(hover);
}

/// Shared timestamp changed: annotate the nearest point in this plot's space.
pub fn resolve_timestamp(chart: &mut ChartModel, hover: Option<&TimestampHover>) {
    chart.pop_annotation();
    let Some(hover) = hover else {
        chart.redraw();
        return;
    };

    let y = hover.y_in(chart.y_domain());
    let closest = chart.find_closest_point(hover.x, y).cloned();
    chart.add_annotation(closest);
}

/// Click on a linked plot selects the frame of the nearest point.
pub fn select_from_click(
    chart: &RefCell<ChartModel>,
    bus: &SyncBus,
    linked: bool,
    pointer: (f64, f64),
) -> Option<FrameRef> {
    if !linked {
        return None;
    }
    let name = chart
        .borrow()
        .find_closest_point(pointer.0, pointer.1)
        .and_then(|p| p.name.clone())?;
    let frame = FrameRef::new(normalize_op_name(&name));
    bus.selected_frame.set(Some(frame.clone()));
    Some(frame)
}

/// Highlight applied to a plotted point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    None,
    Hovered,
    Selected,
    HoveredAndSelected,
}

/// Emphasis of `point`, given the name under the local annotation and the
/// selected frame.
pub fn emphasis(point: &DataPoint, hovered: Option<&str>, selected: Option<&str>) -> Emphasis {
    let Some(name) = point.name.as_deref() else {
        return Emphasis::None;
    };
    match (hovered == Some(name), selected == Some(name)) {
        (true, true) => Emphasis::HoveredAndSelected,
        (true, false) => Emphasis::Hovered,
        (false, true) => Emphasis::Selected,
        (false, false) => Emphasis::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::PointMetric;
    use std::rc::Rc;

    fn bars(names: &[&str]) -> ChartModel {
        let points = names
            .iter()
            .enumerate()
            .map(|(i, n)| DataPoint::named(10.0 * (i + 1) as f64, i as f64, *n))
            .collect();
        ChartModel::new(vec![points], vec![], PointMetric::Vertical, None)
    }

    #[test]
    fn test_publish_normalizes_name() {
        let bus = SyncBus::new();
        let chart = RefCell::new(bars(&["MODEL::conv_0", "MODEL::softmax_1"]));
        publish_frame_hover(&chart, &bus, true, Some((0.0, 0.9)), None);
        assert_eq!(bus.hovered_frame.get(), Some(FrameRef::new("softmax_1")));
        assert_eq!(chart.borrow().annotations().len(), 1);
    }

    #[test]
    fn test_unlinked_plot_annotates_locally_only() {
        let bus = SyncBus::new();
        let chart = RefCell::new(bars(&["conv_0"]));
        publish_frame_hover(&chart, &bus, false, Some((0.0, 0.0)), None);
        assert_eq!(bus.hovered_frame.get(), None);
        assert_eq!(chart.borrow().annotations().len(), 1);
    }

    #[test]
    fn test_pointer_leave_clears_shared_hover() {
        let bus = SyncBus::new();
        bus.hovered_frame.set(Some(FrameRef::new("x")));
        let chart = RefCell::new(bars(&["x"]));
        publish_frame_hover(&chart, &bus, true, None, None);
        assert_eq!(bus.hovered_frame.get(), None);
    }

    #[test]
    fn test_resolve_missing_identity_draws_nothing() {
        let mut chart = bars(&["conv_0"]);
        resolve_frame_hover(&mut chart, Some(&FrameRef::new("pool_3")), true);
        assert!(chart.annotations().is_empty());

        resolve_frame_hover(&mut chart, Some(&FrameRef::new("conv_0")), true);
        assert_eq!(chart.annotations().len(), 1);

        resolve_frame_hover(&mut chart, Some(&FrameRef::new("conv_0")), false);
        assert!(chart.annotations().is_empty());
    }

    #[test]
    fn test_timestamp_resolves_in_own_domain() {
        let points = vec![vec![
            DataPoint::new(10.0, 20.0),
            DataPoint::new(10.0, 50.0),
            DataPoint::new(30.0, 50.0),
        ]];
        let mut chart = ChartModel::new(points, vec![], PointMetric::Normalized, Some((0.0, 100.0)));
        resolve_timestamp(&mut chart, Some(&TimestampHover { x: 10.0, y_proc: 0.5 }));
        assert_eq!(chart.annotations(), &[DataPoint::new(10.0, 50.0)]);
    }

    #[test]
    fn test_click_selects_frame() {
        let bus = SyncBus::new();
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        bus.selected_frame
            .subscribe(Rc::new(move |f: &Option<FrameRef>| *sink.borrow_mut() = f.clone()));

        let chart = RefCell::new(bars(&["MODEL::conv_0"]));
        assert_eq!(select_from_click(&chart, &bus, false, (0.0, 0.0)), None);
        let frame = select_from_click(&chart, &bus, true, (0.0, 0.0));
        assert_eq!(frame, Some(FrameRef::new("conv_0")));
        assert_eq!(*seen.borrow(), Some(FrameRef::new("conv_0")));
    }

    #[test]
    fn test_emphasis() {
        let p = DataPoint::named(0.0, 0.0, "a");
        assert_eq!(emphasis(&p, Some("a"), Some("a")), Emphasis::HoveredAndSelected);
        assert_eq!(emphasis(&p, None, Some("a")), Emphasis::Selected);
        assert_eq!(emphasis(&DataPoint::new(0.0, 0.0), Some("a"), None), Emphasis::None);
    }
}
