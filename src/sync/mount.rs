//! Mount-scoped chart subscriptions.
//!
//! A [`ChartMount`] is created once when a plot view mounts and dropped when
//! it unmounts or is re-keyed (group switch). Subscriptions are acquired in
//! `mount` and released by the guards it owns, so a view can never hold two
//! live subscriptions for the same channel.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::chart::ChartModel;
use crate::observable::{Subscription, SubscriptionId};
use crate::sync::linking;
use crate::sync::{FrameRef, SyncBus, TimestampHover};

/// Which shared channels a plot takes part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    /// Local annotations only.
    Independent,
    /// Hover and selection by frame identity.
    Frames,
    /// Hover by timestamp.
    Timestamps,
}

pub struct ChartMount {
    key: String,
    mode: LinkMode,
    chart: Rc<RefCell<ChartModel>>,
    linked: Rc<Cell<bool>>,
    own_hover: Option<SubscriptionId>,
    subscriptions: Vec<Subscription>,
}

impl std::fmt::Debug for ChartMount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartMount")
            .field("key", &self.key)
            .field("mode", &self.mode)
            .field("subscriptions", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}

/// Runs `f` on the chart if it is still alive and not borrowed.
fn with_chart(chart: &Weak<RefCell<ChartModel>>, f: impl FnOnce(&mut ChartModel)) {
    let Some(chart) = chart.upgrade() else {
        return;
    };
    match chart.try_borrow_mut() {
        Ok(mut chart) => f(&mut chart),
        Err(_) => log::debug!("Chart busy, skipping shared update"),
    };
}

impl ChartMount {
    /// Mounts a chart and subscribes it to the channels of `mode`.
    pub fn mount(key: impl Into<String>, chart: ChartModel, mode: LinkMode, bus: &SyncBus) -> Self {
        let chart = Rc::new(RefCell::new(chart));
        let linked = Rc::new(Cell::new(false));
        let mut subscriptions = Vec::new();
        let mut own_hover = None;

        match mode {
            LinkMode::Independent => {}
            LinkMode::Frames => {
                let weak = Rc::downgrade(&chart);
                let is_linked = Rc::clone(&linked);
                let hover = bus.hovered_frame.subscribe_scoped(Rc::new(
                    move |hovered: &Option<FrameRef>| {
                        with_chart(&weak, |chart| {
                            linking::resolve_frame_hover(chart, hovered.as_ref(), is_linked.get())
                        });
                    },
                ));
                own_hover = Some(hover.id());
                subscriptions.push(hover);

                let weak = Rc::downgrade(&chart);
                subscriptions.push(bus.selected_frame.subscribe_scoped(Rc::new(
                    move |_: &Option<FrameRef>| with_chart(&weak, ChartModel::redraw),
                )));

                let weak = Rc::downgrade(&chart);
                subscriptions.push(bus.active_profile.subscribe_scoped(Rc::new(
                    move |_: &Option<usize>| {
                        with_chart(&weak, |chart| {
                            chart.pop_annotation();
                            chart.redraw();
                        })
                    },
                )));
            }
            LinkMode::Timestamps => {
                let weak = Rc::downgrade(&chart);
                subscriptions.push(bus.hovered_timestamp.subscribe_scoped(Rc::new(
                    move |hover: &Option<TimestampHover>| {
                        with_chart(&weak, |chart| linking::resolve_timestamp(chart, hover.as_ref()));
                    },
                )));
            }
        }

        Self {
            key: key.into(),
            mode,
            chart,
            linked,
            own_hover,
            subscriptions,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn mode(&self) -> LinkMode {
        self.mode
    }

    pub fn chart(&self) -> &Rc<RefCell<ChartModel>> {
        &self.chart
    }

    /// Marks whether this plot shows the active profile.
    pub fn set_linked(&self, linked: bool) {
        self.linked.set(linked);
    }

    pub fn is_linked(&self) -> bool {
        self.linked.get()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Pointer moved to `pointer` (data coordinates) or left the plot.
    pub fn on_pointer(&self, bus: &SyncBus, pointer: Option<(f64, f64)>) {
        match self.mode {
            LinkMode::Frames => linking::publish_frame_hover(
                &self.chart,
                bus,
                self.linked.get(),
                pointer,
                self.own_hover,
            ),
            LinkMode::Timestamps => linking::publish_timestamp(&self.chart, bus, pointer),
            LinkMode::Independent => {
                let mut chart = self.chart.borrow_mut();
                chart.pop_annotation();
                let closest = pointer.and_then(|(x, y)| chart.find_closest_point(x, y).cloned());
                chart.add_annotation(closest);
            }
        }
    }

    /// Primary click at `pointer`; selects a frame on linked frame plots.
    pub fn on_click(&self, bus: &SyncBus, pointer: (f64, f64)) -> Option<FrameRef> {
        match self.mode {
            LinkMode::Frames => linking::select_from_click(&self.chart, bus, self.linked.get(), pointer),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{DataPoint, PointMetric};

    fn chart(names: &[&str]) -> ChartModel {
        let points = names
            .iter()
            .enumerate()
            .map(|(i, n)| DataPoint::named(1.0, i as f64, *n))
            .collect();
        ChartModel::new(vec![points], vec![], PointMetric::Vertical, None)
    }

    #[test]
    fn test_mount_subscribes_once_and_unmount_releases() {
        let bus = SyncBus::new();
        let mount = ChartMount::mount("g1", chart(&["a"]), LinkMode::Frames, &bus);
        assert_eq!(bus.hovered_frame.subscriber_count(), 1);
        assert_eq!(bus.subscriber_count(), 3);
        drop(mount);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_hover_in_one_plot_annotates_another() {
        let bus = SyncBus::new();
        let source = ChartMount::mount("a", chart(&["MODEL::conv_0", "MODEL::fc_1"]), LinkMode::Frames, &bus);
        let target = ChartMount::mount("b", chart(&["fc_1", "conv_0"]), LinkMode::Frames, &bus);
        let unrelated = ChartMount::mount("c", chart(&["pool_9"]), LinkMode::Frames, &bus);
        for mount in [&source, &target, &unrelated] {
            mount.set_linked(true);
        }

        source.on_pointer(&bus, Some((1.0, 1.0)));

        let annotated = target.chart().borrow().annotations().to_vec();
        assert_eq!(annotated.len(), 1);
        assert_eq!(annotated[0].name.as_deref(), Some("fc_1"));
        assert!(unrelated.chart().borrow().annotations().is_empty());
        // the publisher keeps only its own local annotation
        assert_eq!(source.chart().borrow().annotations().len(), 1);
    }

    #[test]
    fn test_timestamp_mount_receives_own_and_foreign_hover() {
        let bus = SyncBus::new();
        let a = ChartMount::mount("a", chart(&["x", "y"]), LinkMode::Timestamps, &bus);
        let b = ChartMount::mount("b", chart(&["p", "q"]), LinkMode::Timestamps, &bus);

        a.on_pointer(&bus, Some((1.0, 1.0)));
        assert_eq!(a.chart().borrow().annotations().len(), 1);
        assert_eq!(b.chart().borrow().annotations()[0].name.as_deref(), Some("q"));

        a.on_pointer(&bus, None);
        assert!(b.chart().borrow().annotations().is_empty());
    }

    #[test]
    fn test_dropped_chart_is_skipped_safely() {
        let bus = SyncBus::new();
        let mount = ChartMount::mount("a", chart(&["x"]), LinkMode::Timestamps, &bus);
        let weak = Rc::downgrade(mount.chart());
        drop(mount);
        bus.hovered_timestamp.set(Some(TimestampHover { x: 0.0, y_proc: 0.0 }));
        assert!(weak.upgrade().is_none());
    }
}
