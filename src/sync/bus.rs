//! Cross-panel synchronization bus.

use crate::observable::Observable;

/// Normalized identity of a frame, shared between panels.
///
/// `name` is the operator name without its `MODEL::` prefix, so every panel
/// can match it against its own dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameRef {
    pub name: String,
}

impl FrameRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Hovered timestamp: absolute x, relative y.
///
/// Panels have different y-domains (percent, degrees, bytes), so only time
/// and the relative vertical position are meaningful to share.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimestampHover {
    pub x: f64,
    pub y_proc: f64,
}

impl TimestampHover {
    /// Builds a hover from a point in the emitting plot's coordinates.
    pub fn from_point(x: f64, y: f64, (y_begin, y_end): (f64, f64)) -> Self {
        let span = y_end - y_begin;
        let y_proc = if span.abs() > f64::EPSILON {
            (y - y_begin) / span
        } else {
            0.0
        };
        Self { x, y_proc }
    }

    /// Re-maps the relative y into a receiving plot's y-domain.
    pub fn y_in(&self, (y_begin, y_end): (f64, f64)) -> f64 {
        y_begin + (y_end - y_begin) * self.y_proc
    }
}

/// The shared values every panel may read and subscribe to.
///
/// Channels are independent: setting one never touches another, so a
/// consumer can observe `selected_frame` change before a related
/// `hovered_frame` reset within the same gesture.
#[derive(Debug, Clone)]
pub struct SyncBus {
    pub selected_frame: Observable<Option<FrameRef>>,
    pub hovered_frame: Observable<Option<FrameRef>>,
    pub hovered_timestamp: Observable<Option<TimestampHover>>,
    pub active_profile: Observable<Option<usize>>,
    pub error_flag: Observable<bool>,
}

impl Default for SyncBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncBus {
    pub fn new() -> Self {
        Self {
            selected_frame: Observable::new(None),
            hovered_frame: Observable::new(None),
            hovered_timestamp: Observable::new(None),
            active_profile: Observable::new(None),
            error_flag: Observable::new(false),
        }
    }

    /// Clears every value and subscriber.
    pub fn reset(&self) {
        self.selected_frame.reset(None);
        self.hovered_frame.reset(None);
        self.hovered_timestamp.reset(None);
        self.active_profile.reset(None);
        self.error_flag.reset(false);
    }

    /// Total subscribers across all channels.
    pub fn subscriber_count(&self) -> usize {
        self.selected_frame.subscriber_count()
            + self.hovered_frame.subscriber_count()
            + self.hovered_timestamp.subscriber_count()
            + self.active_profile.subscriber_count()
            + self.error_flag.subscriber_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_timestamp_round_trip_between_domains() {
        let hover = TimestampHover { x: 10.0, y_proc: 0.5 };
        assert_eq!(hover.y_in((0.0, 100.0)), 50.0);

        let emitted = TimestampHover::from_point(3.0, 30.0, (20.0, 40.0));
        assert_eq!(emitted.y_proc, 0.5);
        assert_eq!(emitted.y_in((0.0, 8.0)), 4.0);
    }

    #[test]
    fn test_degenerate_domain_maps_to_bottom() {
        let hover = TimestampHover::from_point(1.0, 5.0, (5.0, 5.0));
        assert_eq!(hover.y_proc, 0.0);
    }

    #[test]
    fn test_reset_drops_subscribers_and_values() {
        let bus = SyncBus::new();
        bus.hovered_frame.subscribe(Rc::new(|_: &Option<FrameRef>| {}));
        bus.error_flag.set(true);
        assert_eq!(bus.subscriber_count(), 1);

        bus.reset();
        assert_eq!(bus.subscriber_count(), 0);
        assert!(!bus.error_flag.get());
    }

    #[test]
    fn test_channels_are_independent() {
        let bus = SyncBus::new();
        bus.selected_frame.set(Some(FrameRef::new("conv")));
        assert_eq!(bus.hovered_frame.get(), None);
    }
}
