//! Single-threaded observable values.
//!
//! An [`Observable`] holds one current value and an ordered list of subscriber
//! callbacks. Setting the value notifies every subscriber synchronously, in
//! subscription order, before `set` returns. Late subscribers get no replay:
//! they see the next `set`, never the previous one.
//!
//! Handles are cheap to clone and share the same underlying value, so one
//! observable can be handed to every panel that needs it.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Callback invoked with the new value on every `set`.
pub type Callback<T> = Rc<dyn Fn(&T)>;

/// Identifies one subscription on one observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Inner<T> {
    value: T,
    subscribers: Vec<(SubscriptionId, Callback<T>)>,
    next_id: u64,
}

/// Shared, observable value with ordered subscribers.
pub struct Observable<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Default + Clone + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + 'static> Observable<T> {
    /// Creates an observable with an initial value and no subscribers.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value,
                subscribers: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Returns a clone of the current value.
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Reads the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Stores `value` and notifies all subscribers in subscription order.
    pub fn set(&self, value: T) {
        self.publish(value, None);
    }

    /// Like [`Observable::set`], but skips one subscriber.
    ///
    /// Used by a panel that publishes a value it has already applied locally,
    /// so it keeps its place in the notification order.
    pub fn set_except(&self, value: T, skip: SubscriptionId) {
        self.publish(value, Some(skip));
    }

    fn publish(&self, value: T, skip: Option<SubscriptionId>) {
        let (value, subscribers) = {
            let mut inner = self.inner.borrow_mut();
            inner.value = value;
            let subscribers: Vec<_> = inner
                .subscribers
                .iter()
                .filter(|(id, _)| Some(*id) != skip)
                .cloned()
                .collect();
            (inner.value.clone(), subscribers)
        };

        // No borrow is held here: callbacks may read, set or (un)subscribe.
        for (id, callback) in subscribers {
            if self.is_subscribed(id) {
                callback(&value);
            }
        }
    }

    /// Registers `callback` and returns its id.
    ///
    /// Subscribing the same callback (same `Rc`) twice is a no-op that
    /// returns the existing id, so a re-run mount path cannot double-deliver.
    pub fn subscribe(&self, callback: Callback<T>) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        if let Some((id, _)) = inner
            .subscribers
            .iter()
            .find(|(_, existing)| std::ptr::addr_eq(Rc::as_ptr(existing), Rc::as_ptr(&callback)))
        {
            log::debug!("Callback already subscribed as {:?}, ignoring", id);
            return *id;
        }
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.subscribers.push((id, callback));
        id
    }

    /// Removes a subscription. Returns false (and logs) for unknown ids.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(existing, _)| *existing != id);
        let removed = inner.subscribers.len() != before;
        if !removed {
            log::debug!("Unsubscribe of unknown subscription {:?} ignored", id);
        }
        removed
    }

    /// Subscribes and returns a guard that unsubscribes when dropped.
    pub fn subscribe_scoped(&self, callback: Callback<T>) -> Subscription {
        let id = self.subscribe(callback);
        let weak: Weak<RefCell<Inner<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            id,
            release: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    Observable { inner }.unsubscribe(id);
                }
            })),
        }
    }

    /// Returns true if `id` is currently subscribed.
    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .any(|(existing, _)| *existing == id)
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Replaces the value and drops every subscriber without notifying.
    pub fn reset(&self, value: T) {
        let mut inner = self.inner.borrow_mut();
        inner.value = value;
        inner.subscribers.clear();
    }
}

/// Scoped subscription: unsubscribes exactly once, when dropped.
pub struct Subscription {
    id: SubscriptionId,
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_set_notifies_once_per_subscriber() {
        let obs = Observable::new(0);
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let id = obs.subscribe(Rc::new(move |v: &i32| sink.borrow_mut().push(*v)));

        obs.set(7);
        assert_eq!(*calls.borrow(), vec![7]);

        assert!(obs.unsubscribe(id));
        obs.set(8);
        assert_eq!(*calls.borrow(), vec![7]);
        assert_eq!(obs.get(), 8);
    }

    #[test]
    fn test_notification_order_follows_subscription_order() {
        let obs = Observable::new(String::new());
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["a", "b", "c"] {
            let order = Rc::clone(&order);
            obs.subscribe(Rc::new(move |_: &String| order.borrow_mut().push(tag)));
        }
        obs.set("x".to_string());
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_no_replay_for_late_subscriber() {
        let obs = Observable::new(1);
        obs.set(2);
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        obs.subscribe(Rc::new(move |_: &i32| counter.set(counter.get() + 1)));
        assert_eq!(hits.get(), 0);
        obs.set(3);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_duplicate_subscribe_is_idempotent() {
        let obs = Observable::new(0);
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let callback: Callback<i32> = Rc::new(move |_| counter.set(counter.get() + 1));

        let first = obs.subscribe(Rc::clone(&callback));
        let second = obs.subscribe(Rc::clone(&callback));
        assert_eq!(first, second);
        assert_eq!(obs.subscriber_count(), 1);

        obs.set(1);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_scoped_subscription_releases_on_drop() {
        let obs = Observable::new(0);
        let guard = obs.subscribe_scoped(Rc::new(|_: &i32| {}));
        assert_eq!(obs.subscriber_count(), 1);
        drop(guard);
        assert_eq!(obs.subscriber_count(), 0);
    }

    #[test]
    fn test_set_except_skips_publisher() {
        let obs = Observable::new(0);
        let hits = Rc::new(RefCell::new(Vec::new()));
        let a = Rc::clone(&hits);
        let b = Rc::clone(&hits);
        let id_a = obs.subscribe(Rc::new(move |_: &i32| a.borrow_mut().push("a")));
        obs.subscribe(Rc::new(move |_: &i32| b.borrow_mut().push("b")));

        obs.set_except(5, id_a);
        assert_eq!(*hits.borrow(), vec!["b"]);
    }

    #[test]
    fn test_callback_can_unsubscribe_later_subscriber() {
        let obs = Observable::new(0);
        let hits = Rc::new(Cell::new(0));
        let victim = Rc::new(Cell::new(None));

        let obs_handle = obs.clone();
        let victim_id = Rc::clone(&victim);
        obs.subscribe(Rc::new(move |_: &i32| {
            if let Some(id) = victim_id.get() {
                obs_handle.unsubscribe(id);
            }
        }));
        let counter = Rc::clone(&hits);
        victim.set(Some(obs.subscribe(Rc::new(move |_: &i32| counter.set(counter.get() + 1)))));

        obs.set(1);
        assert_eq!(hits.get(), 0);
    }
}
