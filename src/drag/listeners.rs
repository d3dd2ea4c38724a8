//! Instrumented registry of the temporary input listeners a drag session
//! installs.

/// Kind of input a session listens to while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    PointerMove,
    PointerRelease,
    KeyDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Default)]
pub struct ListenerRegistry {
    active: Vec<(ListenerId, ListenerKind)>,
    next_id: u64,
    added: u64,
    removed: u64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: ListenerKind) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.added += 1;
        self.active.push((id, kind));
        log::trace!("Listener {:?} added ({:?})", id, kind);
        id
    }

    /// Removes a listener. Removing an unknown id is a logged no-op.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let Some(pos) = self.active.iter().position(|(active, _)| *active == id) else {
            log::debug!("Listener {:?} was not registered", id);
            return false;
        };
        let (_, kind) = self.active.remove(pos);
        self.removed += 1;
        log::trace!("Listener {:?} removed ({:?})", id, kind);
        true
    }

    pub fn count(&self) -> usize {
        self.active.len()
    }

    pub fn count_of(&self, kind: ListenerKind) -> usize {
        self.active.iter().filter(|(_, k)| *k == kind).count()
    }

    pub fn is_listening(&self, kind: ListenerKind) -> bool {
        self.count_of(kind) > 0
    }

    /// Listeners ever added and removed; equal whenever no session is active.
    pub fn totals(&self) -> (u64, u64) {
        (self.added, self.removed)
    }
}
