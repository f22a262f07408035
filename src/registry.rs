use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::source::{RandomSource, ThreadRandom, TimeSource};
use crate::timer::{Timer, TimerKind};

/// Identifies a timer within its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// The registry's view of a timer.
pub(crate) trait Tickable {
    fn tick(&self, delta: f32);
    fn dispose(&self);
}

struct Entry {
    id: TimerId,
    timer: Weak<dyn Tickable>,
}

struct RegistryShared {
    /// Active timers, in registration order
    active: RefCell<Vec<Entry>>,

    /// Reused snapshot buffer for sweeps
    sweep: RefCell<Vec<Weak<dyn Tickable>>>,

    clock: Rc<dyn TimeSource>,
    random: Rc<dyn RandomSource>,
    next_id: Cell<u64>,
}

/// Tracks the active timers of one host context and advances them in bulk.
///
/// Cloning yields another handle to the same registry. The registry only
/// holds weak references: the code that created a timer owns it.
#[derive(Clone)]
pub struct TimerRegistry {
    shared: Rc<RegistryShared>,
}

impl TimerRegistry {
    /// Create a registry reading frame deltas from `clock` and drawing random
    /// values from the thread RNG.
    pub fn new(clock: Rc<dyn TimeSource>) -> Self {
        Self::with_random(clock, Rc::new(ThreadRandom))
    }

    pub fn with_random(clock: Rc<dyn TimeSource>, random: Rc<dyn RandomSource>) -> Self {
        TimerRegistry {
            shared: Rc::new(RegistryShared {
                active: RefCell::new(Vec::new()),
                sweep: RefCell::new(Vec::new()),
                clock,
                random,
                next_id: Cell::new(0),
            }),
        }
    }

    /// Add `timer` to the active set. Returns false if it was already there
    /// or belongs to another registry.
    ///
    /// Timers register themselves on start; this only changes membership,
    /// not the timer's state.
    pub fn register<K: TimerKind>(&self, timer: &Timer<K>) -> bool {
        if !self.owns(timer) {
            log::warn!("Refusing to register {} created by another registry", timer.id());
            return false;
        }
        self.insert(timer.id(), timer.tickable())
    }

    /// Remove `timer` from the active set. Returns false if it was absent.
    pub fn deregister<K: TimerKind>(&self, timer: &Timer<K>) -> bool {
        self.owns(timer) && self.remove(timer.id())
    }

    /// Tick every timer that is active when the sweep begins, once, with the
    /// current frame delta.
    ///
    /// Timers may stop, start or drop other timers while being ticked:
    /// removed timers are still visited (and ignore the tick unless running
    /// again), timers added mid-sweep wait for the next one.
    pub fn advance_all(&self) {
        if self.is_empty() {
            return;
        }

        let delta = self.shared.clock.delta_time();
        let mut sweep = self.take_snapshot();

        for timer in &sweep {
            match timer.upgrade() {
                Some(timer) => timer.tick(delta),
                None => log::trace!("Skipping timer dropped during sweep"),
            }
        }

        sweep.clear();
        *self.shared.sweep.borrow_mut() = sweep;
    }

    /// Dispose every active timer and empty the active set. Disposed timers
    /// end up stopped without firing their stop listeners.
    pub fn clear_all(&self) {
        let mut sweep = self.take_snapshot();
        let count = sweep.len();

        for timer in &sweep {
            if let Some(timer) = timer.upgrade() {
                timer.dispose();
            }
        }

        self.shared.active.borrow_mut().clear();
        sweep.clear();
        *self.shared.sweep.borrow_mut() = sweep;

        log::debug!("Cleared {} timer(s)", count);
    }

    pub fn len(&self) -> usize {
        self.shared.active.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.active.borrow().is_empty()
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.shared.active.borrow().iter().any(|entry| entry.id == id)
    }

    /// The delta the next sweep would use.
    pub fn delta_time(&self) -> f32 {
        self.shared.clock.delta_time()
    }

    pub fn random(&self) -> &dyn RandomSource {
        &*self.shared.random
    }

    pub(crate) fn random_source(&self) -> Rc<dyn RandomSource> {
        Rc::clone(&self.shared.random)
    }

    pub(crate) fn next_timer_id(&self) -> TimerId {
        let id = TimerId(self.shared.next_id.get());
        self.shared.next_id.set(id.0 + 1);
        id
    }

    pub(crate) fn insert(&self, id: TimerId, timer: Weak<dyn Tickable>) -> bool {
        let mut active = self.shared.active.borrow_mut();
        if active.iter().any(|entry| entry.id == id) {
            return false;
        }
        active.push(Entry { id, timer });
        log::trace!("Registered {} ({} active)", id, active.len());
        true
    }

    pub(crate) fn remove(&self, id: TimerId) -> bool {
        let mut active = self.shared.active.borrow_mut();
        let Some(index) = active.iter().position(|entry| entry.id == id) else {
            return false;
        };
        active.remove(index);
        log::trace!("Deregistered {} ({} active)", id, active.len());
        true
    }

    fn owns<K: TimerKind>(&self, timer: &Timer<K>) -> bool {
        Rc::ptr_eq(&self.shared, &timer.registry().shared)
    }

    /// Copy the active set into the sweep buffer. Nested sweeps get a fresh
    /// buffer since the shared one is taken.
    fn take_snapshot(&self) -> Vec<Weak<dyn Tickable>> {
        let mut sweep = std::mem::take(&mut *self.shared.sweep.borrow_mut());
        sweep.extend(
            self.shared
                .active
                .borrow()
                .iter()
                .map(|entry| entry.timer.clone()),
        );
        sweep
    }
}

impl fmt::Debug for TimerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerRegistry")
            .field("active", &self.len())
            .field("delta_time", &self.delta_time())
            .finish()
    }
}
