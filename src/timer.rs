use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::registry::{Tickable, TimerId, TimerRegistry};

/// Lifecycle notifications a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerEvent {
    Started,
    Stopped,
    Paused,
    Resumed,
    Reset,
    /// Periodic pulse of frequency and sporadic timers.
    Ticked,
}

/// Where a timer is in its lifecycle.
///
/// `Running` and `Paused` timers are members of their registry; only
/// `Running` ones advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Stopped,
    Running,
    Paused,
}

/// Time accounting shared by every timer kind, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimerTime {
    /// Value the timer rewinds to on start and reset.
    pub start: f32,
    pub current: f32,
}

/// What a kind asks the timer to do after one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// Stop the timer, firing [`TimerEvent::Stopped`].
    Stop,
    /// A threshold was crossed, fire [`TimerEvent::Ticked`].
    Elapsed,
}

/// The per-variant rules of a timer.
///
/// Kinds only touch their own data and the [`TimerTime`]; state changes,
/// registration and notifications are handled by [`Timer`].
pub trait TimerKind: 'static {
    /// Advance by `delta` seconds. Only called while the timer is running.
    ///
    /// The timer's state is borrowed for the duration of the call, so a kind
    /// must not call back into its own timer (for example through a
    /// [`TimerHandle`]); return [`TickOutcome::Stop`] instead.
    fn tick(&mut self, time: &mut TimerTime, delta: f32) -> TickOutcome;

    /// Called by [`Timer::start`] before the timer becomes running.
    fn rewind(&mut self, time: &mut TimerTime) {
        time.current = time.start;
    }

    /// Called by [`Timer::reset`].
    fn reset(&mut self, time: &mut TimerTime) {
        time.current = time.start;
    }
}

/// Identifies a subscription made with [`Timer::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener {
    id: ListenerId,
    event: TimerEvent,
    callback: Rc<dyn Fn()>,
}

#[derive(Default)]
struct Listeners {
    next_id: Cell<u64>,
    entries: RefCell<Vec<Listener>>,
}

impl Listeners {
    fn subscribe(&self, event: TimerEvent, callback: Rc<dyn Fn()>) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push(Listener {
            id,
            event,
            callback,
        });
        id
    }

    fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|listener| listener.id != id);
        entries.len() != before
    }

    /// Listeners subscribed while emitting are called from the next emit on.
    fn emit(&self, event: TimerEvent) {
        let callbacks: Vec<Rc<dyn Fn()>> = self
            .entries
            .borrow()
            .iter()
            .filter(|listener| listener.event == event)
            .map(|listener| Rc::clone(&listener.callback))
            .collect();

        for callback in callbacks {
            callback();
        }
    }
}

struct Inner<K> {
    state: TimerState,
    time: TimerTime,
    kind: K,
}

pub(crate) struct TimerCell<K: TimerKind> {
    id: TimerId,
    me: Weak<TimerCell<K>>,
    registry: TimerRegistry,
    inner: RefCell<Inner<K>>,
    listeners: Listeners,
}

impl<K: TimerKind> TimerCell<K> {
    fn state(&self) -> TimerState {
        self.inner.borrow().state
    }

    fn start(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.state == TimerState::Running {
                return;
            }
            let inner = &mut *inner;
            inner.kind.rewind(&mut inner.time);
            inner.state = TimerState::Running;
        }
        self.registry.insert(self.id, self.me.clone());
        self.listeners.emit(TimerEvent::Started);
    }

    fn stop(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.state == TimerState::Stopped {
                return;
            }
            inner.state = TimerState::Stopped;
        }
        self.registry.remove(self.id);
        self.listeners.emit(TimerEvent::Stopped);
    }

    fn pause(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.state != TimerState::Running {
                return;
            }
            inner.state = TimerState::Paused;
        }
        self.listeners.emit(TimerEvent::Paused);
    }

    fn resume(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.state != TimerState::Paused {
                return;
            }
            inner.state = TimerState::Running;
        }
        self.listeners.emit(TimerEvent::Resumed);
    }

    fn reset(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            let inner = &mut *inner;
            inner.kind.reset(&mut inner.time);
        }
        self.listeners.emit(TimerEvent::Reset);
    }

    fn advance(&self, delta: f32) {
        let outcome = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != TimerState::Running {
                return;
            }
            let inner = &mut *inner;
            inner.kind.tick(&mut inner.time, delta)
        };

        match outcome {
            TickOutcome::Continue => {}
            TickOutcome::Stop => self.stop(),
            TickOutcome::Elapsed => self.listeners.emit(TimerEvent::Ticked),
        }
    }

    fn release(&self) {
        self.inner.borrow_mut().state = TimerState::Stopped;
        self.registry.remove(self.id);
    }
}

impl<K: TimerKind> Tickable for TimerCell<K> {
    fn tick(&self, delta: f32) {
        self.advance(delta);
    }

    fn dispose(&self) {
        self.release();
    }
}

/// An owned timer of kind `K`.
///
/// Starting the timer registers it with the [`TimerRegistry`] it was created
/// with; the registry then advances it once per sweep until it stops.
/// Dropping the timer removes it from the registry.
pub struct Timer<K: TimerKind> {
    cell: Rc<TimerCell<K>>,
}

impl<K: TimerKind> Timer<K> {
    /// Wrap a custom [`TimerKind`]. The built-in variants have their own
    /// constructors.
    pub fn with_kind(registry: &TimerRegistry, start_time: f32, kind: K) -> Self {
        let cell = Rc::new_cyclic(|me| TimerCell {
            id: registry.next_timer_id(),
            me: me.clone(),
            registry: registry.clone(),
            inner: RefCell::new(Inner {
                state: TimerState::Stopped,
                time: TimerTime {
                    start: start_time,
                    current: start_time,
                },
                kind,
            }),
            listeners: Listeners::default(),
        });
        Self { cell }
    }

    pub fn id(&self) -> TimerId {
        self.cell.id
    }

    pub fn registry(&self) -> &TimerRegistry {
        &self.cell.registry
    }

    pub fn start_time(&self) -> f32 {
        self.cell.inner.borrow().time.start
    }

    pub fn current_time(&self) -> f32 {
        self.cell.inner.borrow().time.current
    }

    pub fn state(&self) -> TimerState {
        self.cell.state()
    }

    pub fn is_running(&self) -> bool {
        self.state() == TimerState::Running
    }

    /// Rewind to the start time, become running and register. No-op if
    /// already running; a paused timer is restarted from scratch.
    pub fn start(&self) {
        self.cell.start();
    }

    /// Stop and deregister. No-op if already stopped.
    ///
    /// A paused timer can be stopped too, which deregisters it and fires
    /// [`TimerEvent::Stopped`]. This differs from a plain running-flag guard,
    /// where stopping a paused timer did nothing and left it registered.
    pub fn stop(&self) {
        self.cell.stop();
    }

    /// Hold the current time. The timer stays registered but is skipped by
    /// sweeps until resumed.
    pub fn pause(&self) {
        self.cell.pause();
    }

    /// Continue a paused timer. Stopped timers stay stopped; use
    /// [`start`](Self::start) for them.
    pub fn resume(&self) {
        self.cell.resume();
    }

    /// Return to the kind's baseline without changing the running state.
    pub fn reset(&self) {
        self.cell.reset();
    }

    /// Advance by `delta` seconds, as a registry sweep would.
    pub fn tick(&self, delta: f32) {
        self.cell.advance(delta);
    }

    /// Stop silently and leave the registry. Safe to call any number of
    /// times; also runs on drop.
    pub fn dispose(&self) {
        self.cell.release();
    }

    /// Listeners run synchronously, in subscription order, after the
    /// timer's state has been updated.
    pub fn subscribe<F>(&self, event: TimerEvent, listener: F) -> ListenerId
    where
        F: Fn() + 'static,
    {
        self.cell.listeners.subscribe(event, Rc::new(listener))
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.cell.listeners.unsubscribe(id)
    }

    /// A weak handle, for listeners that need to control the timer.
    pub fn handle(&self) -> TimerHandle<K> {
        TimerHandle {
            cell: Rc::downgrade(&self.cell),
        }
    }

    pub(crate) fn tickable(&self) -> Weak<dyn Tickable> {
        self.cell.me.clone()
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&TimerTime, &K) -> R) -> R {
        let inner = self.cell.inner.borrow();
        f(&inner.time, &inner.kind)
    }

    pub(crate) fn update<R>(
        &self,
        f: impl FnOnce(TimerState, &mut TimerTime, &mut K) -> R,
    ) -> R {
        let mut inner = self.cell.inner.borrow_mut();
        let inner = &mut *inner;
        f(inner.state, &mut inner.time, &mut inner.kind)
    }

    /// Apply `f` and fire [`TimerEvent::Reset`].
    pub(crate) fn reset_with(&self, f: impl FnOnce(&mut TimerTime, &mut K)) {
        self.update(|_, time, kind| f(time, kind));
        self.cell.listeners.emit(TimerEvent::Reset);
    }
}

impl<K: TimerKind> Drop for Timer<K> {
    fn drop(&mut self) {
        self.cell.release();
    }
}

impl<K: TimerKind> fmt::Debug for Timer<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.cell.inner.borrow();
        f.debug_struct("Timer")
            .field("id", &self.cell.id)
            .field("state", &inner.state)
            .field("time", &inner.time)
            .finish()
    }
}

/// Non-owning reference to a [`Timer`].
///
/// Every method is a no-op once the timer has been dropped.
pub struct TimerHandle<K: TimerKind> {
    cell: Weak<TimerCell<K>>,
}

impl<K: TimerKind> Clone for TimerHandle<K> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<K: TimerKind> TimerHandle<K> {
    pub fn is_alive(&self) -> bool {
        self.cell.strong_count() > 0
    }

    pub fn state(&self) -> Option<TimerState> {
        self.cell.upgrade().map(|cell| cell.state())
    }

    pub fn is_running(&self) -> bool {
        self.state() == Some(TimerState::Running)
    }

    pub fn current_time(&self) -> Option<f32> {
        self.cell
            .upgrade()
            .map(|cell| cell.inner.borrow().time.current)
    }

    pub fn start(&self) {
        if let Some(cell) = self.cell.upgrade() {
            cell.start();
        }
    }

    pub fn stop(&self) {
        if let Some(cell) = self.cell.upgrade() {
            cell.stop();
        }
    }

    pub fn pause(&self) {
        if let Some(cell) = self.cell.upgrade() {
            cell.pause();
        }
    }

    pub fn resume(&self) {
        if let Some(cell) = self.cell.upgrade() {
            cell.resume();
        }
    }

    pub fn reset(&self) {
        if let Some(cell) = self.cell.upgrade() {
            cell.reset();
        }
    }
}
