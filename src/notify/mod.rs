//! Change notification primitives
//!
//! Single-threaded publish/subscribe building blocks:
//!
//! - [`Channel`]: typed multi-subscriber channel
//! - [`Sender`]: send-only handle onto a channel, given to sub-components
//! - [`Notification`]: zero-argument channel
//! - [`ValCh`]: a value paired with a channel that fires when it changes
//! - [`ChangeFanIn`]: merges many change sources into one coalesced notification
//!
//! Handles are `Rc`-based and therefore `!Send`; everything runs on the UI thread.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Identifier returned by `subscribe`, used to unsubscribe
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<T> = Rc<dyn Fn(&T)>;

struct Subscribers<T> {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback<T>)>,
}

/// Typed multi-subscriber channel
///
/// Cloning yields another handle onto the same subscriber list.
pub struct Channel<T> {
    inner: Rc<RefCell<Subscribers<T>>>,
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<T> Channel<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Subscribers {
                next_id: 0,
                callbacks: Vec::new(),
            })),
        }
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> SubscriptionId {
        let mut subscribers = self.inner.borrow_mut();
        let id = SubscriptionId(subscribers.next_id);
        subscribers.next_id += 1;
        subscribers.callbacks.push((id, Rc::new(callback)));
        id
    }

    /// Returns false if the id was not subscribed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.inner.borrow_mut();
        let before = subscribers.callbacks.len();
        subscribers.callbacks.retain(|(sub_id, _)| *sub_id != id);
        subscribers.callbacks.len() != before
    }

    /// Deliver `value` to every subscriber in subscription order
    ///
    /// Subscribers may subscribe, unsubscribe or send again from inside the
    /// callback; the delivery list is snapshotted first.
    pub fn send(&self, value: T) {
        let callbacks: Vec<Callback<T>> = self
            .inner
            .borrow()
            .callbacks
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();

        for callback in callbacks {
            callback(&value);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().callbacks.len()
    }

    /// Send-only handle onto this channel
    pub fn sender(&self) -> Sender<T> {
        Sender {
            channel: self.clone(),
        }
    }
}

/// Send-only end of a [`Channel`]
pub struct Sender<T> {
    channel: Channel<T>,
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Self {
            channel: self.channel.clone(),
        }
    }
}

impl<T> fmt::Debug for Sender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sender").finish_non_exhaustive()
    }
}

impl<T> Sender<T> {
    pub fn send(&self, value: T) {
        self.channel.send(value);
    }
}

/// Zero-argument notification
///
/// Consumers are told that something changed and re-query state themselves.
#[derive(Clone, Debug, Default)]
pub struct Notification {
    channel: Channel<()>,
}

impl Notification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&self) {
        self.channel.send(());
    }

    pub fn on_notify(&self, callback: impl Fn() + 'static) -> SubscriptionId {
        self.channel.subscribe(move |_| callback())
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.channel.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.channel.subscriber_count()
    }
}

/// Observable value: current value plus a change channel
#[derive(Debug)]
pub struct ValCh<T> {
    val: T,
    ch: Channel<T>,
}

impl<T: Clone + PartialEq> ValCh<T> {
    pub fn new(val: T) -> Self {
        Self {
            val,
            ch: Channel::new(),
        }
    }

    pub fn val(&self) -> &T {
        &self.val
    }

    /// Channel firing with the new value after each effective change
    pub fn ch(&self) -> &Channel<T> {
        &self.ch
    }

    /// Store `val` and notify; setting the current value does nothing.
    /// Returns whether the value changed.
    pub fn set(&mut self, val: T) -> bool {
        if self.val == val {
            return false;
        }
        self.val = val.clone();
        self.ch.send(val);
        true
    }
}

impl<T: Clone + PartialEq + Default> Default for ValCh<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// What raised a notation change (for logging; consumers never see it)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeSource {
    NoteAdded,
    DragChanged,
    TextEditingChanged,
    DropChanged,
    MidiNoteChanged,
    StyleChanged,
    PartsChanged,
    ViewModeChanged,
    HistoryApplied,
    ElementsMoved,
}

#[derive(Default)]
struct FanInState {
    dispatching: Cell<bool>,
    pending: Cell<bool>,
    received: Cell<u64>,
}

/// Fan-in from many [`ChangeSource`] senders to one [`Notification`]
///
/// A change sent while the outgoing notification is being delivered (for
/// example by a subscriber reacting to it) does not re-enter the
/// subscribers; it is folded into exactly one follow-up notification.
pub struct ChangeFanIn {
    sources: Channel<ChangeSource>,
    changed: Notification,
    state: Rc<FanInState>,
}

impl fmt::Debug for ChangeFanIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeFanIn")
            .field("received", &self.state.received.get())
            .finish()
    }
}

impl Default for ChangeFanIn {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFanIn {
    pub fn new() -> Self {
        let sources = Channel::new();
        let changed = Notification::new();
        let state = Rc::new(FanInState::default());

        let out = changed.clone();
        let listener_state = Rc::clone(&state);
        sources.subscribe(move |source: &ChangeSource| {
            listener_state.received.set(listener_state.received.get() + 1);
            log::trace!("notation change from {:?}", source);

            if listener_state.dispatching.get() {
                listener_state.pending.set(true);
                return;
            }

            listener_state.dispatching.set(true);
            loop {
                listener_state.pending.set(false);
                out.notify();
                if !listener_state.pending.get() {
                    break;
                }
            }
            listener_state.dispatching.set(false);
        });

        Self {
            sources,
            changed,
            state,
        }
    }

    /// Send-only handle for a sub-component
    pub fn sender(&self) -> Sender<ChangeSource> {
        self.sources.sender()
    }

    /// The coalesced outgoing notification
    pub fn changed(&self) -> &Notification {
        &self.changed
    }

    /// Number of change events received so far
    pub fn received(&self) -> u64 {
        self.state.received.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> (Rc<Cell<u32>>, impl Fn() + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        (count, move || c.set(c.get() + 1))
    }

    #[test]
    fn test_channel_delivers_in_subscription_order() {
        let channel: Channel<u32> = Channel::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let a = Rc::clone(&seen);
        channel.subscribe(move |v| a.borrow_mut().push(("a", *v)));
        let b = Rc::clone(&seen);
        channel.subscribe(move |v| b.borrow_mut().push(("b", *v)));

        channel.send(7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_unsubscribe() {
        let notification = Notification::new();
        let (count, cb) = counter();
        let id = notification.on_notify(cb);

        notification.notify();
        assert!(notification.unsubscribe(id));
        assert!(!notification.unsubscribe(id));
        notification.notify();

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_subscribe_from_inside_callback() {
        let channel: Channel<()> = Channel::new();
        let inner = channel.clone();
        channel.subscribe(move |_| {
            inner.subscribe(|_| {});
        });

        channel.send(());
        assert_eq!(channel.subscriber_count(), 2);
    }

    #[test]
    fn test_valch_dedups() {
        let mut opened = ValCh::new(false);
        let (count, cb) = counter();
        opened.ch().subscribe(move |_| cb());

        assert!(!opened.set(false));
        assert_eq!(count.get(), 0);

        assert!(opened.set(true));
        assert_eq!(count.get(), 1);
        assert!(*opened.val());
    }

    #[test]
    fn test_fan_in_forwards_each_source() {
        let fan_in = ChangeFanIn::new();
        let (count, cb) = counter();
        fan_in.changed().on_notify(cb);

        let style = fan_in.sender();
        let parts = fan_in.sender();
        style.send(ChangeSource::StyleChanged);
        parts.send(ChangeSource::PartsChanged);

        assert_eq!(count.get(), 2);
        assert_eq!(fan_in.received(), 2);
    }

    #[test]
    fn test_fan_in_coalesces_reentrant_sends() {
        let fan_in = ChangeFanIn::new();
        let sender = fan_in.sender();
        let count = Rc::new(Cell::new(0));

        let c = Rc::clone(&count);
        let reentrant = fan_in.sender();
        fan_in.changed().on_notify(move || {
            c.set(c.get() + 1);
            if c.get() == 1 {
                // Three changes raised while the first notification is delivered
                reentrant.send(ChangeSource::NoteAdded);
                reentrant.send(ChangeSource::DragChanged);
                reentrant.send(ChangeSource::DropChanged);
            }
        });

        sender.send(ChangeSource::StyleChanged);

        assert_eq!(count.get(), 2);
        assert_eq!(fan_in.received(), 4);
    }
}
