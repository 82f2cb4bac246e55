//! Emitter<T> — the thread-safe, channel-keyed event surface.
//!
//! Wraps a [`Registry<T>`] in a `parking_lot::Mutex`. The lock guards
//! registry mutation and snapshot-copy only; it is **never held while a
//! callback runs**, which lets listeners call `on()`/`off()`/`emit()` on
//! the same emitter without deadlocking.
//!
//! Snapshot-on-emit semantics:
//!   - A listener removed *during* emission is still called in that round
//!     (removal takes effect for future emits only).
//!   - A listener added *during* emission is NOT called until the next emit
//!     of its channel.
//!   - Exception: a `once` entry is claimed out of the live registry right
//!     before it runs; if something already removed it, the claim fails and
//!     the callback is skipped. At-most-once wins over snapshot delivery
//!     when the two conflict.
//!
//! Panics inside a listener propagate to the caller and abort the remaining
//! dispatch — no error isolation at this level. Callers that need isolation
//! wrap their own listener bodies.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::registry::{Entry, ListenerFn, ListenerId, Registry};

/// Reserved channel key matched by every emit, regardless of the channel
/// named. An ordinary key in the channel map — `on(ANY_CHANNEL, f)` and
/// [`Emitter::on_any`] register into the same bucket.
pub const ANY_CHANNEL: &str = "*";

/// Separator for composite channel keys accepted by [`Emitter::on_each`]
/// and [`Emitter::off_each`].
pub const CHANNEL_SEPARATOR: char = ' ';

/// Synchronous channel-keyed event emitter.
///
/// `T` is the event payload type. All methods take `&self`; internal state
/// is a [`Registry<T>`] behind a `parking_lot::Mutex` that is released
/// before any callback fires. `Emitter<T>` is `Send + Sync`; callbacks must
/// be `Send + Sync + 'static`.
///
/// An emitter may carry a parent (see [`Emitter::with_parent`]): emits are
/// forwarded to the parent after local dispatch, while registration,
/// removal, and introspection stay strictly local.
pub struct Emitter<T> {
    registry: Mutex<Registry<T>>,
    parent: Option<Arc<Emitter<T>>>,
}

impl<T> Emitter<T> {
    /// Create a new, empty emitter with no parent.
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry::new()),
            parent: None,
        }
    }

    /// Create an emitter layered over `parent`.
    ///
    /// Every emit on this emitter is forwarded to `parent` after local
    /// dispatch. The two registries are otherwise independent: removal and
    /// introspection on one never touch the other. The parent reference is
    /// fixed for the emitter's lifetime.
    pub fn with_parent(parent: Arc<Emitter<T>>) -> Self {
        Self {
            registry: Mutex::new(Registry::new()),
            parent: Some(parent),
        }
    }

    // -----------------------------------------------------------------------
    // Subscribe
    // -----------------------------------------------------------------------

    /// Register `callback` on `channel` and return its [`ListenerId`].
    ///
    /// Listeners are invoked in registration order. Registering the same
    /// callback twice yields two independent entries that each fire per
    /// emit.
    pub fn on(&self, channel: &str, callback: impl Fn(&T) + Send + Sync + 'static) -> ListenerId {
        let cb: Arc<ListenerFn<T>> = Arc::new(move |_channel, event: &T| callback(event));
        self.register(channel, cb, false)
    }

    /// Register `callback` on the wildcard channel.
    ///
    /// The callback fires for every emit on any channel and receives the
    /// emitted channel key alongside the event.
    pub fn on_any(&self, callback: impl Fn(&str, &T) + Send + Sync + 'static) -> ListenerId {
        self.register(ANY_CHANNEL, Arc::new(callback), false)
    }

    /// Register a single-shot listener on `channel`.
    ///
    /// The entry is removed from the live registry strictly *before* the
    /// callback runs, so reentrant emits from inside the callback never
    /// re-invoke it. Removable beforehand via the returned handle like any
    /// other listener.
    pub fn once(&self, channel: &str, callback: impl Fn(&T) + Send + Sync + 'static) -> ListenerId {
        let cb: Arc<ListenerFn<T>> = Arc::new(move |_channel, event: &T| callback(event));
        self.register(channel, cb, true)
    }

    /// Single-shot wildcard listener; see [`Emitter::once`] and
    /// [`Emitter::on_any`].
    pub fn once_any(&self, callback: impl Fn(&str, &T) + Send + Sync + 'static) -> ListenerId {
        self.register(ANY_CHANNEL, Arc::new(callback), true)
    }

    /// Register `callback` once per whitespace-separated token in
    /// `channels`, returning the handles in token order.
    ///
    /// Composite-key mode: `on_each("open close", f)` is `on("open", f)`
    /// plus `on("close", f)` sharing one allocation of the callback. Empty
    /// tokens (doubled separators, leading/trailing whitespace) are skipped.
    pub fn on_each(
        &self,
        channels: &str,
        callback: impl Fn(&T) + Send + Sync + 'static,
    ) -> Vec<ListenerId> {
        let cb: Arc<ListenerFn<T>> = Arc::new(move |_channel, event: &T| callback(event));
        channels
            .split(CHANNEL_SEPARATOR)
            .filter(|token| !token.is_empty())
            .map(|token| self.register(token, Arc::clone(&cb), false))
            .collect()
    }

    /// Ecosystem-compat alias for [`Emitter::on`].
    pub fn add_event_listener(
        &self,
        channel: &str,
        callback: impl Fn(&T) + Send + Sync + 'static,
    ) -> ListenerId {
        self.on(channel, callback)
    }

    fn register(&self, channel: &str, callback: Arc<ListenerFn<T>>, once: bool) -> ListenerId {
        let id = self.registry.lock().insert(channel, callback, once);
        trace!(channel, id, once, "listener registered");
        id
    }

    // -----------------------------------------------------------------------
    // Unsubscribe
    // -----------------------------------------------------------------------

    /// Remove the listener registered under `id` on `channel`.
    ///
    /// Removes at most one entry. Unknown channel or handle is a silent
    /// no-op — never an error — so double removal is safe.
    pub fn off(&self, channel: &str, id: ListenerId) {
        if self.registry.lock().remove(channel, id) {
            trace!(channel, id, "listener removed");
        }
    }

    /// Remove every listener on `channel`. No-op when the channel has none.
    pub fn off_channel(&self, channel: &str) {
        if self.registry.lock().remove_channel(channel) {
            trace!(channel, "channel cleared");
        }
    }

    /// Remove every listener on each whitespace-separated token in
    /// `channels`. Composite-key counterpart of [`Emitter::off_channel`].
    pub fn off_each(&self, channels: &str) {
        for token in channels.split(CHANNEL_SEPARATOR).filter(|t| !t.is_empty()) {
            self.off_channel(token);
        }
    }

    /// Remove every listener on every channel.
    pub fn clear(&self) {
        self.registry.lock().clear();
        trace!("registry cleared");
    }

    /// Ecosystem-compat alias for [`Emitter::off`].
    pub fn remove_listener(&self, channel: &str, id: ListenerId) {
        self.off(channel, id);
    }

    /// Ecosystem-compat alias for [`Emitter::off`].
    pub fn remove_event_listener(&self, channel: &str, id: ListenerId) {
        self.off(channel, id);
    }

    /// Ecosystem-compat alias for [`Emitter::clear`].
    pub fn remove_all_listeners(&self) {
        self.clear();
    }

    // -----------------------------------------------------------------------
    // Emit
    // -----------------------------------------------------------------------

    /// Emit `event` on `channel`.
    ///
    /// Dispatch order:
    ///   1. the named channel's snapshot, in registration order;
    ///   2. the wildcard channel's snapshot (taken after named dispatch
    ///      completes), unless the named channel *is* the wildcard — the
    ///      wildcard bucket is dispatched exactly once per emit;
    ///   3. the parent emitter, if any, with the same channel and event.
    ///
    /// Emitting to a channel nobody listens on is a safe no-op. A panicking
    /// listener aborts the remaining dispatch and propagates to the caller.
    pub fn emit(&self, channel: &str, event: &T) {
        let named = self.registry.lock().snapshot(channel);
        if !named.is_empty() {
            trace!(channel, listeners = named.len(), "dispatch");
        }
        for entry in &named {
            self.fire(channel, channel, entry, event);
        }

        if channel != ANY_CHANNEL {
            let wildcard = self.registry.lock().snapshot(ANY_CHANNEL);
            for entry in &wildcard {
                self.fire(ANY_CHANNEL, channel, entry, event);
            }
        }

        if let Some(parent) = &self.parent {
            parent.emit(channel, event);
        }
    }

    /// Ecosystem-compat alias for [`Emitter::emit`].
    pub fn trigger(&self, channel: &str, event: &T) {
        self.emit(channel, event);
    }

    /// Ecosystem-compat alias for [`Emitter::emit`].
    pub fn trigger_handler(&self, channel: &str, event: &T) {
        self.emit(channel, event);
    }

    /// Ecosystem-compat alias for [`Emitter::emit`].
    pub fn dispatch_event(&self, channel: &str, event: &T) {
        self.emit(channel, event);
    }

    /// Invoke one snapshot entry. `bucket` is the registry key the entry
    /// lives under; `channel` is the key the emit named (they differ for
    /// wildcard entries).
    fn fire(&self, bucket: &str, channel: &str, entry: &Entry<T>, event: &T) {
        if entry.is_once() && !self.registry.lock().remove(bucket, entry.id()) {
            // Already claimed by an earlier listener in this dispatch or by
            // a nested emit.
            return;
        }
        entry.call(channel, event);
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Handles currently registered on `channel`, in registration order.
    ///
    /// A defensive copy; callbacks themselves are never exposed. Empty when
    /// no listeners are registered.
    pub fn listeners(&self, channel: &str) -> Vec<ListenerId> {
        self.registry.lock().ids(channel)
    }

    /// True iff `channel` has at least one listener.
    pub fn has_listeners(&self, channel: &str) -> bool {
        self.registry.lock().has_listeners(channel)
    }

    /// Number of listeners on `channel`.
    pub fn listener_count(&self, channel: &str) -> usize {
        self.registry.lock().channel_len(channel)
    }

    /// Total number of listeners across all channels.
    pub fn len(&self) -> usize {
        self.registry.lock().len()
    }

    /// True iff no listeners are registered at all.
    pub fn is_empty(&self) -> bool {
        self.registry.lock().is_empty()
    }

    /// Keys of all channels with at least one listener. Unordered.
    pub fn channel_names(&self) -> Vec<String> {
        self.registry.lock().channel_names()
    }
}

impl<T> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.lock();
        f.debug_struct("Emitter")
            .field("channels", &registry.channel_names().len())
            .field("listeners", &registry.len())
            .field("layered", &self.parent.is_some())
            .finish()
    }
}
