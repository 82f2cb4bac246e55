//! Capability layer — attach emission to host types by composition.
//!
//! Two ways for a host type to expose a channel-keyed event surface:
//!
//! - [`EventSource<T>`] — implement by embedding an [`Emitter<T>`] and
//!   returning it from [`emitter`](EventSource::emitter); the whole
//!   operation surface comes along as provided methods.
//! - [`WithEvents<H, T>`] — decorator for types you cannot (or do not want
//!   to) change: wraps the host value together with a fresh emitter.
//!
//! Each host owns its own registry; decorating two values never shares
//! listener state between them.

use crate::emitter::Emitter;
use crate::registry::ListenerId;

/// Capability trait for types that expose a channel-keyed event surface.
///
/// One required method; everything else delegates to the embedded emitter.
///
/// ```rust
/// use signalbox::{Emitter, EventSource};
///
/// struct Thermostat {
///     events: Emitter<f64>,
/// }
///
/// impl EventSource<f64> for Thermostat {
///     fn emitter(&self) -> &Emitter<f64> {
///         &self.events
///     }
/// }
///
/// let t = Thermostat { events: Emitter::new() };
/// t.on("temperature", |celsius| println!("now at {celsius}"));
/// t.emit("temperature", &21.5);
/// ```
pub trait EventSource<T> {
    /// The emitter backing this host.
    fn emitter(&self) -> &Emitter<T>;

    /// See [`Emitter::on`].
    fn on(&self, channel: &str, callback: impl Fn(&T) + Send + Sync + 'static) -> ListenerId {
        self.emitter().on(channel, callback)
    }

    /// See [`Emitter::on_any`].
    fn on_any(&self, callback: impl Fn(&str, &T) + Send + Sync + 'static) -> ListenerId {
        self.emitter().on_any(callback)
    }

    /// See [`Emitter::once`].
    fn once(&self, channel: &str, callback: impl Fn(&T) + Send + Sync + 'static) -> ListenerId {
        self.emitter().once(channel, callback)
    }

    /// See [`Emitter::off`].
    fn off(&self, channel: &str, id: ListenerId) {
        self.emitter().off(channel, id);
    }

    /// See [`Emitter::off_channel`].
    fn off_channel(&self, channel: &str) {
        self.emitter().off_channel(channel);
    }

    /// See [`Emitter::clear`].
    fn clear_listeners(&self) {
        self.emitter().clear();
    }

    /// See [`Emitter::emit`].
    fn emit(&self, channel: &str, event: &T) {
        self.emitter().emit(channel, event);
    }

    /// See [`Emitter::listeners`].
    fn listeners(&self, channel: &str) -> Vec<ListenerId> {
        self.emitter().listeners(channel)
    }

    /// See [`Emitter::has_listeners`].
    fn has_listeners(&self, channel: &str) -> bool {
        self.emitter().has_listeners(channel)
    }
}

/// Decorator that pairs an arbitrary host value with its own emitter.
///
/// The host is reachable through [`host`](WithEvents::host) /
/// [`host_mut`](WithEvents::host_mut) and recoverable with
/// [`into_inner`](WithEvents::into_inner); the event surface comes from the
/// [`EventSource`] impl.
pub struct WithEvents<H, T> {
    host: H,
    events: Emitter<T>,
}

impl<H, T> WithEvents<H, T> {
    /// Wrap `host` with a fresh, empty emitter.
    pub fn new(host: H) -> Self {
        Self {
            host,
            events: Emitter::new(),
        }
    }

    /// The wrapped value.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the wrapped value.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Unwrap, discarding the emitter and all its listeners.
    pub fn into_inner(self) -> H {
        self.host
    }
}

impl<H, T> EventSource<T> for WithEvents<H, T> {
    fn emitter(&self) -> &Emitter<T> {
        &self.events
    }
}

impl<H: std::fmt::Debug, T> std::fmt::Debug for WithEvents<H, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WithEvents")
            .field("host", &self.host)
            .field("events", &self.events)
            .finish()
    }
}
