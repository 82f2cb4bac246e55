//! signalbox — synchronous, channel-keyed event emission.
//!
//! # Overview
//!
//! [`Emitter<T>`] maps string channel keys to ordered listener lists and
//! dispatches emitted events to them synchronously, on the calling thread.
//! Registration returns a [`ListenerId`] handle that removes exactly that
//! registration later — no function-identity comparisons anywhere.
//!
//! The one non-trivial guarantee is **snapshot-before-dispatch**: `emit`
//! freezes the channel's listener list before invoking anything, so a
//! listener that subscribes or unsubscribes mid-dispatch changes only
//! *future* emissions, never the one in flight. That rule is what makes
//! reentrant `on`/`off`/`emit` calls from inside a listener body safe.
//!
//! # Modules
//!
//! - [`registry`] — [`Registry<T>`], the lock-free listener table.
//! - [`emitter`] — [`Emitter<T>`], the thread-safe surface, plus the
//!   wildcard channel and composite-key helpers.
//! - [`capability`] — [`EventSource`] trait and [`WithEvents`] decorator for
//!   attaching the capability to host types by composition.
//!
//! # Example
//!
//! ```rust
//! use signalbox::Emitter;
//!
//! let emitter: Emitter<u32> = Emitter::new();
//! let id = emitter.on("tick", |n| println!("tick {n}"));
//! emitter.emit("tick", &1);
//! emitter.off("tick", id);
//! emitter.emit("tick", &2); // no listeners — safe no-op
//! ```

pub mod capability;
pub mod emitter;
pub mod registry;

pub use capability::{EventSource, WithEvents};
pub use emitter::{Emitter, ANY_CHANNEL, CHANNEL_SEPARATOR};
pub use registry::{ListenerFn, ListenerId, Registry};
