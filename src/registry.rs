//! Registry<T> — the lock-free listener table.
//!
//! Maps channel keys to ordered entry lists and allocates [`ListenerId`]
//! handles. All mutation goes through `&mut self`; there is no interior
//! mutability and no locking at this layer. [`Emitter<T>`](crate::Emitter)
//! wraps a `Registry<T>` in a mutex for the thread-safe surface; in
//! single-threaded code the registry is usable on its own.
//!
//! Entries store their callback as `Arc<dyn Fn(&str, &T)>` so that
//! [`snapshot`](Registry::snapshot) is cheap — cloning a bucket only bumps
//! reference counts.
//!
//! Invariants:
//!   - A channel key never maps to an empty bucket; the bucket is deleted
//!     the moment its last entry is removed.
//!   - Entries within a bucket keep registration order, which is dispatch
//!     order.
//!   - Handles are allocated from a counter that never resets, so a handle
//!     is never reused for the lifetime of the registry.

use std::collections::HashMap;
use std::sync::Arc;

/// Handle identifying one registration, returned by
/// [`Registry::insert`] and the `Emitter` subscribe methods.
///
/// Every registration gets its own handle, including repeated registrations
/// of the same callback, so removal by handle always targets exactly one
/// entry.
pub type ListenerId = u64;

/// Closure type stored in the registry.
///
/// The first argument is the channel key named by the emit. Listeners on a
/// specific channel usually ignore it; wildcard listeners use it to learn
/// which channel actually fired.
pub type ListenerFn<T> = dyn Fn(&str, &T) + Send + Sync;

/// One registered listener plus its once-bookkeeping.
pub struct Entry<T> {
    id: ListenerId,
    callback: Arc<ListenerFn<T>>,
    once: bool,
}

// Manual impl: a derived Clone would require T: Clone.
impl<T> Clone for Entry<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: Arc::clone(&self.callback),
            once: self.once,
        }
    }
}

impl<T> Entry<T> {
    /// The handle this entry was registered under.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Whether this entry must be removed before its first invocation.
    pub fn is_once(&self) -> bool {
        self.once
    }

    /// Invoke the callback with the emitted channel key and event.
    pub fn call(&self, channel: &str, event: &T) {
        (self.callback)(channel, event);
    }
}

impl<T> std::fmt::Debug for Entry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("once", &self.once)
            .finish()
    }
}

/// Channel-keyed listener table.
pub struct Registry<T> {
    channels: HashMap<String, Vec<Entry<T>>>,
    next_id: ListenerId,
}

impl<T> Registry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            channels: HashMap::new(),
            next_id: 1,
        }
    }

    /// Append a new entry to `channel`, creating the bucket on first use.
    ///
    /// Duplicate callbacks are permitted; each insert is an independent
    /// entry with its own handle and is invoked independently per emit.
    pub fn insert(&mut self, channel: &str, callback: Arc<ListenerFn<T>>, once: bool) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        self.channels
            .entry(channel.to_string())
            .or_default()
            .push(Entry { id, callback, once });
        id
    }

    /// Remove the entry registered under `id` from `channel`.
    ///
    /// Removes at most one entry. Returns `false` when the channel or the
    /// handle is unknown — never an error. Prunes the bucket if it became
    /// empty.
    pub fn remove(&mut self, channel: &str, id: ListenerId) -> bool {
        let Some(bucket) = self.channels.get_mut(channel) else {
            return false;
        };
        let Some(index) = bucket.iter().position(|e| e.id == id) else {
            return false;
        };
        bucket.remove(index);
        if bucket.is_empty() {
            self.channels.remove(channel);
        }
        true
    }

    /// Drop `channel`'s whole bucket. Returns `false` if it did not exist.
    pub fn remove_channel(&mut self, channel: &str) -> bool {
        self.channels.remove(channel).is_some()
    }

    /// Drop every channel and every entry.
    pub fn clear(&mut self) {
        self.channels.clear();
    }

    /// Clone of `channel`'s current bucket — the frozen dispatch list.
    ///
    /// Empty when no listeners are registered. Mutating the registry after
    /// taking a snapshot does not affect it.
    pub fn snapshot(&self, channel: &str) -> Vec<Entry<T>> {
        self.channels.get(channel).cloned().unwrap_or_default()
    }

    /// Handles currently registered on `channel`, in registration order.
    pub fn ids(&self, channel: &str) -> Vec<ListenerId> {
        self.channels
            .get(channel)
            .map(|bucket| bucket.iter().map(|e| e.id).collect())
            .unwrap_or_default()
    }

    /// True iff `channel`'s bucket is non-empty.
    pub fn has_listeners(&self, channel: &str) -> bool {
        self.channels.contains_key(channel)
    }

    /// Number of entries on `channel`.
    pub fn channel_len(&self, channel: &str) -> usize {
        self.channels.get(channel).map_or(0, Vec::len)
    }

    /// Total number of entries across all channels.
    pub fn len(&self) -> usize {
        self.channels.values().map(Vec::len).sum()
    }

    /// True iff no entries are registered at all.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Keys of all channels with at least one listener. Unordered.
    pub fn channel_names(&self) -> Vec<String> {
        self.channels.keys().cloned().collect()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("channels", &self.channels.len())
            .field("listeners", &self.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn noop<T>() -> Arc<ListenerFn<T>> {
        Arc::new(|_: &str, _: &T| {})
    }

    #[test]
    fn insert_allocates_monotonic_handles() {
        let mut reg: Registry<()> = Registry::new();
        let a = reg.insert("foo", noop(), false);
        let b = reg.insert("foo", noop(), false);
        let c = reg.insert("bar", noop(), false);
        assert!(a < b && b < c, "handles must increase: {a}, {b}, {c}");
    }

    #[test]
    fn remove_prunes_empty_bucket() {
        let mut reg: Registry<()> = Registry::new();
        let id = reg.insert("foo", noop(), false);
        assert!(reg.has_listeners("foo"));

        assert!(reg.remove("foo", id));
        assert!(!reg.has_listeners("foo"));
        assert!(
            !reg.channel_names().contains(&"foo".to_string()),
            "empty bucket must be deleted, not kept as a dangling key"
        );
    }

    #[test]
    fn remove_keeps_bucket_while_entries_remain() {
        let mut reg: Registry<()> = Registry::new();
        let a = reg.insert("foo", noop(), false);
        let _b = reg.insert("foo", noop(), false);

        assert!(reg.remove("foo", a));
        assert!(reg.has_listeners("foo"));
        assert_eq!(reg.channel_len("foo"), 1);
    }

    #[test]
    fn remove_unknown_channel_or_handle_is_a_no_op() {
        let mut reg: Registry<()> = Registry::new();
        assert!(!reg.remove("missing", 1));

        let id = reg.insert("foo", noop(), false);
        assert!(!reg.remove("foo", id + 100));
        assert_eq!(reg.channel_len("foo"), 1);
    }

    #[test]
    fn remove_targets_exactly_one_entry() {
        let mut reg: Registry<()> = Registry::new();
        let shared = noop();
        let a = reg.insert("foo", Arc::clone(&shared), false);
        let _b = reg.insert("foo", shared, false);

        assert!(reg.remove("foo", a));
        assert_eq!(
            reg.channel_len("foo"),
            1,
            "duplicate registrations are independent entries"
        );
    }

    #[test]
    fn snapshot_is_isolated_from_later_mutation() {
        let mut reg: Registry<()> = Registry::new();
        let a = reg.insert("foo", noop(), false);
        let snap = reg.snapshot("foo");

        reg.remove("foo", a);
        reg.insert("foo", noop(), false);

        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].id(), a);
    }

    #[test]
    fn clear_empties_everything() {
        let mut reg: Registry<()> = Registry::new();
        reg.insert("a", noop(), false);
        reg.insert("b", noop(), false);

        reg.clear();

        assert!(reg.is_empty());
        assert_eq!(reg.len(), 0);
        assert!(reg.channel_names().is_empty());
    }

    #[test]
    fn ids_preserve_registration_order() {
        let mut reg: Registry<()> = Registry::new();
        let a = reg.insert("foo", noop(), false);
        let b = reg.insert("foo", noop(), false);
        let c = reg.insert("foo", noop(), false);
        assert_eq!(reg.ids("foo"), vec![a, b, c]);
    }
}
