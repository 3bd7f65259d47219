use std::any::Any;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use dashmap::DashMap;

use crate::key::Key;
use crate::store::{unerase, ConcurrentTokenStore, Entry};

/// The concurrency-safe counterpart of [`TokenMap`](crate::TokenMap).
///
/// Same contract, shared-access signatures: every operation takes `&self`,
/// each single-key operation is atomic without external locking, and the
/// handle is cheap to clone; clones share one backing store. Concurrent
/// inserts to the same `(name, type)` pair resolve to last-writer-wins.
///
/// Only single-key operations are atomic. A contains-then-insert sequence
/// is two operations; callers needing it atomic must synchronize
/// externally. Whole-store sweeps (`contains_value` and `keys`) are weakly
/// consistent: entries inserted or removed mid-sweep may or may not be
/// observed, but the sweep itself never corrupts or panics.
///
/// # Examples
///
/// ```
/// use std::thread;
/// use tokenmap::ConcurrentTokenMap;
///
/// let map = ConcurrentTokenMap::new();
/// map.insert("visits", 0u32);
///
/// let worker = {
///     let map = map.clone();
///     thread::spawn(move || {
///         map.with_mut("visits", |count: &mut u32| *count += 1);
///     })
/// };
/// worker.join().unwrap();
///
/// assert_eq!(map.get::<u32>("visits"), Some(1));
/// ```
pub struct ConcurrentTokenMap<N, S = Arc<DashMap<Key<N>, Entry>>> {
    store: S,
    _name: PhantomData<N>,
}

impl<N: Eq + Hash + 'static> ConcurrentTokenMap<N> {
    /// Creates an empty map over an owned, default-capacity backing store.
    pub fn new() -> Self {
        Self::of(Arc::new(DashMap::new()))
    }

    /// Creates an empty map pre-sized for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::of(Arc::new(DashMap::with_capacity(capacity)))
    }
}

impl<N, S> ConcurrentTokenMap<N, S>
where
    N: Eq + Hash,
    S: ConcurrentTokenStore<N>,
{
    /// Wraps a caller-supplied concurrency-safe backing store.
    ///
    /// The store stays owned by whoever created it; cloning an
    /// `Arc<DashMap<..>>` and passing one clone here leaves the caller with
    /// a handle through which writes on either side are visible to the
    /// other. The [`ConcurrentTokenStore`] bound is the precondition: a
    /// store without safe shared mutation cannot be passed in at all.
    pub fn of(store: S) -> Self {
        Self {
            store,
            _name: PhantomData,
        }
    }

    /// Stores `value` under `(name, T)`, returning the value previously
    /// stored under that exact pair.
    pub fn insert<T: Any + Send + Sync>(&self, name: N, value: T) -> Option<T> {
        self.store
            .insert(Key::of::<T>(name), Box::new(value))
            .and_then(unerase)
    }

    /// Returns a clone of the value stored under `(name, T)`, or `None` if
    /// the pair is absent, including when the name exists only under other
    /// types. For values that cannot be cloned, use
    /// [`with`](ConcurrentTokenMap::with).
    pub fn get<T: Any + Clone>(&self, name: N) -> Option<T> {
        self.store
            .read(&Key::of::<T>(name), |entry| {
                entry.downcast_ref::<T>().cloned()
            })
            .flatten()
    }

    /// Returns a clone of the value stored under `(name, T)`, or `default`
    /// if the pair is absent.
    pub fn get_or_default<T: Any + Clone>(&self, name: N, default: T) -> T {
        self.get(name).unwrap_or(default)
    }

    /// Runs `f` on the value stored under `(name, T)`.
    ///
    /// The closure runs while the store's per-key synchronization is held,
    /// so it must not call back into this map: re-entry on the same shard
    /// can deadlock. Keep closures short and free of map operations.
    pub fn with<T: Any, R>(&self, name: N, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.store
            .read(&Key::of::<T>(name), |entry| entry.downcast_ref().map(f))
            .flatten()
    }

    /// Like [`with`](ConcurrentTokenMap::with), but `f` receives a mutable
    /// reference. The same re-entry caveat applies.
    ///
    /// # Examples
    ///
    /// ```
    /// use tokenmap::ConcurrentTokenMap;
    ///
    /// let map = ConcurrentTokenMap::new();
    /// map.insert("scores", vec![3u32, 7]);
    ///
    /// map.with_mut("scores", |scores: &mut Vec<u32>| scores.push(11));
    /// assert_eq!(map.with("scores", |scores: &Vec<u32>| scores.len()), Some(3));
    /// ```
    pub fn with_mut<T: Any, R>(&self, name: N, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.store
            .write(&Key::of::<T>(name), |entry| entry.downcast_mut().map(f))
            .flatten()
    }

    /// Whether an entry exists under the exact `(name, T)` pair.
    pub fn contains_key<T: Any>(&self, name: N) -> bool {
        self.store.contains_key(&Key::of::<T>(name))
    }

    /// Whether any stored value equals `value`. Walks every entry; weakly
    /// consistent under concurrent mutation.
    pub fn contains_value<T: Any + PartialEq>(&self, value: &T) -> bool {
        self.store
            .scan(|_, entry| entry.downcast_ref::<T>() == Some(value))
    }

    /// Removes and returns the value stored under `(name, T)`.
    pub fn remove<T: Any>(&self, name: N) -> Option<T> {
        self.store.remove(&Key::of::<T>(name)).and_then(unerase)
    }

    /// Number of entries, counting each `(name, type)` pair separately.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.len() == 0
    }

    /// Snapshot of the keys of all entries; weakly consistent under
    /// concurrent mutation.
    pub fn keys(&self) -> Vec<Key<N>>
    where
        N: Clone,
    {
        let mut keys = Vec::new();
        self.store.scan(|key, _| {
            keys.push(key.clone());
            false
        });
        keys
    }

    /// The raw backing store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<N, S: Clone> Clone for ConcurrentTokenMap<N, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _name: PhantomData,
        }
    }
}

impl<N: Eq + Hash + 'static> Default for ConcurrentTokenMap<N> {
    fn default() -> Self {
        Self::new()
    }
}
