use std::any::Any;
use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::key::Key;
use crate::store::{unerase, Entry, TokenStore};

/// A single-owner container holding values of many types, each stored under
/// a `(name, type)` pair.
///
/// Because entries are keyed by [`Key`] rather than by name alone, the same
/// name can carry several values as long as each lives under a different
/// type; a plain map could only do that through unchecked casts. Reading
/// a name that exists under a *different* type than the one requested
/// behaves as absence, not as an error; callers that need to distinguish
/// "never set" from "set under another type" cannot do so through this API.
///
/// Mutation requires `&mut self`: there is no internal synchronization, and
/// sharing across threads is rejected at compile time rather than left as a
/// data race. For shared mutation use
/// [`ConcurrentTokenMap`](crate::ConcurrentTokenMap).
///
/// # Examples
///
/// ```
/// use tokenmap::TokenMap;
///
/// let mut map = TokenMap::new();
/// map.insert("radius", 4i32);
/// map.insert("radius", "four");
///
/// assert_eq!(map.get::<i32>("radius"), Some(&4));
/// assert_eq!(map.get::<&str>("radius"), Some(&"four"));
/// assert_eq!(map.get::<f64>("radius"), None);
/// ```
pub struct TokenMap<N, S = HashMap<Key<N>, Entry>> {
    store: S,
    _name: PhantomData<N>,
}

impl<N: Eq + Hash> TokenMap<N> {
    /// Creates an empty map over an owned, default-capacity backing store.
    pub fn new() -> Self {
        Self::of(HashMap::new())
    }

    /// Creates an empty map pre-sized for `capacity` entries.
    ///
    /// Purely a performance hint; behavior is identical to [`TokenMap::new`].
    pub fn with_capacity(capacity: usize) -> Self {
        Self::of(HashMap::with_capacity(capacity))
    }
}

impl<N, S> TokenMap<N, S>
where
    N: Eq + Hash,
    S: TokenStore<N>,
{
    /// Wraps a caller-built backing store.
    ///
    /// Passing a store by value transfers ownership to the map; it can be
    /// reclaimed with [`into_store`](TokenMap::into_store). Passing `&mut
    /// store` instead makes the map a temporary typed view: the caller
    /// keeps the store, and writes made through either side are visible to
    /// the other.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use tokenmap::{Entry, Key, TokenMap};
    ///
    /// let mut raw = HashMap::new();
    /// let seeded: Entry = Box::new(9u8);
    /// raw.insert(Key::of::<u8>("lives"), seeded);
    ///
    /// let mut view = TokenMap::of(&mut raw);
    /// assert_eq!(view.get::<u8>("lives"), Some(&9));
    /// assert_eq!(view.insert("lives", 7u8), Some(9));
    ///
    /// let direct = raw[&Key::of::<u8>("lives")].downcast_ref::<u8>();
    /// assert_eq!(direct, Some(&7));
    /// ```
    pub fn of(store: S) -> Self {
        Self {
            store,
            _name: PhantomData,
        }
    }

    /// Stores `value` under `(name, T)`, returning the value previously
    /// stored under that exact pair.
    ///
    /// An entry under the same name but another type is left untouched.
    pub fn insert<T: Any + Send + Sync>(&mut self, name: N, value: T) -> Option<T> {
        self.store
            .insert(Key::of::<T>(name), Box::new(value))
            .and_then(unerase)
    }

    /// Returns the value stored under `(name, T)`, or `None` if the pair is
    /// absent, including when the name exists only under other types.
    pub fn get<T: Any>(&self, name: N) -> Option<&T> {
        self.store
            .get(&Key::of::<T>(name))
            .and_then(|entry| entry.downcast_ref())
    }

    /// Mutable counterpart of [`get`](TokenMap::get).
    pub fn get_mut<T: Any>(&mut self, name: N) -> Option<&mut T> {
        self.store
            .get_mut(&Key::of::<T>(name))
            .and_then(|entry| entry.downcast_mut())
    }

    /// Returns the value stored under `(name, T)`, or `default` if the pair
    /// is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use tokenmap::TokenMap;
    ///
    /// let mut map = TokenMap::new();
    /// assert_eq!(map.get_or_default("a", 1i32), 1);
    ///
    /// map.insert("a", 5i32);
    /// assert_eq!(map.get_or_default("a", 1i32), 5);
    /// ```
    pub fn get_or_default<T: Any + Clone>(&self, name: N, default: T) -> T {
        self.get(name).cloned().unwrap_or(default)
    }

    /// Whether an entry exists under the exact `(name, T)` pair.
    pub fn contains_key<T: Any>(&self, name: N) -> bool {
        self.store.contains_key(&Key::of::<T>(name))
    }

    /// Whether any stored value equals `value`. Walks every entry.
    pub fn contains_value<T: Any + PartialEq>(&self, value: &T) -> bool {
        self.store
            .iter()
            .any(|(_, entry)| entry.downcast_ref::<T>() == Some(value))
    }

    /// Removes and returns the value stored under `(name, T)`.
    pub fn remove<T: Any>(&mut self, name: N) -> Option<T> {
        self.store.remove(&Key::of::<T>(name)).and_then(unerase)
    }

    /// Number of entries, counting each `(name, type)` pair separately.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.len() == 0
    }

    /// Iterates over the keys of all entries.
    pub fn keys(&self) -> impl Iterator<Item = &Key<N>> {
        self.store.iter().map(|(key, _)| key)
    }

    /// The raw backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The raw backing store, mutably. Entries written here bypass the
    /// typed surface; a value filed under a key witnessing a different type
    /// is simply never found by [`get`](TokenMap::get).
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consumes the map, handing the backing store back to the caller.
    pub fn into_store(self) -> S {
        self.store
    }
}

impl<N: Eq + Hash> Default for TokenMap<N> {
    fn default() -> Self {
        Self::new()
    }
}
