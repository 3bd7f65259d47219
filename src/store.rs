use std::any::Any;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use dashmap::DashMap;

use crate::key::Key;

/// A stored value with its static type erased.
///
/// The [`Key`] indexing an entry carries the witness needed to restore the
/// concrete type on the way out, so the entry itself is an untyped box.
pub type Entry = Box<dyn Any + Send + Sync>;

/// Recovers the concrete value from an entry taken out of a backing store.
pub(crate) fn unerase<T: Any>(entry: Entry) -> Option<T> {
    entry.downcast().ok().map(|boxed| *boxed)
}

/// The mapping capability required to back a [`TokenMap`](crate::TokenMap).
///
/// Mutation requires exclusive access, matching the single-owner model of
/// the non-concurrent family. Implemented for `std::collections::HashMap`
/// under any hasher, and for `&mut S` so a map can be a temporary typed
/// view over a store the caller keeps.
pub trait TokenStore<N> {
    fn get(&self, key: &Key<N>) -> Option<&Entry>;

    fn get_mut(&mut self, key: &Key<N>) -> Option<&mut Entry>;

    /// Inserts the entry, returning the one previously stored under `key`.
    fn insert(&mut self, key: Key<N>, entry: Entry) -> Option<Entry>;

    fn remove(&mut self, key: &Key<N>) -> Option<Entry>;

    fn contains_key(&self, key: &Key<N>) -> bool;

    fn len(&self) -> usize;

    fn iter<'a>(&'a self) -> impl Iterator<Item = (&'a Key<N>, &'a Entry)>
    where
        N: 'a;
}

impl<N, H> TokenStore<N> for HashMap<Key<N>, Entry, H>
where
    N: Eq + Hash,
    H: BuildHasher,
{
    fn get(&self, key: &Key<N>) -> Option<&Entry> {
        HashMap::get(self, key)
    }

    fn get_mut(&mut self, key: &Key<N>) -> Option<&mut Entry> {
        HashMap::get_mut(self, key)
    }

    fn insert(&mut self, key: Key<N>, entry: Entry) -> Option<Entry> {
        HashMap::insert(self, key, entry)
    }

    fn remove(&mut self, key: &Key<N>) -> Option<Entry> {
        HashMap::remove(self, key)
    }

    fn contains_key(&self, key: &Key<N>) -> bool {
        HashMap::contains_key(self, key)
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn iter<'a>(&'a self) -> impl Iterator<Item = (&'a Key<N>, &'a Entry)>
    where
        N: 'a,
    {
        HashMap::iter(self)
    }
}

// A mutable borrow of a store is itself a store. This is what makes the
// proxied construction mode a borrowing view: the caller keeps ownership
// and regains direct access once the view is dropped.
impl<N, S: TokenStore<N>> TokenStore<N> for &mut S {
    fn get(&self, key: &Key<N>) -> Option<&Entry> {
        (**self).get(key)
    }

    fn get_mut(&mut self, key: &Key<N>) -> Option<&mut Entry> {
        (**self).get_mut(key)
    }

    fn insert(&mut self, key: Key<N>, entry: Entry) -> Option<Entry> {
        (**self).insert(key, entry)
    }

    fn remove(&mut self, key: &Key<N>) -> Option<Entry> {
        (**self).remove(key)
    }

    fn contains_key(&self, key: &Key<N>) -> bool {
        (**self).contains_key(key)
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn iter<'a>(&'a self) -> impl Iterator<Item = (&'a Key<N>, &'a Entry)>
    where
        N: 'a,
    {
        (**self).iter()
    }
}

/// The mapping capability required to back a
/// [`ConcurrentTokenMap`](crate::ConcurrentTokenMap).
///
/// Every operation takes `&self` and the implementation must make each
/// single-key operation atomic; concurrent inserts to the same key resolve
/// to last-writer-wins with no corruption. Nothing beyond single-key
/// atomicity is required: a contains-then-insert sequence composed by the
/// caller is not atomic.
///
/// Implemented for [`dashmap::DashMap`] under any hasher, and for `Arc<S>`
/// so one store can be shared between several maps and the caller.
pub trait ConcurrentTokenStore<N> {
    /// Inserts the entry, returning the one previously stored under `key`.
    fn insert(&self, key: Key<N>, entry: Entry) -> Option<Entry>;

    fn remove(&self, key: &Key<N>) -> Option<Entry>;

    fn contains_key(&self, key: &Key<N>) -> bool;

    fn len(&self) -> usize;

    /// Runs `f` on the entry under `key` while the store's own per-key
    /// synchronization is held.
    fn read<R>(&self, key: &Key<N>, f: impl FnOnce(&Entry) -> R) -> Option<R>;

    /// Like [`read`](ConcurrentTokenStore::read), with mutable access.
    fn write<R>(&self, key: &Key<N>, f: impl FnOnce(&mut Entry) -> R) -> Option<R>;

    /// Sweeps the store, stopping at the first entry `f` accepts and
    /// reporting whether one was found. The sweep is weakly consistent:
    /// entries inserted or removed while it runs may or may not be visited.
    fn scan(&self, f: impl FnMut(&Key<N>, &Entry) -> bool) -> bool;
}

impl<N, H> ConcurrentTokenStore<N> for DashMap<Key<N>, Entry, H>
where
    N: Eq + Hash + 'static,
    H: BuildHasher + Clone,
{
    fn insert(&self, key: Key<N>, entry: Entry) -> Option<Entry> {
        DashMap::insert(self, key, entry)
    }

    fn remove(&self, key: &Key<N>) -> Option<Entry> {
        DashMap::remove(self, key).map(|(_, entry)| entry)
    }

    fn contains_key(&self, key: &Key<N>) -> bool {
        DashMap::contains_key(self, key)
    }

    fn len(&self) -> usize {
        DashMap::len(self)
    }

    fn read<R>(&self, key: &Key<N>, f: impl FnOnce(&Entry) -> R) -> Option<R> {
        DashMap::get(self, key).map(|guard| f(guard.value()))
    }

    fn write<R>(&self, key: &Key<N>, f: impl FnOnce(&mut Entry) -> R) -> Option<R> {
        DashMap::get_mut(self, key).map(|mut guard| f(guard.value_mut()))
    }

    fn scan(&self, mut f: impl FnMut(&Key<N>, &Entry) -> bool) -> bool {
        DashMap::iter(self).any(|guard| f(guard.key(), guard.value()))
    }
}

// Shared handles to a concurrent store are stores themselves, which is the
// whole proxied mode: clone the Arc, hand one clone to the map, keep the
// other, and both sides observe each other's writes.
impl<N, S: ConcurrentTokenStore<N>> ConcurrentTokenStore<N> for Arc<S> {
    fn insert(&self, key: Key<N>, entry: Entry) -> Option<Entry> {
        (**self).insert(key, entry)
    }

    fn remove(&self, key: &Key<N>) -> Option<Entry> {
        (**self).remove(key)
    }

    fn contains_key(&self, key: &Key<N>) -> bool {
        (**self).contains_key(key)
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn read<R>(&self, key: &Key<N>, f: impl FnOnce(&Entry) -> R) -> Option<R> {
        (**self).read(key, f)
    }

    fn write<R>(&self, key: &Key<N>, f: impl FnOnce(&mut Entry) -> R) -> Option<R> {
        (**self).write(key, f)
    }

    fn scan(&self, f: impl FnMut(&Key<N>, &Entry) -> bool) -> bool {
        (**self).scan(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry<T: Any + Send + Sync>(value: T) -> Entry {
        Box::new(value)
    }

    #[test]
    fn hash_map_implements_the_capability() {
        let mut store: HashMap<Key<&str>, Entry> = HashMap::new();
        assert!(TokenStore::insert(&mut store, Key::of::<i32>("a"), entry(1i32)).is_none());

        assert!(TokenStore::contains_key(&store, &Key::of::<i32>("a")));
        assert!(!TokenStore::contains_key(&store, &Key::of::<i64>("a")));
        assert_eq!(TokenStore::len(&store), 1);

        let previous = TokenStore::insert(&mut store, Key::of::<i32>("a"), entry(2i32));
        assert_eq!(unerase::<i32>(previous.unwrap()), Some(1));
    }

    #[test]
    fn mutable_borrow_is_a_store() {
        let mut store: HashMap<Key<&str>, Entry> = HashMap::new();
        {
            let mut view = &mut store;
            TokenStore::insert(&mut view, Key::of::<u8>("b"), entry(7u8));
            assert!(TokenStore::contains_key(&view, &Key::of::<u8>("b")));
        }
        assert!(store.contains_key(&Key::of::<u8>("b")));
    }

    #[test]
    fn arc_handle_is_a_concurrent_store() {
        let shared = Arc::new(DashMap::new());
        let handle = Arc::clone(&shared);

        ConcurrentTokenStore::insert(&handle, Key::of::<u8>("b"), entry(7u8));
        assert!(ConcurrentTokenStore::contains_key(&shared, &Key::of::<u8>("b")));

        let seen = ConcurrentTokenStore::read(&shared, &Key::of::<u8>("b"), |e| {
            e.downcast_ref::<u8>().copied()
        });
        assert_eq!(seen, Some(Some(7)));
    }

    #[test]
    fn custom_hasher_store_behaves_identically() {
        let mut store: HashMap<Key<&str>, Entry, fxhash::FxBuildHasher> =
            HashMap::with_hasher(fxhash::FxBuildHasher::default());
        TokenStore::insert(&mut store, Key::of::<&str>("motd"), entry("welcome"));

        let found = TokenStore::get(&store, &Key::of::<&str>("motd"))
            .and_then(|e| e.downcast_ref::<&str>());
        assert_eq!(found, Some(&"welcome"));
    }

    #[test]
    fn scan_short_circuits_on_a_hit() {
        let store: DashMap<Key<&str>, Entry> = DashMap::new();
        ConcurrentTokenStore::insert(&store, Key::of::<i32>("a"), entry(1i32));
        ConcurrentTokenStore::insert(&store, Key::of::<i32>("b"), entry(2i32));

        let mut visited = 0;
        let hit = ConcurrentTokenStore::scan(&store, |_, _| {
            visited += 1;
            true
        });
        assert!(hit);
        assert_eq!(visited, 1);
    }
}
