//! # tokenmap
//!
//! A type-safe heterogeneous container keyed jointly by name and type.
//!
//! `tokenmap` stores values of many different types in one collection. Each
//! entry is indexed by a [`Key`]: the pairing of a logical name with a type
//! witness. Because the type is part of the key, the same name can hold an
//! `i32`, a `String` and a `Duration` side by side, and retrieval is fully
//! typed at the call site even though storage is type-erased internally.
//!
//! ## Key Features
//!
//! - **Type-safe**: `get::<T>` only ever returns values stored as `T`
//! - **Per-name slots, partitioned by type**: no unchecked casts, no
//!   one-value-per-name restriction
//! - **Pluggable backing store**: owned, pre-sized, or proxied over a
//!   store the caller keeps, via the [`TokenStore`] and
//!   [`ConcurrentTokenStore`] capability traits
//! - **Two families**: [`TokenMap`] for single-owner use,
//!   [`ConcurrentTokenMap`] for lock-free sharing across threads (backed
//!   by [`dashmap`])
//!
//! ## Usage Examples
//!
//! ### Basic Usage
//!
//! ```rust
//! use tokenmap::TokenMap;
//!
//! let mut map = TokenMap::new();
//!
//! // Store values of different types under the same name
//! map.insert("spawn", 12i64);
//! map.insert("spawn", "world_spawn");
//!
//! // Retrieve them in a type-safe way
//! assert_eq!(map.get::<i64>("spawn"), Some(&12));
//! assert_eq!(map.get::<&str>("spawn"), Some(&"world_spawn"));
//!
//! // A name held under a different type behaves as absent, not as an error
//! assert_eq!(map.get::<f32>("spawn"), None);
//! assert_eq!(map.get_or_default("spawn", 1.5f32), 1.5);
//! ```
//!
//! ### Overwrite Semantics
//!
//! ```rust
//! use tokenmap::TokenMap;
//!
//! let mut map = TokenMap::new();
//!
//! assert_eq!(map.insert("a", "b"), None);
//! assert_eq!(map.insert("a", "c"), Some("b")); // previous value comes back
//! assert_eq!(map.len(), 1);
//! ```
//!
//! ### Proxied Backing Stores
//!
//! A map can wrap a store the caller built and keeps, which is handy for
//! dependency injection and tests. Writes on either side are visible to
//! the other.
//!
//! ```rust
//! use std::collections::HashMap;
//! use tokenmap::{Entry, Key, TokenMap};
//!
//! let mut raw = HashMap::new();
//! let seeded: Entry = Box::new(20u32);
//! raw.insert(Key::of::<u32>("max_players"), seeded);
//!
//! let mut view = TokenMap::of(&mut raw);
//! assert_eq!(view.get::<u32>("max_players"), Some(&20));
//! view.insert("motd", "welcome".to_string());
//!
//! // The view is gone; the caller still owns the store, writes included.
//! assert_eq!(raw.len(), 2);
//! ```
//!
//! ### Sharing State Between Threads
//!
//! ```rust
//! use std::thread;
//! use tokenmap::ConcurrentTokenMap;
//!
//! let map = ConcurrentTokenMap::new();
//!
//! let workers: Vec<_> = (0..4)
//!     .map(|id: i32| {
//!         let map = map.clone();
//!         thread::spawn(move || {
//!             map.insert(format!("worker-{id}"), id);
//!         })
//!     })
//!     .collect();
//! for worker in workers {
//!     worker.join().unwrap();
//! }
//!
//! assert_eq!(map.len(), 4);
//! assert_eq!(map.get::<i32>("worker-3".to_string()), Some(3));
//! ```
//!
//! ## Absence Over Errors
//!
//! Reading a name that exists only under another type returns `None` (or
//! the caller's default), identical to a name that was never stored. This
//! trades strictness for simplicity: no operation in this crate returns an
//! error or panics on a type mismatch, and callers that must distinguish
//! "never set" from "set under another type" need to track that
//! themselves. The same softening applies to entries written through the
//! raw-store escape hatch under a key whose witness does not match the
//! boxed value: such entries are simply never found.

mod concurrent;
mod key;
mod map;
mod store;

pub use concurrent::ConcurrentTokenMap;
pub use key::Key;
pub use map::TokenMap;
pub use store::{ConcurrentTokenStore, Entry, TokenStore};

// Re-export std::any for convenience
pub use std::any::{Any, TypeId};
