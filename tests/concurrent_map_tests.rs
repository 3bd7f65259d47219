use std::sync::Arc;
use std::thread;

use dashmap::DashMap;
use tokenmap::{ConcurrentTokenMap, ConcurrentTokenStore, Entry, Key};

/// The contract every construction mode must satisfy; identical to the
/// single-owner family's, through shared-access signatures.
fn contract<S: ConcurrentTokenStore<&'static str>>(map: ConcurrentTokenMap<&'static str, S>) {
    assert!(map.is_empty());

    assert_eq!(map.insert("a", 1i32), None);
    assert!(map.contains_key::<i32>("a"));
    assert_eq!(map.get::<i32>("a"), Some(1));

    assert!(!map.contains_key::<i64>("a"));
    assert_eq!(map.get::<i64>("a"), None);
    assert_eq!(map.get_or_default("a", 9i64), 9);

    assert_eq!(map.insert("a", 5i32), Some(1));
    assert_eq!(map.get_or_default("a", 2i32), 5);

    map.insert("a", "text");
    assert_eq!(map.len(), 2);
    assert_eq!(map.get::<i32>("a"), Some(5));
    assert_eq!(map.get::<&str>("a"), Some("text"));

    assert_eq!(map.remove::<i32>("a"), Some(5));
    assert!(!map.contains_key::<i32>("a"));
    assert_eq!(map.len(), 1);
}

#[test]
fn default_construction_satisfies_the_contract() {
    contract(ConcurrentTokenMap::new());
}

#[test]
fn sized_construction_satisfies_the_contract() {
    contract(ConcurrentTokenMap::with_capacity(1));
}

#[test]
fn proxied_construction_satisfies_the_contract() {
    let shared = Arc::new(DashMap::new());
    contract(ConcurrentTokenMap::of(Arc::clone(&shared)));
}

#[test]
fn proxied_store_is_shared_not_owned() {
    let shared: Arc<DashMap<Key<&str>, Entry>> = Arc::new(DashMap::new());
    let map = ConcurrentTokenMap::of(Arc::clone(&shared));

    // the map wraps the very store the caller kept
    assert!(Arc::ptr_eq(map.store(), &shared));

    // writes on the caller's handle are visible through the map
    let seeded: Entry = Box::new(9u8);
    shared.insert(Key::of::<u8>("lives"), seeded);
    assert_eq!(map.get::<u8>("lives"), Some(9));

    // and map writes are visible on the caller's handle
    map.insert("motd", "welcome");
    assert!(shared.contains_key(&Key::of::<&str>("motd")));
}

#[test]
fn two_maps_over_one_store_observe_each_other() {
    let shared = Arc::new(DashMap::new());
    let first = ConcurrentTokenMap::of(Arc::clone(&shared));
    let second = ConcurrentTokenMap::of(shared);

    first.insert("round", 3u32);
    assert_eq!(second.get::<u32>("round"), Some(3));

    second.with_mut("round", |round: &mut u32| *round += 1);
    assert_eq!(first.get::<u32>("round"), Some(4));
}

#[test]
fn with_and_with_mut_access_without_cloning() {
    let map = ConcurrentTokenMap::new();
    map.insert("scores", vec![3u32, 7]);

    assert_eq!(map.with("scores", |scores: &Vec<u32>| scores.len()), Some(2));
    map.with_mut("scores", |scores: &mut Vec<u32>| scores.push(11));
    assert_eq!(map.with("scores", |scores: &Vec<u32>| scores.len()), Some(3));

    // wrong type or missing name: the closure never runs
    assert_eq!(map.with("scores", |_: &Vec<u64>| ()), None);
    assert_eq!(map.with_mut("absent", |_: &mut Vec<u32>| ()), None);
}

#[test]
fn distinct_keys_see_no_cross_talk_under_load() {
    let map: ConcurrentTokenMap<String> = ConcurrentTokenMap::new();

    let writers: Vec<_> = (0..8)
        .map(|id: usize| {
            let map = map.clone();
            thread::spawn(move || {
                for round in 0..100 {
                    let name = format!("slot-{id}");
                    map.insert(name.clone(), id * 1000 + round);
                    // a reader must only ever observe its own writes
                    let seen = map.get::<usize>(name).unwrap();
                    assert_eq!(seen / 1000, id);
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    assert_eq!(map.len(), 8);
}

#[test]
fn same_key_writers_resolve_to_last_writer_wins() {
    let map: ConcurrentTokenMap<&str> = ConcurrentTokenMap::new();

    let writers: Vec<_> = (0..8)
        .map(|id: u64| {
            let map = map.clone();
            thread::spawn(move || {
                map.insert("shared", id);
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    // exactly one write survives, uncorrupted
    assert_eq!(map.len(), 1);
    let survivor = map.get::<u64>("shared").unwrap();
    assert!(survivor < 8);
}

#[test]
fn in_place_mutation_is_atomic_per_key() {
    let map: ConcurrentTokenMap<&str> = ConcurrentTokenMap::new();
    map.insert("counter", 0u64);

    let workers: Vec<_> = (0..10)
        .map(|_| {
            let map = map.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    map.with_mut("counter", |counter: &mut u64| *counter += 1);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(map.get::<u64>("counter"), Some(1000));
}

#[test]
fn sweeps_stay_sound_while_the_store_churns() {
    let map: ConcurrentTokenMap<String> = ConcurrentTokenMap::new();
    map.insert("anchor".to_string(), u32::MAX);

    let churn: Vec<_> = (0..4)
        .map(|id: u32| {
            let map = map.clone();
            thread::spawn(move || {
                for round in 0..200u32 {
                    let name = format!("churn-{id}");
                    map.insert(name.clone(), round);
                    map.remove::<u32>(name);
                }
            })
        })
        .collect();

    // weakly consistent sweeps: entries may come and go mid-scan, but the
    // anchor is always found and the scan never panics
    for _ in 0..200 {
        assert!(map.contains_value(&u32::MAX));
        assert!(!map.keys().is_empty());
    }

    for worker in churn {
        worker.join().unwrap();
    }
    assert_eq!(map.len(), 1);
}

#[test]
fn keys_snapshot_renders_both_components() {
    let map = ConcurrentTokenMap::new();
    map.insert("a", 1u8);
    map.insert("a", "text");

    let mut keys: Vec<String> = map.keys().iter().map(|key| key.to_string()).collect();
    keys.sort();
    assert_eq!(
        keys,
        vec!["Key[name: a type: &str]", "Key[name: a type: u8]"]
    );
}

#[test]
fn custom_hasher_stores_are_a_drop_in() {
    let store: DashMap<Key<&str>, Entry, fxhash::FxBuildHasher> =
        DashMap::with_hasher(fxhash::FxBuildHasher::default());
    let map = ConcurrentTokenMap::of(store);

    map.insert("tick", 20u32);
    assert_eq!(map.get::<u32>("tick"), Some(20));
    assert_eq!(map.get::<u64>("tick"), None);
}
