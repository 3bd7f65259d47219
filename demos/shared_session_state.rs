//! Demonstrates sharing one ConcurrentTokenMap between threads.
//!
//! A game server runs some work on the main loop and some on workers; both
//! sides read and write session state. ConcurrentTokenMap handles are
//! cheap clones over one backing store, so every handle observes every
//! write, and per-key operations need no external locking.
//!
//! Run with: cargo run --example shared_session_state

use std::thread;
use std::time::Duration;
use tokenmap::ConcurrentTokenMap;

fn main() {
    let session = ConcurrentTokenMap::new();
    session.insert("motd", "Welcome aboard".to_string());
    session.insert("online", 0u32);
    session.insert("ticks", 0u64);

    // Workers mutate their own slots concurrently.
    let ticker = {
        let session = session.clone();
        thread::spawn(move || {
            for _ in 0..50 {
                session.with_mut("ticks", |ticks: &mut u64| *ticks += 1);
                thread::sleep(Duration::from_millis(1));
            }
        })
    };

    let greeter = {
        let session = session.clone();
        thread::spawn(move || {
            for player in ["alice", "bob", "carol"] {
                session.with_mut("online", |online: &mut u32| *online += 1);
                let motd = session.get_or_default("motd", String::new());
                println!("{player} joined: \"{motd}\"");
                thread::sleep(Duration::from_millis(5));
            }
        })
    };

    // Meanwhile the main thread rewrites the banner; last writer wins.
    session.insert("motd", "Maintenance at midnight".to_string());

    ticker.join().unwrap();
    greeter.join().unwrap();

    println!(
        "online: {}, ticks: {}",
        session.get_or_default("online", 0u32),
        session.get_or_default("ticks", 0u64),
    );

    // Each (name, type) pair is its own entry.
    for key in session.keys() {
        println!("  {key}");
    }
}
