//! Demonstrates using TokenMap as a per-command attribute sheet.
//!
//! A command registry tends to accumulate attributes of wildly different
//! types: a description, a permission node, a cooldown, a usage counter.
//! TokenMap holds them all in one collection per command, and the type in
//! the key means "cooldown" the Duration and "cooldown" the human-readable
//! string can coexist without clashing.
//!
//! Run with: cargo run --example command_metadata

use std::time::Duration;
use tokenmap::TokenMap;

fn main() {
    let mut teleport = TokenMap::new();

    // Register attributes; the name alone is not the slot, the pair is.
    teleport.insert("description", "Teleports a player to a location".to_string());
    teleport.insert("permission", "essentials.teleport");
    teleport.insert("cooldown", Duration::from_secs(3));
    teleport.insert("cooldown", "3 seconds"); // display form, same name
    teleport.insert("uses", 0u64);

    describe(&teleport);

    // Count an invocation in place.
    if let Some(uses) = teleport.get_mut::<u64>("uses") {
        *uses += 1;
    }

    // Overwriting hands back the previous value.
    let previous = teleport.insert("cooldown", Duration::from_secs(5));
    println!("cooldown raised from {previous:?}");

    // Absent or differently-typed lookups fall back to defaults.
    let aliases = teleport.get_or_default("aliases", Vec::<String>::new());
    println!("aliases configured: {}", aliases.len());

    describe(&teleport);
}

fn describe(command: &TokenMap<&str>) {
    println!("-- command ({} attributes)", command.len());
    if let Some(description) = command.get::<String>("description") {
        println!("   {description}");
    }
    println!(
        "   permission: {}",
        command.get_or_default("permission", "none")
    );
    if let Some(cooldown) = command.get::<Duration>("cooldown") {
        let display = command.get_or_default("cooldown", "unset");
        println!("   cooldown: {cooldown:?} (shown as: {display})");
    }
    println!("   uses: {}", command.get_or_default("uses", 0u64));
}
