#![allow(dead_code)]

use dualring::{
    Entry,
    RingManager,
};

/// A manager seeded with the given nodes and keys using the default hasher.
pub fn seeded_manager(nodes: &[&str], keys: &[&str]) -> RingManager {
    let manager = RingManager::new();
    for node in nodes {
        manager.add_node(node).expect("add node");
    }
    for key in keys {
        manager.add_key(key).expect("add key");
    }
    manager
}

pub fn ids(entries: &[Entry]) -> Vec<&str> {
    entries.iter().map(|e| e.id.as_str()).collect()
}
