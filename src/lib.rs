pub mod config;
pub mod entries;
pub mod error;
pub mod hash_ring;
pub mod hasher;
pub mod key_strategy;
pub mod observability;
pub mod prelude;
pub mod ring_manager;

pub use crate::entries::Entry;
pub use crate::error::RingError;
pub use crate::hash_ring::HashRing;
pub use crate::hasher::{
    KeyHasher, SharedHasher,
};
pub use crate::key_strategy::{
    KeyStrategy, SharedKeyStrategy,
};
pub use crate::ring_manager::RingManager;
