pub use crate::entries::{
    Entry, SortedEntries,
};
pub use crate::error::RingError;
pub use crate::hash_ring::HashRing;
pub use crate::hasher::{
    Crc32Hasher, KeyHasher, SharedHasher, SipHasher32, default_hasher,
};
pub use crate::key_strategy::{
    InMemoryKeyStrategy, KeyStrategy, SharedKeyStrategy, owned_keys,
};
pub use crate::ring_manager::{
    RingManager, RingManagerBuilder,
};
