use std::{
    collections::hash_map::DefaultHasher,
    hash::Hasher,
    sync::Arc,
};

/// Maps an identifier to its position on the 32-bit hash circle.
///
/// Implementations must be pure: the same identifier always yields the same
/// digest for as long as a ring using the hasher is alive. Swapping the hasher
/// of a populated ring would invalidate its sort order, so rings only accept
/// one at construction time.
pub trait KeyHasher: Send + Sync {
    fn hash(&self, id: &str) -> u32;
}

pub type SharedHasher = Arc<dyn KeyHasher>;

/// CRC-32 (IEEE polynomial) over the UTF-8 bytes of the identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32Hasher;

impl KeyHasher for Crc32Hasher {
    fn hash(&self, id: &str) -> u32 {
        crc32fast::hash(id.as_bytes())
    }
}

/// SipHash from the standard library, folded down to 32 bits.
///
/// Only stable within one build of the program, which is all a ring needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SipHasher32;

impl KeyHasher for SipHasher32 {
    fn hash(&self, id: &str) -> u32 {
        let mut hasher = DefaultHasher::new();
        hasher.write(id.as_bytes());
        let digest = hasher.finish();
        ((digest >> 32) as u32) ^ (digest as u32)
    }
}

impl<F> KeyHasher for F
where
    F: Fn(&str) -> u32 + Send + Sync,
{
    fn hash(&self, id: &str) -> u32 {
        self(id)
    }
}

pub fn default_hasher() -> SharedHasher {
    Arc::new(Crc32Hasher)
}
