use std::{
    fmt,
    sync::{
        Mutex,
        MutexGuard,
        PoisonError,
    },
};

use tracing::{
    Span,
    debug,
};

use crate::{
    entries::{
        Entry,
        SortedEntries,
    },
    error::RingError,
    hasher::{
        KeyHasher,
        SharedHasher,
        default_hasher,
    },
};

/// A consistent hash ring.
///
/// Identifiers are placed on a 32-bit circle by the ring's hasher and a key
/// belongs to the first entry at or after its own hash, wrapping around to
/// the smallest entry. Every operation takes the ring's single lock, so
/// readers never observe a partially updated sequence.
pub struct HashRing {
    hasher: SharedHasher,

    /// Entries sorted by `(hash_id, id)`.
    entries: Mutex<SortedEntries>,

    /// Parent span for the events this ring emits.
    span: Span,
}

impl HashRing {
    /// Create an empty ring using the CRC-32 hasher.
    pub fn new() -> Self {
        Self::with_hasher(default_hasher())
    }

    /// Create an empty ring with a custom hasher. The hasher is fixed for the
    /// life of the ring.
    pub fn with_hasher(hasher: SharedHasher) -> Self {
        HashRing {
            hasher,
            entries: Mutex::new(SortedEntries::new()),
            span: Span::none(),
        }
    }

    /// Attach the span that this ring's debug events are recorded under.
    pub fn instrumented(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn hasher(&self) -> &SharedHasher {
        &self.hasher
    }

    pub fn hash_of(&self, id: &str) -> u32 {
        self.hasher.hash(id)
    }

    /// Build the entry `id` would occupy in this ring.
    pub fn entry_for(&self, id: &str) -> Entry {
        Entry::new(id, self.hash_of(id))
    }

    // A panic can only happen inside Vec::insert/remove, which leave the
    // sequence sorted, so a poisoned lock still guards valid data.
    fn lock(&self) -> MutexGuard<'_, SortedEntries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add `id` to the ring. Adding an id that is already present is a no-op;
    /// the return value tells whether anything was inserted.
    pub fn add(&self, id: &str) -> bool {
        let entry = self.entry_for(id);
        let hash_id = entry.hash_id;
        let inserted = self.lock().insert(entry);
        debug!(parent: &self.span, id = %id, hash_id, inserted, "ring add");
        inserted
    }

    /// Remove the entry with exactly this id.
    pub fn remove(&self, id: &str) -> Result<(), RingError> {
        let entry = self.entry_for(id);
        match self.lock().remove(&entry) {
            Some(removed) => {
                debug!(parent: &self.span, id = %id, hash_id = removed.hash_id, "ring remove");
                Ok(())
            },
            None => Err(RingError::NotFound(id.to_string())),
        }
    }

    /// Get the id of the entry responsible for `key`.
    pub fn get(&self, key: &str) -> Result<String, RingError> {
        let key_hash = self.hash_of(key);
        let entries = self.lock();
        let index = entries.successor(key_hash).ok_or(RingError::EmptyRing)?;
        entries
            .get(index)
            .map(|e| e.id.clone())
            .ok_or(RingError::EmptyRing)
    }

    pub fn contains(&self, id: &str) -> bool {
        let entry = self.entry_for(id);
        self.lock().find_exact(&entry).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// A point-in-time copy of the entries in ring order. The copy is not
    /// updated by later mutations.
    pub fn nodes(&self) -> Vec<Entry> {
        self.lock().as_slice().to_vec()
    }

    /// Run a read-only computation against the entries while holding the
    /// ring lock.
    pub fn read<R>(&self, f: impl FnOnce(&SortedEntries) -> R) -> R {
        f(&self.lock())
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("entries", &*self.lock())
            .finish_non_exhaustive()
    }
}
