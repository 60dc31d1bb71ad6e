use serde::{
    Deserialize,
    Serialize,
};

/// A named point on the hash circle.
///
/// Entries order by `hash_id` first and fall back to `id`, so two identifiers
/// whose digests collide still have a total, deterministic order and are never
/// conflated.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Entry {
    pub hash_id: u32,
    pub id: String,
}

impl Entry {
    pub fn new(id: impl Into<String>, hash_id: u32) -> Self {
        Self {
            hash_id,
            id: id.into(),
        }
    }
}

/// Entries kept sorted ascending by `(hash_id, id)`.
///
/// The only way to mutate the sequence is through `insert` and `remove`, both
/// of which preserve the order.
#[derive(Debug, Clone, Default)]
pub struct SortedEntries {
    entries: Vec<Entry>,
}

impl SortedEntries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Entry] {
        &self.entries
    }

    /// Index of the entry equal to `entry`, or `None` when absent.
    pub fn find_exact(&self, entry: &Entry) -> Option<usize> {
        self.entries.binary_search(entry).ok()
    }

    /// Index of the first entry whose `hash_id >= hash`, wrapping to 0 when
    /// `hash` is past every entry. `None` only for an empty sequence.
    pub fn successor(&self, hash: u32) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }

        let index = self.entries.partition_point(|e| e.hash_id < hash);
        if index == self.entries.len() {
            Some(0)
        } else {
            Some(index)
        }
    }

    /// Index of the last entry ordered strictly before `entry`, wrapping to
    /// the last entry when none is. `None` only for an empty sequence.
    pub fn predecessor(&self, entry: &Entry) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }

        match self.entries.partition_point(|e| e < entry) {
            0 => Some(self.entries.len() - 1),
            index => Some(index - 1),
        }
    }

    /// Inserts `entry` at its sorted position. Returns `false` if an equal
    /// entry is already present.
    pub fn insert(&mut self, entry: Entry) -> bool {
        match self.entries.binary_search(&entry) {
            Ok(_) => false,
            Err(index) => {
                self.entries.insert(index, entry);
                true
            },
        }
    }

    /// Removes the entry equal to `entry`, returning it if it was present.
    pub fn remove(&mut self, entry: &Entry) -> Option<Entry> {
        let index = self.find_exact(entry)?;
        Some(self.entries.remove(index))
    }
}
