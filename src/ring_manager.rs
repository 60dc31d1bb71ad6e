use std::sync::{
    Arc,
    Mutex,
    MutexGuard,
    PoisonError,
};

use tracing::{
    Span,
    debug,
    warn,
};

use crate::{
    entries::Entry,
    error::RingError,
    hash_ring::HashRing,
    hasher::{
        SharedHasher,
        default_hasher,
    },
    key_strategy::{
        InMemoryKeyStrategy,
        SharedKeyStrategy,
    },
};

/// Tracks which keys each node owns using two rings.
///
/// The node ring holds cluster membership. The data ring holds a marker for
/// every node plus every key, and the markers split it into one interval per
/// node. Every manager operation takes the manager lock before touching
/// either ring, so a node is never visible in one ring and missing from the
/// other.
pub struct RingManager {
    lock: Mutex<()>,
    node_ring: HashRing,
    data_ring: HashRing,
    strategy: SharedKeyStrategy,
    span: Span,
}

#[derive(Default)]
pub struct RingManagerBuilder {
    hasher: Option<SharedHasher>,
    strategy: Option<SharedKeyStrategy>,
    span: Option<Span>,
}

impl RingManagerBuilder {
    /// Hasher shared by both rings. Defaults to CRC-32.
    pub fn hasher(mut self, hasher: SharedHasher) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Key strategy. Defaults to [`InMemoryKeyStrategy`].
    pub fn strategy(mut self, strategy: SharedKeyStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Span that the manager, its rings and the default strategy log under.
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn build(self) -> RingManager {
        let hasher = self.hasher.unwrap_or_else(default_hasher);
        let span = self.span.unwrap_or_else(Span::none);
        let strategy = self
            .strategy
            .unwrap_or_else(|| Arc::new(InMemoryKeyStrategy::instrumented(span.clone())));

        RingManager {
            lock: Mutex::new(()),
            node_ring: HashRing::with_hasher(hasher.clone()).instrumented(span.clone()),
            data_ring: HashRing::with_hasher(hasher).instrumented(span.clone()),
            strategy,
            span,
        }
    }
}

impl RingManager {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> RingManagerBuilder {
        RingManagerBuilder::default()
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn hasher(&self) -> &SharedHasher {
        self.node_ring.hasher()
    }

    /// Add a node to the membership ring and its marker to the data ring.
    /// Adding an existing node is a no-op; adding an id already stored as a
    /// key is a conflict.
    pub fn add_node(&self, node_id: &str) -> Result<(), RingError> {
        let _guard = self.guard();

        if !self.node_ring.contains(node_id) && self.data_ring.contains(node_id) {
            return Err(RingError::Conflict(node_id.to_string(), "key"));
        }

        let inserted = self.node_ring.add(node_id);
        if let Err(err) = self.strategy.store(&self.data_ring, node_id) {
            if inserted {
                if let Err(rollback) = self.node_ring.remove(node_id) {
                    warn!(parent: &self.span, node_id = %node_id, error = %rollback, "failed to roll back node insert");
                }
            }
            warn!(parent: &self.span, node_id = %node_id, error = %err, "failed to store node marker, rolled back");
            return Err(err);
        }

        debug!(parent: &self.span, node_id = %node_id, inserted, "node added");
        Ok(())
    }

    /// Remove a node from both rings. Its keys fall into the interval of the
    /// node that precedes it.
    pub fn remove_node(&self, node_id: &str) -> Result<(), RingError> {
        let _guard = self.guard();

        self.node_ring.remove(node_id)?;
        if let Err(err) = self.strategy.remove(&self.data_ring, node_id) {
            self.node_ring.add(node_id);
            warn!(parent: &self.span, node_id = %node_id, error = %err, "failed to remove node marker, rolled back");
            return Err(err);
        }

        debug!(parent: &self.span, node_id = %node_id, "node removed");
        Ok(())
    }

    /// Store a key. Ids already used by a node are rejected.
    pub fn add_key(&self, key: &str) -> Result<(), RingError> {
        let _guard = self.guard();
        if self.node_ring.contains(key) {
            return Err(RingError::Conflict(key.to_string(), "node"));
        }
        self.strategy.store(&self.data_ring, key)
    }

    /// Remove a key. Node markers can only be removed through
    /// [`RingManager::remove_node`].
    pub fn remove_key(&self, key: &str) -> Result<(), RingError> {
        let _guard = self.guard();
        if self.node_ring.contains(key) {
            return Err(RingError::ProtectedMarker(key.to_string()));
        }
        self.strategy.remove(&self.data_ring, key)
    }

    /// Keys currently owned by `node_id`, in data ring order.
    pub fn get_keys(&self, node_id: &str) -> Result<Vec<Entry>, RingError> {
        let _guard = self.guard();
        let nodes = self.node_ring.nodes();
        self.strategy.fetch(&nodes, &self.data_ring, node_id)
    }

    /// The node whose interval holds `key`: the last node ordered before the
    /// key, wrapping to the last node. Agrees with [`RingManager::get_keys`]
    /// whether or not the key has been stored.
    pub fn get(&self, key: &str) -> Result<String, RingError> {
        let target = self.node_ring.entry_for(key);
        self.node_ring.read(|nodes| {
            let index = nodes.predecessor(&target).ok_or(RingError::EmptyRing)?;
            nodes
                .get(index)
                .map(|e| e.id.clone())
                .ok_or(RingError::EmptyRing)
        })
    }

    /// Snapshot of the membership ring.
    pub fn nodes(&self) -> Vec<Entry> {
        self.node_ring.nodes()
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.node_ring.nodes().into_iter().map(|e| e.id).collect()
    }

    /// Snapshot of the data ring, markers included.
    pub fn data_entries(&self) -> Vec<Entry> {
        let _guard = self.guard();
        self.data_ring.nodes()
    }

    pub fn node_count(&self) -> usize {
        self.node_ring.len()
    }
}

impl Default for RingManager {
    fn default() -> Self {
        Self::new()
    }
}
