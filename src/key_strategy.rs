use std::sync::Arc;

use tracing::{
    Span,
    debug,
};

use crate::{
    entries::Entry,
    error::RingError,
    hash_ring::HashRing,
};

/// How a [`RingManager`](crate::ring_manager::RingManager) stores, removes and
/// looks up keys.
///
/// The default keeps keys in the manager's data ring. Other implementations
/// can back keys with an external index and use the rings only for
/// membership. Methods are called with the manager lock held and no ring lock
/// held.
#[cfg_attr(test, mockall::automock)]
pub trait KeyStrategy: Send + Sync + 'static {
    /// Keys owned by `node_id`, in data ring order. `nodes` is a snapshot of
    /// the membership ring in ring order; membership can only change through
    /// the manager.
    fn fetch(&self, nodes: &[Entry], data_ring: &HashRing, node_id: &str) -> Result<Vec<Entry>, RingError>;

    /// Store a key or a node marker. Storing an id that is already present is
    /// a no-op.
    fn store(&self, data_ring: &HashRing, key: &str) -> Result<(), RingError>;

    /// Remove a key or a node marker.
    fn remove(&self, data_ring: &HashRing, key: &str) -> Result<(), RingError>;
}

pub type SharedKeyStrategy = Arc<dyn KeyStrategy>;

#[derive(Debug, Clone)]
pub struct InMemoryKeyStrategy {
    span: Span,
}

impl InMemoryKeyStrategy {
    pub fn new() -> Self {
        Self { span: Span::none() }
    }

    pub fn instrumented(span: Span) -> Self {
        Self { span }
    }
}

impl Default for InMemoryKeyStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyStrategy for InMemoryKeyStrategy {
    fn fetch(&self, nodes: &[Entry], data_ring: &HashRing, node_id: &str) -> Result<Vec<Entry>, RingError> {
        let keys = owned_keys(nodes, data_ring, node_id)?;
        debug!(parent: &self.span, node_id = %node_id, keys = keys.len(), "fetched owned keys");
        Ok(keys)
    }

    fn store(&self, data_ring: &HashRing, key: &str) -> Result<(), RingError> {
        if !data_ring.add(key) {
            debug!(parent: &self.span, key = %key, "key already stored");
        }
        Ok(())
    }

    fn remove(&self, data_ring: &HashRing, key: &str) -> Result<(), RingError> {
        data_ring.remove(key)
    }
}

/// Every data ring entry strictly between `node_id`'s marker and the marker
/// of the next node in `nodes`.
///
/// The walk wraps past the end of the data ring when the next node sorts
/// before `node_id`, which covers both the node with the largest hash and a
/// ring with a single node (where the next node is itself and the interval is
/// the whole circle).
pub fn owned_keys(nodes: &[Entry], data_ring: &HashRing, node_id: &str) -> Result<Vec<Entry>, RingError> {
    let target = data_ring.entry_for(node_id);
    let index = nodes
        .binary_search(&target)
        .map_err(|_| RingError::NotFound(node_id.to_string()))?;
    let node = &nodes[index];
    let next = &nodes[(index + 1) % nodes.len()];

    data_ring.read(|data| {
        let start = data
            .find_exact(node)
            .ok_or_else(|| RingError::MissingMarker(node.id.clone()))?;
        let end = data
            .find_exact(next)
            .ok_or_else(|| RingError::MissingMarker(next.id.clone()))?;

        let data = data.as_slice();
        let keys = if start < end {
            data[start + 1..end].to_vec()
        } else {
            data[start + 1..].iter().chain(&data[..end]).cloned().collect()
        };
        Ok(keys)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rings(nodes: &[&str], keys: &[&str]) -> (Vec<Entry>, HashRing) {
        let node_ring = HashRing::new();
        let data_ring = HashRing::new();
        for node in nodes {
            node_ring.add(node);
            data_ring.add(node);
        }
        for key in keys {
            data_ring.add(key);
        }
        (node_ring.nodes(), data_ring)
    }

    fn ids(entries: Vec<Entry>) -> Vec<String> {
        entries.into_iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_owned_keys_interval_and_wraparound() {
        // Data ring: user 180, node b, user 9, node a.
        let (nodes, data_ring) = rings(&["node a", "node b"], &["user 180", "user 9"]);

        let keys_b = owned_keys(&nodes, &data_ring, "node b").unwrap();
        assert_eq!(ids(keys_b), vec!["user 9"]);

        // node a has the largest hash, so its interval wraps to the front.
        let keys_a = owned_keys(&nodes, &data_ring, "node a").unwrap();
        assert_eq!(ids(keys_a), vec!["user 180"]);
    }

    #[test]
    fn test_single_node_owns_everything() {
        let (nodes, data_ring) = rings(&["node a"], &["user 180", "user 9", "Foo"]);
        let keys = owned_keys(&nodes, &data_ring, "node a").unwrap();
        assert_eq!(ids(keys), vec!["user 180", "Foo", "user 9"]);
    }

    #[test]
    fn test_single_node_without_keys() {
        let (nodes, data_ring) = rings(&["node a"], &[]);
        assert!(owned_keys(&nodes, &data_ring, "node a").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_node() {
        let (nodes, data_ring) = rings(&["node a"], &["user 9"]);
        let err = owned_keys(&nodes, &data_ring, "node z").unwrap_err();
        assert!(matches!(err, RingError::NotFound(id) if id == "node z"));
    }

    #[test]
    fn test_empty_node_ring() {
        let (nodes, data_ring) = rings(&[], &["user 9"]);
        assert!(owned_keys(&nodes, &data_ring, "node a").unwrap_err().is_not_found());
    }

    #[test]
    fn test_missing_marker() {
        let (nodes, data_ring) = rings(&["node a", "node b"], &["user 9"]);
        data_ring.remove("node b").unwrap();
        let err = owned_keys(&nodes, &data_ring, "node a").unwrap_err();
        assert!(matches!(err, RingError::MissingMarker(id) if id == "node b"));
    }

    #[test]
    fn test_in_memory_strategy_store_and_remove() {
        let strategy = InMemoryKeyStrategy::new();
        let data_ring = HashRing::new();

        strategy.store(&data_ring, "user 9").unwrap();
        strategy.store(&data_ring, "user 9").unwrap();
        assert_eq!(data_ring.len(), 1);

        strategy.remove(&data_ring, "user 9").unwrap();
        assert!(data_ring.is_empty());
        assert!(strategy.remove(&data_ring, "user 9").unwrap_err().is_not_found());
    }
}
