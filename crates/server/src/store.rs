//! The node store: a concurrent map from node id to node.
//!
//! Reads hand out `Arc<Node>` snapshots together with a per-entry version;
//! a snapshot stays readable for as long as the caller holds it and can
//! never observe a half-applied write. Mutation happens by inserting a new
//! `Arc` under a version check ([`NodeStore::replace`]), which is the CAS
//! the edit-node protocol retries on.
//!
//! The in-memory implementation shards the map over a power-of-two number
//! of `RwLock`-guarded buckets selected by the node-id hash. Critical
//! sections only clone or swap an `Arc`, so readers are never stuck behind
//! a writer doing real work.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use ua_types::{NodeId, StatusCode};

use crate::node::{Node, Reference};

/// A consistent view of one node plus the store version it was taken at.
#[derive(Debug, Clone)]
pub struct NodeSnapshot {
    pub node: Arc<Node>,
    pub version: u64,
}

/// Why a [`NodeStore::replace`] did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceError {
    /// The entry changed since the version was observed.
    Conflict,
    /// No entry with that node id exists.
    Unknown,
}

/// The associative container behind the address space. Implementable by
/// callers that bring their own backing store.
pub trait NodeStore: Send + Sync {
    /// A snapshot of the node, or `None` if the id is unknown.
    fn get(&self, node_id: &NodeId) -> Option<NodeSnapshot>;

    /// Adds a node under its own id. `BAD_NODEID_EXISTS` if taken.
    fn insert(&self, node: Node) -> StatusCode;

    /// Swaps in `node` iff the entry is still at `expected_version`.
    fn replace(
        &self,
        node_id: &NodeId,
        expected_version: u64,
        node: Node,
    ) -> Result<(), ReplaceError>;

    /// Removes the node. Returns whether it existed.
    fn remove(&self, node_id: &NodeId) -> bool;

    /// Invokes `visit` for each outgoing reference of the node.
    fn for_each_reference(&self, node_id: &NodeId, visit: &mut dyn FnMut(&Reference));
}

struct Entry {
    node: Arc<Node>,
    version: u64,
}

/// Sharded in-memory [`NodeStore`].
pub struct InMemoryNodeStore {
    shards: Box<[RwLock<HashMap<NodeId, Entry>>]>,
}

const DEFAULT_SHARDS: usize = 16;

impl InMemoryNodeStore {
    pub fn new() -> InMemoryNodeStore {
        InMemoryNodeStore::with_shards(DEFAULT_SHARDS)
    }

    /// A store with at least `shards` buckets, rounded up to a power of two
    /// so shard selection is a mask on the node-id hash.
    pub fn with_shards(shards: usize) -> InMemoryNodeStore {
        let count = shards.max(1).next_power_of_two();
        let shards = (0..count)
            .map(|_| RwLock::new(HashMap::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        InMemoryNodeStore { shards }
    }

    fn shard(&self, node_id: &NodeId) -> &RwLock<HashMap<NodeId, Entry>> {
        let index = node_id.hash_value() as usize & (self.shards.len() - 1);
        &self.shards[index]
    }

    /// Number of nodes across all shards.
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.read().expect("node store lock poisoned").len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryNodeStore {
    fn default() -> InMemoryNodeStore {
        InMemoryNodeStore::new()
    }
}

impl NodeStore for InMemoryNodeStore {
    fn get(&self, node_id: &NodeId) -> Option<NodeSnapshot> {
        let shard = self.shard(node_id).read().expect("node store lock poisoned");
        shard.get(node_id).map(|entry| NodeSnapshot {
            node: Arc::clone(&entry.node),
            version: entry.version,
        })
    }

    fn insert(&self, node: Node) -> StatusCode {
        let node_id = node.node_id().clone();
        let mut shard = self
            .shard(&node_id)
            .write()
            .expect("node store lock poisoned");
        if shard.contains_key(&node_id) {
            return StatusCode::BAD_NODEID_EXISTS;
        }
        shard.insert(
            node_id,
            Entry {
                node: Arc::new(node),
                version: 0,
            },
        );
        StatusCode::GOOD
    }

    fn replace(
        &self,
        node_id: &NodeId,
        expected_version: u64,
        node: Node,
    ) -> Result<(), ReplaceError> {
        let mut shard = self
            .shard(node_id)
            .write()
            .expect("node store lock poisoned");
        let entry = shard.get_mut(node_id).ok_or(ReplaceError::Unknown)?;
        if entry.version != expected_version {
            return Err(ReplaceError::Conflict);
        }
        entry.node = Arc::new(node);
        entry.version += 1;
        Ok(())
    }

    fn remove(&self, node_id: &NodeId) -> bool {
        self.shard(node_id)
            .write()
            .expect("node store lock poisoned")
            .remove(node_id)
            .is_some()
    }

    fn for_each_reference(&self, node_id: &NodeId, visit: &mut dyn FnMut(&Reference)) {
        // Snapshot first so the callback runs outside the shard lock.
        if let Some(snapshot) = self.get(node_id) {
            for reference in &snapshot.node.head().references {
                visit(reference);
            }
        }
    }
}
