//! The edit-node protocol: copy-on-write mutation of stored nodes.
//!
//! Readers keep taking lock-free snapshots while a writer works on a
//! private clone; the clone only becomes visible through the store's
//! version-checked replace. On a version conflict the whole cycle runs
//! again against the fresh snapshot, so concurrent writers to the same
//! node linearize in commit order and a failed editor leaves no trace.

use tracing::trace;

use ua_types::{NodeId, StatusCode};

use crate::node::Node;
use crate::store::{NodeStore, ReplaceError};

/// Applies `editor` to a copy of the node and commits the copy.
///
/// The editor may run more than once (once per conflict), so it must be a
/// pure function of the node it is given. A non-good editor status aborts
/// the cycle and is returned as-is; conflicts are retried and never
/// surface to the caller.
pub fn edit_node<F>(store: &dyn NodeStore, node_id: &NodeId, editor: F) -> StatusCode
where
    F: Fn(&mut Node) -> StatusCode,
{
    loop {
        let Some(snapshot) = store.get(node_id) else {
            return StatusCode::BAD_NODEID_UNKNOWN;
        };

        let mut copy = (*snapshot.node).clone();
        let status = editor(&mut copy);
        if !status.is_good() {
            return status;
        }

        match store.replace(node_id, snapshot.version, copy) {
            Ok(()) => return StatusCode::GOOD,
            Err(ReplaceError::Unknown) => return StatusCode::BAD_NODEID_UNKNOWN,
            Err(ReplaceError::Conflict) => {
                trace!(node_id = %node_id, "edit conflict, retrying");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeHead, ObjectNode};
    use crate::store::InMemoryNodeStore;
    use std::sync::Arc;
    use std::thread;
    use ua_types::{LocalizedText, QualifiedName};

    fn store_with_object(id: u32) -> InMemoryNodeStore {
        let store = InMemoryNodeStore::new();
        store.insert(Node::Object(ObjectNode {
            head: NodeHead::new(
                NodeId::numeric(1, id),
                QualifiedName::new(1, "Obj"),
                LocalizedText::from_text("Obj"),
            ),
            event_notifier: 0,
        }));
        store
    }

    #[test]
    fn test_edit_commits_mutation() {
        let store = store_with_object(1);
        let id = NodeId::numeric(1, 1);

        let status = edit_node(&store, &id, |node| {
            node.head_mut().description = LocalizedText::from_text("edited");
            StatusCode::GOOD
        });

        assert_eq!(status, StatusCode::GOOD);
        let snapshot = store.get(&id).unwrap();
        assert_eq!(snapshot.node.head().description.text, "edited");
        assert_eq!(snapshot.version, 1);
    }

    #[test]
    fn test_unknown_node() {
        let store = InMemoryNodeStore::new();
        let status = edit_node(&store, &NodeId::numeric(1, 1), |_| StatusCode::GOOD);
        assert_eq!(status, StatusCode::BAD_NODEID_UNKNOWN);
    }

    #[test]
    fn test_failed_editor_leaves_node_untouched() {
        let store = store_with_object(1);
        let id = NodeId::numeric(1, 1);

        let status = edit_node(&store, &id, |node| {
            // Mutations on the copy must not leak when the editor fails
            node.head_mut().description = LocalizedText::from_text("poison");
            StatusCode::BAD_TYPE_MISMATCH
        });

        assert_eq!(status, StatusCode::BAD_TYPE_MISMATCH);
        let snapshot = store.get(&id).unwrap();
        assert_eq!(snapshot.node.head().description.text, "");
        assert_eq!(snapshot.version, 0);
    }

    #[test]
    #[serial_test::serial]
    fn test_concurrent_writers_all_commit() {
        let store = Arc::new(store_with_object(1));
        let id = NodeId::numeric(1, 1);
        let writers = 8;
        let edits_each = 50;

        let handles: Vec<_> = (0..writers)
            .map(|_| {
                let store = Arc::clone(&store);
                let id = id.clone();
                thread::spawn(move || {
                    for _ in 0..edits_each {
                        let status = edit_node(store.as_ref(), &id, |node| {
                            let Node::Object(object) = node else {
                                return StatusCode::BAD_INTERNAL_ERROR;
                            };
                            object.event_notifier = object.event_notifier.wrapping_add(1);
                            StatusCode::GOOD
                        });
                        assert_eq!(status, StatusCode::GOOD);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Every edit committed exactly once: the version counts them.
        let snapshot = store.get(&id).unwrap();
        assert_eq!(snapshot.version, (writers * edits_each) as u64);
        let Node::Object(object) = snapshot.node.as_ref() else {
            panic!("object expected");
        };
        assert_eq!(
            object.event_notifier,
            ((writers * edits_each) % 256) as u8
        );
    }
}
