//! Node identities.
//!
//! A [`NodeId`] names a node in the address space: a 16-bit namespace index
//! plus one of four identifier payloads. Equality and hashing are required
//! by the node store; ordering is deliberately not implemented.
//!
//! The hash mixes the namespace index and the identifier payload bytes
//! through FNV-1a so that string and opaque identifiers hash by content and
//! numeric/GUID identifiers hash by their fixed-width encoding. The store
//! also uses the same value directly for shard selection, so it must stay
//! stable for the lifetime of the process.

use std::fmt;
use std::hash::{Hash, Hasher};

use uuid::Uuid;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// The identifier payload of a [`NodeId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    /// Unsigned numeric identifier.
    Numeric(u32),
    /// String identifier.
    String(String),
    /// 128-bit GUID identifier.
    Guid(Uuid),
    /// Opaque byte-string identifier.
    Opaque(Vec<u8>),
}

/// Identity of a node: namespace index plus identifier payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeId {
    pub namespace: u16,
    pub identifier: Identifier,
}

impl NodeId {
    /// A numeric node id.
    pub const fn numeric(namespace: u16, value: u32) -> NodeId {
        NodeId {
            namespace,
            identifier: Identifier::Numeric(value),
        }
    }

    /// A string node id.
    pub fn string(namespace: u16, value: impl Into<String>) -> NodeId {
        NodeId {
            namespace,
            identifier: Identifier::String(value.into()),
        }
    }

    /// A GUID node id.
    pub const fn guid(namespace: u16, value: Uuid) -> NodeId {
        NodeId {
            namespace,
            identifier: Identifier::Guid(value),
        }
    }

    /// An opaque byte-string node id.
    pub const fn opaque(namespace: u16, value: Vec<u8>) -> NodeId {
        NodeId {
            namespace,
            identifier: Identifier::Opaque(value),
        }
    }

    /// The null node id (`ns=0;i=0`).
    pub const fn null() -> NodeId {
        NodeId::numeric(0, 0)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.identifier, Identifier::Numeric(0)) && self.namespace == 0
    }

    /// Stable 64-bit hash combining namespace index and identifier payload.
    pub fn hash_value(&self) -> u64 {
        let hash = fnv1a(FNV_OFFSET_BASIS, &self.namespace.to_le_bytes());
        match &self.identifier {
            Identifier::Numeric(n) => fnv1a(fnv1a(hash, &[0]), &n.to_le_bytes()),
            Identifier::String(s) => fnv1a(fnv1a(hash, &[1]), s.as_bytes()),
            Identifier::Guid(g) => fnv1a(fnv1a(hash, &[2]), g.as_bytes()),
            Identifier::Opaque(b) => fnv1a(fnv1a(hash, &[3]), b),
        }
    }
}

impl Hash for NodeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_value());
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ns={};", self.namespace)?;
        match &self.identifier {
            Identifier::Numeric(n) => write!(f, "i={n}"),
            Identifier::String(s) => write!(f, "s={s}"),
            Identifier::Guid(g) => write!(f, "g={g}"),
            Identifier::Opaque(b) => {
                f.write_str("b=")?;
                for byte in b {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_by_namespace_and_payload() {
        assert_eq!(NodeId::numeric(1, 42), NodeId::numeric(1, 42));
        assert_ne!(NodeId::numeric(1, 42), NodeId::numeric(2, 42));
        assert_ne!(NodeId::numeric(1, 42), NodeId::string(1, "42"));
    }

    #[test]
    fn test_hash_distinguishes_payload_kind() {
        // "42" as a string and 42 as a number must not collide through the
        // discriminant byte even when their payload bytes overlap.
        let numeric = NodeId::numeric(0, 42);
        let string = NodeId::string(0, "42");
        assert_ne!(numeric.hash_value(), string.hash_value());
    }

    #[test]
    fn test_hash_is_stable() {
        let id = NodeId::string(3, "Motor.Speed");
        assert_eq!(id.hash_value(), id.clone().hash_value());
    }

    #[test]
    fn test_hash_includes_namespace() {
        assert_ne!(
            NodeId::numeric(0, 7).hash_value(),
            NodeId::numeric(1, 7).hash_value()
        );
    }

    #[test]
    fn test_null_id() {
        assert!(NodeId::null().is_null());
        assert!(!NodeId::numeric(1, 0).is_null());
        assert!(!NodeId::numeric(0, 1).is_null());
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(NodeId::numeric(2, 1001).to_string(), "ns=2;i=1001");
        assert_eq!(NodeId::string(1, "Pump").to_string(), "ns=1;s=Pump");
        assert_eq!(
            NodeId::opaque(0, vec![0xde, 0xad]).to_string(),
            "ns=0;b=dead"
        );
    }

    #[test]
    fn test_guid_id_roundtrip() {
        let guid = Uuid::new_v4();
        let id = NodeId::guid(4, guid);
        assert_eq!(id, NodeId::guid(4, guid));
        assert_ne!(id, NodeId::guid(4, Uuid::new_v4()));
    }
}
