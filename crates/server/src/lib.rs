//! OPC UA address-space and attribute-service core.
//!
//! Key design principles:
//! - Node: a tagged sum over the eight node classes, all sharing a common
//!   attribute head by composition
//! - NodeStore: snapshot reads (`Arc<Node>` + version), version-checked
//!   replace; readers never wait on a writer doing real work
//! - edit_node: copy-on-write mutation (clone the snapshot, edit the
//!   clone, commit via the version check, retry on conflict)
//! - read/write dispatch: the per-attribute matrix with node-class and
//!   datatype guards; batch services fan out item-wise and delegate whole
//!   external namespaces
//!
//! Transport, sessions, encoding and job scheduling live outside this
//! crate and talk to it through decoded request/response structs.

pub mod config;
pub mod datasource;
pub mod edit;
pub mod external;
pub mod node;
pub mod read;
pub mod server;
pub mod store;
pub mod write;

// Re-export the surface most applications touch
pub use config::{ConfigError, ServerConfig, CORE_NAMESPACE_URI};
pub use datasource::DataSource;
pub use edit::edit_node;
pub use external::{ExternalNamespace, ExternalNodeStore};
pub use node::{
    AccessLevel, DataTypeNode, MethodNode, Node, NodeHead, ObjectNode, ObjectTypeNode,
    OnReadCallback, OnWriteCallback, Reference, ReferenceTypeNode, VariableNode,
    VariableTypeNode, VariableValue, ViewNode, WriteMask,
};
pub use read::read_single;
pub use server::Server;
pub use store::{InMemoryNodeStore, NodeSnapshot, NodeStore, ReplaceError};
pub use write::write_single;
