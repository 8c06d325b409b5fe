//! OPC UA value model.
//!
//! Key design principles:
//! - NodeId / QualifiedName / LocalizedText: wire identities, hashable where
//!   the node store needs it
//! - Variant: descriptor-tagged scalar or flat row-major array; Arc payloads
//!   make snapshots O(1) and mutation copy-on-write
//! - NumericRange: parsed slice descriptors plus the row-major offset
//!   arithmetic the variant algebra runs on
//! - Service structs: decoded requests/responses; binary codecs live outside

pub mod attribute;
pub mod data_value;
pub mod date_time;
pub mod node_class;
pub mod node_id;
pub mod range;
pub mod registry;
pub mod service;
pub mod status;
pub mod text;
pub mod variant;

// Re-export the types nearly every consumer touches
pub use attribute::{AttributeId, TimestampsToReturn};
pub use data_value::DataValue;
pub use date_time::DateTime;
pub use node_class::{NodeClass, NodeClassMask};
pub use node_id::{Identifier, NodeId};
pub use range::{Dimension, NumericRange};
pub use registry::{registry, BuiltinType, DataTypeDescriptor, DataTypeRegistry};
pub use service::{
    DiagnosticInfo, ReadRequest, ReadResponse, ReadValueId, RequestHeader, WriteRequest,
    WriteResponse, WriteValue,
};
pub use status::StatusCode;
pub use text::{LocalizedText, QualifiedName};
pub use variant::{Scalar, Variant};
