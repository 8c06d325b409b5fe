//! Data-type descriptors and the process-wide type registry.
//!
//! Every [`Variant`](crate::variant::Variant) points at a
//! [`DataTypeDescriptor`]. The built-in OPC UA types live in the static
//! [`BUILTIN_TYPES`] table, indexed by [`BuiltinType`]. Applications that
//! model their own types (enumerations encoded as Int32, opaque types
//! encoded as ByteString) install additional descriptors once, before the
//! server starts answering requests; after that the registry is immutable
//! and shared by every thread.
//!
//! Descriptors carry no copy/delete hooks: value lifecycle is `Clone` and
//! `Drop` on the variant payload itself. What remains is the typing facet
//! the dispatchers need, in particular `type_index`, the built-in encoding
//! a value of the type travels as on the wire.

use std::sync::OnceLock;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::node_id::NodeId;
use crate::status::StatusCode;

/// Index into [`BUILTIN_TYPES`]; doubles as the encoding kind of a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum BuiltinType {
    Boolean = 0,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float,
    Double,
    String,
    DateTime,
    Guid,
    ByteString,
    NodeId,
    StatusCode,
    QualifiedName,
    LocalizedText,
}

impl BuiltinType {
    pub const COUNT: usize = 19;

    /// The shared descriptor for this built-in type.
    pub fn descriptor(self) -> &'static DataTypeDescriptor {
        &BUILTIN_TYPES[self as usize]
    }
}

/// Static description of a data type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTypeDescriptor {
    /// Name for diagnostics.
    pub name: &'static str,
    /// The node id of the type in the address space.
    pub type_id: NodeId,
    /// The built-in encoding values of this type travel as.
    pub type_index: BuiltinType,
    /// Whether the type belongs to namespace zero.
    pub namespace_zero: bool,
    /// Encoded byte size for fixed-width types, 0 for variable-length ones.
    pub mem_size: u8,
}

impl DataTypeDescriptor {
    /// Two descriptors denote the same type iff their type ids match.
    pub fn is(&self, other: &DataTypeDescriptor) -> bool {
        std::ptr::eq(self, other) || self.type_id == other.type_id
    }
}

const fn builtin(
    name: &'static str,
    numeric_id: u32,
    type_index: BuiltinType,
    mem_size: u8,
) -> DataTypeDescriptor {
    DataTypeDescriptor {
        name,
        type_id: NodeId::numeric(0, numeric_id),
        type_index,
        namespace_zero: true,
        mem_size,
    }
}

/// The built-in type table. Indexed by [`BuiltinType`]; the numeric ids are
/// the namespace-zero data-type node ids from OPC UA Part 6.
pub static BUILTIN_TYPES: [DataTypeDescriptor; BuiltinType::COUNT] = [
    builtin("Boolean", 1, BuiltinType::Boolean, 1),
    builtin("SByte", 2, BuiltinType::SByte, 1),
    builtin("Byte", 3, BuiltinType::Byte, 1),
    builtin("Int16", 4, BuiltinType::Int16, 2),
    builtin("UInt16", 5, BuiltinType::UInt16, 2),
    builtin("Int32", 6, BuiltinType::Int32, 4),
    builtin("UInt32", 7, BuiltinType::UInt32, 4),
    builtin("Int64", 8, BuiltinType::Int64, 8),
    builtin("UInt64", 9, BuiltinType::UInt64, 8),
    builtin("Float", 10, BuiltinType::Float, 4),
    builtin("Double", 11, BuiltinType::Double, 8),
    builtin("String", 12, BuiltinType::String, 0),
    builtin("DateTime", 13, BuiltinType::DateTime, 8),
    builtin("Guid", 14, BuiltinType::Guid, 16),
    builtin("ByteString", 15, BuiltinType::ByteString, 0),
    builtin("NodeId", 17, BuiltinType::NodeId, 0),
    builtin("StatusCode", 19, BuiltinType::StatusCode, 4),
    builtin("QualifiedName", 20, BuiltinType::QualifiedName, 0),
    builtin("LocalizedText", 21, BuiltinType::LocalizedText, 0),
];

/// Process-wide lookup from type node id to descriptor.
///
/// Built-ins are always present; custom descriptors come from
/// [`DataTypeRegistry::install`]. The registry freezes at first use.
#[derive(Debug, Default)]
pub struct DataTypeRegistry {
    custom: Vec<DataTypeDescriptor>,
}

static REGISTRY: OnceLock<DataTypeRegistry> = OnceLock::new();

/// The process-wide registry, initialized with the built-ins on first use.
pub fn registry() -> &'static DataTypeRegistry {
    REGISTRY.get_or_init(DataTypeRegistry::default)
}

impl DataTypeRegistry {
    /// Installs custom descriptors. Must happen before the first
    /// [`registry`] call anywhere in the process; afterwards the table is
    /// frozen and installation reports `BAD_INTERNAL_ERROR`.
    pub fn install(custom: Vec<DataTypeDescriptor>) -> Result<(), StatusCode> {
        REGISTRY
            .set(DataTypeRegistry { custom })
            .map_err(|_| StatusCode::BAD_INTERNAL_ERROR)
    }

    /// Finds the descriptor for a type node id, built-ins first.
    pub fn find(&self, type_id: &NodeId) -> Option<&DataTypeDescriptor> {
        BUILTIN_TYPES
            .iter()
            .chain(self.custom.iter())
            .find(|d| d.type_id == *type_id)
    }
}
