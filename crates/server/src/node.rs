//! The node model: eight node classes sharing a common attribute head.
//!
//! Each class struct embeds [`NodeHead`] by composition and the [`Node`]
//! sum type dispatches on the class tag. Nodes are plain owned data: the
//! store hands out `Arc<Node>` snapshots and the edit protocol clones a
//! node, mutates the clone and swaps it back in, so everything here derives
//! `Clone`. Variant payloads inside a clone stay shared until mutated.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use ua_types::{
    LocalizedText, NodeClass, NodeId, NumericRange, QualifiedName, Variant,
};

use crate::datasource::DataSource;

bitflags! {
    /// Variable access level bits (OPC UA Part 3).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AccessLevel: u8 {
        const CURRENT_READ = 1;
        const CURRENT_WRITE = 2;
        const HISTORY_READ = 4;
        const HISTORY_WRITE = 8;
        const SEMANTIC_CHANGE = 16;
        const STATUS_WRITE = 32;
        const TIMESTAMP_WRITE = 64;
    }
}

bitflags! {
    /// Per-attribute writability bits (OPC UA Part 3). The core exposes
    /// these values; enforcing them is the caller's policy decision.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WriteMask: u32 {
        const ACCESS_LEVEL = 1 << 0;
        const ARRAY_DIMENSIONS = 1 << 1;
        const BROWSE_NAME = 1 << 2;
        const CONTAINS_NO_LOOPS = 1 << 3;
        const DATA_TYPE = 1 << 4;
        const DESCRIPTION = 1 << 5;
        const DISPLAY_NAME = 1 << 6;
        const EVENT_NOTIFIER = 1 << 7;
        const EXECUTABLE = 1 << 8;
        const HISTORIZING = 1 << 9;
        const INVERSE_NAME = 1 << 10;
        const IS_ABSTRACT = 1 << 11;
        const MINIMUM_SAMPLING_INTERVAL = 1 << 12;
        const NODE_CLASS = 1 << 13;
        const NODE_ID = 1 << 14;
        const SYMMETRIC = 1 << 15;
        const USER_ACCESS_LEVEL = 1 << 16;
        const USER_EXECUTABLE = 1 << 17;
        const USER_WRITE_MASK = 1 << 18;
        const VALUE_RANK = 1 << 19;
        const WRITE_MASK = 1 << 20;
        const VALUE_FOR_VARIABLE_TYPE = 1 << 21;
    }
}

/// An outgoing reference to another node.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub reference_type_id: NodeId,
    pub target_id: NodeId,
    pub is_inverse: bool,
}

/// The attributes every node class carries.
#[derive(Debug, Clone)]
pub struct NodeHead {
    pub node_id: NodeId,
    pub browse_name: QualifiedName,
    pub display_name: LocalizedText,
    pub description: LocalizedText,
    pub write_mask: WriteMask,
    pub user_write_mask: WriteMask,
    pub references: Vec<Reference>,
}

impl NodeHead {
    pub fn new(
        node_id: NodeId,
        browse_name: QualifiedName,
        display_name: LocalizedText,
    ) -> NodeHead {
        NodeHead {
            node_id,
            browse_name,
            display_name,
            description: LocalizedText::default(),
            write_mask: WriteMask::empty(),
            user_write_mask: WriteMask::empty(),
            references: Vec::new(),
        }
    }
}

/// Notification hook fired before a variable's value is read.
pub type OnReadCallback = Arc<dyn Fn(&NodeId, Option<&NumericRange>) + Send + Sync>;

/// Notification hook fired after a variable's value was written; receives
/// the value now stored on the node.
pub type OnWriteCallback = Arc<dyn Fn(&NodeId, &Variant, Option<&NumericRange>) + Send + Sync>;

/// Where a variable's value comes from. The discriminant is fixed at node
/// creation; a write can change the stored variant but never turn an
/// in-place value into a data source or back.
#[derive(Clone)]
pub enum VariableValue {
    /// The value lives in the node itself.
    Variant {
        value: Variant,
        on_read: Option<OnReadCallback>,
        on_write: Option<OnWriteCallback>,
    },
    /// The value is pulled from (and pushed to) an external provider.
    Source(Arc<dyn DataSource>),
}

impl VariableValue {
    pub fn variant(value: Variant) -> VariableValue {
        VariableValue::Variant {
            value,
            on_read: None,
            on_write: None,
        }
    }
}

impl fmt::Debug for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableValue::Variant { value, .. } => {
                f.debug_tuple("Variant").field(value).finish()
            }
            VariableValue::Source(_) => f.write_str("Source(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObjectNode {
    pub head: NodeHead,
    pub event_notifier: u8,
}

#[derive(Debug, Clone)]
pub struct VariableNode {
    pub head: NodeHead,
    pub value: VariableValue,
    pub value_rank: i32,
    pub array_dimensions: Option<Vec<u32>>,
    pub access_level: AccessLevel,
    pub user_access_level: AccessLevel,
    pub minimum_sampling_interval: f64,
    pub historizing: bool,
}

impl VariableNode {
    /// A read-only variable holding `value` in place.
    pub fn new(
        node_id: NodeId,
        browse_name: QualifiedName,
        display_name: LocalizedText,
        value: Variant,
    ) -> VariableNode {
        VariableNode {
            head: NodeHead::new(node_id, browse_name, display_name),
            value: VariableValue::variant(value),
            value_rank: -1,
            array_dimensions: None,
            access_level: AccessLevel::CURRENT_READ,
            user_access_level: AccessLevel::CURRENT_READ,
            minimum_sampling_interval: 0.0,
            historizing: false,
        }
    }

    /// A variable backed by an external data source.
    pub fn with_source(
        node_id: NodeId,
        browse_name: QualifiedName,
        display_name: LocalizedText,
        source: Arc<dyn DataSource>,
    ) -> VariableNode {
        VariableNode {
            head: NodeHead::new(node_id, browse_name, display_name),
            value: VariableValue::Source(source),
            value_rank: -1,
            array_dimensions: None,
            access_level: AccessLevel::CURRENT_READ,
            user_access_level: AccessLevel::CURRENT_READ,
            minimum_sampling_interval: 0.0,
            historizing: false,
        }
    }

    /// Grants write access on both the access level and user access level.
    pub fn writable(mut self) -> VariableNode {
        self.access_level |= AccessLevel::CURRENT_WRITE;
        self.user_access_level |= AccessLevel::CURRENT_WRITE;
        self
    }

    pub fn with_value_rank(mut self, value_rank: i32) -> VariableNode {
        self.value_rank = value_rank;
        self
    }

    pub fn with_array_dimensions(mut self, dimensions: Vec<u32>) -> VariableNode {
        self.array_dimensions = Some(dimensions);
        self
    }

    pub fn with_minimum_sampling_interval(mut self, interval: f64) -> VariableNode {
        self.minimum_sampling_interval = interval;
        self
    }

    pub fn with_historizing(mut self, historizing: bool) -> VariableNode {
        self.historizing = historizing;
        self
    }

    /// Installs a read notification hook. Only meaningful for in-place
    /// values; ignored on source-backed variables.
    pub fn with_on_read(mut self, callback: OnReadCallback) -> VariableNode {
        if let VariableValue::Variant { on_read, .. } = &mut self.value {
            *on_read = Some(callback);
        }
        self
    }

    /// Installs a write notification hook. Only meaningful for in-place
    /// values; ignored on source-backed variables.
    pub fn with_on_write(mut self, callback: OnWriteCallback) -> VariableNode {
        if let VariableValue::Variant { on_write, .. } = &mut self.value {
            *on_write = Some(callback);
        }
        self
    }
}

#[derive(Debug, Clone)]
pub struct VariableTypeNode {
    pub head: NodeHead,
    /// Type declarations may carry a default value; absent means the Value
    /// attribute is not provided.
    pub value: Option<VariableValue>,
    pub value_rank: i32,
    pub array_dimensions: Option<Vec<u32>>,
    pub is_abstract: bool,
}

#[derive(Debug, Clone)]
pub struct ObjectTypeNode {
    pub head: NodeHead,
    pub is_abstract: bool,
}

#[derive(Debug, Clone)]
pub struct ReferenceTypeNode {
    pub head: NodeHead,
    pub is_abstract: bool,
    pub symmetric: bool,
    pub inverse_name: LocalizedText,
}

#[derive(Debug, Clone)]
pub struct DataTypeNode {
    pub head: NodeHead,
    pub is_abstract: bool,
}

#[derive(Debug, Clone)]
pub struct ViewNode {
    pub head: NodeHead,
    pub contains_no_loops: bool,
    pub event_notifier: u8,
}

#[derive(Debug, Clone)]
pub struct MethodNode {
    pub head: NodeHead,
    pub executable: bool,
    pub user_executable: bool,
}

/// A node of the address space.
#[derive(Debug, Clone)]
pub enum Node {
    Object(ObjectNode),
    Variable(VariableNode),
    Method(MethodNode),
    ObjectType(ObjectTypeNode),
    VariableType(VariableTypeNode),
    ReferenceType(ReferenceTypeNode),
    DataType(DataTypeNode),
    View(ViewNode),
}

impl Node {
    pub fn head(&self) -> &NodeHead {
        match self {
            Node::Object(n) => &n.head,
            Node::Variable(n) => &n.head,
            Node::Method(n) => &n.head,
            Node::ObjectType(n) => &n.head,
            Node::VariableType(n) => &n.head,
            Node::ReferenceType(n) => &n.head,
            Node::DataType(n) => &n.head,
            Node::View(n) => &n.head,
        }
    }

    pub fn head_mut(&mut self) -> &mut NodeHead {
        match self {
            Node::Object(n) => &mut n.head,
            Node::Variable(n) => &mut n.head,
            Node::Method(n) => &mut n.head,
            Node::ObjectType(n) => &mut n.head,
            Node::VariableType(n) => &mut n.head,
            Node::ReferenceType(n) => &mut n.head,
            Node::DataType(n) => &mut n.head,
            Node::View(n) => &mut n.head,
        }
    }

    pub fn node_id(&self) -> &NodeId {
        &self.head().node_id
    }

    pub fn node_class(&self) -> NodeClass {
        match self {
            Node::Object(_) => NodeClass::Object,
            Node::Variable(_) => NodeClass::Variable,
            Node::Method(_) => NodeClass::Method,
            Node::ObjectType(_) => NodeClass::ObjectType,
            Node::VariableType(_) => NodeClass::VariableType,
            Node::ReferenceType(_) => NodeClass::ReferenceType,
            Node::DataType(_) => NodeClass::DataType,
            Node::View(_) => NodeClass::View,
        }
    }

    /// The value backing of a Variable or VariableType node, when present.
    pub fn variable_value(&self) -> Option<&VariableValue> {
        match self {
            Node::Variable(n) => Some(&n.value),
            Node::VariableType(n) => n.value.as_ref(),
            _ => None,
        }
    }

    pub fn variable_value_mut(&mut self) -> Option<&mut VariableValue> {
        match self {
            Node::Variable(n) => Some(&mut n.value),
            Node::VariableType(n) => n.value.as_mut(),
            _ => None,
        }
    }

    /// Appends an outgoing reference.
    pub fn add_reference(&mut self, reference: Reference) {
        self.head_mut().references.push(reference);
    }
}
