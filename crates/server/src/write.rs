//! Single-item attribute write dispatch.
//!
//! A Value write on a source-backed variable goes straight to the data
//! source; every other write runs inside the edit-node protocol, so the
//! dispatch below always mutates a private copy and either commits it
//! whole or not at all. Variable-length payloads are installed by moving
//! them into the copy; ownership makes the no-aliasing rule structural.

use ua_types::{
    AttributeId, BuiltinType, LocalizedText, NodeId, NumericRange, QualifiedName, Scalar,
    StatusCode, Variant, WriteValue,
};

use crate::datasource::DataSource;
use crate::edit::edit_node;
use crate::node::{AccessLevel, Node, VariableValue, WriteMask};
use crate::store::NodeStore;

/// Writes one attribute of one node.
pub fn write_single(store: &dyn NodeStore, item: &WriteValue) -> StatusCode {
    let Some(incoming) = item.value.value.as_ref() else {
        return StatusCode::BAD_NO_DATA;
    };

    if item.attribute_id == u32::from(AttributeId::Value) {
        let Some(snapshot) = store.get(&item.node_id) else {
            return StatusCode::BAD_NODEID_UNKNOWN;
        };
        if let Some(VariableValue::Source(source)) = snapshot.node.variable_value() {
            return write_through_source(
                source.as_ref(),
                &item.node_id,
                incoming,
                &item.index_range,
            );
        }
    }

    edit_node(store, &item.node_id, |node| apply_write(node, item))
}

fn write_through_source(
    source: &dyn DataSource,
    node_id: &NodeId,
    value: &Variant,
    index_range: &str,
) -> StatusCode {
    if index_range.is_empty() {
        return source.write(node_id, value, None);
    }
    match NumericRange::parse(index_range) {
        Ok(range) => source.write(node_id, value, Some(&range)),
        Err(status) => status,
    }
}

/// The editor body: dispatches on the attribute id with node-class and
/// datatype guards. Runs on a copy, possibly more than once.
fn apply_write(node: &mut Node, item: &WriteValue) -> StatusCode {
    let Ok(attribute) = AttributeId::try_from(item.attribute_id) else {
        return StatusCode::BAD_ATTRIBUTE_ID_INVALID;
    };
    let Some(incoming) = item.value.value.as_ref() else {
        return StatusCode::BAD_NO_DATA;
    };

    match attribute {
        AttributeId::NodeId | AttributeId::NodeClass | AttributeId::DataType => {
            StatusCode::BAD_WRITE_NOT_SUPPORTED
        }
        // Not writable through the attribute service
        AttributeId::ValueRank | AttributeId::ArrayDimensions => {
            StatusCode::BAD_ATTRIBUTE_ID_INVALID
        }
        AttributeId::BrowseName => match expect_qualified_name(incoming) {
            Ok(name) => {
                node.head_mut().browse_name = name;
                StatusCode::GOOD
            }
            Err(status) => status,
        },
        AttributeId::DisplayName => match expect_localized_text(incoming) {
            Ok(text) => {
                node.head_mut().display_name = text;
                StatusCode::GOOD
            }
            Err(status) => status,
        },
        AttributeId::Description => match expect_localized_text(incoming) {
            Ok(text) => {
                node.head_mut().description = text;
                StatusCode::GOOD
            }
            Err(status) => status,
        },
        AttributeId::WriteMask => match expect_uint32(incoming) {
            Ok(bits) => {
                node.head_mut().write_mask = WriteMask::from_bits_retain(bits);
                StatusCode::GOOD
            }
            Err(status) => status,
        },
        AttributeId::UserWriteMask => match expect_uint32(incoming) {
            Ok(bits) => {
                node.head_mut().user_write_mask = WriteMask::from_bits_retain(bits);
                StatusCode::GOOD
            }
            Err(status) => status,
        },
        AttributeId::IsAbstract => {
            let slot = match node {
                Node::ObjectType(n) => &mut n.is_abstract,
                Node::ReferenceType(n) => &mut n.is_abstract,
                Node::VariableType(n) => &mut n.is_abstract,
                Node::DataType(n) => &mut n.is_abstract,
                _ => return StatusCode::BAD_NODE_CLASS_INVALID,
            };
            set_bool(slot, incoming)
        }
        AttributeId::Symmetric => match node {
            Node::ReferenceType(n) => set_bool(&mut n.symmetric, incoming),
            _ => StatusCode::BAD_NODE_CLASS_INVALID,
        },
        AttributeId::InverseName => match node {
            Node::ReferenceType(n) => match expect_localized_text(incoming) {
                Ok(text) => {
                    n.inverse_name = text;
                    StatusCode::GOOD
                }
                Err(status) => status,
            },
            _ => StatusCode::BAD_NODE_CLASS_INVALID,
        },
        AttributeId::ContainsNoLoops => match node {
            Node::View(n) => set_bool(&mut n.contains_no_loops, incoming),
            _ => StatusCode::BAD_NODE_CLASS_INVALID,
        },
        AttributeId::EventNotifier => {
            let slot = match node {
                Node::View(n) => &mut n.event_notifier,
                Node::Object(n) => &mut n.event_notifier,
                _ => return StatusCode::BAD_NODE_CLASS_INVALID,
            };
            match expect_byte(incoming) {
                Ok(byte) => {
                    *slot = byte;
                    StatusCode::GOOD
                }
                Err(status) => status,
            }
        }
        AttributeId::Value => match node {
            Node::Variable(_) | Node::VariableType(_) => {
                write_value_in_place(node, item, incoming)
            }
            _ => StatusCode::BAD_NODE_CLASS_INVALID,
        },
        AttributeId::AccessLevel => match node {
            Node::Variable(n) => match expect_byte(incoming) {
                Ok(bits) => {
                    n.access_level = AccessLevel::from_bits_retain(bits);
                    StatusCode::GOOD
                }
                Err(status) => status,
            },
            _ => StatusCode::BAD_NODE_CLASS_INVALID,
        },
        AttributeId::UserAccessLevel => match node {
            Node::Variable(n) => match expect_byte(incoming) {
                Ok(bits) => {
                    n.user_access_level = AccessLevel::from_bits_retain(bits);
                    StatusCode::GOOD
                }
                Err(status) => status,
            },
            _ => StatusCode::BAD_NODE_CLASS_INVALID,
        },
        AttributeId::MinimumSamplingInterval => match node {
            Node::Variable(n) => match expect_double(incoming) {
                Ok(interval) => {
                    n.minimum_sampling_interval = interval;
                    StatusCode::GOOD
                }
                Err(status) => status,
            },
            _ => StatusCode::BAD_NODE_CLASS_INVALID,
        },
        AttributeId::Historizing => match node {
            Node::Variable(n) => set_bool(&mut n.historizing, incoming),
            _ => StatusCode::BAD_NODE_CLASS_INVALID,
        },
        AttributeId::Executable => match node {
            Node::Method(n) => set_bool(&mut n.executable, incoming),
            _ => StatusCode::BAD_NODE_CLASS_INVALID,
        },
        AttributeId::UserExecutable => match node {
            Node::Method(n) => set_bool(&mut n.user_executable, incoming),
            _ => StatusCode::BAD_NODE_CLASS_INVALID,
        },
    }
}

fn write_value_in_place(node: &mut Node, item: &WriteValue, incoming: &Variant) -> StatusCode {
    let node_id = node.head().node_id.clone();
    let Some(backing) = node.variable_value_mut() else {
        return StatusCode::BAD_NODE_CLASS_INVALID;
    };
    let VariableValue::Variant {
        value: current,
        on_write,
        ..
    } = backing
    else {
        // Source-backed Value writes are delegated before the editor runs;
        // reaching this arm means the node was swapped out mid-request.
        return StatusCode::BAD_INTERNAL_ERROR;
    };

    let range = if item.index_range.is_empty() {
        None
    } else {
        match NumericRange::parse(&item.index_range) {
            Ok(range) => Some(range),
            Err(status) => return status,
        }
    };

    // The wire type may legitimately differ from the stored type (enums as
    // Int32, opaque types as ByteString, strings over byte arrays).
    let adjusted = match incoming.clone().coerce_to(current) {
        Ok(variant) => variant,
        Err(status) => return status,
    };

    match &range {
        None => *current = adjusted,
        Some(range) => {
            // A scalar source never matches a range extent, exactly like a
            // zero-length array.
            let source = adjusted.elements().unwrap_or(&[]);
            let status = current.set_range_copy(source, range);
            if !status.is_good() {
                return status;
            }
        }
    }

    if let Some(callback) = on_write {
        callback(&node_id, current, range.as_ref());
    }
    StatusCode::GOOD
}

fn typed_scalar<'a>(value: &'a Variant, kind: BuiltinType) -> Result<&'a Scalar, StatusCode> {
    if !value.ty().is(kind.descriptor()) {
        return Err(StatusCode::BAD_TYPE_MISMATCH);
    }
    value.as_scalar().ok_or(StatusCode::BAD_TYPE_MISMATCH)
}

fn set_bool(slot: &mut bool, value: &Variant) -> StatusCode {
    match typed_scalar(value, BuiltinType::Boolean) {
        Ok(Scalar::Boolean(b)) => {
            *slot = *b;
            StatusCode::GOOD
        }
        Ok(_) => StatusCode::BAD_TYPE_MISMATCH,
        Err(status) => status,
    }
}

fn expect_byte(value: &Variant) -> Result<u8, StatusCode> {
    match typed_scalar(value, BuiltinType::Byte)? {
        Scalar::Byte(b) => Ok(*b),
        _ => Err(StatusCode::BAD_TYPE_MISMATCH),
    }
}

fn expect_uint32(value: &Variant) -> Result<u32, StatusCode> {
    match typed_scalar(value, BuiltinType::UInt32)? {
        Scalar::UInt32(v) => Ok(*v),
        _ => Err(StatusCode::BAD_TYPE_MISMATCH),
    }
}

fn expect_double(value: &Variant) -> Result<f64, StatusCode> {
    match typed_scalar(value, BuiltinType::Double)? {
        Scalar::Double(v) => Ok(*v),
        _ => Err(StatusCode::BAD_TYPE_MISMATCH),
    }
}

fn expect_qualified_name(value: &Variant) -> Result<QualifiedName, StatusCode> {
    match typed_scalar(value, BuiltinType::QualifiedName)? {
        Scalar::QualifiedName(name) => Ok(name.clone()),
        _ => Err(StatusCode::BAD_TYPE_MISMATCH),
    }
}

fn expect_localized_text(value: &Variant) -> Result<LocalizedText, StatusCode> {
    match typed_scalar(value, BuiltinType::LocalizedText)? {
        Scalar::LocalizedText(text) => Ok(text.clone()),
        _ => Err(StatusCode::BAD_TYPE_MISMATCH),
    }
}
