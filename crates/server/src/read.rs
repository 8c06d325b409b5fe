//! Single-item attribute read dispatch.
//!
//! Guards run in wire order: data encoding, index-range-on-non-Value, node
//! lookup, then the per-attribute match with its node-class legality
//! checks. Any failure clears the value and surfaces as the result status;
//! the server timestamp is stamped on everything the dispatch produced,
//! success or not.

use ua_types::{
    AttributeId, BuiltinType, DataValue, DateTime, NodeId, NumericRange, ReadValueId, Scalar,
    StatusCode, TimestampsToReturn, Variant,
};

use crate::node::{Node, VariableValue};
use crate::store::NodeStore;

const DEFAULT_BINARY_ENCODING: &str = "DefaultBinary";

/// Reads one attribute of one node into a [`DataValue`].
pub fn read_single(
    store: &dyn NodeStore,
    timestamps: TimestampsToReturn,
    item: &ReadValueId,
) -> DataValue {
    let mut out = DataValue::default();

    if !item.data_encoding.name.is_empty()
        && item.data_encoding.name != DEFAULT_BINARY_ENCODING
    {
        out.status = Some(StatusCode::BAD_DATA_ENCODING_INVALID);
        return out;
    }

    // An index range only makes sense on the Value attribute.
    if !item.index_range.is_empty() && item.attribute_id != u32::from(AttributeId::Value) {
        out.status = Some(StatusCode::BAD_INDEX_RANGE_NO_DATA);
        return out;
    }

    let Some(snapshot) = store.get(&item.node_id) else {
        out.status = Some(StatusCode::BAD_NODEID_UNKNOWN);
        return out;
    };

    let status = read_attribute(snapshot.node.as_ref(), timestamps, item, &mut out);
    if !status.is_good() {
        out.value = None;
        out.status = Some(status);
    }
    stamp_server_timestamp(timestamps, &mut out);
    out
}

fn read_attribute(
    node: &Node,
    timestamps: TimestampsToReturn,
    item: &ReadValueId,
    out: &mut DataValue,
) -> StatusCode {
    let Ok(attribute) = AttributeId::try_from(item.attribute_id) else {
        return StatusCode::BAD_ATTRIBUTE_ID_INVALID;
    };

    let head = node.head();
    let value = match attribute {
        AttributeId::NodeId => Variant::scalar(Scalar::NodeId(head.node_id.clone())),
        AttributeId::NodeClass => Variant::scalar(Scalar::Int32(node.node_class() as u32 as i32)),
        AttributeId::BrowseName => {
            Variant::scalar(Scalar::QualifiedName(head.browse_name.clone()))
        }
        AttributeId::DisplayName => {
            Variant::scalar(Scalar::LocalizedText(head.display_name.clone()))
        }
        AttributeId::Description => {
            Variant::scalar(Scalar::LocalizedText(head.description.clone()))
        }
        AttributeId::WriteMask => Variant::scalar(Scalar::UInt32(head.write_mask.bits())),
        AttributeId::UserWriteMask => {
            Variant::scalar(Scalar::UInt32(head.user_write_mask.bits()))
        }
        AttributeId::IsAbstract => match node {
            Node::ReferenceType(n) => Variant::scalar(Scalar::Boolean(n.is_abstract)),
            Node::ObjectType(n) => Variant::scalar(Scalar::Boolean(n.is_abstract)),
            Node::VariableType(n) => Variant::scalar(Scalar::Boolean(n.is_abstract)),
            Node::DataType(n) => Variant::scalar(Scalar::Boolean(n.is_abstract)),
            _ => return StatusCode::BAD_ATTRIBUTE_ID_INVALID,
        },
        AttributeId::Symmetric => match node {
            Node::ReferenceType(n) => Variant::scalar(Scalar::Boolean(n.symmetric)),
            _ => return StatusCode::BAD_ATTRIBUTE_ID_INVALID,
        },
        AttributeId::InverseName => match node {
            Node::ReferenceType(n) => {
                Variant::scalar(Scalar::LocalizedText(n.inverse_name.clone()))
            }
            _ => return StatusCode::BAD_ATTRIBUTE_ID_INVALID,
        },
        AttributeId::ContainsNoLoops => match node {
            Node::View(n) => Variant::scalar(Scalar::Boolean(n.contains_no_loops)),
            _ => return StatusCode::BAD_ATTRIBUTE_ID_INVALID,
        },
        AttributeId::EventNotifier => match node {
            Node::View(n) => Variant::scalar(Scalar::Byte(n.event_notifier)),
            Node::Object(n) => Variant::scalar(Scalar::Byte(n.event_notifier)),
            _ => return StatusCode::BAD_ATTRIBUTE_ID_INVALID,
        },
        AttributeId::Value => {
            let Some(backing) = node.variable_value() else {
                return StatusCode::BAD_ATTRIBUTE_ID_INVALID;
            };
            return read_value(&head.node_id, backing, timestamps, &item.index_range, out);
        }
        AttributeId::DataType => {
            let Some(backing) = node.variable_value() else {
                return StatusCode::BAD_ATTRIBUTE_ID_INVALID;
            };
            return read_data_type(&head.node_id, backing, out);
        }
        AttributeId::ValueRank => match node {
            Node::Variable(n) => Variant::scalar(Scalar::Int32(n.value_rank)),
            Node::VariableType(n) => Variant::scalar(Scalar::Int32(n.value_rank)),
            _ => return StatusCode::BAD_ATTRIBUTE_ID_INVALID,
        },
        AttributeId::ArrayDimensions => {
            let Some(backing) = node.variable_value() else {
                return StatusCode::BAD_ATTRIBUTE_ID_INVALID;
            };
            return read_array_dimensions(&head.node_id, backing, out);
        }
        AttributeId::AccessLevel => match node {
            Node::Variable(n) => Variant::scalar(Scalar::Byte(n.access_level.bits())),
            _ => return StatusCode::BAD_ATTRIBUTE_ID_INVALID,
        },
        AttributeId::UserAccessLevel => match node {
            Node::Variable(n) => Variant::scalar(Scalar::Byte(n.user_access_level.bits())),
            _ => return StatusCode::BAD_ATTRIBUTE_ID_INVALID,
        },
        AttributeId::MinimumSamplingInterval => match node {
            Node::Variable(n) => Variant::scalar(Scalar::Double(n.minimum_sampling_interval)),
            _ => return StatusCode::BAD_ATTRIBUTE_ID_INVALID,
        },
        AttributeId::Historizing => match node {
            Node::Variable(n) => Variant::scalar(Scalar::Boolean(n.historizing)),
            _ => return StatusCode::BAD_ATTRIBUTE_ID_INVALID,
        },
        AttributeId::Executable => match node {
            Node::Method(n) => Variant::scalar(Scalar::Boolean(n.executable)),
            _ => return StatusCode::BAD_ATTRIBUTE_ID_INVALID,
        },
        AttributeId::UserExecutable => match node {
            Node::Method(n) => Variant::scalar(Scalar::Boolean(n.user_executable)),
            _ => return StatusCode::BAD_ATTRIBUTE_ID_INVALID,
        },
    };

    out.value = Some(value);
    StatusCode::GOOD
}

fn read_value(
    node_id: &NodeId,
    backing: &VariableValue,
    timestamps: TimestampsToReturn,
    index_range: &str,
    out: &mut DataValue,
) -> StatusCode {
    let range = if index_range.is_empty() {
        None
    } else {
        match NumericRange::parse(index_range) {
            Ok(range) => Some(range),
            Err(status) => return status,
        }
    };

    match backing {
        VariableValue::Variant { value, on_read, .. } => {
            if let Some(callback) = on_read {
                callback(node_id, range.as_ref());
            }
            match &range {
                // The clone shares the array payload: a borrowed snapshot,
                // not a deep copy.
                None => out.value = Some(value.clone()),
                Some(range) => match value.copy_range(range) {
                    Ok(sliced) => out.value = Some(sliced),
                    Err(status) => return status,
                },
            }
            stamp_source_timestamp(timestamps, out);
            StatusCode::GOOD
        }
        VariableValue::Source(source) => {
            let status = source.read(node_id, timestamps.wants_source(), range.as_ref(), out);
            if status.is_good() {
                // The source may have stamped its own time; fill in only
                // when it did not.
                stamp_source_timestamp(timestamps, out);
            }
            status
        }
    }
}

fn read_data_type(node_id: &NodeId, backing: &VariableValue, out: &mut DataValue) -> StatusCode {
    let type_id = match backing {
        VariableValue::Variant { value, .. } => value.ty().type_id.clone(),
        VariableValue::Source(source) => match scratch_read(node_id, source.as_ref()) {
            Ok(current) => current.ty().type_id.clone(),
            Err(status) => return status,
        },
    };
    out.value = Some(Variant::scalar(Scalar::NodeId(type_id)));
    StatusCode::GOOD
}

fn read_array_dimensions(
    node_id: &NodeId,
    backing: &VariableValue,
    out: &mut DataValue,
) -> StatusCode {
    let dimensions: Vec<Scalar> = match backing {
        VariableValue::Variant { value, .. } => collect_dimensions(value),
        VariableValue::Source(source) => match scratch_read(node_id, source.as_ref()) {
            Ok(current) => collect_dimensions(&current),
            Err(status) => return status,
        },
    };
    match Variant::array(BuiltinType::Int32, dimensions) {
        Ok(value) => {
            out.value = Some(value);
            StatusCode::GOOD
        }
        Err(status) => status,
    }
}

fn collect_dimensions(value: &Variant) -> Vec<Scalar> {
    value
        .dimensions()
        .unwrap_or(&[])
        .iter()
        .map(|&d| Scalar::Int32(d))
        .collect()
}

/// Pulls the current value out of a data source to inspect one of its
/// facets (data type, dimensions) without touching timestamps.
fn scratch_read(
    node_id: &NodeId,
    source: &dyn crate::datasource::DataSource,
) -> Result<Variant, StatusCode> {
    let mut scratch = DataValue::default();
    let status = source.read(node_id, false, None, &mut scratch);
    if !status.is_good() {
        return Err(status);
    }
    scratch.value.ok_or(StatusCode::BAD_INTERNAL_ERROR)
}

fn stamp_server_timestamp(timestamps: TimestampsToReturn, out: &mut DataValue) {
    if timestamps.wants_server() {
        out.server_timestamp = Some(DateTime::now());
    }
}

fn stamp_source_timestamp(timestamps: TimestampsToReturn, out: &mut DataValue) {
    if timestamps.wants_source() && out.source_timestamp.is_none() {
        out.source_timestamp = Some(DateTime::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::testing::CounterSource;
    use crate::node::{NodeHead, ObjectNode, VariableNode};
    use crate::store::InMemoryNodeStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use ua_types::{LocalizedText, QualifiedName};

    fn store_with(node: Node) -> InMemoryNodeStore {
        let store = InMemoryNodeStore::new();
        assert_eq!(store.insert(node), StatusCode::GOOD);
        store
    }

    fn int32_variable(id: u32, values: &[i32]) -> Node {
        let value = Variant::array(
            BuiltinType::Int32,
            values.iter().map(|&v| Scalar::Int32(v)).collect(),
        )
        .unwrap();
        Node::Variable(VariableNode::new(
            NodeId::numeric(1, id),
            QualifiedName::new(1, "Samples"),
            LocalizedText::from_text("Samples"),
            value,
        ))
    }

    fn read(
        store: &InMemoryNodeStore,
        id: u32,
        attribute: AttributeId,
    ) -> DataValue {
        read_single(
            store,
            TimestampsToReturn::Neither,
            &ReadValueId::new(NodeId::numeric(1, id), attribute),
        )
    }

    #[test]
    fn test_read_head_attributes() {
        let store = store_with(int32_variable(1, &[1, 2, 3]));

        let result = read(&store, 1, AttributeId::BrowseName);
        assert_eq!(
            result.value.unwrap().as_scalar(),
            Some(&Scalar::QualifiedName(QualifiedName::new(1, "Samples")))
        );

        let result = read(&store, 1, AttributeId::NodeClass);
        assert_eq!(result.value.unwrap().as_scalar(), Some(&Scalar::Int32(2)));

        let result = read(&store, 1, AttributeId::WriteMask);
        assert_eq!(result.value.unwrap().as_scalar(), Some(&Scalar::UInt32(0)));
    }

    #[test]
    fn test_unknown_node() {
        let store = InMemoryNodeStore::new();
        let result = read(&store, 9, AttributeId::DisplayName);
        assert_eq!(result.status(), StatusCode::BAD_NODEID_UNKNOWN);
        assert!(result.value.is_none());
    }

    #[test]
    fn test_unknown_attribute_id() {
        let store = store_with(int32_variable(1, &[1]));
        let mut item = ReadValueId::new(NodeId::numeric(1, 1), AttributeId::Value);
        item.attribute_id = 99;
        let result = read_single(&store, TimestampsToReturn::Neither, &item);
        assert_eq!(result.status(), StatusCode::BAD_ATTRIBUTE_ID_INVALID);
    }

    #[test]
    fn test_class_guard() {
        let store = store_with(Node::Object(ObjectNode {
            head: NodeHead::new(
                NodeId::numeric(1, 1),
                QualifiedName::new(1, "Obj"),
                LocalizedText::from_text("Obj"),
            ),
            event_notifier: 5,
        }));

        let result = read(&store, 1, AttributeId::IsAbstract);
        assert_eq!(result.status(), StatusCode::BAD_ATTRIBUTE_ID_INVALID);
        assert!(result.value.is_none());

        // EventNotifier is legal on objects
        let result = read(&store, 1, AttributeId::EventNotifier);
        assert_eq!(result.value.unwrap().as_scalar(), Some(&Scalar::Byte(5)));
    }

    #[test]
    fn test_wrong_encoding() {
        let store = store_with(int32_variable(1, &[1]));
        let mut item = ReadValueId::new(NodeId::numeric(1, 1), AttributeId::Value);
        item.data_encoding = QualifiedName::new(0, "DefaultXml");
        let result = read_single(&store, TimestampsToReturn::Neither, &item);
        assert_eq!(result.status(), StatusCode::BAD_DATA_ENCODING_INVALID);

        // The default-binary name is accepted
        let mut item = ReadValueId::new(NodeId::numeric(1, 1), AttributeId::Value);
        item.data_encoding = QualifiedName::new(0, "DefaultBinary");
        let result = read_single(&store, TimestampsToReturn::Neither, &item);
        assert_eq!(result.status(), StatusCode::GOOD);
    }

    #[test]
    fn test_range_on_non_value_attribute() {
        let store = store_with(int32_variable(1, &[1, 2, 3]));
        let item = ReadValueId::new(NodeId::numeric(1, 1), AttributeId::DisplayName)
            .with_index_range("0:1");
        let result = read_single(&store, TimestampsToReturn::Neither, &item);
        assert_eq!(result.status(), StatusCode::BAD_INDEX_RANGE_NO_DATA);
    }

    #[test]
    fn test_value_with_range() {
        let store = store_with(int32_variable(1, &[10, 11, 12, 13]));
        let item =
            ReadValueId::new(NodeId::numeric(1, 1), AttributeId::Value).with_index_range("1:2");
        let result = read_single(&store, TimestampsToReturn::Neither, &item);
        assert_eq!(result.status(), StatusCode::GOOD);
        assert_eq!(
            result.value.unwrap().elements().unwrap(),
            &[Scalar::Int32(11), Scalar::Int32(12)]
        );
    }

    #[test]
    fn test_range_on_scalar_value() {
        let store = store_with(Node::Variable(VariableNode::new(
            NodeId::numeric(1, 1),
            QualifiedName::new(1, "S"),
            LocalizedText::from_text("S"),
            Variant::scalar(Scalar::Int32(7)),
        )));
        let item =
            ReadValueId::new(NodeId::numeric(1, 1), AttributeId::Value).with_index_range("0");
        let result = read_single(&store, TimestampsToReturn::Neither, &item);
        assert_eq!(result.status(), StatusCode::BAD_INDEX_RANGE_INVALID);
    }

    #[test]
    fn test_on_read_hook_fires() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let node = VariableNode::new(
            NodeId::numeric(1, 1),
            QualifiedName::new(1, "S"),
            LocalizedText::from_text("S"),
            Variant::scalar(Scalar::Int32(7)),
        )
        .with_on_read(Arc::new(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        let store = store_with(Node::Variable(node));

        read(&store, 1, AttributeId::Value);
        read(&store, 1, AttributeId::Value);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_data_source_value_read() {
        let node = VariableNode::with_source(
            NodeId::numeric(1, 1),
            QualifiedName::new(1, "Counter"),
            LocalizedText::from_text("Counter"),
            Arc::new(CounterSource::new(41)),
        );
        let store = store_with(Node::Variable(node));

        let result = read(&store, 1, AttributeId::Value);
        assert_eq!(result.status(), StatusCode::GOOD);
        assert_eq!(result.value.unwrap().as_scalar(), Some(&Scalar::Int64(41)));
    }

    #[test]
    fn test_data_type_from_variant_and_source() {
        let store = store_with(int32_variable(1, &[1]));
        let result = read(&store, 1, AttributeId::DataType);
        assert_eq!(
            result.value.unwrap().as_scalar(),
            Some(&Scalar::NodeId(NodeId::numeric(0, 6)))
        );

        let node = VariableNode::with_source(
            NodeId::numeric(1, 2),
            QualifiedName::new(1, "Counter"),
            LocalizedText::from_text("Counter"),
            Arc::new(CounterSource::new(0)),
        );
        store.insert(Node::Variable(node));
        let result = read(&store, 2, AttributeId::DataType);
        // Int64 data type node id
        assert_eq!(
            result.value.unwrap().as_scalar(),
            Some(&Scalar::NodeId(NodeId::numeric(0, 8)))
        );
    }

    #[test]
    fn test_array_dimensions_read() {
        let matrix = Variant::array(
            BuiltinType::Int32,
            (0..6).map(Scalar::Int32).collect(),
        )
        .unwrap()
        .with_dimensions(vec![2, 3])
        .unwrap();
        let store = store_with(Node::Variable(VariableNode::new(
            NodeId::numeric(1, 1),
            QualifiedName::new(1, "M"),
            LocalizedText::from_text("M"),
            matrix,
        )));

        let result = read(&store, 1, AttributeId::ArrayDimensions);
        assert_eq!(
            result.value.unwrap().elements().unwrap(),
            &[Scalar::Int32(2), Scalar::Int32(3)]
        );
    }

    #[test]
    fn test_timestamps() {
        let store = store_with(int32_variable(1, &[1]));
        let item = ReadValueId::new(NodeId::numeric(1, 1), AttributeId::Value);

        let result = read_single(&store, TimestampsToReturn::Neither, &item);
        assert!(result.server_timestamp.is_none());
        assert!(result.source_timestamp.is_none());

        let result = read_single(&store, TimestampsToReturn::Server, &item);
        assert!(result.server_timestamp.is_some());
        assert!(result.source_timestamp.is_none());

        let result = read_single(&store, TimestampsToReturn::Both, &item);
        assert!(result.server_timestamp.is_some());
        assert!(result.source_timestamp.is_some());

        // Errors still get the server timestamp
        let result = read_single(
            &store,
            TimestampsToReturn::Server,
            &ReadValueId::new(NodeId::numeric(1, 1), AttributeId::Executable),
        );
        assert_eq!(result.status(), StatusCode::BAD_ATTRIBUTE_ID_INVALID);
        assert!(result.server_timestamp.is_some());
    }
}
