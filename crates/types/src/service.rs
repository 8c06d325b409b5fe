//! Decoded service request and response structures.
//!
//! These are the structs the attribute services consume and produce; binary
//! encoding and decoding happen outside the core. `attribute_id` and
//! `timestamps_to_return` stay raw `u32` here because validating them is
//! the service's job, not the decoder's.

use crate::attribute::{AttributeId, TimestampsToReturn};
use crate::data_value::DataValue;
use crate::date_time::DateTime;
use crate::node_id::NodeId;
use crate::status::StatusCode;
use crate::text::QualifiedName;

/// Common request header fields the core cares about.
#[derive(Debug, Clone, Default)]
pub struct RequestHeader {
    pub timestamp: DateTime,
    pub return_diagnostics: u32,
}

/// Operation-level diagnostic information. Carried through the
/// external-namespace contract; the core itself never populates it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagnosticInfo {
    pub symbolic_id: Option<i32>,
    pub namespace_uri: Option<i32>,
    pub localized_text: Option<i32>,
    pub additional_info: Option<String>,
}

/// One item of a read request.
#[derive(Debug, Clone)]
pub struct ReadValueId {
    pub node_id: NodeId,
    pub attribute_id: u32,
    /// Textual numeric range; empty means "whole value".
    pub index_range: String,
    /// Requested data encoding; empty means the default.
    pub data_encoding: QualifiedName,
}

impl ReadValueId {
    pub fn new(node_id: NodeId, attribute_id: AttributeId) -> ReadValueId {
        ReadValueId {
            node_id,
            attribute_id: attribute_id.into(),
            index_range: String::new(),
            data_encoding: QualifiedName::default(),
        }
    }

    pub fn with_index_range(mut self, index_range: impl Into<String>) -> ReadValueId {
        self.index_range = index_range.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct ReadRequest {
    pub header: RequestHeader,
    pub max_age: f64,
    /// Raw wire value; anything above 3 is invalid.
    pub timestamps_to_return: u32,
    pub nodes_to_read: Vec<ReadValueId>,
}

impl ReadRequest {
    pub fn new(nodes_to_read: Vec<ReadValueId>) -> ReadRequest {
        ReadRequest {
            header: RequestHeader::default(),
            max_age: 0.0,
            timestamps_to_return: TimestampsToReturn::Neither.into(),
            nodes_to_read,
        }
    }

    pub fn with_timestamps(mut self, timestamps: TimestampsToReturn) -> ReadRequest {
        self.timestamps_to_return = timestamps.into();
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReadResponse {
    pub service_result: StatusCode,
    pub results: Vec<DataValue>,
    pub diagnostic_infos: Vec<DiagnosticInfo>,
}

/// One item of a write request.
#[derive(Debug, Clone)]
pub struct WriteValue {
    pub node_id: NodeId,
    pub attribute_id: u32,
    /// Textual numeric range; empty means "replace the whole value".
    pub index_range: String,
    pub value: DataValue,
}

impl WriteValue {
    pub fn new(node_id: NodeId, attribute_id: AttributeId, value: DataValue) -> WriteValue {
        WriteValue {
            node_id,
            attribute_id: attribute_id.into(),
            index_range: String::new(),
            value,
        }
    }

    pub fn with_index_range(mut self, index_range: impl Into<String>) -> WriteValue {
        self.index_range = index_range.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct WriteRequest {
    pub header: RequestHeader,
    pub nodes_to_write: Vec<WriteValue>,
}

impl WriteRequest {
    pub fn new(nodes_to_write: Vec<WriteValue>) -> WriteRequest {
        WriteRequest {
            header: RequestHeader::default(),
            nodes_to_write,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WriteResponse {
    pub service_result: StatusCode,
    pub results: Vec<StatusCode>,
    pub diagnostic_infos: Vec<DiagnosticInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::Scalar;

    #[test]
    fn test_read_request_defaults() {
        let request = ReadRequest::new(vec![ReadValueId::new(
            NodeId::numeric(1, 1),
            AttributeId::DisplayName,
        )]);
        assert_eq!(request.max_age, 0.0);
        assert_eq!(
            request.timestamps_to_return,
            u32::from(TimestampsToReturn::Neither)
        );
        assert_eq!(request.nodes_to_read[0].attribute_id, 4);
        assert!(request.nodes_to_read[0].index_range.is_empty());
    }

    #[test]
    fn test_item_builders() {
        let item = ReadValueId::new(NodeId::numeric(1, 1), AttributeId::Value)
            .with_index_range("0:3");
        assert_eq!(item.index_range, "0:3");

        let write = WriteValue::new(
            NodeId::numeric(1, 1),
            AttributeId::Value,
            DataValue::of(Scalar::Int32(5)),
        )
        .with_index_range("2");
        assert_eq!(write.index_range, "2");
        assert_eq!(write.attribute_id, 13);
    }
}
