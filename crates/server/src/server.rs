//! The server core: address space plus the batched attribute services.
//!
//! Whole-request faults (empty batch, bad timestamp mode, bad max age,
//! oversized batch) surface as the response-level service result; per-item
//! faults only ever touch their own result slot. Items belonging to a
//! registered external namespace are delegated in one call per namespace;
//! everything else fans out through the single-item dispatchers. Each
//! result slot is written exactly once and results match input order.

use std::sync::Arc;

use tracing::{debug, warn};

use ua_types::{
    DataValue, DateTime, NodeId, ReadRequest, ReadResponse, ReadValueId, StatusCode,
    TimestampsToReturn, WriteRequest, WriteResponse, WriteValue,
};

use crate::config::{ServerConfig, CORE_NAMESPACE_URI};
use crate::external::{ExternalNamespace, ExternalNodeStore};
use crate::node::{Node, Reference};
use crate::read;
use crate::store::{InMemoryNodeStore, NodeStore};
use crate::write;

/// The address-space core of an OPC UA server.
pub struct Server {
    config: ServerConfig,
    namespaces: Vec<String>,
    start_time: DateTime,
    store: Arc<dyn NodeStore>,
    external_namespaces: Vec<ExternalNamespace>,
}

impl Server {
    /// A server over a fresh in-memory node store.
    pub fn new(config: ServerConfig) -> Server {
        let store = Arc::new(InMemoryNodeStore::with_shards(config.store_shards));
        Server::with_store(config, store)
    }

    /// A server over a caller-provided node store.
    pub fn with_store(config: ServerConfig, store: Arc<dyn NodeStore>) -> Server {
        let mut namespaces = vec![CORE_NAMESPACE_URI.to_string()];
        namespaces.extend(config.namespaces.iter().cloned());
        Server {
            config,
            namespaces,
            start_time: DateTime::now(),
            store,
            external_namespaces: Vec::new(),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// When this server instance was constructed.
    pub fn start_time(&self) -> DateTime {
        self.start_time
    }

    pub fn store(&self) -> &dyn NodeStore {
        self.store.as_ref()
    }

    /// The namespace array; index 0 is always the OPC UA core namespace.
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Adds a namespace URI and returns its index. Adding a URI that is
    /// already present returns the existing index.
    pub fn add_namespace(&mut self, uri: impl Into<String>) -> u16 {
        let uri = uri.into();
        if let Some(index) = self.namespace_index(&uri) {
            return index;
        }
        self.namespaces.push(uri);
        (self.namespaces.len() - 1) as u16
    }

    /// Looks up the index of a namespace URI.
    pub fn namespace_index(&self, uri: &str) -> Option<u16> {
        self.namespaces
            .iter()
            .position(|n| n == uri)
            .map(|i| i as u16)
    }

    /// Routes every node of a namespace index to an external store.
    /// Returns false (and changes nothing) when the index is taken.
    pub fn register_external_namespace(
        &mut self,
        index: u16,
        url: impl Into<String>,
        store: Arc<dyn ExternalNodeStore>,
    ) -> bool {
        if self.external_namespaces.iter().any(|e| e.index == index) {
            warn!(index, "external namespace index already registered");
            return false;
        }
        self.external_namespaces.push(ExternalNamespace {
            index,
            url: url.into(),
            store,
        });
        true
    }

    /// Inserts a finished node into the address space.
    pub fn add_node(&self, node: Node) -> StatusCode {
        self.store.insert(node)
    }

    /// Removes a node from the address space.
    pub fn delete_node(&self, node_id: &NodeId) -> StatusCode {
        if self.store.remove(node_id) {
            StatusCode::GOOD
        } else {
            StatusCode::BAD_NODEID_UNKNOWN
        }
    }

    /// Invokes `visit` for each outgoing reference of a node.
    pub fn for_each_reference(&self, node_id: &NodeId, visit: &mut dyn FnMut(&Reference)) {
        self.store.for_each_reference(node_id, visit);
    }

    /// Reads one attribute of one node.
    pub fn read_single(&self, timestamps: TimestampsToReturn, item: &ReadValueId) -> DataValue {
        read::read_single(self.store.as_ref(), timestamps, item)
    }

    /// Writes one attribute of one node.
    pub fn write_single(&self, item: &WriteValue) -> StatusCode {
        write::write_single(self.store.as_ref(), item)
    }

    /// The Read service.
    pub fn read(&self, request: &ReadRequest) -> ReadResponse {
        let mut response = ReadResponse::default();
        let size = request.nodes_to_read.len();
        debug!(items = size, "read request");

        if size == 0 {
            response.service_result = StatusCode::BAD_NOTHING_TO_DO;
            return response;
        }
        let Ok(timestamps) = TimestampsToReturn::try_from(request.timestamps_to_return) else {
            response.service_result = StatusCode::BAD_TIMESTAMPS_TO_RETURN_INVALID;
            return response;
        };
        if size > self.config.max_operations_per_request {
            response.service_result = StatusCode::BAD_OUT_OF_MEMORY;
            return response;
        }

        response.results = vec![DataValue::default(); size];

        if request.max_age < 0.0 {
            response.service_result = StatusCode::BAD_MAX_AGE_INVALID;
            return response;
        }

        let handled = self.delegate_reads(request, &mut response);

        for (i, item) in request.nodes_to_read.iter().enumerate() {
            if !handled[i] {
                response.results[i] = read::read_single(self.store.as_ref(), timestamps, item);
            }
        }
        response.service_result = StatusCode::GOOD;
        response
    }

    /// The Write service.
    pub fn write(&self, request: &WriteRequest) -> WriteResponse {
        let mut response = WriteResponse::default();
        let size = request.nodes_to_write.len();
        debug!(items = size, "write request");

        if size == 0 {
            response.service_result = StatusCode::BAD_NOTHING_TO_DO;
            return response;
        }
        if size > self.config.max_operations_per_request {
            response.service_result = StatusCode::BAD_OUT_OF_MEMORY;
            return response;
        }

        response.results = vec![StatusCode::GOOD; size];

        let handled = self.delegate_writes(request, &mut response);

        for (i, item) in request.nodes_to_write.iter().enumerate() {
            if !handled[i] {
                response.results[i] = write::write_single(self.store.as_ref(), item);
            }
        }
        response.service_result = StatusCode::GOOD;
        response
    }

    /// Hands read items in external namespaces to their stores, one batch
    /// call per namespace. Returns which item indices were taken.
    fn delegate_reads(&self, request: &ReadRequest, response: &mut ReadResponse) -> Vec<bool> {
        let mut handled = vec![false; request.nodes_to_read.len()];
        for external in &self.external_namespaces {
            let indices: Vec<usize> = request
                .nodes_to_read
                .iter()
                .enumerate()
                .filter(|(_, item)| item.node_id.namespace == external.index)
                .map(|(i, _)| i)
                .collect();
            if indices.is_empty() {
                continue;
            }
            for &i in &indices {
                handled[i] = true;
            }
            external.store.read_nodes(
                &request.header,
                &request.nodes_to_read,
                &indices,
                &mut response.results,
                &mut response.diagnostic_infos,
            );
        }
        handled
    }

    fn delegate_writes(&self, request: &WriteRequest, response: &mut WriteResponse) -> Vec<bool> {
        let mut handled = vec![false; request.nodes_to_write.len()];
        for external in &self.external_namespaces {
            let indices: Vec<usize> = request
                .nodes_to_write
                .iter()
                .enumerate()
                .filter(|(_, item)| item.node_id.namespace == external.index)
                .map(|(i, _)| i)
                .collect();
            if indices.is_empty() {
                continue;
            }
            for &i in &indices {
                handled[i] = true;
            }
            external.store.write_nodes(
                &request.header,
                &request.nodes_to_write,
                &indices,
                &mut response.results,
                &mut response.diagnostic_infos,
            );
        }
        handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::VariableNode;
    use ua_types::{AttributeId, LocalizedText, QualifiedName, Scalar, Variant};

    fn server_with_variable(id: u32, value: i32) -> Server {
        let server = Server::new(ServerConfig::default());
        server.add_node(Node::Variable(
            VariableNode::new(
                NodeId::numeric(1, id),
                QualifiedName::new(1, "V"),
                LocalizedText::from_text("V"),
                Variant::scalar(Scalar::Int32(value)),
            )
            .writable(),
        ));
        server
    }

    #[test]
    fn test_namespace_array() {
        let config = ServerConfig::new().with_namespace("urn:example:plant");
        let mut server = Server::new(config);
        assert_eq!(server.namespaces()[0], CORE_NAMESPACE_URI);
        assert_eq!(server.namespace_index("urn:example:plant"), Some(1));

        let index = server.add_namespace("urn:example:boiler");
        assert_eq!(index, 2);
        // Re-adding returns the existing index
        assert_eq!(server.add_namespace("urn:example:boiler"), 2);
        assert_eq!(server.namespace_index("urn:missing"), None);
    }

    #[test]
    fn test_add_and_delete_node() {
        let server = server_with_variable(1, 5);
        assert_eq!(
            server.add_node(Node::Variable(VariableNode::new(
                NodeId::numeric(1, 1),
                QualifiedName::new(1, "Dup"),
                LocalizedText::from_text("Dup"),
                Variant::scalar(Scalar::Int32(0)),
            ))),
            StatusCode::BAD_NODEID_EXISTS
        );
        assert_eq!(server.delete_node(&NodeId::numeric(1, 1)), StatusCode::GOOD);
        assert_eq!(
            server.delete_node(&NodeId::numeric(1, 1)),
            StatusCode::BAD_NODEID_UNKNOWN
        );
    }

    #[test]
    fn test_read_empty_batch() {
        let server = server_with_variable(1, 5);
        let response = server.read(&ReadRequest::new(Vec::new()));
        assert_eq!(response.service_result, StatusCode::BAD_NOTHING_TO_DO);
        assert!(response.results.is_empty());
    }

    #[test]
    fn test_read_invalid_timestamp_mode() {
        let server = server_with_variable(1, 5);
        let mut request = ReadRequest::new(vec![ReadValueId::new(
            NodeId::numeric(1, 1),
            AttributeId::Value,
        )]);
        request.timestamps_to_return = 4;
        let response = server.read(&request);
        assert_eq!(
            response.service_result,
            StatusCode::BAD_TIMESTAMPS_TO_RETURN_INVALID
        );
    }

    #[test]
    fn test_read_invalid_max_age() {
        let server = server_with_variable(1, 5);
        let mut request = ReadRequest::new(vec![ReadValueId::new(
            NodeId::numeric(1, 1),
            AttributeId::Value,
        )]);
        request.max_age = -1.0;
        let response = server.read(&request);
        assert_eq!(response.service_result, StatusCode::BAD_MAX_AGE_INVALID);
        // The results array is allocated but untouched
        assert_eq!(response.results, vec![DataValue::default()]);
    }

    #[test]
    fn test_read_batch_mixes_results_in_order() {
        let server = server_with_variable(1, 5);
        let response = server.read(&ReadRequest::new(vec![
            ReadValueId::new(NodeId::numeric(1, 1), AttributeId::Value),
            ReadValueId::new(NodeId::numeric(1, 99), AttributeId::Value),
            ReadValueId::new(NodeId::numeric(1, 1), AttributeId::BrowseName),
        ]));
        assert_eq!(response.service_result, StatusCode::GOOD);
        assert_eq!(response.results.len(), 3);
        assert_eq!(
            response.results[0].value.as_ref().unwrap().as_scalar(),
            Some(&Scalar::Int32(5))
        );
        assert_eq!(
            response.results[1].status(),
            StatusCode::BAD_NODEID_UNKNOWN
        );
        assert_eq!(
            response.results[2].value.as_ref().unwrap().as_scalar(),
            Some(&Scalar::QualifiedName(QualifiedName::new(1, "V")))
        );
    }

    #[test]
    fn test_oversized_batch() {
        let mut config = ServerConfig::default();
        config.max_operations_per_request = 2;
        let server = Server::new(config);
        let items = vec![
            ReadValueId::new(NodeId::numeric(1, 1), AttributeId::Value);
            3
        ];
        let response = server.read(&ReadRequest::new(items));
        assert_eq!(response.service_result, StatusCode::BAD_OUT_OF_MEMORY);
    }

    #[test]
    fn test_write_batch() {
        let server = server_with_variable(1, 5);
        let response = server.write(&WriteRequest::new(vec![
            WriteValue::new(
                NodeId::numeric(1, 1),
                AttributeId::Value,
                DataValue::of(Scalar::Int32(6)),
            ),
            WriteValue::new(
                NodeId::numeric(1, 99),
                AttributeId::Value,
                DataValue::of(Scalar::Int32(6)),
            ),
        ]));
        assert_eq!(response.service_result, StatusCode::GOOD);
        assert_eq!(
            response.results,
            vec![StatusCode::GOOD, StatusCode::BAD_NODEID_UNKNOWN]
        );

        let value = server.read_single(
            TimestampsToReturn::Neither,
            &ReadValueId::new(NodeId::numeric(1, 1), AttributeId::Value),
        );
        assert_eq!(value.value.unwrap().as_scalar(), Some(&Scalar::Int32(6)));
    }

    #[test]
    fn test_write_empty_batch() {
        let server = server_with_variable(1, 5);
        let response = server.write(&WriteRequest::new(Vec::new()));
        assert_eq!(response.service_result, StatusCode::BAD_NOTHING_TO_DO);
    }

    #[test]
    fn test_external_namespace_registration() {
        struct NullStore;
        impl ExternalNodeStore for NullStore {
            fn read_nodes(
                &self,
                _: &ua_types::RequestHeader,
                _: &[ReadValueId],
                _: &[usize],
                _: &mut [DataValue],
                _: &mut Vec<ua_types::DiagnosticInfo>,
            ) {
            }
            fn write_nodes(
                &self,
                _: &ua_types::RequestHeader,
                _: &[WriteValue],
                _: &[usize],
                _: &mut [StatusCode],
                _: &mut Vec<ua_types::DiagnosticInfo>,
            ) {
            }
        }

        let mut server = Server::new(ServerConfig::default());
        assert!(server.register_external_namespace(2, "urn:external", Arc::new(NullStore)));
        assert!(!server.register_external_namespace(2, "urn:other", Arc::new(NullStore)));
    }
}
