//! External namespaces: whole namespaces served by a foreign node store.
//!
//! A registered external namespace takes over every request item whose
//! node id carries its namespace index. The batch services hand it the
//! original item array plus the indices it owns and it writes those result
//! slots itself, exactly once each.

use std::sync::Arc;

use ua_types::{
    DataValue, DiagnosticInfo, ReadValueId, RequestHeader, StatusCode, WriteValue,
};

/// A foreign node store answering reads and writes for one namespace.
pub trait ExternalNodeStore: Send + Sync {
    /// Answers the read items at `indices`, writing `results[i]` for each
    /// `i` in `indices` and nothing else.
    fn read_nodes(
        &self,
        header: &RequestHeader,
        items: &[ReadValueId],
        indices: &[usize],
        results: &mut [DataValue],
        diagnostics: &mut Vec<DiagnosticInfo>,
    );

    /// Answers the write items at `indices`, writing `results[i]` for each
    /// `i` in `indices` and nothing else.
    fn write_nodes(
        &self,
        header: &RequestHeader,
        items: &[WriteValue],
        indices: &[usize],
        results: &mut [StatusCode],
        diagnostics: &mut Vec<DiagnosticInfo>,
    );
}

/// Mapping of a namespace index and URL to an external node store.
#[derive(Clone)]
pub struct ExternalNamespace {
    pub index: u16,
    pub url: String,
    pub store: Arc<dyn ExternalNodeStore>,
}
