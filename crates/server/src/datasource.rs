//! External value providers for variable nodes.

use ua_types::{DataValue, NodeId, NumericRange, StatusCode, Variant};

/// Supplies and accepts the value of a variable on demand.
///
/// Implementations may block arbitrarily (a device poll, a database
/// round-trip); the dispatchers call them outside every store critical
/// section. Statuses are passed through to the client verbatim.
pub trait DataSource: Send + Sync {
    /// Produces the current value into `out`.
    ///
    /// When `want_source_timestamp` is set the implementation should stamp
    /// `out.source_timestamp`; the dispatcher fills it in afterwards only
    /// if left empty. A `range` selects a slice of an array value.
    fn read(
        &self,
        node_id: &NodeId,
        want_source_timestamp: bool,
        range: Option<&NumericRange>,
        out: &mut DataValue,
    ) -> StatusCode;

    /// Accepts a new value, optionally into a slice of the current one.
    fn write(
        &self,
        node_id: &NodeId,
        value: &Variant,
        range: Option<&NumericRange>,
    ) -> StatusCode;
}
