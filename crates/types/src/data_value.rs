//! Attribute read results.

use crate::date_time::DateTime;
use crate::status::StatusCode;
use crate::variant::Variant;

/// The value of an attribute together with status and timestamps. Every
/// field is optional on the wire; an absent status means `GOOD`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataValue {
    pub value: Option<Variant>,
    pub status: Option<StatusCode>,
    pub source_timestamp: Option<DateTime>,
    pub server_timestamp: Option<DateTime>,
}

impl DataValue {
    /// A value-only result.
    pub fn of(value: impl Into<Variant>) -> DataValue {
        DataValue {
            value: Some(value.into()),
            ..DataValue::default()
        }
    }

    /// A status-only result with no value.
    pub fn error(status: StatusCode) -> DataValue {
        DataValue {
            status: Some(status),
            ..DataValue::default()
        }
    }

    /// The effective status (`GOOD` when unset).
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::GOOD)
    }
}
