//! OPC UA status codes.
//!
//! A status code is an opaque 32-bit identifier (OPC UA Part 4/6). The top
//! two bits carry the severity: `00` good, `01` uncertain, `1x` bad. Only
//! the codes the address-space core raises are named here; unknown codes
//! still round-trip through [`StatusCode::from_bits`] untouched, which
//! matters for data sources and external namespaces that report their own.

use std::fmt;

/// Opaque 32-bit OPC UA status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StatusCode(u32);

impl StatusCode {
    /// The operation succeeded.
    pub const GOOD: StatusCode = StatusCode(0x0000_0000);
    /// An internal error occurred as a result of a programming or configuration error.
    pub const BAD_INTERNAL_ERROR: StatusCode = StatusCode(0x8002_0000);
    /// Not enough memory to complete the operation.
    pub const BAD_OUT_OF_MEMORY: StatusCode = StatusCode(0x8003_0000);
    /// The request did not contain any work to do.
    pub const BAD_NOTHING_TO_DO: StatusCode = StatusCode(0x800F_0000);
    /// The node id refers to a node that does not exist in the address space.
    pub const BAD_NODEID_UNKNOWN: StatusCode = StatusCode(0x8034_0000);
    /// The attribute is not supported for the specified node.
    pub const BAD_ATTRIBUTE_ID_INVALID: StatusCode = StatusCode(0x8035_0000);
    /// The syntax or semantics of the index range parameter is invalid.
    pub const BAD_INDEX_RANGE_INVALID: StatusCode = StatusCode(0x8036_0000);
    /// No data exists within the range of indexes specified.
    pub const BAD_INDEX_RANGE_NO_DATA: StatusCode = StatusCode(0x8037_0000);
    /// The data encoding is invalid.
    pub const BAD_DATA_ENCODING_INVALID: StatusCode = StatusCode(0x8038_0000);
    /// The requested node id is already used by another node.
    pub const BAD_NODEID_EXISTS: StatusCode = StatusCode(0x805E_0000);
    /// The node class is not valid for the operation.
    pub const BAD_NODE_CLASS_INVALID: StatusCode = StatusCode(0x805F_0000);
    /// The timestamps-to-return parameter is invalid.
    pub const BAD_TIMESTAMPS_TO_RETURN_INVALID: StatusCode = StatusCode(0x806B_0000);
    /// The max-age parameter is invalid.
    pub const BAD_MAX_AGE_INVALID: StatusCode = StatusCode(0x8070_0000);
    /// Writing the attribute is not supported.
    pub const BAD_WRITE_NOT_SUPPORTED: StatusCode = StatusCode(0x8073_0000);
    /// The value supplied for the attribute is not of the same type as the attribute's value.
    pub const BAD_TYPE_MISMATCH: StatusCode = StatusCode(0x8074_0000);
    /// No data was supplied where some was required.
    pub const BAD_NO_DATA: StatusCode = StatusCode(0x809B_0000);

    /// Wraps a raw 32-bit code.
    pub const fn from_bits(bits: u32) -> StatusCode {
        StatusCode(bits)
    }

    /// The raw 32-bit code.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Severity is good (top two bits `00`).
    pub const fn is_good(self) -> bool {
        self.0 >> 30 == 0
    }

    /// Severity is bad (top bit set).
    pub const fn is_bad(self) -> bool {
        self.0 & 0x8000_0000 != 0
    }

    fn name(self) -> Option<&'static str> {
        let name = match self {
            StatusCode::GOOD => "Good",
            StatusCode::BAD_INTERNAL_ERROR => "BadInternalError",
            StatusCode::BAD_OUT_OF_MEMORY => "BadOutOfMemory",
            StatusCode::BAD_NOTHING_TO_DO => "BadNothingToDo",
            StatusCode::BAD_NODEID_UNKNOWN => "BadNodeIdUnknown",
            StatusCode::BAD_ATTRIBUTE_ID_INVALID => "BadAttributeIdInvalid",
            StatusCode::BAD_INDEX_RANGE_INVALID => "BadIndexRangeInvalid",
            StatusCode::BAD_INDEX_RANGE_NO_DATA => "BadIndexRangeNoData",
            StatusCode::BAD_DATA_ENCODING_INVALID => "BadDataEncodingInvalid",
            StatusCode::BAD_NODEID_EXISTS => "BadNodeIdExists",
            StatusCode::BAD_NODE_CLASS_INVALID => "BadNodeClassInvalid",
            StatusCode::BAD_TIMESTAMPS_TO_RETURN_INVALID => "BadTimestampsToReturnInvalid",
            StatusCode::BAD_MAX_AGE_INVALID => "BadMaxAgeInvalid",
            StatusCode::BAD_WRITE_NOT_SUPPORTED => "BadWriteNotSupported",
            StatusCode::BAD_TYPE_MISMATCH => "BadTypeMismatch",
            StatusCode::BAD_NO_DATA => "BadNoData",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "StatusCode(0x{:08X})", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_classification() {
        assert!(StatusCode::GOOD.is_good());
        assert!(!StatusCode::GOOD.is_bad());
        assert!(StatusCode::BAD_NODEID_UNKNOWN.is_bad());
        assert!(!StatusCode::BAD_NODEID_UNKNOWN.is_good());

        // Uncertain codes (top bits 01) are neither good nor bad
        let uncertain = StatusCode::from_bits(0x4000_0000);
        assert!(!uncertain.is_good());
        assert!(!uncertain.is_bad());
    }

    #[test]
    fn test_unknown_codes_round_trip() {
        let vendor = StatusCode::from_bits(0x8123_4567);
        assert_eq!(vendor.bits(), 0x8123_4567);
        assert_eq!(format!("{vendor}"), "StatusCode(0x81234567)");
    }

    #[test]
    fn test_display_names() {
        assert_eq!(format!("{}", StatusCode::GOOD), "Good");
        assert_eq!(
            format!("{}", StatusCode::BAD_TYPE_MISMATCH),
            "BadTypeMismatch"
        );
    }

    #[test]
    fn test_default_is_good() {
        assert_eq!(StatusCode::default(), StatusCode::GOOD);
    }
}
