//! Attribute identifiers and the timestamps-to-return selector.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The 22 node attributes (OPC UA Part 3, numbered on the wire from 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum AttributeId {
    NodeId = 1,
    NodeClass = 2,
    BrowseName = 3,
    DisplayName = 4,
    Description = 5,
    WriteMask = 6,
    UserWriteMask = 7,
    IsAbstract = 8,
    Symmetric = 9,
    InverseName = 10,
    ContainsNoLoops = 11,
    EventNotifier = 12,
    Value = 13,
    DataType = 14,
    ValueRank = 15,
    ArrayDimensions = 16,
    AccessLevel = 17,
    UserAccessLevel = 18,
    MinimumSamplingInterval = 19,
    Historizing = 20,
    Executable = 21,
    UserExecutable = 22,
}

/// Which timestamps a read should stamp onto its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum TimestampsToReturn {
    Source = 0,
    Server = 1,
    Both = 2,
    Neither = 3,
}

impl TimestampsToReturn {
    pub fn wants_source(self) -> bool {
        matches!(self, TimestampsToReturn::Source | TimestampsToReturn::Both)
    }

    pub fn wants_server(self) -> bool {
        matches!(self, TimestampsToReturn::Server | TimestampsToReturn::Both)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_conversion() {
        assert_eq!(AttributeId::try_from(13u32), Ok(AttributeId::Value));
        assert_eq!(u32::from(AttributeId::UserExecutable), 22);
        assert!(AttributeId::try_from(0u32).is_err());
        assert!(AttributeId::try_from(23u32).is_err());
    }

    #[test]
    fn test_timestamp_selector() {
        assert!(TimestampsToReturn::Source.wants_source());
        assert!(!TimestampsToReturn::Source.wants_server());
        assert!(TimestampsToReturn::Both.wants_source());
        assert!(TimestampsToReturn::Both.wants_server());
        assert!(!TimestampsToReturn::Neither.wants_source());
        assert!(!TimestampsToReturn::Neither.wants_server());
        assert!(TimestampsToReturn::try_from(4u32).is_err());
    }
}
