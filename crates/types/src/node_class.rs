//! Node classes.
//!
//! The wire values are single bits so that attribute legality checks can be
//! expressed as one mask test per attribute.

use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The eight node classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum NodeClass {
    Object = 1,
    Variable = 2,
    Method = 4,
    ObjectType = 8,
    VariableType = 16,
    ReferenceType = 32,
    DataType = 64,
    View = 128,
}

bitflags! {
    /// A set of node classes, used for attribute legality guards.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NodeClassMask: u32 {
        const OBJECT = 1;
        const VARIABLE = 2;
        const METHOD = 4;
        const OBJECT_TYPE = 8;
        const VARIABLE_TYPE = 16;
        const REFERENCE_TYPE = 32;
        const DATA_TYPE = 64;
        const VIEW = 128;
    }
}

impl NodeClass {
    pub fn mask(self) -> NodeClassMask {
        NodeClassMask::from_bits_truncate(self as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_bits_match_masks() {
        assert_eq!(NodeClass::Object.mask(), NodeClassMask::OBJECT);
        assert_eq!(NodeClass::View.mask(), NodeClassMask::VIEW);
    }

    #[test]
    fn test_mask_membership() {
        let types = NodeClassMask::REFERENCE_TYPE
            | NodeClassMask::OBJECT_TYPE
            | NodeClassMask::VARIABLE_TYPE
            | NodeClassMask::DATA_TYPE;
        assert!(types.intersects(NodeClass::ObjectType.mask()));
        assert!(!types.intersects(NodeClass::Variable.mask()));
    }

    #[test]
    fn test_wire_conversion() {
        assert_eq!(NodeClass::try_from(2u32), Ok(NodeClass::Variable));
        assert!(NodeClass::try_from(3u32).is_err());
    }
}
