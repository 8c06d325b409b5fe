//! Tagged dynamic values and the slice-range algebra over them.
//!
//! A [`Variant`] pairs a data-type descriptor with either one scalar or a
//! flat row-major array of scalars plus optional dimensions. Array payloads
//! sit behind an `Arc`, so cloning a variant is O(1) and a clone handed out
//! to a reader keeps observing the snapshot it was taken from; mutation
//! goes through `Arc::make_mut` and copies first when the payload is
//! shared.
//!
//! Invariants enforced by the constructors:
//! - array elements are homogeneous and match the descriptor's encoding;
//! - when dimensions are present, their product equals the element count.

use std::sync::Arc;

use uuid::Uuid;

use crate::date_time::DateTime;
use crate::node_id::NodeId;
use crate::range::{Dimension, NumericRange, RangeOffsets};
use crate::registry::{BuiltinType, DataTypeDescriptor};
use crate::status::StatusCode;
use crate::text::{LocalizedText, QualifiedName};

/// One element of a variant payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Boolean(bool),
    SByte(i8),
    Byte(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    String(String),
    DateTime(DateTime),
    Guid(Uuid),
    ByteString(Vec<u8>),
    NodeId(NodeId),
    StatusCode(StatusCode),
    QualifiedName(QualifiedName),
    LocalizedText(LocalizedText),
}

impl Scalar {
    /// The built-in encoding this value travels as.
    pub fn builtin_type(&self) -> BuiltinType {
        match self {
            Scalar::Boolean(_) => BuiltinType::Boolean,
            Scalar::SByte(_) => BuiltinType::SByte,
            Scalar::Byte(_) => BuiltinType::Byte,
            Scalar::Int16(_) => BuiltinType::Int16,
            Scalar::UInt16(_) => BuiltinType::UInt16,
            Scalar::Int32(_) => BuiltinType::Int32,
            Scalar::UInt32(_) => BuiltinType::UInt32,
            Scalar::Int64(_) => BuiltinType::Int64,
            Scalar::UInt64(_) => BuiltinType::UInt64,
            Scalar::Float(_) => BuiltinType::Float,
            Scalar::Double(_) => BuiltinType::Double,
            Scalar::String(_) => BuiltinType::String,
            Scalar::DateTime(_) => BuiltinType::DateTime,
            Scalar::Guid(_) => BuiltinType::Guid,
            Scalar::ByteString(_) => BuiltinType::ByteString,
            Scalar::NodeId(_) => BuiltinType::NodeId,
            Scalar::StatusCode(_) => BuiltinType::StatusCode,
            Scalar::QualifiedName(_) => BuiltinType::QualifiedName,
            Scalar::LocalizedText(_) => BuiltinType::LocalizedText,
        }
    }
}

#[derive(Debug, Clone)]
enum Body {
    Scalar(Scalar),
    Array {
        elements: Arc<Vec<Scalar>>,
        dimensions: Option<Arc<Vec<i32>>>,
    },
}

/// A self-describing tagged value: descriptor plus scalar or array payload.
#[derive(Debug, Clone)]
pub struct Variant {
    ty: &'static DataTypeDescriptor,
    body: Body,
}

impl Variant {
    /// A scalar of its own built-in type.
    pub fn scalar(value: Scalar) -> Variant {
        Variant {
            ty: value.builtin_type().descriptor(),
            body: Body::Scalar(value),
        }
    }

    /// A scalar carrying a specific descriptor (an enumeration value, an
    /// opaque type). The descriptor's encoding must match the value.
    pub fn scalar_typed(
        value: Scalar,
        ty: &'static DataTypeDescriptor,
    ) -> Result<Variant, StatusCode> {
        if value.builtin_type() != ty.type_index {
            return Err(StatusCode::BAD_TYPE_MISMATCH);
        }
        Ok(Variant {
            ty,
            body: Body::Scalar(value),
        })
    }

    /// A one-dimensional array of `kind` elements.
    pub fn array(kind: BuiltinType, elements: Vec<Scalar>) -> Result<Variant, StatusCode> {
        Variant::array_typed(kind.descriptor(), elements)
    }

    /// A one-dimensional array carrying a specific descriptor.
    pub fn array_typed(
        ty: &'static DataTypeDescriptor,
        elements: Vec<Scalar>,
    ) -> Result<Variant, StatusCode> {
        if elements.iter().any(|e| e.builtin_type() != ty.type_index) {
            return Err(StatusCode::BAD_TYPE_MISMATCH);
        }
        Ok(Variant {
            ty,
            body: Body::Array {
                elements: Arc::new(elements),
                dimensions: None,
            },
        })
    }

    /// Attaches array dimensions. Their product must equal the element
    /// count; attaching dimensions to a scalar is a caller error.
    pub fn with_dimensions(mut self, dimensions: Vec<i32>) -> Result<Variant, StatusCode> {
        match &mut self.body {
            Body::Scalar(_) => Err(StatusCode::BAD_INTERNAL_ERROR),
            Body::Array {
                elements,
                dimensions: slot,
            } => {
                if dimensions.iter().any(|&d| d <= 0) {
                    return Err(StatusCode::BAD_INTERNAL_ERROR);
                }
                let product: usize = dimensions.iter().map(|&d| d as usize).product();
                if product != elements.len() {
                    return Err(StatusCode::BAD_INTERNAL_ERROR);
                }
                *slot = Some(Arc::new(dimensions));
                Ok(self)
            }
        }
    }

    pub fn ty(&self) -> &'static DataTypeDescriptor {
        self.ty
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.body, Body::Scalar(_))
    }

    /// Element count for arrays, 0 for scalars.
    pub fn array_length(&self) -> usize {
        match &self.body {
            Body::Scalar(_) => 0,
            Body::Array { elements, .. } => elements.len(),
        }
    }

    pub fn dimensions(&self) -> Option<&[i32]> {
        match &self.body {
            Body::Scalar(_) => None,
            Body::Array { dimensions, .. } => dimensions.as_deref().map(|d| d.as_slice()),
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match &self.body {
            Body::Scalar(s) => Some(s),
            Body::Array { .. } => None,
        }
    }

    pub fn elements(&self) -> Option<&[Scalar]> {
        match &self.body {
            Body::Scalar(_) => None,
            Body::Array { elements, .. } => Some(elements),
        }
    }

    /// A copy that shares nothing with `self`.
    pub fn deep_copy(&self) -> Variant {
        let body = match &self.body {
            Body::Scalar(s) => Body::Scalar(s.clone()),
            Body::Array {
                elements,
                dimensions,
            } => Body::Array {
                elements: Arc::new(elements.as_ref().clone()),
                dimensions: dimensions.as_ref().map(|d| Arc::new(d.as_ref().clone())),
            },
        };
        Variant { ty: self.ty, body }
    }

    /// Shape of the array: declared dimensions, or the flat length for a
    /// one-dimensional payload. `None` for scalars.
    fn extents(&self) -> Option<Vec<u32>> {
        match &self.body {
            Body::Scalar(_) => None,
            Body::Array {
                elements,
                dimensions,
            } => Some(match dimensions {
                Some(dims) => dims.iter().map(|&d| d as u32).collect(),
                None => vec![elements.len() as u32],
            }),
        }
    }

    /// Extracts the hyper-rectangle selected by `range` into a new variant.
    ///
    /// The range must have at least as many dimensions as the array; excess
    /// trailing range dimensions are ignored. Out-of-bounds selection is
    /// `BAD_INDEX_RANGE_NO_DATA`; applying a range to a scalar or with too
    /// few dimensions is `BAD_INDEX_RANGE_INVALID`.
    pub fn copy_range(&self, range: &NumericRange) -> Result<Variant, StatusCode> {
        let Some(extents) = self.extents() else {
            return Err(StatusCode::BAD_INDEX_RANGE_INVALID);
        };
        let used = clip_range(range, &extents)?;

        let Body::Array { elements, .. } = &self.body else {
            unreachable!("extents() returned Some for a scalar");
        };
        let picked: Vec<Scalar> = RangeOffsets::new(used, &extents)
            .map(|offset| elements[offset].clone())
            .collect();

        let dimensions = if used.len() > 1 {
            Some(Arc::new(
                used.iter().map(|d| d.extent() as i32).collect::<Vec<_>>(),
            ))
        } else {
            None
        };
        Ok(Variant {
            ty: self.ty,
            body: Body::Array {
                elements: Arc::new(picked),
                dimensions,
            },
        })
    }

    /// Writes `source` (flat, row-major, exactly one element per selected
    /// position) into the hyper-rectangle of this array.
    pub fn set_range_copy(&mut self, source: &[Scalar], range: &NumericRange) -> StatusCode {
        let Some(extents) = self.extents() else {
            return StatusCode::BAD_INDEX_RANGE_INVALID;
        };
        let used = match clip_range(range, &extents) {
            Ok(used) => used,
            Err(status) => return status,
        };
        let selected: usize = used.iter().map(|d| d.extent()).product();
        if source.len() != selected {
            return StatusCode::BAD_INDEX_RANGE_INVALID;
        }
        if source.iter().any(|s| s.builtin_type() != self.ty.type_index) {
            return StatusCode::BAD_TYPE_MISMATCH;
        }

        let Body::Array { elements, .. } = &mut self.body else {
            unreachable!("extents() returned Some for a scalar");
        };
        let slots = Arc::make_mut(elements);
        for (offset, value) in RangeOffsets::new(used, &extents).zip(source) {
            slots[offset] = value.clone();
        }
        StatusCode::GOOD
    }

    /// Reconciles this (incoming) variant's type with the type of `target`
    /// (the stored value it is about to replace or patch).
    ///
    /// Two mismatched-descriptor cases are legal: a value whose descriptor
    /// shares the target's namespace-zero encoding adopts the target's
    /// descriptor (an enumeration written as Int32, an opaque type written
    /// as ByteString); and a scalar ByteString written over a Byte array is
    /// reinterpreted as that array. Everything else is a type mismatch.
    pub fn coerce_to(self, target: &Variant) -> Result<Variant, StatusCode> {
        if self.ty.is(target.ty) {
            return Ok(self);
        }
        if self.ty.namespace_zero
            && target.ty.namespace_zero
            && self.ty.type_index == target.ty.type_index
        {
            return Ok(Variant {
                ty: target.ty,
                body: self.body,
            });
        }
        if target.ty.is(BuiltinType::Byte.descriptor())
            && !target.is_scalar()
            && self.ty.is(BuiltinType::ByteString.descriptor())
        {
            if let Body::Scalar(Scalar::ByteString(bytes)) = self.body {
                return Ok(Variant {
                    ty: target.ty,
                    body: Body::Array {
                        elements: Arc::new(bytes.into_iter().map(Scalar::Byte).collect()),
                        dimensions: None,
                    },
                });
            }
        }
        Err(StatusCode::BAD_TYPE_MISMATCH)
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Variant) -> bool {
        if self.ty.type_id != other.ty.type_id {
            return false;
        }
        match (&self.body, &other.body) {
            (Body::Scalar(a), Body::Scalar(b)) => a == b,
            (
                Body::Array {
                    elements: a,
                    dimensions: da,
                },
                Body::Array {
                    elements: b,
                    dimensions: db,
                },
            ) => a == b && da.as_deref() == db.as_deref(),
            _ => false,
        }
    }
}

impl From<Scalar> for Variant {
    fn from(value: Scalar) -> Variant {
        Variant::scalar(value)
    }
}

/// Checks a range against an array shape and returns the dimensions that
/// actually apply (the range may carry extra trailing dimensions, which are
/// dropped; too few is malformed, out of bounds selects no data).
fn clip_range<'r>(
    range: &'r NumericRange,
    extents: &[u32],
) -> Result<&'r [Dimension], StatusCode> {
    let dims = range.dimensions();
    if dims.len() < extents.len() {
        return Err(StatusCode::BAD_INDEX_RANGE_INVALID);
    }
    let used = &dims[..extents.len()];
    for (dim, &extent) in used.iter().zip(extents) {
        if dim.max >= extent {
            return Err(StatusCode::BAD_INDEX_RANGE_NO_DATA);
        }
    }
    Ok(used)
}
