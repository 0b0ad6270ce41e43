//! Field typing for component schemas.
//!
//! A component schema is an ordered list of named, typed fields. Each field is
//! backed by one [`Column`] of flat storage, and the numeric subtypes map onto
//! plain Rust scalars. The [`Scalar`] trait ties a Rust type to the column
//! variant that holds it, so per-tick access compiles down to an indexed load
//! or store with no string lookup and no dynamic dispatch.
//!
//! # Architecture
//!
//! - **[`FieldKind`]**: the declared subtype of a field (width, signedness,
//!   or fixed capacity for strings and binary blobs).
//! - **[`FieldDef`]**: a named field inside a schema.
//! - **[`Scalar`]**: sealed trait implemented for the scalar Rust types a
//!   column can hold. Field handles are parameterized over it.
//!
//! String and binary fields are fixed-capacity: their capacity is part of the
//! [`FieldKind`] and is validated at component registration, not at use.

pub mod column;

use crate::error::{EcsError, Result};
use column::Column;

/// The declared subtype of a component field.
///
/// Numeric kinds follow the IEEE / two's-complement width of the subtype
/// (1/2/4/8 bytes per element). `Str` and `Bytes` are fixed-capacity per
/// slot; their capacity is validated at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Signed 8-bit integer.
    I8,
    /// Signed 16-bit integer.
    I16,
    /// Signed 32-bit integer.
    I32,
    /// Unsigned 8-bit integer.
    U8,
    /// Unsigned 16-bit integer.
    U16,
    /// Unsigned 32-bit integer.
    U32,
    /// 32-bit IEEE float.
    F32,
    /// 64-bit IEEE float.
    F64,
    /// Boolean, bit-packed in storage.
    Bool,
    /// UTF-8 string with a fixed byte capacity per slot.
    Str {
        /// Maximum stored length in bytes. Writes longer than this are
        /// truncated at a character boundary.
        max_len: usize,
    },
    /// Fixed-length binary blob.
    Bytes {
        /// Exact stored length in bytes. Shorter writes are zero-padded,
        /// longer writes truncated.
        len: usize,
    },
}

impl FieldKind {
    /// Bytes of storage one slot of this kind occupies.
    ///
    /// `Bool` reports one byte even though columns bit-pack it.
    pub fn byte_width(&self) -> usize {
        match self {
            Self::I8 | Self::U8 | Self::Bool => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::F64 => 8,
            Self::Str { max_len } => *max_len,
            Self::Bytes { len } => *len,
        }
    }

    /// Whether this kind is one of the numeric subtypes.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::Bool | Self::Str { .. } | Self::Bytes { .. })
    }

    /// Short name used in log and error messages.
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Bool => "bool",
            Self::Str { .. } => "str",
            Self::Bytes { .. } => "bytes",
        }
    }

    /// Validate capacity constraints for this kind within a named field.
    pub(crate) fn validate(&self, field: &str) -> Result<()> {
        match self {
            Self::Str { max_len: 0 } => Err(EcsError::InvalidFieldConfiguration {
                reason: format!("str field `{field}` has zero capacity"),
            }),
            Self::Str { max_len } if *max_len > u16::MAX as usize => {
                Err(EcsError::InvalidFieldConfiguration {
                    reason: format!(
                        "str field `{field}` capacity {max_len} exceeds {}",
                        u16::MAX
                    ),
                })
            }
            Self::Bytes { len: 0 } => Err(EcsError::InvalidFieldConfiguration {
                reason: format!("bytes field `{field}` has zero length"),
            }),
            _ => Ok(()),
        }
    }
}

/// A named field inside a component schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name, unique within its schema.
    pub(crate) name: String,
    /// Declared subtype.
    pub(crate) kind: FieldKind,
}

impl FieldDef {
    /// Construct a field definition.
    pub(crate) fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// The field's name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field's declared subtype.
    #[inline]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A scalar Rust type that a column can hold directly.
///
/// Implemented for the numeric subtypes and `bool`. String and binary fields
/// are accessed through their own handle types since they are not `Copy`
/// scalars.
pub trait Scalar: Copy + sealed::Sealed + 'static {
    /// The field kind a column must have to hold this scalar.
    const KIND: FieldKind;

    #[doc(hidden)]
    fn load(column: &Column, index: usize) -> Self;

    #[doc(hidden)]
    fn store(column: &mut Column, index: usize, value: Self);
}

macro_rules! impl_scalar {
    ($ty:ty => $variant:ident) => {
        impl sealed::Sealed for $ty {}

        impl Scalar for $ty {
            const KIND: FieldKind = FieldKind::$variant;

            #[inline]
            fn load(column: &Column, index: usize) -> Self {
                match column {
                    Column::$variant(values) => values[index],
                    _ => unreachable!("column kind is checked at field resolution"),
                }
            }

            #[inline]
            fn store(column: &mut Column, index: usize, value: Self) {
                match column {
                    Column::$variant(values) => values[index] = value,
                    _ => unreachable!("column kind is checked at field resolution"),
                }
            }
        }
    };
}

impl_scalar!(i8 => I8);
impl_scalar!(i16 => I16);
impl_scalar!(i32 => I32);
impl_scalar!(u8 => U8);
impl_scalar!(u16 => U16);
impl_scalar!(u32 => U32);
impl_scalar!(f32 => F32);
impl_scalar!(f64 => F64);

impl sealed::Sealed for bool {}

impl Scalar for bool {
    const KIND: FieldKind = FieldKind::Bool;

    #[inline]
    fn load(column: &Column, index: usize) -> Self {
        match column {
            Column::Bool(bits) => bits.contains(index),
            _ => unreachable!("column kind is checked at field resolution"),
        }
    }

    #[inline]
    fn store(column: &mut Column, index: usize, value: Self) {
        match column {
            Column::Bool(bits) => bits.set(index, value),
            _ => unreachable!("column kind is checked at field resolution"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_widths_follow_subtype() {
        // Given / Then
        assert_eq!(FieldKind::I8.byte_width(), 1);
        assert_eq!(FieldKind::U16.byte_width(), 2);
        assert_eq!(FieldKind::I32.byte_width(), 4);
        assert_eq!(FieldKind::F32.byte_width(), 4);
        assert_eq!(FieldKind::F64.byte_width(), 8);
        assert_eq!(FieldKind::Str { max_len: 32 }.byte_width(), 32);
        assert_eq!(FieldKind::Bytes { len: 16 }.byte_width(), 16);
    }

    #[test]
    fn zero_capacity_str_rejected() {
        // Given
        let kind = FieldKind::Str { max_len: 0 };

        // When
        let result = kind.validate("label");

        // Then
        assert!(matches!(
            result,
            Err(EcsError::InvalidFieldConfiguration { .. })
        ));
    }

    #[test]
    fn oversized_str_rejected() {
        // Given
        let kind = FieldKind::Str {
            max_len: u16::MAX as usize + 1,
        };

        // When
        let result = kind.validate("label");

        // Then
        assert!(matches!(
            result,
            Err(EcsError::InvalidFieldConfiguration { .. })
        ));
    }

    #[test]
    fn zero_length_bytes_rejected() {
        // Given
        let kind = FieldKind::Bytes { len: 0 };

        // When
        let result = kind.validate("blob");

        // Then
        assert!(matches!(
            result,
            Err(EcsError::InvalidFieldConfiguration { .. })
        ));
    }

    #[test]
    fn numeric_kinds_validate() {
        for kind in [
            FieldKind::I8,
            FieldKind::I16,
            FieldKind::I32,
            FieldKind::U8,
            FieldKind::U16,
            FieldKind::U32,
            FieldKind::F32,
            FieldKind::F64,
            FieldKind::Bool,
        ] {
            assert!(kind.validate("n").is_ok());
        }
    }
}
