//! Property model: scalar kinds and property declarations.
//!
//! PLY payload values are typed by the header. This module provides
//! [`ScalarType`] for the eight scalar kinds the format knows, and
//! [`PropertyType`] / [`PropertyDef`] to describe declared properties.

use std::fmt;
use std::fmt::{Display, Formatter};

/// Scalar type used to encode properties in the payload.
///
/// For the translation to rust types, see individual documentation.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ScalarType {
    /// Signed 8 bit integer, rust: `i8`.
    Char,
    /// Unsigned 8 bit integer, rust: `u8`.
    UChar,
    /// Signed 16 bit integer, rust: `i16`.
    Short,
    /// Unsigned 16 bit integer, rust: `u16`.
    UShort,
    /// Signed 32 bit integer, rust: `i32`.
    Int,
    /// Unsigned 32 bit integer, rust: `u32`.
    UInt,
    /// 32 bit floating point number, rust: `f32`.
    Float,
    /// 64 bit floating point number, rust: `f64`.
    Double,
}

impl ScalarType {
    /// Encoded size of one value of this kind, in bytes.
    #[inline]
    pub fn size_bytes(self) -> usize {
        match self {
            ScalarType::Char | ScalarType::UChar => 1,
            ScalarType::Short | ScalarType::UShort => 2,
            ScalarType::Int | ScalarType::UInt | ScalarType::Float => 4,
            ScalarType::Double => 8,
        }
    }

    /// True for `Float` and `Double`.
    #[inline]
    pub fn is_float(self) -> bool {
        matches!(self, ScalarType::Float | ScalarType::Double)
    }

    /// True for the signed integer kinds.
    #[inline]
    pub fn is_signed(self) -> bool {
        matches!(self, ScalarType::Char | ScalarType::Short | ScalarType::Int)
    }

    /// The canonical header keyword for this kind.
    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Char => "char",
            ScalarType::UChar => "uchar",
            ScalarType::Short => "short",
            ScalarType::UShort => "ushort",
            ScalarType::Int => "int",
            ScalarType::UInt => "uint",
            ScalarType::Float => "float",
            ScalarType::Double => "double",
        }
    }
}

impl Display for ScalarType {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        f.write_str(self.name())
    }
}

/// Data type of a declared property.
///
/// A property is either a single scalar, a variable-length list (a leading
/// count of the first scalar kind followed by that many items of the second),
/// or a list that has been converted to a fixed per-row size via
/// [`PlyReader::convert_list_to_fixed`](crate::reader::PlyReader::convert_list_to_fixed).
/// A converted list still carries its count on the wire, but every row must
/// carry exactly the fixed count and the row block stores only the items.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PropertyType {
    /// Simple, "one-number" type.
    Scalar(ScalarType),
    /// Variable-length sequence: count kind first, item kind second.
    List(ScalarType, ScalarType),
    /// A list pinned to exactly `n` items per row: count kind, item kind, `n`.
    FixedList(ScalarType, ScalarType, usize),
}

impl PropertyType {
    /// True for a variable-length list (conversion to fixed size clears this).
    #[inline]
    pub fn is_list(&self) -> bool {
        matches!(self, PropertyType::List(..))
    }
}

/// Defines a property of an element.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PropertyDef {
    /// Unique name of the property within its element.
    pub name: String,
    /// Declared data type: scalar, list, or fixed-size-converted list.
    pub data_type: PropertyType,
}

impl PropertyDef {
    /// Creates a new property definition.
    pub fn new(name: String, data_type: PropertyType) -> Self {
        PropertyDef { name, data_type }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_sizes() {
        assert_eq!(ScalarType::Char.size_bytes(), 1);
        assert_eq!(ScalarType::UChar.size_bytes(), 1);
        assert_eq!(ScalarType::Short.size_bytes(), 2);
        assert_eq!(ScalarType::UShort.size_bytes(), 2);
        assert_eq!(ScalarType::Int.size_bytes(), 4);
        assert_eq!(ScalarType::UInt.size_bytes(), 4);
        assert_eq!(ScalarType::Float.size_bytes(), 4);
        assert_eq!(ScalarType::Double.size_bytes(), 8);
    }

    #[test]
    fn scalar_classification() {
        assert!(ScalarType::Float.is_float());
        assert!(ScalarType::Double.is_float());
        assert!(!ScalarType::Int.is_float());
        assert!(ScalarType::Char.is_signed());
        assert!(ScalarType::Short.is_signed());
        assert!(ScalarType::Int.is_signed());
        assert!(!ScalarType::UInt.is_signed());
        assert!(!ScalarType::Float.is_signed());
    }

    #[test]
    fn scalar_display_uses_canonical_keyword() {
        assert_eq!(ScalarType::UChar.to_string(), "uchar");
        assert_eq!(ScalarType::Double.to_string(), "double");
    }

    #[test]
    fn list_conversion_changes_shape() {
        let list = PropertyType::List(ScalarType::UChar, ScalarType::Int);
        assert!(list.is_list());

        let fixed = PropertyType::FixedList(ScalarType::UChar, ScalarType::Int, 3);
        assert!(!fixed.is_list());
    }
}
