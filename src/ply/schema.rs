//! Schema model of a PLY file.
//!
//! This module defines [`Header`] and the element/property declarations the
//! header parser produces. The schema is the contract between the header and
//! the body: elements appear in the body exactly in declaration order, and
//! each element's rows carry its properties in declaration order.

use std::fmt;
use std::fmt::{Display, Formatter};

use super::KeyMap;
use super::PropertyDef;
use super::PropertyType;

/// Alias to give object information lines (`obj_info ...`) an explicit type.
pub type ObjInfo = String;

/// Alias to give comments an explicit type.
pub type Comment = String;

/// Models a version number.
///
/// At time of writing, the only existing version for a PLY file is "1.0",
/// and the header parser rejects anything else.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Version {
    /// Major version number.
    pub major: u16,
    /// Minor version number.
    pub minor: u8,
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Models possible encoding standards for the payload.
///
/// The encoding is fixed for the whole file by the `format` line.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Encoding {
    /// Numbers in their ascii representation, separated by whitespace.
    Ascii,
    /// Binary payload, big endian scalars.
    BinaryBigEndian,
    /// Binary payload, little endian scalars.
    BinaryLittleEndian,
}

impl Display for Encoding {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        f.write_str(match *self {
            Encoding::Ascii => "ascii",
            Encoding::BinaryBigEndian => "binary_big_endian",
            Encoding::BinaryLittleEndian => "binary_little_endian",
        })
    }
}

/// Models the definition of an element.
///
/// Elements describe single entities consisting of different properties.
/// A point cloud's `vertex` element might carry three float properties
/// `x`, `y`, `z`; a mesh adds a `face` element with an index list.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ElementDef {
    /// Name of the element, unique within a PLY file.
    pub name: String,
    /// Number of rows of this element in the body.
    pub count: usize,
    /// Ordered property declarations.
    pub properties: KeyMap<PropertyDef>,
}

impl ElementDef {
    /// Creates a new element definition with no properties and a count of zero.
    pub fn new(name: String) -> Self {
        ElementDef {
            name,
            count: 0,
            properties: KeyMap::new(),
        }
    }

    /// True if any property is still a variable-length list.
    ///
    /// A list-bearing element has no fixed row stride, so skipping past it
    /// requires scanning every row. Converting all lists to fixed size
    /// restores O(1) skipping.
    pub fn has_lists(&self) -> bool {
        self.properties.values().any(|p| p.data_type.is_list())
    }

    /// Bytes one row occupies on the wire in a binary encoding, if fixed.
    ///
    /// Scalars contribute their size; a fixed-size-converted list contributes
    /// its count prefix plus `n` items. Returns `None` while any property is
    /// a variable-length list.
    pub fn wire_stride(&self) -> Option<usize> {
        let mut total = 0usize;
        for p in self.properties.values() {
            match p.data_type {
                PropertyType::Scalar(t) => total += t.size_bytes(),
                PropertyType::FixedList(count, item, n) => {
                    total += count.size_bytes() + n * item.size_bytes()
                }
                PropertyType::List(..) => return None,
            }
        }
        Some(total)
    }
}

/// Models the header of a PLY file.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Header {
    /// In which format is the payload encoded?
    pub encoding: Encoding,
    /// Which file format standard is used? Always 1.0.
    pub version: Version,
    /// Arbitrary object metadata lines (`obj_info ...`) as found in the header.
    pub obj_infos: Vec<ObjInfo>,
    /// Ordered map of elements as they appear in the payload.
    pub elements: KeyMap<ElementDef>,
    /// File comments.
    pub comments: Vec<Comment>,
}

impl Header {
    /// Constructs an empty `Header` using ASCII encoding and version 1.0.
    pub fn new() -> Self {
        Header {
            encoding: Encoding::Ascii,
            version: Version { major: 1, minor: 0 },
            obj_infos: Vec::new(),
            elements: KeyMap::new(),
            comments: Vec::new(),
        }
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}
