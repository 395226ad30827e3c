//! PEG grammar for classifying PLY header lines.
//!
//! The grammar only understands single lines; the loop in [`super`] feeds it
//! one header line at a time and assembles the schema from the resulting
//! [`Line`] values.

use crate::ply::{
    Comment, ElementDef, Encoding, ObjInfo, PropertyDef, PropertyType, ScalarType, Version,
};

/// A single parsed header line.
#[derive(Debug, PartialEq, Clone)]
pub enum Line {
    /// The `ply` magic number line.
    MagicNumber,
    /// A `format <encoding> <version>` line. The version is `None` when it
    /// does not fit `u16.u8`.
    Format((Encoding, Option<Version>)),
    /// A `comment ...` line.
    Comment(Comment),
    /// An `obj_info ...` line.
    ObjInfo(ObjInfo),
    /// An `element <name> <count>` line; `None` when the count overflows.
    Element(Option<ElementDef>),
    /// A `property ...` line.
    Property(PropertyDef),
    /// The `end_header` terminator line.
    EndHeader,
}

peg::parser! {pub grammar grammar() for str {

rule space() = [' ' | '\t']+

rule uint() -> Option<u64>
    = n:$(['0'..='9']+) {
        n.parse::<u64>().ok()
    }

// Element and property names are arbitrary non-whitespace ASCII.
rule ident() -> &'input str
    = s:$(['!'..='~']+) { s }

rule text() -> &'input str
    = s:$((!['\n' | '\r'][_])+) { s }

rule scalar() -> ScalarType
    = "int8"    { ScalarType::Char }
    / "char"    { ScalarType::Char }
    / "uint8"   { ScalarType::UChar }
    / "uchar"   { ScalarType::UChar }
    / "int16"   { ScalarType::Short }
    / "short"   { ScalarType::Short }
    / "uint16"  { ScalarType::UShort }
    / "ushort"  { ScalarType::UShort }
    / "int32"   { ScalarType::Int }
    / "int"     { ScalarType::Int }
    / "uint32"  { ScalarType::UInt }
    / "uint"    { ScalarType::UInt }
    / "float32" { ScalarType::Float }
    / "float64" { ScalarType::Double }
    / "float"   { ScalarType::Float }
    / "double"  { ScalarType::Double }

rule data_type() -> PropertyType
    = "list" space() c:scalar() space() t:scalar() {
        PropertyType::List(c, t)
    }
    / s:scalar() { PropertyType::Scalar(s) }

pub rule magic_number()
    = "ply"

rule version() -> Option<Version>
    = maj:uint() "." min:uint() {{
        let maj = maj?;
        let min = min?;
        Some(Version {
            major: u16::try_from(maj).ok()?,
            minor: u8::try_from(min).ok()?,
        })
    }}

pub rule format() -> (Encoding, Option<Version>)
    = "format" space() "ascii" space() v:version() { (Encoding::Ascii, v) }
    / "format" space() "binary_big_endian" space() v:version() { (Encoding::BinaryBigEndian, v) }
    / "format" space() "binary_little_endian" space() v:version() { (Encoding::BinaryLittleEndian, v) }

pub rule comment() -> Comment
    = "comment" space() c:text() { c.to_string() }
    / "comment" space()? { String::new() }

pub rule obj_info() -> ObjInfo
    = "obj_info" space() c:text() { c.to_string() }
    / "obj_info" space()? { String::new() }

pub rule element() -> Option<ElementDef>
    = "element" space() id:ident() space() n:uint() {{
        let mut e = ElementDef::new(id.to_owned());
        e.count = usize::try_from(n?).ok()?;
        Some(e)
    }}

pub rule property() -> PropertyDef
    = "property" space() data_type:data_type() space() id:ident() {
        PropertyDef::new(id.to_owned(), data_type)
    }

pub rule end_header()
    = "end_header"

pub rule line() -> Line
    = space()? l:trimmed_line() space()? { l }

rule trimmed_line() -> Line
    = magic_number() { Line::MagicNumber }
    / end_header() { Line::EndHeader }
    / v:format() { Line::Format(v) }
    / v:obj_info() { Line::ObjInfo(v) }
    / v:comment() { Line::Comment(v) }
    / v:element() { Line::Element(v) }
    / v:property() { Line::Property(v) }

}}
