//! Row layout and the three row decoders.
//!
//! A loaded element is materialized as a [`RowBlock`]: one contiguous buffer
//! of packed rows plus, when variable-length lists are present, a side buffer
//! holding the list payloads. Properties sit at fixed offsets within each row
//! (aligned to their scalar size); a variable-length list occupies a fixed
//! 8-byte slot `(count: u32, byte_offset: u32)` pointing into the side buffer.
//!
//! All stored values are native-endian, whatever the wire encoding was, so
//! extraction never has to know where the bytes came from.

use std::io;
use std::io::Read;
use std::str::FromStr;

use byteorder::{BigEndian, ByteOrder, LittleEndian, NativeEndian, ReadBytesExt};

use crate::errors::{PlyError, PlyResult};
use crate::ply::{ElementDef, Encoding, PropertyType, ScalarType};
use crate::source::ByteSource;

/// Bytes a variable-length list occupies inside a row: `(count, byte_offset)`.
pub(crate) const LIST_SLOT_BYTES: usize = 8;

/// Shape of one property inside the row block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldShape {
    Scalar(ScalarType),
    FixedList {
        count: ScalarType,
        item: ScalarType,
        len: usize,
    },
    List {
        count: ScalarType,
        item: ScalarType,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct FieldLayout {
    /// Byte offset of this property within a row.
    pub offset: usize,
    pub shape: FieldShape,
}

/// Per-element block layout, derived from the schema at load time.
#[derive(Debug, Clone)]
pub(crate) struct RowLayout {
    pub fields: Vec<FieldLayout>,
    /// Bytes per row in the block.
    pub stride: usize,
    /// Any variable-length list present?
    pub has_lists: bool,
    /// The block bytes mirror the wire bytes one-to-one: scalars only, no
    /// alignment padding. Enables loading a whole element with one read.
    wire_matches_block: bool,
}

#[inline]
fn align_up(n: usize, align: usize) -> usize {
    n.div_ceil(align) * align
}

impl RowLayout {
    pub(crate) fn of(element: &ElementDef) -> Self {
        let mut fields = Vec::with_capacity(element.properties.len());
        let mut offset = 0usize;
        let mut max_align = 1usize;
        let mut has_lists = false;
        let mut packed = true;
        for def in element.properties.values() {
            let (shape, size, align) = match def.data_type {
                PropertyType::Scalar(t) => {
                    (FieldShape::Scalar(t), t.size_bytes(), t.size_bytes())
                }
                PropertyType::FixedList(count, item, len) => {
                    packed = false;
                    (
                        FieldShape::FixedList { count, item, len },
                        len * item.size_bytes(),
                        item.size_bytes(),
                    )
                }
                PropertyType::List(count, item) => {
                    has_lists = true;
                    packed = false;
                    (FieldShape::List { count, item }, LIST_SLOT_BYTES, 4)
                }
            };
            let aligned = align_up(offset, align);
            if aligned != offset {
                packed = false;
            }
            fields.push(FieldLayout {
                offset: aligned,
                shape,
            });
            offset = aligned + size;
            max_align = max_align.max(align);
        }
        let stride = align_up(offset, max_align);
        if stride != offset {
            packed = false;
        }
        RowLayout {
            fields,
            stride,
            has_lists,
            wire_matches_block: packed,
        }
    }
}

/// All rows of one loaded element.
#[derive(Debug)]
pub(crate) struct RowBlock {
    pub layout: RowLayout,
    /// Number of rows; always the element's declared count.
    pub count: usize,
    /// `count * layout.stride` bytes of packed rows.
    pub rows: Vec<u8>,
    /// Variable-length list payloads, native-endian, in decode order.
    pub list_data: Vec<u8>,
}

impl RowBlock {
    /// The bytes of one row.
    #[inline]
    pub(crate) fn row(&self, r: usize) -> &[u8] {
        &self.rows[r * self.layout.stride..(r + 1) * self.layout.stride]
    }

    /// Reads a row's `(count, byte_offset)` list slot.
    #[inline]
    pub(crate) fn list_slot(&self, r: usize, field: &FieldLayout) -> (usize, usize) {
        let slot = &self.row(r)[field.offset..field.offset + LIST_SLOT_BYTES];
        (
            NativeEndian::read_u32(&slot[..4]) as usize,
            NativeEndian::read_u32(&slot[4..]) as usize,
        )
    }
}

/// Decodes every row of `element` from the source.
pub(crate) fn decode_element<R: Read>(
    source: &mut ByteSource<R>,
    encoding: Encoding,
    element: &ElementDef,
) -> PlyResult<RowBlock> {
    let layout = RowLayout::of(element);
    let bytes = element.count.checked_mul(layout.stride).ok_or_else(|| {
        PlyError::MalformedHeader(format!(
            "element '{}' declares an impossible row count",
            element.name
        ))
    })?;
    let mut block = RowBlock {
        count: element.count,
        rows: vec![0u8; bytes],
        list_data: Vec::new(),
        layout,
    };
    match encoding {
        Encoding::Ascii => decode_rows_ascii(source, &mut block)?,
        Encoding::BinaryLittleEndian => decode_rows_binary::<R, LittleEndian>(source, &mut block)?,
        Encoding::BinaryBigEndian => decode_rows_binary::<R, BigEndian>(source, &mut block)?,
    }
    Ok(block)
}

/// Advances the source past every row of `element` without materializing it.
pub(crate) fn skip_element<R: Read>(
    source: &mut ByteSource<R>,
    encoding: Encoding,
    element: &ElementDef,
) -> PlyResult<()> {
    match encoding {
        Encoding::Ascii => skip_rows_ascii(source, element),
        Encoding::BinaryLittleEndian => skip_rows_binary::<R, LittleEndian>(source, element),
        Encoding::BinaryBigEndian => skip_rows_binary::<R, BigEndian>(source, element),
    }
}

/// True when `B` writes bytes in this machine's order.
fn host_order_is<B: ByteOrder>() -> bool {
    let mut probe = [0u8; 2];
    B::write_u16(&mut probe, 1);
    u16::from_ne_bytes(probe) == 1
}

fn decode_rows_binary<R: Read, B: ByteOrder>(
    source: &mut ByteSource<R>,
    block: &mut RowBlock,
) -> PlyResult<()> {
    if !block.layout.has_lists && block.layout.wire_matches_block && host_order_is::<B>() {
        return source.read_exact_into(&mut block.rows);
    }
    let RowBlock {
        layout,
        count,
        rows,
        list_data,
    } = block;
    let stride = layout.stride;
    for r in 0..*count {
        let row = &mut rows[r * stride..(r + 1) * stride];
        for field in &layout.fields {
            match field.shape {
                FieldShape::Scalar(t) => {
                    let size = t.size_bytes();
                    decode_scalar_binary::<R, B>(
                        source,
                        t,
                        &mut row[field.offset..field.offset + size],
                    )?;
                }
                FieldShape::FixedList { count, item, len } => {
                    let n = read_count_binary::<R, B>(source, count)?;
                    if n as usize != len {
                        return Err(PlyError::BadListLength(format!(
                            "expected exactly {len} list items, found {n}"
                        )));
                    }
                    let size = item.size_bytes();
                    for i in 0..len {
                        let at = field.offset + i * size;
                        decode_scalar_binary::<R, B>(source, item, &mut row[at..at + size])?;
                    }
                }
                FieldShape::List { count, item } => {
                    let n = read_count_binary::<R, B>(source, count)?;
                    let start = append_list_payload(list_data, n, item)?;
                    let size = item.size_bytes();
                    for i in 0..n as usize {
                        let at = start + i * size;
                        decode_scalar_binary::<R, B>(source, item, &mut list_data[at..at + size])?;
                    }
                    write_list_slot(row, field.offset, n as u32, start as u32);
                }
            }
        }
    }
    Ok(())
}

fn decode_rows_ascii<R: Read>(source: &mut ByteSource<R>, block: &mut RowBlock) -> PlyResult<()> {
    let RowBlock {
        layout,
        count,
        rows,
        list_data,
    } = block;
    let stride = layout.stride;
    for r in 0..*count {
        let row = &mut rows[r * stride..(r + 1) * stride];
        for field in &layout.fields {
            match field.shape {
                FieldShape::Scalar(t) => {
                    let size = t.size_bytes();
                    decode_scalar_ascii(source, t, &mut row[field.offset..field.offset + size])?;
                }
                FieldShape::FixedList { count, item, len } => {
                    let n = read_count_ascii(source, count)?;
                    if n as usize != len {
                        return Err(PlyError::BadListLength(format!(
                            "expected exactly {len} list items, found {n}"
                        )));
                    }
                    let size = item.size_bytes();
                    for i in 0..len {
                        let at = field.offset + i * size;
                        decode_scalar_ascii(source, item, &mut row[at..at + size])?;
                    }
                }
                FieldShape::List { count, item } => {
                    let n = read_count_ascii(source, count)?;
                    let start = append_list_payload(list_data, n, item)?;
                    let size = item.size_bytes();
                    for i in 0..n as usize {
                        let at = start + i * size;
                        decode_scalar_ascii(source, item, &mut list_data[at..at + size])?;
                    }
                    write_list_slot(row, field.offset, n as u32, start as u32);
                }
            }
        }
    }
    Ok(())
}

/// Grows the payload buffer for `n` items of `item`, returning the start
/// offset. Offsets are stored as `u32`, which caps the payload buffer.
fn append_list_payload(list_data: &mut Vec<u8>, n: u64, item: ScalarType) -> PlyResult<usize> {
    if n > u32::MAX as u64 {
        return Err(PlyError::BadListLength(format!(
            "list count {n} exceeds the supported maximum"
        )));
    }
    let start = list_data.len();
    let bytes = n as usize * item.size_bytes();
    if (start as u64).saturating_add(bytes as u64) > u32::MAX as u64 {
        return Err(PlyError::BadListLength(
            "list payloads exceed the supported total size".to_string(),
        ));
    }
    list_data.resize(start + bytes, 0);
    Ok(start)
}

#[inline]
fn write_list_slot(row: &mut [u8], offset: usize, n: u32, start: u32) {
    let slot = &mut row[offset..offset + LIST_SLOT_BYTES];
    NativeEndian::write_u32(&mut slot[..4], n);
    NativeEndian::write_u32(&mut slot[4..], start);
}

fn decode_scalar_binary<R: Read, B: ByteOrder>(
    source: &mut ByteSource<R>,
    kind: ScalarType,
    out: &mut [u8],
) -> PlyResult<()> {
    let result: io::Result<()> = (|| {
        match kind {
            ScalarType::Char => out[0] = source.read_i8()? as u8,
            ScalarType::UChar => out[0] = source.read_u8()?,
            ScalarType::Short => NativeEndian::write_i16(out, source.read_i16::<B>()?),
            ScalarType::UShort => NativeEndian::write_u16(out, source.read_u16::<B>()?),
            ScalarType::Int => NativeEndian::write_i32(out, source.read_i32::<B>()?),
            ScalarType::UInt => NativeEndian::write_u32(out, source.read_u32::<B>()?),
            ScalarType::Float => NativeEndian::write_f32(out, source.read_f32::<B>()?),
            ScalarType::Double => NativeEndian::write_f64(out, source.read_f64::<B>()?),
        }
        Ok(())
    })();
    result.map_err(|e| PlyError::from_io(e, "row data ended early"))
}

fn read_count_binary<R: Read, B: ByteOrder>(
    source: &mut ByteSource<R>,
    kind: ScalarType,
) -> PlyResult<u64> {
    let result: io::Result<i64> = (|| {
        Ok(match kind {
            ScalarType::Char => source.read_i8()? as i64,
            ScalarType::UChar => source.read_u8()? as i64,
            ScalarType::Short => source.read_i16::<B>()? as i64,
            ScalarType::UShort => source.read_u16::<B>()? as i64,
            ScalarType::Int => source.read_i32::<B>()? as i64,
            ScalarType::UInt => source.read_u32::<B>()? as i64,
            // Rejected while parsing the header.
            ScalarType::Float | ScalarType::Double => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "float list count",
                ))
            }
        })
    })();
    let v = result.map_err(|e| PlyError::from_io(e, "list count ended early"))?;
    if v < 0 {
        return Err(PlyError::BadListLength(format!("negative list count {v}")));
    }
    Ok(v as u64)
}

fn parse_num<T: FromStr>(token: &str, kind: ScalarType) -> PlyResult<T> {
    token
        .parse()
        .map_err(|_| PlyError::NumericParse(format!("'{token}' is not a valid {kind}")))
}

fn decode_scalar_ascii<R: Read>(
    source: &mut ByteSource<R>,
    kind: ScalarType,
    out: &mut [u8],
) -> PlyResult<()> {
    let token = source.read_token()?;
    match kind {
        ScalarType::Char => out[0] = parse_num::<i8>(token, kind)? as u8,
        ScalarType::UChar => out[0] = parse_num::<u8>(token, kind)?,
        ScalarType::Short => NativeEndian::write_i16(out, parse_num(token, kind)?),
        ScalarType::UShort => NativeEndian::write_u16(out, parse_num(token, kind)?),
        ScalarType::Int => NativeEndian::write_i32(out, parse_num(token, kind)?),
        ScalarType::UInt => NativeEndian::write_u32(out, parse_num(token, kind)?),
        ScalarType::Float => NativeEndian::write_f32(out, parse_num(token, kind)?),
        ScalarType::Double => NativeEndian::write_f64(out, parse_num(token, kind)?),
    }
    Ok(())
}

fn read_count_ascii<R: Read>(source: &mut ByteSource<R>, kind: ScalarType) -> PlyResult<u64> {
    let token = source.read_token()?;
    let v: i64 = match kind {
        ScalarType::Char => parse_num::<i8>(token, kind)? as i64,
        ScalarType::UChar => parse_num::<u8>(token, kind)? as i64,
        ScalarType::Short => parse_num::<i16>(token, kind)? as i64,
        ScalarType::UShort => parse_num::<u16>(token, kind)? as i64,
        ScalarType::Int => parse_num::<i32>(token, kind)? as i64,
        ScalarType::UInt => parse_num::<u32>(token, kind)? as i64,
        ScalarType::Float | ScalarType::Double => {
            return Err(PlyError::BadListLength(format!(
                "list count declared as '{kind}'"
            )))
        }
    };
    if v < 0 {
        return Err(PlyError::BadListLength(format!("negative list count {v}")));
    }
    Ok(v as u64)
}

fn skip_rows_binary<R: Read, B: ByteOrder>(
    source: &mut ByteSource<R>,
    element: &ElementDef,
) -> PlyResult<()> {
    if let Some(stride) = element.wire_stride() {
        return source.skip_bytes(element.count as u64 * stride as u64);
    }
    for _ in 0..element.count {
        for def in element.properties.values() {
            match def.data_type {
                PropertyType::Scalar(t) => source.skip_bytes(t.size_bytes() as u64)?,
                PropertyType::FixedList(count, item, len) => {
                    let n = read_count_binary::<R, B>(source, count)?;
                    if n as usize != len {
                        return Err(PlyError::BadListLength(format!(
                            "expected exactly {len} list items, found {n}"
                        )));
                    }
                    source.skip_bytes(len as u64 * item.size_bytes() as u64)?;
                }
                PropertyType::List(count, item) => {
                    let n = read_count_binary::<R, B>(source, count)?;
                    source.skip_bytes(n * item.size_bytes() as u64)?;
                }
            }
        }
    }
    Ok(())
}

fn skip_rows_ascii<R: Read>(source: &mut ByteSource<R>, element: &ElementDef) -> PlyResult<()> {
    for _ in 0..element.count {
        for def in element.properties.values() {
            match def.data_type {
                PropertyType::Scalar(_) => source.skip_tokens(1)?,
                PropertyType::FixedList(count, _, len) => {
                    let n = read_count_ascii(source, count)?;
                    if n as usize != len {
                        return Err(PlyError::BadListLength(format!(
                            "expected exactly {len} list items, found {n}"
                        )));
                    }
                    source.skip_tokens(len)?;
                }
                PropertyType::List(count, _) => {
                    let n = read_count_ascii(source, count)?;
                    source.skip_tokens(n as usize)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ply::PropertyDef;
    use std::io::Cursor;

    fn element(props: &[(&str, PropertyType)]) -> ElementDef {
        let mut e = ElementDef::new("test".to_string());
        for (name, ty) in props {
            e.properties
                .insert(name.to_string(), PropertyDef::new(name.to_string(), *ty));
        }
        e
    }

    fn source(bytes: &[u8]) -> ByteSource<Cursor<Vec<u8>>> {
        ByteSource::new(Cursor::new(bytes.to_vec()))
    }

    #[test]
    fn layout_aligns_to_scalar_size() {
        let mut e = element(&[
            ("flag", PropertyType::Scalar(ScalarType::UChar)),
            ("x", PropertyType::Scalar(ScalarType::Float)),
            ("id", PropertyType::Scalar(ScalarType::UShort)),
        ]);
        e.count = 1;
        let layout = RowLayout::of(&e);
        assert_eq!(layout.fields[0].offset, 0);
        assert_eq!(layout.fields[1].offset, 4);
        assert_eq!(layout.fields[2].offset, 8);
        assert_eq!(layout.stride, 12);
        assert!(!layout.has_lists);
    }

    #[test]
    fn layout_packed_floats_match_wire() {
        let mut e = element(&[
            ("x", PropertyType::Scalar(ScalarType::Float)),
            ("y", PropertyType::Scalar(ScalarType::Float)),
            ("z", PropertyType::Scalar(ScalarType::Float)),
        ]);
        e.count = 2;
        let layout = RowLayout::of(&e);
        assert_eq!(layout.stride, 12);
        assert!(layout.wire_matches_block);
    }

    #[test]
    fn layout_gives_lists_a_slot() {
        let mut e = element(&[(
            "vertex_indices",
            PropertyType::List(ScalarType::UChar, ScalarType::Int),
        )]);
        e.count = 1;
        let layout = RowLayout::of(&e);
        assert_eq!(layout.fields[0].offset, 0);
        assert_eq!(layout.stride, LIST_SLOT_BYTES);
        assert!(layout.has_lists);
        assert!(!layout.wire_matches_block);
    }

    #[test]
    fn binary_le_scalars_decode() {
        let mut e = element(&[
            ("a", PropertyType::Scalar(ScalarType::UShort)),
            ("b", PropertyType::Scalar(ScalarType::Float)),
        ]);
        e.count = 1;
        let mut src = source(&[0x2a, 0x00, 0x00, 0x00, 0x80, 0x3f]);
        let block = decode_element(&mut src, Encoding::BinaryLittleEndian, &e).unwrap();
        let row = block.row(0);
        assert_eq!(NativeEndian::read_u16(&row[0..2]), 42);
        assert_eq!(NativeEndian::read_f32(&row[4..8]), 1.0);
    }

    #[test]
    fn binary_be_swaps_into_native() {
        let mut e = element(&[("v", PropertyType::Scalar(ScalarType::Int))]);
        e.count = 1;
        let mut src = source(&[0x00, 0x00, 0x01, 0x00]);
        let block = decode_element(&mut src, Encoding::BinaryBigEndian, &e).unwrap();
        assert_eq!(NativeEndian::read_i32(block.row(0)), 256);
    }

    #[test]
    fn binary_list_goes_to_side_buffer() {
        let mut e = element(&[(
            "vertex_indices",
            PropertyType::List(ScalarType::UChar, ScalarType::Int),
        )]);
        e.count = 2;
        let mut src = source(&[
            3, 0, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, // row 0: 3 items
            1, 7, 0, 0, 0, // row 1: 1 item
        ]);
        let block = decode_element(&mut src, Encoding::BinaryLittleEndian, &e).unwrap();
        let field = block.layout.fields[0].clone();
        assert_eq!(block.list_slot(0, &field), (3, 0));
        assert_eq!(block.list_slot(1, &field), (1, 12));
        assert_eq!(NativeEndian::read_i32(&block.list_data[0..4]), 0);
        assert_eq!(NativeEndian::read_i32(&block.list_data[8..12]), 2);
        assert_eq!(NativeEndian::read_i32(&block.list_data[12..16]), 7);
    }

    #[test]
    fn ascii_rows_decode_across_lines() {
        let mut e = element(&[
            ("x", PropertyType::Scalar(ScalarType::Float)),
            ("y", PropertyType::Scalar(ScalarType::Int)),
        ]);
        e.count = 2;
        let mut src = source(b"1.5 -2\n3.25 40\n");
        let block = decode_element(&mut src, Encoding::Ascii, &e).unwrap();
        assert_eq!(NativeEndian::read_f32(&block.row(0)[0..4]), 1.5);
        assert_eq!(NativeEndian::read_i32(&block.row(0)[4..8]), -2);
        assert_eq!(NativeEndian::read_f32(&block.row(1)[0..4]), 3.25);
        assert_eq!(NativeEndian::read_i32(&block.row(1)[4..8]), 40);
    }

    #[test]
    fn ascii_accepts_nan_and_inf() {
        let mut e = element(&[("v", PropertyType::Scalar(ScalarType::Float))]);
        e.count = 4;
        let mut src = source(b"nan NaN -inf INFINITY\n");
        let block = decode_element(&mut src, Encoding::Ascii, &e).unwrap();
        assert!(NativeEndian::read_f32(block.row(0)).is_nan());
        assert!(NativeEndian::read_f32(block.row(1)).is_nan());
        assert_eq!(NativeEndian::read_f32(block.row(2)), f32::NEG_INFINITY);
        assert_eq!(NativeEndian::read_f32(block.row(3)), f32::INFINITY);
    }

    #[test]
    fn ascii_bad_token_is_numeric_parse() {
        let mut e = element(&[("v", PropertyType::Scalar(ScalarType::Int))]);
        e.count = 1;
        let mut src = source(b"five\n");
        assert!(matches!(
            decode_element(&mut src, Encoding::Ascii, &e),
            Err(PlyError::NumericParse(_))
        ));
    }

    #[test]
    fn ascii_missing_token_is_eof() {
        let mut e = element(&[("v", PropertyType::Scalar(ScalarType::Int))]);
        e.count = 3;
        let mut src = source(b"1 2\n");
        assert!(matches!(
            decode_element(&mut src, Encoding::Ascii, &e),
            Err(PlyError::UnexpectedEof(_))
        ));
    }

    #[test]
    fn fixed_list_stores_items_without_count() {
        let mut e = element(&[(
            "vertex_indices",
            PropertyType::FixedList(ScalarType::UChar, ScalarType::Int, 3),
        )]);
        e.count = 1;
        let mut src = source(&[3, 5, 0, 0, 0, 6, 0, 0, 0, 7, 0, 0, 0]);
        let block = decode_element(&mut src, Encoding::BinaryLittleEndian, &e).unwrap();
        assert_eq!(block.layout.stride, 12);
        let row = block.row(0);
        assert_eq!(NativeEndian::read_i32(&row[0..4]), 5);
        assert_eq!(NativeEndian::read_i32(&row[4..8]), 6);
        assert_eq!(NativeEndian::read_i32(&row[8..12]), 7);
        assert!(block.list_data.is_empty());
    }

    #[test]
    fn fixed_list_count_mismatch_is_bad_list_length() {
        let mut e = element(&[(
            "vertex_indices",
            PropertyType::FixedList(ScalarType::UChar, ScalarType::Int, 3),
        )]);
        e.count = 1;
        let mut src = source(&[4, 5, 0, 0, 0, 6, 0, 0, 0, 7, 0, 0, 0, 8, 0, 0, 0]);
        assert!(matches!(
            decode_element(&mut src, Encoding::BinaryLittleEndian, &e),
            Err(PlyError::BadListLength(_))
        ));
    }

    #[test]
    fn negative_list_count_is_bad_list_length() {
        let mut e = element(&[(
            "vertex_indices",
            PropertyType::List(ScalarType::Char, ScalarType::Int),
        )]);
        e.count = 1;
        let mut src = source(&[0xff]);
        assert!(matches!(
            decode_element(&mut src, Encoding::BinaryLittleEndian, &e),
            Err(PlyError::BadListLength(_))
        ));
    }

    #[test]
    fn truncated_list_payload_is_eof() {
        let mut e = element(&[(
            "vertex_indices",
            PropertyType::List(ScalarType::UChar, ScalarType::Int),
        )]);
        e.count = 1;
        let mut src = source(&[200, 1, 0, 0, 0]);
        assert!(matches!(
            decode_element(&mut src, Encoding::BinaryLittleEndian, &e),
            Err(PlyError::UnexpectedEof(_))
        ));
    }

    #[test]
    fn skip_fixed_element_is_byte_exact() {
        let mut e = element(&[
            ("x", PropertyType::Scalar(ScalarType::Float)),
            ("y", PropertyType::Scalar(ScalarType::Float)),
        ]);
        e.count = 3;
        let mut bytes = vec![0u8; 24];
        bytes.extend_from_slice(&[0xAB]);
        let mut src = source(&bytes);
        skip_element(&mut src, Encoding::BinaryLittleEndian, &e).unwrap();
        assert_eq!(src.position(), 24);
        assert_eq!(src.peek().unwrap(), Some(0xAB));
    }

    #[test]
    fn skip_list_element_scans_counts() {
        let mut e = element(&[(
            "vertex_indices",
            PropertyType::List(ScalarType::UChar, ScalarType::Short),
        )]);
        e.count = 2;
        // 2 items, 1 item, then a sentinel byte
        let mut src = source(&[2, 1, 0, 2, 0, 1, 3, 0, 0x5A]);
        skip_element(&mut src, Encoding::BinaryLittleEndian, &e).unwrap();
        assert_eq!(src.peek().unwrap(), Some(0x5A));
    }

    #[test]
    fn skip_ascii_rows_by_tokens() {
        let mut e = element(&[
            ("x", PropertyType::Scalar(ScalarType::Float)),
            (
                "vertex_indices",
                PropertyType::List(ScalarType::UChar, ScalarType::Int),
            ),
        ]);
        e.count = 2;
        let mut src = source(b"1.0 3 0 1 2\n2.0 1 9\nrest");
        skip_element(&mut src, Encoding::Ascii, &e).unwrap();
        assert_eq!(src.read_token().unwrap(), "rest");
    }

    #[test]
    fn zero_property_element_skips_cleanly() {
        let mut e = element(&[]);
        e.count = 5;
        let mut src = source(b"payload");
        skip_element(&mut src, Encoding::BinaryLittleEndian, &e).unwrap();
        assert_eq!(src.position(), 0);
    }
}
