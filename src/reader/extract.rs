//! Typed extraction from a loaded row block.
//!
//! Everything here reads the native-endian row block produced by
//! [`super::row`] and writes caller-supplied typed slices, converting from
//! the declared scalar kind to the destination type. Decoded values travel
//! through [`ScalarValue`] (a 64-bit integer or float, wide enough for every
//! PLY kind), so each (source kind, destination type) pair reduces to one
//! C-style cast.

use byteorder::{ByteOrder, NativeEndian};

use crate::errors::{PlyError, PlyResult};
use crate::ply::ScalarType;

use super::row::{FieldLayout, FieldShape, RowBlock};

/// A decoded scalar, wide enough for any PLY kind.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ScalarValue {
    Int(i64),
    Float(f64),
}

/// Rust scalar types that extraction can write.
///
/// Implemented for `i8`, `u8`, `i16`, `u16`, `i32`, `u32`, `f32` and `f64`.
/// Conversions follow `as`-cast semantics: integer-to-integer truncates in
/// two's complement, integer-to-float rounds to nearest, float-to-integer
/// truncates toward zero (saturating at the type's bounds), float-to-float
/// is the IEEE cast.
pub trait Scalar: Copy + Default {
    /// The PLY scalar kind corresponding to `Self`.
    const KIND: ScalarType;
    #[doc(hidden)]
    fn from_int(v: i64) -> Self;
    #[doc(hidden)]
    fn from_float(v: f64) -> Self;
}

macro_rules! impl_scalar {
    ($t:ty, $kind:expr) => {
        impl Scalar for $t {
            const KIND: ScalarType = $kind;
            #[inline]
            fn from_int(v: i64) -> Self {
                v as $t
            }
            #[inline]
            fn from_float(v: f64) -> Self {
                v as $t
            }
        }
    };
}

impl_scalar!(i8, ScalarType::Char);
impl_scalar!(u8, ScalarType::UChar);
impl_scalar!(i16, ScalarType::Short);
impl_scalar!(u16, ScalarType::UShort);
impl_scalar!(i32, ScalarType::Int);
impl_scalar!(u32, ScalarType::UInt);
impl_scalar!(f32, ScalarType::Float);
impl_scalar!(f64, ScalarType::Double);

/// Reads one native-endian scalar of `kind` from `bytes`.
#[inline]
pub(crate) fn load_value(bytes: &[u8], kind: ScalarType) -> ScalarValue {
    match kind {
        ScalarType::Char => ScalarValue::Int(bytes[0] as i8 as i64),
        ScalarType::UChar => ScalarValue::Int(bytes[0] as i64),
        ScalarType::Short => ScalarValue::Int(NativeEndian::read_i16(bytes) as i64),
        ScalarType::UShort => ScalarValue::Int(NativeEndian::read_u16(bytes) as i64),
        ScalarType::Int => ScalarValue::Int(NativeEndian::read_i32(bytes) as i64),
        ScalarType::UInt => ScalarValue::Int(NativeEndian::read_u32(bytes) as i64),
        ScalarType::Float => ScalarValue::Float(NativeEndian::read_f32(bytes) as f64),
        ScalarType::Double => ScalarValue::Float(NativeEndian::read_f64(bytes)),
    }
}

#[inline]
fn convert<T: Scalar>(v: ScalarValue) -> T {
    match v {
        ScalarValue::Int(i) => T::from_int(i),
        ScalarValue::Float(f) => T::from_float(f),
    }
}

/// Values per row the selected properties contribute: 1 per scalar, `n` per
/// fixed-size-converted list. Fails with `ListProperty` if any selection is
/// still a variable-length list, `OutOfRange` on a bad index.
pub(crate) fn extraction_width(block: &RowBlock, props: &[u32]) -> PlyResult<usize> {
    let mut width = 0usize;
    for &p in props {
        let field = field_at(block, p)?;
        width += match field.shape {
            FieldShape::Scalar(_) => 1,
            FieldShape::FixedList { len, .. } => len,
            FieldShape::List { .. } => {
                return Err(PlyError::ListProperty(format!(
                    "property index {p} is a variable-length list"
                )))
            }
        };
    }
    Ok(width)
}

#[inline]
fn field_at(block: &RowBlock, p: u32) -> PlyResult<&FieldLayout> {
    block
        .layout
        .fields
        .get(p as usize)
        .ok_or_else(|| PlyError::OutOfRange(format!("no property with index {p}")))
}

/// One planned copy: `len` values of `kind` starting at `offset` in the row.
struct PlanEntry {
    offset: usize,
    kind: ScalarType,
    len: usize,
}

/// Copies the selected fixed-size properties of every row into `dest`,
/// row-major, converting each value to `T`.
pub(crate) fn extract_properties<T: Scalar>(
    block: &RowBlock,
    props: &[u32],
    dest: &mut [T],
) -> PlyResult<()> {
    let width = extraction_width(block, props)?;
    let needed = block.count * width;
    if dest.len() < needed {
        return Err(PlyError::OutOfRange(format!(
            "destination holds {} values, {} required",
            dest.len(),
            needed
        )));
    }
    let mut plan = Vec::with_capacity(props.len());
    for &p in props {
        let field = field_at(block, p)?;
        plan.push(match field.shape {
            FieldShape::Scalar(kind) => PlanEntry {
                offset: field.offset,
                kind,
                len: 1,
            },
            FieldShape::FixedList { item, len, .. } => PlanEntry {
                offset: field.offset,
                kind: item,
                len,
            },
            // extraction_width already rejected these
            FieldShape::List { .. } => unreachable!(),
        });
    }
    let mut di = 0usize;
    for r in 0..block.count {
        let row = block.row(r);
        for entry in &plan {
            let size = entry.kind.size_bytes();
            for i in 0..entry.len {
                let at = entry.offset + i * size;
                dest[di] = convert(load_value(&row[at..at + size], entry.kind));
                di += 1;
            }
        }
    }
    Ok(())
}

/// Concatenates every row's payload of a variable-length list property into
/// `dest`, preserving row order.
pub(crate) fn extract_list_property<T: Scalar>(
    block: &RowBlock,
    prop: u32,
    dest: &mut [T],
) -> PlyResult<()> {
    let field = field_at(block, prop)?;
    let FieldShape::List { item, .. } = field.shape else {
        return Err(PlyError::ListProperty(format!(
            "property index {prop} is not a variable-length list"
        )));
    };
    let size = item.size_bytes();
    let mut di = 0usize;
    for r in 0..block.count {
        let (n, start) = block.list_slot(r, field);
        if dest.len() < di + n {
            return Err(PlyError::OutOfRange(format!(
                "destination holds {} values, more required",
                dest.len()
            )));
        }
        for i in 0..n {
            let at = start + i * size;
            dest[di] = convert(load_value(&block.list_data[at..at + size], item));
            di += 1;
        }
    }
    Ok(())
}

/// Sum of per-row counts of a list property; `None` for scalars or a bad
/// index.
pub(crate) fn sum_of_list_counts(block: &RowBlock, prop: u32) -> Option<u64> {
    let field = block.layout.fields.get(prop as usize)?;
    match field.shape {
        FieldShape::List { .. } => Some(
            (0..block.count)
                .map(|r| block.list_slot(r, field).0 as u64)
                .sum(),
        ),
        FieldShape::FixedList { len, .. } => Some(block.count as u64 * len as u64),
        FieldShape::Scalar(_) => None,
    }
}

/// True when any row of the list property holds more than three indices.
pub(crate) fn requires_triangulation(block: &RowBlock, prop: u32) -> Option<bool> {
    let field = block.layout.fields.get(prop as usize)?;
    match field.shape {
        FieldShape::List { .. } => {
            Some((0..block.count).any(|r| block.list_slot(r, field).0 > 3))
        }
        FieldShape::FixedList { len, .. } => Some(len > 3),
        FieldShape::Scalar(_) => None,
    }
}

/// Triangles a fan decomposition will produce: `max(0, count - 2)` per row.
pub(crate) fn num_triangles(block: &RowBlock, prop: u32) -> Option<u64> {
    let field = block.layout.fields.get(prop as usize)?;
    let per_row = |n: usize| n.saturating_sub(2) as u64;
    match field.shape {
        FieldShape::List { .. } => Some(
            (0..block.count)
                .map(|r| per_row(block.list_slot(r, field).0))
                .sum(),
        ),
        FieldShape::FixedList { len, .. } => Some(block.count as u64 * per_row(len)),
        FieldShape::Scalar(_) => None,
    }
}

/// The raw item bytes, item count and item kind of one row's list.
fn row_list<'a>(
    block: &'a RowBlock,
    field: &FieldLayout,
    r: usize,
) -> (&'a [u8], usize, ScalarType) {
    match field.shape {
        FieldShape::FixedList { item, len, .. } => {
            let size = item.size_bytes();
            (
                &block.row(r)[field.offset..field.offset + len * size],
                len,
                item,
            )
        }
        FieldShape::List { item, .. } => {
            let (n, start) = block.list_slot(r, field);
            (
                &block.list_data[start..start + n * item.size_bytes()],
                n,
                item,
            )
        }
        FieldShape::Scalar(_) => (&[], 0, ScalarType::UChar),
    }
}

/// Fan-triangulates every polygon of the index list property into `dest`.
///
/// Rows with fewer than three indices contribute nothing; triangles are
/// emitted as `3 * max(0, count - 2)` indices per row. Polygons with more
/// than three vertices pick the fan start whose smallest triangle (by 3D
/// area against `positions`) is largest, which avoids degenerate fans on
/// non-convex polygons. Ties resolve to the lowest start.
pub(crate) fn extract_triangles<T: Scalar>(
    block: &RowBlock,
    prop: u32,
    positions: &[f32],
    num_verts: usize,
    dest: &mut [T],
) -> PlyResult<()> {
    let field = field_at(block, prop)?;
    if matches!(field.shape, FieldShape::Scalar(_)) {
        return Err(PlyError::ListProperty(format!(
            "property index {prop} is not a list"
        )));
    }
    let mut poly = Vec::<usize>::new();
    let mut di = 0usize;
    for r in 0..block.count {
        let (bytes, n, item) = row_list(block, field, r);
        if n < 3 {
            continue;
        }
        let size = item.size_bytes();
        poly.clear();
        for i in 0..n {
            let idx = match load_value(&bytes[i * size..(i + 1) * size], item) {
                ScalarValue::Int(v) => v,
                ScalarValue::Float(v) => v as i64,
            };
            if idx < 0 || idx as u64 >= num_verts as u64 {
                return Err(PlyError::OutOfRange(format!(
                    "vertex index {idx} outside 0..{num_verts}"
                )));
            }
            poly.push(idx as usize);
        }
        let emitted = 3 * (n - 2);
        if dest.len() < di + emitted {
            return Err(PlyError::OutOfRange(format!(
                "destination holds {} values, more required",
                dest.len()
            )));
        }
        let k = if n == 3 { 0 } else { best_fan_start(&poly, positions) };
        for i in 1..n - 1 {
            dest[di] = T::from_int(poly[k] as i64);
            dest[di + 1] = T::from_int(poly[(k + i) % n] as i64);
            dest[di + 2] = T::from_int(poly[(k + i + 1) % n] as i64);
            di += 3;
        }
    }
    Ok(())
}

/// Tests every candidate fan start and keeps the one whose smallest triangle
/// area is largest, lowest start winning ties.
fn best_fan_start(poly: &[usize], positions: &[f32]) -> usize {
    let n = poly.len();
    let mut best_k = 0usize;
    let mut best_min = f64::NEG_INFINITY;
    for k in 0..n {
        let mut min_area = f64::INFINITY;
        for i in 1..n - 1 {
            let area = triangle_area(
                positions,
                poly[k],
                poly[(k + i) % n],
                poly[(k + i + 1) % n],
            );
            if area < min_area {
                min_area = area;
            }
        }
        if min_area > best_min {
            best_min = min_area;
            best_k = k;
        }
    }
    best_k
}

/// Half the magnitude of the cross product of two triangle edges, in 3D.
fn triangle_area(positions: &[f32], a: usize, b: usize, c: usize) -> f64 {
    let p = |i: usize| {
        [
            positions[3 * i] as f64,
            positions[3 * i + 1] as f64,
            positions[3 * i + 2] as f64,
        ]
    };
    let (pa, pb, pc) = (p(a), p(b), p(c));
    let u = [pb[0] - pa[0], pb[1] - pa[1], pb[2] - pa[2]];
    let v = [pc[0] - pa[0], pc[1] - pa[1], pc[2] - pa[2]];
    let cx = u[1] * v[2] - u[2] * v[1];
    let cy = u[2] * v[0] - u[0] * v[2];
    let cz = u[0] * v[1] - u[1] * v[0];
    0.5 * (cx * cx + cy * cy + cz * cz).sqrt()
}
