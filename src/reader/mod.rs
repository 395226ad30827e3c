//! The streaming reader facade.
//!
//! [`PlyReader`] parses the header eagerly, then walks the body as a cursor
//! over the declared elements. Only elements the caller loads are ever
//! materialized; everything else is skipped, byte-exactly for list-free
//! binary elements and by scanning rows otherwise.
//!
//! Body-phase errors latch: the failing call returns `false` (or an empty
//! value), [`PlyReader::valid`] turns false, and every later call
//! short-circuits. The latched error stays available through
//! [`PlyReader::error`].

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::errors::{PlyError, PlyResult};
use crate::parser;
use crate::ply::{Comment, ElementDef, Encoding, Header, ObjInfo, PropertyType, ScalarType, Version};
use crate::source::ByteSource;
use crate::INVALID_INDEX;

pub(crate) mod extract;
pub(crate) mod row;

pub use self::extract::Scalar;

use self::row::RowBlock;

/// A forward-only reader over one PLY file.
///
/// The reader holds the schema, the byte source and at most one decoded
/// element (the "loaded block"). Elements are visited strictly in declaration
/// order: inspect the current element, optionally [`load_element`], extract
/// what you need, then [`next_element`].
///
/// [`load_element`]: PlyReader::load_element
/// [`next_element`]: PlyReader::next_element
#[derive(Debug)]
pub struct PlyReader<R> {
    source: ByteSource<R>,
    header: Header,
    cursor: usize,
    block: Option<RowBlock>,
    failure: Option<PlyError>,
}

impl PlyReader<File> {
    /// Opens the file at `path` and parses the header eagerly.
    pub fn open<P: AsRef<Path>>(path: P) -> PlyResult<Self> {
        Self::new(File::open(path)?)
    }
}

impl<R: Read> PlyReader<R> {
    /// Wraps any byte stream and parses the header eagerly.
    ///
    /// On success the reader sits on the first declared element with nothing
    /// loaded; header errors surface here as `Err`.
    pub fn new(reader: R) -> PlyResult<Self> {
        let mut source = ByteSource::new(reader);
        let header = parser::read_header(&mut source)?;
        Ok(PlyReader {
            source,
            header,
            cursor: 0,
            block: None,
            failure: None,
        })
    }

    /// The parsed header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The body encoding declared by the format line.
    pub fn encoding(&self) -> Encoding {
        self.header.encoding
    }

    /// The format version; always 1.0.
    pub fn version(&self) -> Version {
        self.header.version
    }

    /// Comment lines, in header order.
    pub fn comments(&self) -> &[Comment] {
        &self.header.comments
    }

    /// `obj_info` lines, in header order.
    pub fn obj_infos(&self) -> &[ObjInfo] {
        &self.header.obj_infos
    }

    /// Absolute byte offset the reader has consumed from the stream.
    ///
    /// Right after construction this is the offset of the first body byte.
    pub fn position(&self) -> u64 {
        self.source.position()
    }

    /// False once any body-phase error has been latched.
    pub fn valid(&self) -> bool {
        self.failure.is_none()
    }

    /// The latched error, if any.
    pub fn error(&self) -> Option<&PlyError> {
        self.failure.as_ref()
    }

    /// Number of elements the header declares.
    pub fn element_count(&self) -> usize {
        self.header.elements.len()
    }

    /// Index of the element the cursor currently sits on.
    pub fn current_element_index(&self) -> usize {
        self.cursor
    }

    /// True while the cursor sits on an element (and no error is latched).
    pub fn has_element(&self) -> bool {
        self.valid() && self.cursor < self.element_count()
    }

    /// The element the cursor sits on.
    pub fn element(&self) -> Option<&ElementDef> {
        if !self.valid() {
            return None;
        }
        self.header.elements.get_index(self.cursor).map(|(_, e)| e)
    }

    /// True when the current element carries `name`.
    pub fn element_is(&self, name: &str) -> bool {
        self.element().is_some_and(|e| e.name == name)
    }

    /// Schema lookup by element index; does not move the cursor.
    pub fn get_element(&self, index: usize) -> Option<&ElementDef> {
        self.header.elements.get_index(index).map(|(_, e)| e)
    }

    /// Schema lookup by element name; does not move the cursor.
    pub fn find_element(&self, name: &str) -> Option<usize> {
        self.header.elements.get_index_of(name)
    }

    /// True when the current element's rows are materialized.
    pub fn element_is_loaded(&self) -> bool {
        self.block.is_some()
    }

    /// Decodes all rows of the current element into memory.
    ///
    /// Loading twice is a no-op. On a decode error the reader latches and
    /// no partial data is retained.
    pub fn load_element(&mut self) -> bool {
        if !self.has_element() {
            return false;
        }
        if self.block.is_some() {
            return true;
        }
        let Some((_, element)) = self.header.elements.get_index(self.cursor) else {
            return false;
        };
        match row::decode_element(&mut self.source, self.header.encoding, element) {
            Ok(block) => {
                self.block = Some(block);
                true
            }
            Err(e) => {
                self.failure = Some(e);
                false
            }
        }
    }

    /// Discards the current element and advances to the next.
    ///
    /// If the element was never loaded its rows are skipped in the stream:
    /// one byte-exact skip for list-free binary elements, a row scan
    /// otherwise. Returns false past the last element or once invalid.
    pub fn next_element(&mut self) -> bool {
        if !self.has_element() {
            return false;
        }
        if self.block.take().is_some() {
            self.cursor += 1;
            return true;
        }
        let Some((_, element)) = self.header.elements.get_index(self.cursor) else {
            return false;
        };
        match row::skip_element(&mut self.source, self.header.encoding, element) {
            Ok(()) => {
                self.cursor += 1;
                true
            }
            Err(e) => {
                self.failure = Some(e);
                false
            }
        }
    }

    /// Declares that a list property of the current element always holds
    /// exactly `n` items.
    ///
    /// Afterwards the property decodes like `n` scalars (every row's count
    /// is still validated against `n`, failing the load with a bad-list
    /// error on mismatch) and becomes extractable through
    /// [`extract_properties`](PlyReader::extract_properties). Must be called
    /// before the element is loaded; returns false for non-lists, `n == 0`,
    /// an `n` the declared count type cannot carry, or an already loaded
    /// element.
    pub fn convert_list_to_fixed(&mut self, prop: u32, n: usize) -> bool {
        if !self.has_element() || self.block.is_some() || n == 0 {
            return false;
        }
        let cursor = self.cursor;
        let Some((_, element)) = self.header.elements.get_index_mut(cursor) else {
            return false;
        };
        let Some((_, def)) = element.properties.get_index_mut(prop as usize) else {
            return false;
        };
        match def.data_type {
            PropertyType::List(count, item) => {
                if n as u64 > max_list_count(count) {
                    return false;
                }
                def.data_type = PropertyType::FixedList(count, item, n);
                true
            }
            _ => false,
        }
    }

    /// Index of the current element's property called `name`, or
    /// [`INVALID_INDEX`].
    pub fn find_property(&self, name: &str) -> u32 {
        self.element()
            .and_then(|e| e.properties.get_index_of(name))
            .map_or(INVALID_INDEX, |i| i as u32)
    }

    fn find_names<const N: usize>(&self, names: [&str; N]) -> Option<[u32; N]> {
        let mut out = [0u32; N];
        for (slot, name) in out.iter_mut().zip(names) {
            let idx = self.find_property(name);
            if idx == INVALID_INDEX {
                return None;
            }
            *slot = idx;
        }
        Some(out)
    }

    /// Property indices of `x`, `y`, `z` on the current element.
    pub fn find_pos(&self) -> Option<[u32; 3]> {
        self.find_names(["x", "y", "z"])
    }

    /// Property indices of `nx`, `ny`, `nz` on the current element.
    pub fn find_normal(&self) -> Option<[u32; 3]> {
        self.find_names(["nx", "ny", "nz"])
    }

    /// Property indices of the first texture coordinate pair among
    /// `(u, v)`, `(s, t)`, `(texture_u, texture_v)`, `(texture_s, texture_t)`.
    pub fn find_texcoord(&self) -> Option<[u32; 2]> {
        [
            ["u", "v"],
            ["s", "t"],
            ["texture_u", "texture_v"],
            ["texture_s", "texture_t"],
        ]
        .into_iter()
        .find_map(|pair| self.find_names(pair))
    }

    /// Property indices of `red`, `green`, `blue` on the current element.
    pub fn find_color(&self) -> Option<[u32; 3]> {
        self.find_names(["red", "green", "blue"])
    }

    /// Like [`find_color`](PlyReader::find_color) but also requiring `alpha`.
    pub fn find_color_rgba(&self) -> Option<[u32; 4]> {
        self.find_names(["red", "green", "blue", "alpha"])
    }

    /// The current element's polygon index list: a list property called
    /// `vertex_indices`, or failing that `vertex_index`.
    pub fn find_indices(&self) -> Option<u32> {
        let element = self.element()?;
        for name in ["vertex_indices", "vertex_index"] {
            if let Some((i, _, def)) = element.properties.get_full(name) {
                if !matches!(def.data_type, PropertyType::Scalar(_)) {
                    return Some(i as u32);
                }
            }
        }
        None
    }

    /// Copies the selected fixed-size properties of the loaded element into
    /// `dest`, row-major, converting each value to `T`.
    ///
    /// Each scalar property contributes one value per row, a
    /// fixed-size-converted list contributes its item count. Requires a
    /// loaded element and a large enough `dest`; selecting a variable-length
    /// list latches a list-property error.
    pub fn extract_properties<T: Scalar>(&mut self, props: &[u32], dest: &mut [T]) -> bool {
        if !self.valid() {
            return false;
        }
        let Some(block) = self.block.as_ref() else {
            return false;
        };
        match extract::extract_properties(block, props, dest) {
            Ok(()) => true,
            Err(e) => {
                self.failure = Some(e);
                false
            }
        }
    }

    /// Concatenates every row's payload of the list property `prop` into
    /// `dest`, preserving row order. Size `dest` with
    /// [`sum_of_list_counts`](PlyReader::sum_of_list_counts).
    pub fn extract_list_property<T: Scalar>(&mut self, prop: u32, dest: &mut [T]) -> bool {
        if !self.valid() {
            return false;
        }
        let Some(block) = self.block.as_ref() else {
            return false;
        };
        match extract::extract_list_property(block, prop, dest) {
            Ok(()) => true,
            Err(e) => {
                self.failure = Some(e);
                false
            }
        }
    }

    /// Sum of per-row list counts of `prop` over the loaded element; `None`
    /// for scalars or when nothing is loaded.
    pub fn sum_of_list_counts(&self, prop: u32) -> Option<u64> {
        if !self.valid() {
            return None;
        }
        extract::sum_of_list_counts(self.block.as_ref()?, prop)
    }

    /// True when any row of the list property holds more than three indices.
    pub fn requires_triangulation(&self, prop: u32) -> bool {
        self.valid()
            && self
                .block
                .as_ref()
                .and_then(|b| extract::requires_triangulation(b, prop))
                .unwrap_or(false)
    }

    /// Triangles fan decomposition will produce for `prop`:
    /// `max(0, count - 2)` summed over rows.
    pub fn num_triangles(&self, prop: u32) -> u64 {
        if !self.valid() {
            return 0;
        }
        self.block
            .as_ref()
            .and_then(|b| extract::num_triangles(b, prop))
            .unwrap_or(0)
    }

    /// Fan-triangulates every polygon of the index list `prop` into `dest`,
    /// writing `3 * num_triangles` indices.
    ///
    /// `positions` holds `num_verts` tightly packed xyz triples; polygon
    /// indices must lie in `[0, num_verts)` or the reader latches an
    /// out-of-range error. Polygons with more than three vertices pick the
    /// fan start whose smallest triangle area is largest, so non-convex
    /// quads never produce a degenerate fan.
    pub fn extract_triangles<T: Scalar>(
        &mut self,
        prop: u32,
        positions: &[f32],
        num_verts: usize,
        dest: &mut [T],
    ) -> bool {
        if !self.valid() || positions.len() < 3 * num_verts {
            return false;
        }
        let Some(block) = self.block.as_ref() else {
            return false;
        };
        match extract::extract_triangles(block, prop, positions, num_verts, dest) {
            Ok(()) => true,
            Err(e) => {
                self.failure = Some(e);
                false
            }
        }
    }
}

/// Largest count the wire representation of `kind` can carry.
fn max_list_count(kind: ScalarType) -> u64 {
    match (kind.size_bytes(), kind.is_signed()) {
        (1, true) => i8::MAX as u64,
        (1, false) => u8::MAX as u64,
        (2, true) => i16::MAX as u64,
        (2, false) => u16::MAX as u64,
        (4, true) => i32::MAX as u64,
        _ => u32::MAX as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(bytes: &[u8]) -> PlyReader<Cursor<Vec<u8>>> {
        PlyReader::new(Cursor::new(bytes.to_vec())).expect("header should parse")
    }

    const TWO_ELEMENTS: &[u8] = b"ply\n\
format ascii 1.0\n\
element vertex 2\n\
property float x\n\
property float y\n\
property float z\n\
element face 1\n\
property list uchar int vertex_indices\n\
end_header\n\
0 0 0\n\
1 1 1\n\
3 0 1 0\n";

    #[test]
    fn cursor_walks_elements_in_order() {
        let mut r = reader(TWO_ELEMENTS);
        assert_eq!(r.element_count(), 2);
        assert!(r.has_element());
        assert!(r.element_is("vertex"));
        assert!(r.next_element());
        assert!(r.element_is("face"));
        assert!(r.next_element());
        assert!(!r.has_element());
        assert!(!r.next_element());
        assert!(r.valid());
    }

    #[test]
    fn schema_queries_do_not_move_the_cursor() {
        let r = reader(TWO_ELEMENTS);
        assert_eq!(r.find_element("face"), Some(1));
        assert_eq!(r.get_element(1).unwrap().name, "face");
        assert_eq!(r.current_element_index(), 0);
        assert!(r.element_is("vertex"));
    }

    #[test]
    fn load_is_idempotent() {
        let mut r = reader(TWO_ELEMENTS);
        assert!(r.load_element());
        assert!(r.load_element());
        let mut pos = [0f32; 6];
        assert!(r.extract_properties(&[0, 1, 2], &mut pos));
        assert_eq!(pos, [0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn extraction_without_load_returns_false() {
        let mut r = reader(TWO_ELEMENTS);
        let mut pos = [0f32; 6];
        assert!(!r.extract_properties(&[0, 1, 2], &mut pos));
        // Not an error, just nothing loaded.
        assert!(r.valid());
    }

    #[test]
    fn errors_latch_and_short_circuit() {
        // The face row claims 9 indices but carries 2.
        let mut r = reader(
            b"ply\nformat ascii 1.0\n\
element face 1\nproperty list uchar int vertex_indices\n\
end_header\n9 0 1\n",
        );
        assert!(!r.load_element());
        assert!(!r.valid());
        assert!(matches!(r.error(), Some(PlyError::UnexpectedEof(_))));
        assert!(!r.has_element());
        assert!(!r.next_element());
        assert!(!r.load_element());
        assert!(r.element().is_none());
    }

    #[test]
    fn finders_on_the_current_element() {
        let r = reader(
            b"ply\nformat ascii 1.0\n\
element vertex 1\n\
property float x\nproperty float y\nproperty float z\n\
property float nx\nproperty float ny\nproperty float nz\n\
property uchar red\nproperty uchar green\nproperty uchar blue\n\
property float s\nproperty float t\n\
end_header\n\
0 0 0 0 0 1 255 0 0 0.5 0.5\n",
        );
        assert_eq!(r.find_pos(), Some([0, 1, 2]));
        assert_eq!(r.find_normal(), Some([3, 4, 5]));
        assert_eq!(r.find_color(), Some([6, 7, 8]));
        assert_eq!(r.find_color_rgba(), None);
        assert_eq!(r.find_texcoord(), Some([9, 10]));
        assert_eq!(r.find_property("red"), 6);
        assert_eq!(r.find_property("missing"), crate::INVALID_INDEX);
    }

    #[test]
    fn find_indices_requires_a_list() {
        let r = reader(
            b"ply\nformat ascii 1.0\n\
element face 1\nproperty int vertex_indices\n\
end_header\n7\n",
        );
        assert_eq!(r.find_indices(), None);

        let r = reader(TWO_ELEMENTS);
        assert_eq!(r.find_indices(), None); // vertex element has no index list
    }

    #[test]
    fn convert_list_to_fixed_rewrites_the_schema() {
        let mut r = reader(TWO_ELEMENTS);
        assert!(r.next_element());
        assert!(!r.convert_list_to_fixed(0, 0));
        // The uchar count prefix cannot carry 300.
        assert!(!r.convert_list_to_fixed(0, 300));
        assert!(r.convert_list_to_fixed(0, 3));

        let def = &r.element().unwrap().properties["vertex_indices"];
        assert_eq!(
            def.data_type,
            PropertyType::FixedList(crate::ply::ScalarType::UChar, crate::ply::ScalarType::Int, 3)
        );
        // Second conversion fails: no longer a variable-length list.
        assert!(!r.convert_list_to_fixed(0, 3));
    }
}
