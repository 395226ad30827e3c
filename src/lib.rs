//! Streaming reader for ascii and binary PLY files.
//!
//! This library reads the Stanford PLY polygon format with two goals:
//!
//! - Pay only for what you ask: elements are visited as a forward cursor and
//!   only the ones you load are ever decoded, so pulling the vertex table out
//!   of a multi-gigabyte scan does not touch the rest of the file.
//! - One logical model for all three encodings: ascii, binary little endian
//!   and binary big endian decode into the same native row representation,
//!   and extraction converts to whatever scalar type your buffers use.
//!
//! Reading a mesh looks like this:
//!
//! ```rust
//! use ply_scan::PlyReader;
//!
//! let data = b"ply\n\
//! format ascii 1.0\n\
//! element vertex 3\n\
//! property float x\n\
//! property float y\n\
//! property float z\n\
//! end_header\n\
//! 0 0 0\n\
//! 1 0 0\n\
//! 0 1 0\n";
//!
//! let mut reader = PlyReader::new(std::io::Cursor::new(&data[..]))?;
//! assert!(reader.element_is(ply_scan::ELEMENT_VERTEX));
//! let pos = reader.find_pos().expect("vertex should carry x/y/z");
//! assert!(reader.load_element());
//!
//! let count = reader.element().map(|e| e.count).unwrap_or(0);
//! let mut xyz = vec![0.0f32; 3 * count];
//! assert!(reader.extract_properties(&pos, &mut xyz));
//! assert_eq!(&xyz[3..6], &[1.0, 0.0, 0.0]);
//! # Ok::<(), ply_scan::PlyError>(())
//! ```
//!
//! Polygonal faces can be pulled out as triangles with
//! [`PlyReader::extract_triangles`], or pinned to a fixed arity with
//! [`PlyReader::convert_list_to_fixed`] when you already know every face is
//! a triangle.

pub mod errors;
pub mod ply;
pub mod reader;

mod parser;
mod source;
mod util;

pub use errors::{PlyError, PlyResult};
pub use reader::{PlyReader, Scalar};

/// Name of the conventional vertex element.
pub const ELEMENT_VERTEX: &str = "vertex";
/// Name of the conventional face element.
pub const ELEMENT_FACE: &str = "face";
/// Sentinel property index returned when a name lookup fails.
pub const INVALID_INDEX: u32 = u32::MAX;

#[cfg(doctest)]
doc_comment::doctest!("../README.md");
