//! Schema types describing a PLY file.
//!
//! The PLY format is inherently dynamic: elements and properties are declared
//! in the header, and the body follows that declaration exactly. This module
//! holds the declaration model ([`Header`], [`ElementDef`], [`PropertyDef`],
//! [`ScalarType`]) and the [`KeyMap`] alias used to keep declarations ordered
//! while allowing name lookup.

mod property;
mod schema;

pub use self::property::{PropertyDef, PropertyType, ScalarType};
pub use self::schema::{Comment, ElementDef, Encoding, Header, ObjInfo, Version};

use indexmap::IndexMap;

/// Ordered name-to-definition map; alias to reduce coupling with the map
/// implementation. Iteration order is insertion order, which for schema maps
/// is header declaration order.
///
/// Definitions are keyed by their own `name` field; the header parser checks
/// for duplicates before inserting, so a key never shadows an earlier one.
pub type KeyMap<V> = IndexMap<String, V>;
