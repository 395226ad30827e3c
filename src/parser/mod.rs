//! Header parsing.
//!
//! The header is line-oriented ASCII. Each line is read through the
//! [`ByteSource`] and classified by the peg grammar in [`ply_grammar`]; this
//! module assembles and validates the resulting schema. After a successful
//! parse the source sits exactly on the first body byte.

use std::fmt::Debug;
use std::io::Read;

use crate::errors::{PlyError, PlyResult};
use crate::ply::{Comment, ElementDef, Encoding, Header, KeyMap, ObjInfo, PropertyDef, PropertyType, Version};
use crate::source::ByteSource;

mod ply_grammar;

pub(crate) use self::ply_grammar::grammar;
pub(crate) use self::ply_grammar::Line;

fn header_rethrow<T, E: Debug>(
    line_no: usize,
    line_str: &str,
    e: E,
    message: &str,
) -> PlyResult<T> {
    Err(PlyError::MalformedHeader(format!(
        "line {line_no}: {message}\n\tString: '{line_str}'\n\tError: {e:?}"
    )))
}

fn header_error<T>(line_no: usize, line_str: &str, message: &str) -> PlyResult<T> {
    Err(PlyError::MalformedHeader(format!(
        "line {line_no}: {message}\n\tString: '{line_str}'"
    )))
}

/// Reads header lines until and including `end_header`.
///
/// A PLY file starts with a line `ply`, followed by a `format` line and the
/// element/property declarations. Validation beyond the line grammar happens
/// here: exactly one format line, version 1.0, unique element and property
/// names, properties only inside an element block, and integer list counts.
pub(crate) fn read_header<R: Read>(source: &mut ByteSource<R>) -> PlyResult<Header> {
    let mut line_no = 1usize;

    let first = match source.read_line()? {
        Some(line) => line,
        None => {
            return Err(PlyError::UnexpectedEof(
                "file ended before the magic number".to_string(),
            ))
        }
    };
    match grammar::line(first) {
        Ok(Line::MagicNumber) => (),
        Ok(l) => {
            let msg = format!("expected magic number 'ply', but saw '{:?}'", l);
            return header_error(line_no, first, &msg);
        }
        Err(e) => return header_rethrow(line_no, first, e, "expected magic number 'ply'"),
    }

    let mut form_ver: Option<(Encoding, Version)> = None;
    let mut obj_infos = Vec::<ObjInfo>::new();
    let mut elements = KeyMap::<ElementDef>::new();
    let mut comments = Vec::<Comment>::new();
    loop {
        line_no += 1;
        let line_str = match source.read_line()? {
            Some(line) => line,
            None => {
                return Err(PlyError::UnexpectedEof(format!(
                    "line {line_no}: header ended without 'end_header'"
                )))
            }
        };

        match grammar::line(line_str) {
            Err(e) => return header_rethrow(line_no, line_str, e, "couldn't parse line"),
            Ok(Line::MagicNumber) => {
                return header_error(line_no, line_str, "unexpected 'ply' found")
            }
            Ok(Line::Format((encoding, version))) => {
                let version = match version {
                    Some(v) => v,
                    None => return header_error(line_no, line_str, "invalid version"),
                };
                if version != (Version { major: 1, minor: 0 }) {
                    return Err(PlyError::UnsupportedVersion(format!(
                        "only PLY 1.0 is supported, found {version}"
                    )));
                }
                if let Some((prev_enc, prev_ver)) = form_ver {
                    if prev_enc != encoding || prev_ver != version {
                        return header_error(
                            line_no,
                            line_str,
                            "found contradicting format definition",
                        );
                    }
                } else {
                    form_ver = Some((encoding, version));
                }
            }
            Ok(Line::ObjInfo(o)) => obj_infos.push(o),
            Ok(Line::Comment(c)) => comments.push(c),
            Ok(Line::Element(e)) => match e {
                Some(e) => {
                    if elements.contains_key(&e.name) {
                        let msg = format!("duplicate element '{}'", e.name);
                        return header_error(line_no, line_str, &msg);
                    }
                    elements.insert(e.name.clone(), e);
                }
                None => return header_error(line_no, line_str, "invalid element count"),
            },
            Ok(Line::Property(p)) => match elements.values_mut().next_back() {
                None => {
                    let msg = format!("property '{}' found without preceding element", p.name);
                    return header_error(line_no, line_str, &msg);
                }
                Some(element) => {
                    validate_property(&p, line_no, line_str)?;
                    if element.properties.contains_key(&p.name) {
                        let msg = format!(
                            "duplicate property '{}' in element '{}'",
                            p.name, element.name
                        );
                        return header_error(line_no, line_str, &msg);
                    }
                    element.properties.insert(p.name.clone(), p);
                }
            },
            Ok(Line::EndHeader) => break,
        }
    }

    let (encoding, version) = match form_ver {
        Some(fv) => fv,
        None => {
            return Err(PlyError::MalformedHeader(
                "no format line found".to_string(),
            ))
        }
    };

    Ok(Header {
        encoding,
        version,
        obj_infos,
        comments,
        elements,
    })
}

fn validate_property(p: &PropertyDef, line_no: usize, line_str: &str) -> PlyResult<()> {
    if let PropertyType::List(count_type, _) = p.data_type {
        if count_type.is_float() {
            let msg = format!(
                "list '{}' declares '{count_type}' as its count type",
                p.name
            );
            return header_error(line_no, line_str, &msg);
        }
    }
    Ok(())
}
