use thiserror::Error;

/// Errors that can occur while reading a PLY file.
///
/// Once the body is being read, the first error of any kind is latched by
/// [`PlyReader`](crate::reader::PlyReader) and further operations on that
/// reader short-circuit. See [`PlyReader::error`](crate::reader::PlyReader::error).
#[derive(Debug, Error)]
pub enum PlyError {
    /// An I/O error occurred on the underlying stream.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The stream ended before a required read could be satisfied.
    #[error("unexpected end of file: {0}")]
    UnexpectedEof(String),
    /// The header violates the PLY grammar or declares an inconsistent schema.
    #[error("malformed header: {0}")]
    MalformedHeader(String),
    /// The format line declares a version other than 1.0.
    #[error("unsupported PLY version: {0}")]
    UnsupportedVersion(String),
    /// A list count was negative, absurdly large, or violated a fixed-size
    /// list conversion.
    #[error("bad list length: {0}")]
    BadListLength(String),
    /// An ASCII token could not be parsed as a number of the declared type.
    #[error("invalid number: {0}")]
    NumericParse(String),
    /// A scalar-only operation was invoked on a variable-length list property.
    #[error("list property: {0}")]
    ListProperty(String),
    /// A polygon referenced a vertex index outside the caller's position array.
    #[error("index out of range: {0}")]
    OutOfRange(String),
}

/// A specialized `Result` type for PLY operations.
pub type PlyResult<T> = Result<T, PlyError>;

impl PlyError {
    /// Maps `io::ErrorKind::UnexpectedEof` onto [`PlyError::UnexpectedEof`],
    /// keeping other I/O failures as [`PlyError::Io`].
    pub(crate) fn from_io(e: std::io::Error, what: &str) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            PlyError::UnexpectedEof(what.to_string())
        } else {
            PlyError::Io(e)
        }
    }
}
