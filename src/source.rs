//! Buffered byte window over the input stream.
//!
//! [`ByteSource`] owns the single I/O buffer of a reader. The header parser
//! consumes it line by line, ASCII bodies token by token, and binary bodies
//! through the [`std::io::Read`] impl (which lets `byteorder` drive scalar
//! decoding directly). After `end_header` the source is positioned exactly at
//! the first body byte, so no re-synchronization is ever needed.

use std::io;
use std::io::Read;

use crate::errors::{PlyError, PlyResult};
use crate::util::{is_ply_whitespace, trim_cr};

/// Size of the I/O window. Header lines and body tokens must fit in it.
pub(crate) const SOURCE_BUF_SIZE: usize = 64 * 1024;

/// A buffered window over `R` with refill-on-underflow.
///
/// Valid bytes live in `buf[start..end]`. When a line or token would cross
/// the end of the window, the unconsumed tail is moved to the front and the
/// rest of the window is refilled from `R`.
#[derive(Debug)]
pub(crate) struct ByteSource<R> {
    inner: R,
    buf: Box<[u8]>,
    start: usize,
    end: usize,
    /// The inner reader reported end of stream.
    hit_end: bool,
    /// Absolute offset of `buf[start]` in the stream.
    position: u64,
}

impl<R: Read> ByteSource<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self::with_capacity(inner, SOURCE_BUF_SIZE)
    }

    /// Smaller capacities are used by tests to force refills on short input.
    pub(crate) fn with_capacity(inner: R, capacity: usize) -> Self {
        ByteSource {
            inner,
            buf: vec![0u8; capacity].into_boxed_slice(),
            start: 0,
            end: 0,
            hit_end: false,
            position: 0,
        }
    }

    /// Absolute offset of the next unconsumed byte.
    pub(crate) fn position(&self) -> u64 {
        self.position
    }

    #[inline]
    fn available(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.available());
        self.start += n;
        self.position += n as u64;
    }

    /// Moves the unconsumed tail to the front and fills the rest of the
    /// window. Returns the number of new bytes (0 only at end of stream).
    fn refill(&mut self) -> io::Result<usize> {
        if self.start > 0 {
            self.buf.copy_within(self.start..self.end, 0);
            self.end -= self.start;
            self.start = 0;
        }
        let mut added = 0;
        while self.end < self.buf.len() {
            match self.inner.read(&mut self.buf[self.end..]) {
                Ok(0) => {
                    self.hit_end = true;
                    break;
                }
                Ok(n) => {
                    self.end += n;
                    added += n;
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(added)
    }

    /// Returns the next byte without consuming it, or `None` at end of stream.
    pub(crate) fn peek(&mut self) -> io::Result<Option<u8>> {
        if self.available() == 0 {
            if self.hit_end {
                return Ok(None);
            }
            self.refill()?;
            if self.available() == 0 {
                return Ok(None);
            }
        }
        Ok(Some(self.buf[self.start]))
    }

    /// Reads exactly `out.len()` bytes, draining the window first and then
    /// pulling the remainder straight from the inner reader.
    pub(crate) fn read_exact_into(&mut self, out: &mut [u8]) -> PlyResult<()> {
        let buffered = self.available().min(out.len());
        out[..buffered].copy_from_slice(&self.buf[self.start..self.start + buffered]);
        self.consume(buffered);
        let rest = &mut out[buffered..];
        if !rest.is_empty() {
            self.inner
                .read_exact(rest)
                .map_err(|e| PlyError::from_io(e, "body data ended early"))?;
            self.position += rest.len() as u64;
        }
        Ok(())
    }

    /// Discards exactly `n` bytes of the stream.
    pub(crate) fn skip_bytes(&mut self, n: u64) -> PlyResult<()> {
        let buffered = (self.available() as u64).min(n);
        self.consume(buffered as usize);
        let rest = n - buffered;
        if rest > 0 {
            let skipped = io::copy(&mut (&mut self.inner).take(rest), &mut io::sink())?;
            self.position += skipped;
            if skipped < rest {
                self.hit_end = true;
                return Err(PlyError::UnexpectedEof(format!(
                    "could not skip {rest} body bytes"
                )));
            }
        }
        Ok(())
    }

    /// Reads one ASCII header line, stripping the `\n` terminator and any
    /// trailing `\r`. Returns `None` at a clean end of stream. Lines longer
    /// than the window fail with `MalformedHeader`.
    pub(crate) fn read_line(&mut self) -> PlyResult<Option<&str>> {
        let newline = loop {
            if let Some(pos) = memchr_newline(&self.buf[self.start..self.end]) {
                break Some(pos);
            }
            if self.hit_end {
                break None;
            }
            if self.available() == self.buf.len() {
                return Err(PlyError::MalformedHeader(format!(
                    "header line exceeds {} bytes",
                    self.buf.len()
                )));
            }
            self.refill()?;
        };
        let (line_len, consumed) = match newline {
            Some(pos) => (pos, pos + 1),
            None if self.available() > 0 => (self.available(), self.available()),
            None => return Ok(None),
        };
        // Advance the cursor before handing out the borrow; the bytes stay
        // valid until the next refill.
        let line_start = self.start;
        self.consume(consumed);
        let raw = &self.buf[line_start..line_start + line_len];
        let line = std::str::from_utf8(trim_cr(raw))
            .map_err(|_| PlyError::MalformedHeader("header line is not valid ASCII".to_string()))?;
        Ok(Some(line))
    }

    /// Consumes ASCII whitespace (spaces, tabs, line breaks), stopping at the
    /// next token byte or end of stream.
    pub(crate) fn skip_whitespace(&mut self) -> io::Result<()> {
        while let Some(b) = self.peek()? {
            if !is_ply_whitespace(b) {
                break;
            }
            self.consume(1);
        }
        Ok(())
    }

    /// Reads one whitespace-separated ASCII token. Tokens may be separated by
    /// line breaks; a token cannot be larger than the window.
    pub(crate) fn read_token(&mut self) -> PlyResult<&str> {
        self.skip_whitespace()?;
        let token_len = loop {
            if let Some(pos) = self.buf[self.start..self.end]
                .iter()
                .position(|&b| is_ply_whitespace(b))
            {
                break pos;
            }
            if self.hit_end {
                break self.available();
            }
            if self.available() == self.buf.len() {
                return Err(PlyError::NumericParse(format!(
                    "token exceeds {} bytes",
                    self.buf.len()
                )));
            }
            self.refill()?;
        };
        if token_len == 0 {
            return Err(PlyError::UnexpectedEof(
                "expected another value token".to_string(),
            ));
        }
        let token_start = self.start;
        self.consume(token_len);
        let raw = &self.buf[token_start..token_start + token_len];
        let token = std::str::from_utf8(raw)
            .map_err(|_| PlyError::NumericParse("token is not valid ASCII".to_string()))?;
        Ok(token)
    }

    /// Discards `n` whitespace-separated tokens.
    pub(crate) fn skip_tokens(&mut self, n: usize) -> PlyResult<()> {
        for _ in 0..n {
            self.read_token()?;
        }
        Ok(())
    }
}

/// Finds the first `\n` in `haystack`.
#[inline]
fn memchr_newline(haystack: &[u8]) -> Option<usize> {
    haystack.iter().position(|&b| b == b'\n')
}

impl<R: Read> Read for ByteSource<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.available() == 0 {
            if out.len() >= self.buf.len() {
                // Large read with an empty window: bypass the buffer.
                let n = self.inner.read(out)?;
                self.position += n as u64;
                return Ok(n);
            }
            if self.hit_end {
                return Ok(0);
            }
            self.refill()?;
        }
        let n = self.available().min(out.len());
        out[..n].copy_from_slice(&self.buf[self.start..self.start + n]);
        self.consume(n);
        Ok(n)
    }
}
