//! Incremental decoder for the head of an HTTP/1.x message
//!
//! The head is the first line plus the header block. Both requests and responses go through
//! the same decoder: the first token of the first line decides which one it is.
//!
//! The decoder consumes the input one complete CRLF-terminated line at a time, and only after
//! the line parsed. A line whose terminator has not arrived yet, or that was rejected, is left
//! in the buffer untouched. The decoder remembers how far it already searched so the same
//! bytes are not scanned twice.
//!
//! A head may take at most [`MAX_HEAD_BYTES`] bytes and hold at most [`MAX_HEADER_NUM`]
//! distinct fields.
//!
//! # Grammar
//!
//! - first line, response: `HTTP/x.y SP status [SP reason]`
//! - first line, request: `method SP path SP version`
//! - header line: `name ":" OWS value`
//! - continuation line: starts with SP or HT, appended verbatim to the previous value
//! - an empty line ends the head

use std::mem;

use bytes::{Buf, BytesMut};
use http::{Method, StatusCode};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{HeaderFields, ParseError, RequestLine, StartLine, StatusLine, latin1, parse_version};

const CRLF: &[u8] = b"\r\n";

/// Upper bound on the size of a whole head, first line and terminating empty line included
pub const MAX_HEAD_BYTES: usize = 64 * 1024;

/// Upper bound on the number of distinct header fields in one head
pub const MAX_HEADER_NUM: usize = 128;

/// Decoder for the first line and header block of a message.
#[derive(Debug, Default)]
pub struct HeaderDecoder {
    state: HeadState,
    /// bytes of the current line already searched for CRLF
    scanned: usize,
    /// bytes of the current head consumed so far
    consumed: usize,
}

#[derive(Debug, Default)]
enum HeadState {
    /// Waiting for the request line or status line
    #[default]
    FirstLine,
    /// Reading header lines until the empty line
    Fields {
        start_line: StartLine,
        headers: HeaderFields,
        /// index of the field a continuation line extends
        last_field: Option<usize>,
    },
}

impl HeaderDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no part of a head has been consumed yet.
    pub fn is_idle(&self) -> bool {
        matches!(self.state, HeadState::FirstLine)
    }

    /// Finds the end of the next complete line in `src`, without consuming anything.
    fn line_end(&mut self, src: &[u8]) -> Result<Option<usize>, ParseError> {
        // the CR of a CRLF may be the last byte searched so far
        let from = self.scanned.min(src.len()).saturating_sub(1);
        let Some(offset) = src[from..].windows(CRLF.len()).position(|window| window == CRLF) else {
            self.scanned = src.len();
            let size = self.consumed + src.len();
            ensure!(size <= MAX_HEAD_BYTES, ParseError::too_large_header(size, MAX_HEAD_BYTES));
            return Ok(None);
        };

        let end = from + offset;
        self.scanned = end;
        let size = self.consumed + end + CRLF.len();
        ensure!(size <= MAX_HEAD_BYTES, ParseError::too_large_header(size, MAX_HEAD_BYTES));
        Ok(Some(end))
    }

    /// Drops a parsed line and its CRLF from the front of `src`.
    fn consume_line(&mut self, src: &mut BytesMut, end: usize) {
        src.advance(end + CRLF.len());
        self.consumed += end + CRLF.len();
        self.scanned = 0;
    }
}

impl Decoder for HeaderDecoder {
    type Item = (StartLine, HeaderFields);
    type Error = ParseError;

    /// Consumes as many complete head lines as `src` holds.
    ///
    /// # Returns
    ///
    /// - `Ok(Some((start_line, headers)))` once the empty line ending the head is consumed
    /// - `Ok(None)` if the head is not complete yet
    /// - `Err(ParseError)` on a malformed first line or header line
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        while let Some(end) = self.line_end(src)? {
            let line = &src[..end];
            match &mut self.state {
                HeadState::FirstLine => {
                    let start_line = parse_start_line(line)?;
                    trace!(%start_line, "parsed first line");
                    self.state = HeadState::Fields { start_line, headers: HeaderFields::new(), last_field: None };
                }

                HeadState::Fields { headers, last_field, .. } if !line.is_empty() => {
                    *last_field = Some(parse_field_line(line, headers, *last_field)?);
                }

                HeadState::Fields { .. } => {
                    self.consume_line(src, end);
                    self.consumed = 0;
                    if let HeadState::Fields { start_line, headers, .. } = mem::take(&mut self.state) {
                        trace!(header_count = headers.len(), "parsed header block");
                        return Ok(Some((start_line, headers)));
                    }
                }
            }
            self.consume_line(src, end);
        }

        Ok(None)
    }
}

fn split_token(bytes: &[u8]) -> (&[u8], &[u8]) {
    match bytes.iter().position(|&b| b == b' ') {
        Some(index) => (&bytes[..index], &bytes[index + 1..]),
        None => (bytes, &[]),
    }
}

fn parse_start_line(line: &[u8]) -> Result<StartLine, ParseError> {
    let (first, rest) = split_token(line);
    let first = first.to_ascii_uppercase();

    if first.starts_with(b"HTTP/") {
        let version =
            parse_version(&first).ok_or_else(|| ParseError::invalid_first_line(format!("unsupported version {}", latin1::decode(&first))))?;

        let (status, reason) = match rest.iter().position(|&b| b == b' ') {
            Some(index) => (&rest[..index], Some(latin1::decode(&rest[index + 1..]))),
            None => (rest, None),
        };
        let status = StatusCode::from_bytes(status)
            .map_err(|e| ParseError::invalid_first_line(format!("status {:?}: {e}", latin1::decode(status))))?;

        return Ok(StartLine::Response(StatusLine { version, status, reason }));
    }

    let method = Method::from_bytes(&first)
        .map_err(|e| ParseError::invalid_first_line(format!("method {:?}: {e}", latin1::decode(&first))))?;

    let (path, version) = split_token(rest);
    ensure!(!path.is_empty(), ParseError::invalid_first_line("missing request target"));

    let version =
        parse_version(version).ok_or_else(|| ParseError::invalid_first_line(format!("unsupported version {:?}", latin1::decode(version))))?;

    Ok(StartLine::Request(RequestLine { method, path: latin1::decode(path), version }))
}

/// Parses one non-empty header line into `headers` and returns the index of the field it touched.
fn parse_field_line(line: &[u8], headers: &mut HeaderFields, last_field: Option<usize>) -> Result<usize, ParseError> {
    if matches!(line[0], b' ' | b'\t') {
        let index = last_field.ok_or_else(|| ParseError::invalid_header("continuation line before any header"))?;
        ensure!(headers.extend_value(index, &latin1::decode(line)), ParseError::invalid_header("continuation of an unknown header"));
        return Ok(index);
    }

    let colon = line
        .iter()
        .position(|&b| b == b':')
        .ok_or_else(|| ParseError::invalid_header(format!("missing colon in {:?}", latin1::decode(line))))?;

    let name = latin1::decode(&line[..colon]);
    ensure!(headers.len() < MAX_HEADER_NUM || headers.contains(&name), ParseError::too_many_headers(MAX_HEADER_NUM));
    let value = latin1::decode(line[colon + 1..].trim_ascii_start());
    Ok(headers.insert(name, value))
}
