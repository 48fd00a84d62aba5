use std::fmt;

use bytes::Bytes;
use http::{Method, StatusCode, Version};

use crate::protocol::HeaderFields;
use crate::protocol::version::version_str;

/// A complete HTTP/1.x message: a request or a response with its headers and body.
///
/// The fields shared by both kinds live on the struct; the kind-specific first line is the
/// [`StartLine`] tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpMessage {
    pub start_line: StartLine,
    pub headers: HeaderFields,
    pub body: Body,
}

/// The first line of a message, which also decides whether it is a request or a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartLine {
    Request(RequestLine),
    Response(StatusLine),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    pub path: String,
    pub version: Version,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub version: Version,
    pub status: StatusCode,
    /// `None` when the line ends right after the status code
    pub reason: Option<String>,
}

/// The body of a message.
///
/// `Absent` means the message kind carries no body at all, which is different from a body
/// that was framed but turned out to be zero bytes long (`Empty`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Body {
    #[default]
    Absent,
    Empty,
    Full(Bytes),
}

impl HttpMessage {
    pub fn new(start_line: StartLine, headers: HeaderFields, body: Body) -> Self {
        Self { start_line, headers, body }
    }

    #[inline]
    pub fn is_request(&self) -> bool {
        matches!(self.start_line, StartLine::Request(_))
    }

    #[inline]
    pub fn is_response(&self) -> bool {
        matches!(self.start_line, StartLine::Response(_))
    }

    pub fn request_line(&self) -> Option<&RequestLine> {
        match &self.start_line {
            StartLine::Request(line) => Some(line),
            StartLine::Response(_) => None,
        }
    }

    pub fn status_line(&self) -> Option<&StatusLine> {
        match &self.start_line {
            StartLine::Request(_) => None,
            StartLine::Response(line) => Some(line),
        }
    }
}

impl StartLine {
    /// Whether a message with this first line is followed by a body.
    ///
    /// Only `POST`, `PUT` and `PATCH` requests and `200`/`404` responses are treated as
    /// body-bearing; every other message ends after its header block.
    pub fn has_body(&self) -> bool {
        match self {
            StartLine::Request(line) => matches!(line.method, Method::POST | Method::PUT | Method::PATCH),
            StartLine::Response(line) => matches!(line.status, StatusCode::OK | StatusCode::NOT_FOUND),
        }
    }
}

impl Body {
    /// Wraps decoded body bytes, mapping zero bytes to [`Body::Empty`].
    pub fn from_bytes(bytes: Bytes) -> Self {
        if bytes.is_empty() { Body::Empty } else { Body::Full(bytes) }
    }

    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, Body::Absent)
    }

    pub fn len(&self) -> usize {
        match self {
            Body::Absent | Body::Empty => 0,
            Body::Full(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Body::Absent | Body::Empty => &[],
            Body::Full(bytes) => bytes,
        }
    }
}

impl fmt::Display for StartLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartLine::Request(line) => write!(f, "{} {} {}", line.method, line.path, version_str(line.version)),
            StartLine::Response(line) => {
                write!(f, "{} {}", version_str(line.version), line.status.as_str())?;
                match &line.reason {
                    Some(reason) => write!(f, " {reason}"),
                    None => Ok(()),
                }
            }
        }
    }
}

impl fmt::Display for HttpMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.start_line)?;
        write!(f, "{}", self.headers)?;
        match &self.body {
            Body::Absent => Ok(()),
            Body::Empty => writeln!(f, "\n<empty body>"),
            Body::Full(bytes) => writeln!(f, "\n{}", String::from_utf8_lossy(bytes)),
        }
    }
}
