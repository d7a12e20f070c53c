//! Just enough HTTP/1.x to read a request head and write a response head.
//!
//! Every response closes the connection, so bodies never need chunking and
//! a successful response can stream its body without a length.

use std::io;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Longest accepted request or header line, excluding the line ending.
pub const MAX_LINE_LEN: usize = 65536;

/// Most header lines accepted before the request is refused.
pub const MAX_HEADERS: usize = 100;

const SERVER_NAME: &str = concat!("hosts-server/", env!("CARGO_PKG_VERSION"));

/// Request methods we distinguish between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Other(String),
}

impl Method {
    fn parse(method: &str) -> Self {
        match method {
            "GET" => Method::Get,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Other(method) => method,
        }
    }
}

/// Parsed request line. Headers are read and discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: Method,
    /// Raw request target, query string included.
    pub path: String,
    pub version: String,
    /// The request line as received, for access logging.
    pub request_line: String,
}

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("connection closed before a request was received")]
    Closed,

    #[error("timed out waiting for the request")]
    TimedOut,

    #[error("bad request syntax ({0:?})")]
    BadRequest(String),

    #[error("bad request version ({0:?})")]
    BadVersion(String),

    #[error("request-URI too long")]
    UriTooLong,

    #[error("header line too long")]
    HeaderTooLong,

    #[error("too many headers")]
    TooManyHeaders,

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl RequestError {
    /// Status to answer with, or `None` when no response should be sent.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::Closed | RequestError::TimedOut | RequestError::Io(_) => None,
            RequestError::BadRequest(_) | RequestError::BadVersion(_) => {
                Some(StatusCode::BadRequest)
            }
            RequestError::UriTooLong => Some(StatusCode::UriTooLong),
            RequestError::HeaderTooLong | RequestError::TooManyHeaders => {
                Some(StatusCode::HeaderFieldsTooLarge)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    BadRequest,
    NotFound,
    UriTooLong,
    HeaderFieldsTooLarge,
    NotImplemented,
}

impl StatusCode {
    pub fn as_u16(self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::UriTooLong => 414,
            StatusCode::HeaderFieldsTooLarge => 431,
            StatusCode::NotImplemented => 501,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::UriTooLong => "Request-URI Too Long",
            StatusCode::HeaderFieldsTooLarge => "Request Header Fields Too Large",
            StatusCode::NotImplemented => "Not Implemented",
        }
    }
}

/// Read the request line and skip past the headers.
pub async fn read_request_head<R>(reader: &mut R) -> Result<RequestHead, RequestError>
where
    R: AsyncBufRead + Unpin,
{
    let line = match read_line(reader).await? {
        Line::Eof => return Err(RequestError::Closed),
        Line::TooLong => return Err(RequestError::UriTooLong),
        Line::Text(line) => line,
    };
    if line.is_empty() {
        return Err(RequestError::Closed);
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    let (method, path, version) = match words.as_slice() {
        [method, path, version] => {
            if !version.starts_with("HTTP/") {
                return Err(RequestError::BadVersion(version.to_string()));
            }
            (*method, *path, *version)
        }
        // HTTP/0.9 simple request: no version and no headers.
        ["GET", path] => ("GET", *path, "HTTP/0.9"),
        _ => return Err(RequestError::BadRequest(line.clone())),
    };

    let head = RequestHead {
        method: Method::parse(method),
        path: path.to_string(),
        version: version.to_string(),
        request_line: line.clone(),
    };

    if head.version != "HTTP/0.9" {
        skip_headers(reader).await?;
    }

    Ok(head)
}

async fn skip_headers<R>(reader: &mut R) -> Result<(), RequestError>
where
    R: AsyncBufRead + Unpin,
{
    let mut count = 0;
    loop {
        match read_line(reader).await? {
            Line::Eof => return Ok(()),
            Line::TooLong => return Err(RequestError::HeaderTooLong),
            Line::Text(line) if line.is_empty() => return Ok(()),
            Line::Text(_) => {
                count += 1;
                if count > MAX_HEADERS {
                    return Err(RequestError::TooManyHeaders);
                }
            }
        }
    }
}

enum Line {
    Eof,
    TooLong,
    Text(String),
}

/// Read one line, bounded by [`MAX_LINE_LEN`], without its line ending.
async fn read_line<R>(reader: &mut R) -> io::Result<Line>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let limit = (MAX_LINE_LEN + 2) as u64;
    let n = (&mut *reader).take(limit).read_until(b'\n', &mut buf).await?;
    if n == 0 {
        return Ok(Line::Eof);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if n as u64 == limit {
        return Ok(Line::TooLong);
    }
    if buf.len() > MAX_LINE_LEN {
        return Ok(Line::TooLong);
    }

    Ok(Line::Text(String::from_utf8_lossy(&buf).into_owned()))
}

/// Status line and headers for a plain-text response.
///
/// Without a `content_length` the body is delimited by closing the connection.
pub fn response_head(status: StatusCode, content_length: Option<usize>) -> String {
    let mut head = format!(
        "HTTP/1.0 {} {}\r\nServer: {}\r\nContent-Type: text/plain; charset=utf-8\r\n",
        status.as_u16(),
        status.reason(),
        SERVER_NAME
    );
    if let Some(len) = content_length {
        head.push_str(&format!("Content-Length: {len}\r\n"));
    }
    head.push_str("Connection: close\r\n\r\n");
    head
}

/// Write a complete plain-text error response.
pub async fn write_error<W>(writer: &mut W, status: StatusCode, message: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut response = response_head(status, Some(message.len()));
    response.push_str(message);
    writer.write_all(response.as_bytes()).await?;
    writer.flush().await
}
