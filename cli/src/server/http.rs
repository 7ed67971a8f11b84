//! Blocking HTTP/1.1 request reading and response writing, one request per connection.

use std::io::{self, Read, Write};

use bytes::{Bytes, BytesMut};

/// Upper bound for the request line plus headers
const MAX_HEAD_SIZE: usize = 16 * 1024;
const READ_CHUNK: usize = 8 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("connection closed before the request was complete")]
    ConnectionClosed,
    #[error("malformed request: {0}")]
    Malformed(&'static str),
    #[error("request head exceeds {limit} bytes")]
    HeadTooLarge { limit: usize },
    #[error("POST request without Content-Length")]
    LengthRequired,
    #[error("request body of {len} bytes exceeds the limit of {limit} bytes")]
    PayloadTooLarge { len: usize, limit: usize },
}

impl HttpError {
    /// The response to send back for this error, if the connection is still usable for one
    pub fn response(&self) -> Option<Response> {
        let status = match self {
            HttpError::Io(_) | HttpError::ConnectionClosed => return None,
            HttpError::Malformed(_) | HttpError::HeadTooLarge { .. } => 400,
            HttpError::LengthRequired => 411,
            HttpError::PayloadTooLarge { .. } => 413,
        };
        Some(Response::text(status, self.to_string()))
    }
}

#[derive(Debug)]
pub struct Request {
    pub method: String,
    /// Request target as sent, including any query string
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Request {
    /// Case insensitive header lookup, first match wins
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The target without its query string
    pub fn path(&self) -> &str {
        self.target
            .split_once('?')
            .map_or(self.target.as_str(), |(path, _)| path)
    }
}

/// Read one request from `stream`. The body is framed by `Content-Length` and refused
/// before it is read if it is larger than `max_body`. A client that sent
/// `Expect: 100-continue` is told to go on once the body is known to fit.
pub fn read_request<S: Read + Write>(stream: &mut S, max_body: usize) -> Result<Request, HttpError> {
    let mut buf = BytesMut::with_capacity(READ_CHUNK);
    let head_end = loop {
        if let Some(end) = find_header_end(&buf) {
            break end;
        }
        if buf.len() > MAX_HEAD_SIZE {
            return Err(HttpError::HeadTooLarge {
                limit: MAX_HEAD_SIZE,
            });
        }
        fill(stream, &mut buf)?;
    };

    let head = buf.split_to(head_end + 4);
    let (method, target, headers) = parse_head(&head[..head_end])?;

    let content_length = headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
        .map(|(_, v)| {
            v.parse::<usize>()
                .map_err(|_| HttpError::Malformed("invalid Content-Length"))
        })
        .transpose()?;
    let len = match content_length {
        Some(len) => len,
        None if method == "POST" => return Err(HttpError::LengthRequired),
        None => 0,
    };
    if len > max_body {
        return Err(HttpError::PayloadTooLarge {
            len,
            limit: max_body,
        });
    }

    let expects_continue = headers
        .iter()
        .any(|(n, v)| n.eq_ignore_ascii_case("expect") && v.eq_ignore_ascii_case("100-continue"));
    if expects_continue && buf.len() < len {
        stream.write_all(b"HTTP/1.1 100 Continue\r\n\r\n")?;
        stream.flush()?;
    }

    buf.reserve(len.saturating_sub(buf.len()));
    while buf.len() < len {
        fill(stream, &mut buf)?;
    }
    buf.truncate(len);

    Ok(Request {
        method,
        target,
        headers,
        body: buf.freeze(),
    })
}

fn fill<R: Read>(reader: &mut R, buf: &mut BytesMut) -> Result<(), HttpError> {
    let mut chunk = [0u8; READ_CHUNK];
    let n = reader.read(&mut chunk)?;
    if n == 0 {
        return Err(HttpError::ConnectionClosed);
    }
    buf.extend_from_slice(&chunk[..n]);
    Ok(())
}

/// Find the position of `\r\n\r\n` in data, returns index of the first `\r`.
fn find_header_end(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|w| w == b"\r\n\r\n")
}

type Head = (String, String, Vec<(String, String)>);

/// Parse the request line and headers (everything before `\r\n\r\n`).
fn parse_head(data: &[u8]) -> Result<Head, HttpError> {
    let text =
        std::str::from_utf8(data).map_err(|_| HttpError::Malformed("request head is not utf-8"))?;
    let mut lines = text.split("\r\n");

    // Request line: POST /compress HTTP/1.1
    let request_line = lines.next().unwrap_or("");
    let mut parts = request_line.split(' ');
    let (Some(method), Some(target), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(HttpError::Malformed("bad request line"));
    };
    if method.is_empty() || !target.starts_with('/') || !version.starts_with("HTTP/1.") {
        return Err(HttpError::Malformed("bad request line"));
    }

    let mut headers = Vec::new();
    for line in lines {
        let (name, value) = line
            .split_once(':')
            .ok_or(HttpError::Malformed("header without colon"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(HttpError::Malformed("empty header name"));
        }
        headers.push((name.to_string(), value.trim().to_string()));
    }

    Ok((method.to_string(), target.to_string(), headers))
}

#[derive(Debug)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, content_type: &str, body: Vec<u8>) -> Self {
        Response {
            status,
            headers: vec![("Content-Type", content_type.to_string())],
            body,
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        let mut body = body.into().into_bytes();
        body.push(b'\n');
        Response::new(status, "text/plain; charset=utf-8", body)
    }

    /// An `application/octet-stream` download with a suggested filename
    pub fn attachment(body: Vec<u8>, filename: &str) -> Self {
        Response::new(200, "application/octet-stream", body).with_header(
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        )
    }

    pub fn with_header(mut self, name: &'static str, value: String) -> Self {
        self.headers.push((name, value));
        self
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status, reason(self.status));
        for (name, value) in &self.headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str(&format!(
            "Content-Length: {}\r\nConnection: close\r\n\r\n",
            self.body.len()
        ));
        writer.write_all(head.as_bytes())?;
        writer.write_all(&self.body)?;
        writer.flush()
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        411 => "Length Required",
        413 => "Payload Too Large",
        503 => "Service Unavailable",
        500 => "Internal Server Error",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out one queued chunk per read and keeps everything written to it
    struct Duplex {
        chunks: Vec<&'static [u8]>,
        written: Vec<u8>,
    }

    impl Duplex {
        fn new(chunks: &[&'static [u8]]) -> Self {
            Duplex {
                chunks: chunks.iter().rev().copied().collect(),
                written: Vec::new(),
            }
        }
    }

    impl Read for Duplex {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let Some(chunk) = self.chunks.pop() else {
                return Ok(0);
            };
            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            if n < chunk.len() {
                self.chunks.push(&chunk[n..]);
            }
            Ok(n)
        }
    }

    impl Write for Duplex {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn read(raw: &'static [u8], max_body: usize) -> Result<Request, HttpError> {
        read_request(&mut Duplex::new(&[raw]), max_body)
    }

    #[test]
    fn parse_post_with_body() {
        let request = read(
            b"POST /compress?x=1 HTTP/1.1\r\nHost: a\r\ncontent-length: 5\r\n\r\nhello",
            1024,
        )
        .unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(request.target, "/compress?x=1");
        assert_eq!(request.path(), "/compress");
        assert_eq!(request.header("Content-Length"), Some("5"));
        assert_eq!(request.header("host"), Some("a"));
        assert_eq!(&request.body[..], b"hello");
    }

    #[test]
    fn parse_get_without_body() {
        let request = read(b"GET /health HTTP/1.1\r\n\r\n", 0).unwrap();
        assert_eq!(request.method, "GET");
        assert!(request.body.is_empty());
    }

    #[test]
    fn post_needs_content_length() {
        let err = read(b"POST /compress HTTP/1.1\r\n\r\n", 1024).unwrap_err();
        assert!(matches!(err, HttpError::LengthRequired));
        assert_eq!(err.response().unwrap().status, 411);
    }

    #[test]
    fn body_over_limit() {
        let err = read(b"POST /compress HTTP/1.1\r\nContent-Length: 11\r\n\r\n", 10).unwrap_err();
        assert!(matches!(
            err,
            HttpError::PayloadTooLarge { len: 11, limit: 10 }
        ));
        assert_eq!(err.response().unwrap().status, 413);
    }

    #[test]
    fn malformed_requests() {
        for raw in [
            &b"GARBAGE\r\n\r\n"[..],
            b"GET /health HTTP/2\r\n\r\n",
            b"GET health HTTP/1.1\r\n\r\n",
            b"GET /health HTTP/1.1\r\nno colon here\r\n\r\n",
            b"POST /compress HTTP/1.1\r\nContent-Length: ten\r\n\r\n",
        ] {
            let err = read(raw, 1024).unwrap_err();
            assert!(matches!(err, HttpError::Malformed(_)), "{err}");
            assert_eq!(err.response().unwrap().status, 400);
        }
    }

    #[test]
    fn truncated_body() {
        let err = read(b"POST /compress HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc", 1024).unwrap_err();
        assert!(matches!(err, HttpError::ConnectionClosed));
        assert!(err.response().is_none());
    }

    #[test]
    fn continue_before_the_body() {
        let mut stream = Duplex::new(&[
            &b"POST /compress HTTP/1.1\r\nExpect: 100-continue\r\nContent-Length: 5\r\n\r\n"[..],
            &b"hello"[..],
        ]);
        let request = read_request(&mut stream, 1024).unwrap();
        assert_eq!(&request.body[..], b"hello");
        assert_eq!(stream.written, b"HTTP/1.1 100 Continue\r\n\r\n");
    }

    #[test]
    fn no_continue_for_refused_or_buffered_bodies() {
        let mut stream = Duplex::new(&[
            &b"POST /compress HTTP/1.1\r\nExpect: 100-continue\r\nContent-Length: 50\r\n\r\n"[..],
        ]);
        let err = read_request(&mut stream, 10).unwrap_err();
        assert!(matches!(err, HttpError::PayloadTooLarge { .. }));
        assert!(stream.written.is_empty());

        let mut stream = Duplex::new(&[
            &b"POST /compress HTTP/1.1\r\nExpect: 100-continue\r\nContent-Length: 2\r\n\r\nhi"[..],
        ]);
        read_request(&mut stream, 10).unwrap();
        assert!(stream.written.is_empty());
    }

    #[test]
    fn write_response() {
        let mut out = Vec::new();
        Response::attachment(b"abc".to_vec(), "x.huff")
            .write_to(&mut out)
            .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(out.contains("Content-Type: application/octet-stream\r\n"));
        assert!(out.contains("Content-Disposition: attachment; filename=\"x.huff\"\r\n"));
        assert!(out.contains("Content-Length: 3\r\n"));
        assert!(out.ends_with("\r\n\r\nabc"));
    }
}
