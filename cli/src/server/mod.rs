//! HTTP front end for the codec: upload a file, download the container, and back.
//!
//! Every connection gets its own thread and serves exactly one request. Requests share
//! nothing but the [ServerConfig] and a count of open connections. Past
//! `max_connections` new connections are answered with 503 right away.

mod http;
mod multipart;

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use huffpack::DecodeError;
use tracing::{error, info, warn};

use http::{read_request, Request, Response};
use multipart::Part;

const COMPRESSED_FALLBACK_NAME: &str = "compressed.huff";
const DECOMPRESSED_FALLBACK_NAME: &str = "decompressed.bin";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    /// Largest accepted request body in bytes
    pub max_upload: usize,
    pub read_timeout: Duration,
    /// Connections served at the same time
    pub max_connections: usize,
}

pub struct Server {
    listener: TcpListener,
    config: Arc<ServerConfig>,
    active: Arc<AtomicUsize>,
}

/// Holds one of the `max_connections` slots until dropped
struct ConnectionSlot(Arc<AtomicUsize>);

impl ConnectionSlot {
    fn acquire(active: &Arc<AtomicUsize>, max: usize) -> Option<ConnectionSlot> {
        active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n < max).then_some(n + 1))
            .ok()
            .map(|_| ConnectionSlot(Arc::clone(active)))
    }
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl Server {
    pub fn bind(config: ServerConfig) -> io::Result<Server> {
        let listener = TcpListener::bind(config.listen)?;
        Ok(Server {
            listener,
            config: Arc::new(config),
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the listener fails
    pub fn run(self) -> io::Result<()> {
        info!(
            addr = %self.local_addr()?,
            max_upload = self.config.max_upload,
            max_connections = self.config.max_connections,
            "listening"
        );
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let Some(slot) = ConnectionSlot::acquire(&self.active, self.config.max_connections)
                    else {
                        turn_away(stream);
                        continue;
                    };
                    let config = Arc::clone(&self.config);
                    thread::spawn(move || {
                        handle_connection(stream, &config);
                        drop(slot);
                    });
                }
                Err(e) => error!("failed to accept connection: {e}"),
            }
        }
        Ok(())
    }
}

fn turn_away(mut stream: TcpStream) {
    let peer = stream
        .peer_addr()
        .map_or_else(|_| "unknown".to_string(), |addr| addr.to_string());
    warn!(%peer, "connection limit reached, answering 503");
    if let Err(e) = Response::text(503, "too many connections").write_to(&mut stream) {
        error!(%peer, "failed to write response: {e}");
    }
}

fn handle_connection(mut stream: TcpStream, config: &ServerConfig) {
    let start = Instant::now();
    let peer = stream
        .peer_addr()
        .map_or_else(|_| "unknown".to_string(), |addr| addr.to_string());
    if let Err(e) = stream.set_read_timeout(Some(config.read_timeout)) {
        error!(%peer, "failed to set read timeout: {e}");
        return;
    }

    let (response, method, path, bytes_in) = match read_request(&mut stream, config.max_upload) {
        Ok(request) => (
            route(&request),
            request.method.clone(),
            request.path().to_string(),
            request.body.len(),
        ),
        Err(e) => match e.response() {
            Some(response) => {
                warn!(%peer, "rejected request: {e}");
                (response, String::new(), String::new(), 0)
            }
            None => {
                warn!(%peer, "dropped connection: {e}");
                return;
            }
        },
    };

    if let Err(e) = response.write_to(&mut stream) {
        error!(%peer, "failed to write response: {e}");
        return;
    }
    info!(
        %peer,
        %method,
        %path,
        status = response.status,
        bytes_in,
        bytes_out = response.body.len(),
        elapsed = ?start.elapsed(),
        "handled request"
    );
}

fn route(request: &Request) -> Response {
    match (request.method.as_str(), request.path()) {
        ("POST", "/compress") => compress(request),
        ("POST", "/decompress") => decompress(request),
        ("GET" | "HEAD", "/health") => Response::text(200, "ok"),
        (_, "/compress" | "/decompress") => {
            Response::text(405, "method not allowed").with_header("Allow", "POST".to_string())
        }
        (_, "/health") => {
            Response::text(405, "method not allowed").with_header("Allow", "GET, HEAD".to_string())
        }
        _ => Response::text(404, "not found"),
    }
}

fn compress(request: &Request) -> Response {
    let upload = match uploaded_file(request) {
        Ok(upload) => upload,
        Err(response) => return response,
    };
    match huffpack::encode(upload.data) {
        Ok(container) => {
            let filename = upload
                .filename
                .as_deref()
                .and_then(sanitize_filename)
                .map_or_else(
                    || COMPRESSED_FALLBACK_NAME.to_string(),
                    |name| format!("{name}.huff"),
                );
            Response::attachment(container, &filename)
        }
        Err(e) => {
            error!("encoding failed: {e}");
            Response::text(500, "internal error while encoding")
        }
    }
}

fn decompress(request: &Request) -> Response {
    let upload = match uploaded_file(request) {
        Ok(upload) => upload,
        Err(response) => return response,
    };
    match huffpack::decode(upload.data) {
        Ok(original) => {
            let filename = upload
                .filename
                .as_deref()
                .and_then(sanitize_filename)
                .and_then(|name| name.strip_suffix(".huff").map(str::to_string))
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DECOMPRESSED_FALLBACK_NAME.to_string());
            Response::attachment(original, &filename)
        }
        Err(e) => {
            let kind = if e.is_unsupported() {
                "unsupported container"
            } else {
                "corrupt container"
            };
            warn!("rejected upload: {e}");
            Response::text(400, format!("{kind}: {}", describe(&e)))
        }
    }
}

fn describe(e: &DecodeError) -> String {
    match e {
        DecodeError::CorruptContainer(inner) => inner.to_string(),
        other => other.to_string(),
    }
}

/// The file part of a multipart upload, or the 400 to answer with
fn uploaded_file(request: &Request) -> Result<Part<'_>, Response> {
    let content_type = request
        .header("Content-Type")
        .ok_or_else(|| Response::text(400, "missing Content-Type"))?;
    let boundary =
        multipart::boundary(content_type).map_err(|e| Response::text(400, e.to_string()))?;
    let parts =
        multipart::parse(&request.body, &boundary).map_err(|e| Response::text(400, e.to_string()))?;
    multipart::find_file(&parts)
        .cloned()
        .ok_or_else(|| Response::text(400, "no file part in upload"))
}

/// Last path component of an uploaded filename, with anything that could break the
/// `Content-Disposition` header removed. `None` if nothing usable is left.
fn sanitize_filename(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .collect();
    let cleaned = cleaned.trim();
    (!cleaned.is_empty() && cleaned != "." && cleaned != "..").then(|| cleaned.to_string())
}
