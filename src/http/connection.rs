//! The per-connection session state machine.
//!
//! One worker runs one session at a time; a session is fully sequential.
//! Each iteration awaits a request under the idle deadline, validates it,
//! dispatches to a handler, writes the response, and either loops back for
//! the next request or closes. Every error is resolved to a response (or a
//! silent close) here — nothing propagates past the session except write
//! failures, which abort it.

use std::sync::Arc;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::handlers::Handlers;
use crate::http::parser::{parse_request, ParseError, MAX_REQUEST_BYTES};
use crate::http::request::{Method, Request, Version};
use crate::http::response::{Response, StatusCode};
use crate::http::writer::{self, KeepAlive};
use crate::security::{GateError, SecurityGate};

const UPLOAD_PATH: &str = "/upload";

enum SessionState {
    AwaitRequest,
    Respond { response: Response, persist: bool },
    Close,
}

/// Outcome of waiting for the next request on the wire.
enum NextRequest {
    Request(Request),
    Malformed(ParseError),
    /// EOF, idle deadline, or a socket-level read error. All close silently.
    Disconnected(&'static str),
}

pub struct Connection {
    stream: TcpStream,
    peer: std::net::SocketAddr,
    buffer: BytesMut,
    /// Completed requests on this connection; at `config.max_requests` the
    /// connection is forced closed.
    completed: u32,
    config: Arc<Config>,
    gate: Arc<SecurityGate>,
    handlers: Arc<Handlers>,
}

impl Connection {
    pub fn new(
        stream: TcpStream,
        peer: std::net::SocketAddr,
        config: Arc<Config>,
        gate: Arc<SecurityGate>,
        handlers: Arc<Handlers>,
    ) -> Self {
        Self {
            stream,
            peer,
            buffer: BytesMut::with_capacity(4096),
            completed: 0,
            config,
            gate,
            handlers,
        }
    }

    pub fn peer(&self) -> std::net::SocketAddr {
        self.peer
    }

    /// Tears the connection down without a session, used by the acceptor's
    /// overflow path.
    pub fn into_stream(self) -> TcpStream {
        self.stream
    }

    /// Drives the session to a terminal state. Returns `Err` only on a write
    /// failure; read-side problems resolve to responses or silent closes.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let mut state = SessionState::AwaitRequest;
        loop {
            state = match state {
                SessionState::AwaitRequest => self.await_request().await,
                SessionState::Respond { response, persist } => {
                    let status = response.status;
                    let keep_alive = persist.then(|| KeepAlive {
                        timeout_secs: self.config.keep_alive_timeout_secs,
                        max_requests: self.config.max_requests,
                    });
                    writer::write_response(&mut self.stream, response, keep_alive).await?;
                    info!(peer = %self.peer, status = status.as_u16(), persist, "response sent");
                    if persist {
                        SessionState::AwaitRequest
                    } else {
                        SessionState::Close
                    }
                }
                SessionState::Close => break,
            };
        }
        let _ = self.stream.shutdown().await;
        debug!(peer = %self.peer, requests = self.completed, "connection closed");
        Ok(())
    }

    /// One iteration of the read side. The idle deadline covers the whole
    /// wait for a complete request and resets every iteration.
    async fn await_request(&mut self) -> SessionState {
        let next = match timeout(self.config.keep_alive_timeout(), self.next_request()).await {
            Ok(next) => next,
            Err(_) => NextRequest::Disconnected("idle timeout"),
        };

        match next {
            NextRequest::Request(request) => {
                info!(
                    peer = %self.peer,
                    "{} {} {}", request.method, request.path, request.version
                );
                let response = self.process(&request).await;
                let persist = self.persistence(&request, &response);
                SessionState::Respond { response, persist }
            }
            NextRequest::Malformed(err) => {
                warn!(peer = %self.peer, %err, "rejecting malformed request");
                SessionState::Respond {
                    response: Response::error_close(StatusCode::BadRequest, "Malformed request."),
                    persist: false,
                }
            }
            NextRequest::Disconnected(reason) => {
                debug!(peer = %self.peer, reason, "closing without response");
                SessionState::Close
            }
        }
    }

    /// Reads until the buffer holds one complete request, then drains exactly
    /// the consumed bytes; anything after them belongs to the next iteration.
    async fn next_request(&mut self) -> NextRequest {
        loop {
            match parse_request(&self.buffer) {
                Ok((request, consumed)) => {
                    self.buffer.advance(consumed);
                    return NextRequest::Request(request);
                }
                Err(ParseError::Incomplete) => {
                    if self.buffer.len() >= MAX_REQUEST_BYTES {
                        return NextRequest::Malformed(ParseError::TooLarge);
                    }
                }
                Err(err) => return NextRequest::Malformed(err),
            }

            match self.stream.read_buf(&mut self.buffer).await {
                // EOF: clean between requests, abandoned mid-request. Silent
                // close either way.
                Ok(0) => return NextRequest::Disconnected("peer closed"),
                Ok(_) => {}
                Err(_) => return NextRequest::Disconnected("read error"),
            }
        }
    }

    /// Validate then dispatch: Host check first for every request, then the
    /// per-method gate checks, then the handler. Every failure maps to a
    /// response right here.
    async fn process(&self, request: &Request) -> Response {
        if let Err(err) = self.gate.check_host(request) {
            return self.reject(request, err);
        }

        match &request.method {
            Method::GET => match self.gate.resolve_path(&request.path).await {
                Ok(resolved) => match self.handlers.static_files.serve(&resolved).await {
                    Ok(response) => response,
                    Err(err) => {
                        error!(peer = %self.peer, path = %request.path, %err, "GET handler failed");
                        Response::internal_error()
                    }
                },
                Err(err) => self.reject(request, err),
            },
            Method::POST => {
                if request.path != UPLOAD_PATH {
                    return Response::error(StatusCode::NotFound, "No such resource.");
                }
                if let Err(err) = SecurityGate::check_content_type(request) {
                    return self.reject(request, err);
                }
                match self.handlers.uploads.store(&request.body).await {
                    Ok(response) => response,
                    Err(err) => {
                        error!(peer = %self.peer, %err, "upload handler failed");
                        Response::internal_error()
                    }
                }
            }
            Method::Other(token) => {
                warn!(peer = %self.peer, method = %token, "method not allowed");
                Response::error(StatusCode::MethodNotAllowed, "Only GET and POST are supported.")
            }
        }
    }

    /// Maps a gate rejection to its response. Security-class rejections
    /// (missing/mismatched Host, traversal, escape) force the connection
    /// closed so a probing client cannot keep the session open.
    fn reject(&self, request: &Request, err: GateError) -> Response {
        match &err {
            GateError::MissingHost => {
                warn!(peer = %self.peer, "request without Host header");
                Response::error_close(StatusCode::BadRequest, "Host header is required.")
            }
            GateError::HostMismatch { got, .. } => {
                warn!(peer = %self.peer, host = %got, "Host mismatch");
                Response::error_close(StatusCode::Forbidden, "Host not served here.")
            }
            GateError::SuspiciousPath(path) | GateError::OutsideRoot(path) => {
                warn!(peer = %self.peer, path = %path, "path rejected");
                Response::error_close(StatusCode::Forbidden, "Access denied.")
            }
            GateError::NotFound(path) => {
                debug!(peer = %self.peer, path = %path, "resource not found");
                Response::error(StatusCode::NotFound, "No such resource.")
            }
            GateError::UnsupportedMediaType(declared) => {
                warn!(peer = %self.peer, content_type = %declared, "unsupported media type");
                Response::error(
                    StatusCode::UnsupportedMediaType,
                    "POST bodies must be application/json.",
                )
            }
            GateError::Io(io_err) => {
                error!(peer = %self.peer, path = %request.path, %io_err, "path resolution failed");
                Response::internal_error()
            }
        }
    }

    /// The persistence decision, computed before the response is written.
    /// Keep-alive iff: no force-close hint, the post-increment request count
    /// is below the ceiling, and the client negotiated persistence for its
    /// HTTP version (1.1 unless overridden, 1.0 only when explicit).
    fn persistence(&mut self, request: &Request, response: &Response) -> bool {
        self.completed += 1;
        !response.close && self.completed < self.config.max_requests && wants_keep_alive(request)
    }
}

fn wants_keep_alive(request: &Request) -> bool {
    let token = request.connection_token();
    match request.version {
        Version::Http11 => !token.is_some_and(|t| t.eq_ignore_ascii_case("close")),
        Version::Http10 => token.is_some_and(|t| t.eq_ignore_ascii_case("keep-alive")),
    }
}
