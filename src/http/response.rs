use tokio::fs::File;

/// The status codes this server emits. The set is closed on purpose: every
/// code maps to exactly one failure (or success) class of the session, and a
/// new code means a new class, not a pass-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 201 Created
    Created,
    /// 400 Bad Request
    BadRequest,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 415 Unsupported Media Type
    UnsupportedMediaType,
    /// 500 Internal Server Error
    InternalServerError,
    /// 503 Service Unavailable
    ServiceUnavailable,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use rampart::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::UnsupportedMediaType.as_u16(), 415);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::BadRequest => 400,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::UnsupportedMediaType => 415,
            StatusCode::InternalServerError => 500,
            StatusCode::ServiceUnavailable => 503,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use rampart::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::Forbidden.reason_phrase(), "Forbidden");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::UnsupportedMediaType => "Unsupported Media Type",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }
}

/// Where the response body comes from: bytes already in memory, or an open
/// file streamed after the header block. The length is fixed either way —
/// it becomes the Content-Length before any body byte is written.
#[derive(Debug)]
pub enum Body {
    Bytes(Vec<u8>),
    File { file: File, len: u64 },
}

impl Body {
    pub fn len(&self) -> u64 {
        match self {
            Body::Bytes(bytes) => bytes.len() as u64,
            Body::File { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A response specification: everything the writer needs, plus the
/// connection-disposition hint contributed by whichever component built it.
///
/// Headers the wire contract fixes per response (Date, Content-Length,
/// Connection, Keep-Alive) are computed at write time; only the
/// content-describing pair lives here so the writer can emit headers in a
/// stable order.
#[derive(Debug)]
pub struct Response {
    pub status: StatusCode,
    pub content_type: Option<&'static str>,
    pub content_disposition: Option<String>,
    pub body: Body,
    /// Force the connection closed after this response, overriding any
    /// keep-alive negotiation. Set on security rejections and 500s.
    pub close: bool,
}

/// Builder for constructing responses in a fluent style.
///
/// # Example
///
/// ```
/// # use rampart::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .content_type("text/html; charset=utf-8")
///     .body(b"<html></html>".to_vec())
///     .build();
/// assert_eq!(response.body.len(), 13);
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    content_type: Option<&'static str>,
    content_disposition: Option<String>,
    body: Body,
    close: bool,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            content_type: None,
            content_disposition: None,
            body: Body::Bytes(Vec::new()),
            close: false,
        }
    }

    pub fn content_type(mut self, value: &'static str) -> Self {
        self.content_type = Some(value);
        self
    }

    pub fn content_disposition(mut self, value: impl Into<String>) -> Self {
        self.content_disposition = Some(value.into());
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Body::Bytes(body);
        self
    }

    /// Sets an open file as the body; `len` must be the metadata length
    /// captured at open.
    pub fn file(mut self, file: File, len: u64) -> Self {
        self.body = Body::File { file, len };
        self
    }

    /// Marks the response as force-closing the connection.
    pub fn close(mut self) -> Self {
        self.close = true;
        self
    }

    pub fn build(self) -> Response {
        Response {
            status: self.status,
            content_type: self.content_type,
            content_disposition: self.content_disposition,
            body: self.body,
            close: self.close,
        }
    }
}

impl Response {
    /// A minimal HTML error page for `status`, with one line of detail for
    /// the client. Connection disposition stays negotiable; callers add
    /// `.close` through the builder when the error class demands it.
    pub fn error(status: StatusCode, detail: &str) -> Self {
        let body = format!(
            "<html><head><title>{code} {reason}</title></head>\
             <body><h1>{code} {reason}</h1><p>{detail}</p></body></html>\n",
            code = status.as_u16(),
            reason = status.reason_phrase(),
        );
        ResponseBuilder::new(status)
            .content_type("text/html; charset=utf-8")
            .body(body.into_bytes())
            .build()
    }

    /// Like [`Response::error`] but with the connection forced closed.
    pub fn error_close(status: StatusCode, detail: &str) -> Self {
        let mut response = Self::error(status, detail);
        response.close = true;
        response
    }

    /// A 500 with a generic client-facing body. Detail belongs in the server
    /// log, never on the wire.
    pub fn internal_error() -> Self {
        let mut response = Self::error(
            StatusCode::InternalServerError,
            "The server encountered an unexpected condition.",
        );
        response.close = true;
        response
    }

    /// A JSON-bodied response, used on the upload route.
    pub fn json(status: StatusCode, value: &serde_json::Value) -> Self {
        let mut body = serde_json::to_vec(value).unwrap_or_default();
        body.push(b'\n');
        ResponseBuilder::new(status)
            .content_type("application/json")
            .body(body)
            .build()
    }
}
