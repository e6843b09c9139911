use std::collections::HashMap;
use std::fmt;

/// HTTP request methods.
///
/// The server implements GET and POST. Every other token still parses — it
/// becomes [`Method::Other`] carrying the raw token — and is answered with
/// 405 Method Not Allowed once the Host check has run. Adding a method means
/// adding a variant here and a dispatch arm; there is no open-ended dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - retrieve a file from the resource root
    GET,
    /// POST - submit a JSON document to the upload endpoint
    POST,
    /// Any other method token, kept verbatim for logging and the 405 path
    Other(String),
}

impl Method {
    /// Parses an HTTP method token. Total: unknown tokens become
    /// [`Method::Other`] instead of a parse failure, so the session can
    /// answer 405 rather than 400.
    ///
    /// # Example
    ///
    /// ```
    /// # use rampart::http::request::Method;
    /// assert_eq!(Method::parse("GET"), Method::GET);
    /// assert_eq!(Method::parse("PUT"), Method::Other("PUT".to_string()));
    /// ```
    pub fn parse(token: &str) -> Self {
        match token {
            "GET" => Method::GET,
            "POST" => Method::POST,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::Other(token) => token,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP protocol versions the server speaks.
///
/// Anything other than `HTTP/1.0` or `HTTP/1.1` fails the parse and the
/// request is answered 400; the version is never guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Http10,
    Http11,
}

impl Version {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "HTTP/1.0" => Some(Version::Http10),
            "HTTP/1.1" => Some(Version::Http11),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Http10 => "HTTP/1.0",
            Version::Http11 => "HTTP/1.1",
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed HTTP request.
///
/// Header keys are lowercased by the parser, so lookups through
/// [`Request::header`] are case-insensitive; values are kept as received
/// (trimmed). The path is the raw request-line token — path policy lives in
/// the security gate, never here. Immutable once parsed; each session
/// iteration owns exactly one.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Raw, unvalidated request path (e.g. "/index.html")
    pub path: String,
    pub version: Version,
    /// Header mapping, keys lowercased; on duplicate keys the last wins
    pub headers: HashMap<String, String>,
    /// Request body; populated only for POST with a Content-Length
    pub body: Vec<u8>,
}

impl Request {
    /// Retrieves a header value by name, case-insensitively.
    ///
    /// # Example
    ///
    /// ```
    /// # use rampart::http::request::{Method, RequestBuilder};
    /// let req = RequestBuilder::new()
    ///     .method(Method::GET)
    ///     .path("/")
    ///     .header("Host", "127.0.0.1:8080")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(req.header("HOST"), Some("127.0.0.1:8080"));
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_str())
    }

    /// The Content-Length header parsed as a usize.
    ///
    /// Returns 0 if the header is missing or not a valid number.
    pub fn content_length(&self) -> usize {
        self.header("content-length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    /// The client's Connection header value, trimmed, if present.
    pub fn connection_token(&self) -> Option<&str> {
        self.header("connection").map(str::trim)
    }
}

/// Builder for constructing Request values outside the parser (tests mostly).
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    version: Option<Version>,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            path: None,
            version: None,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    /// Inserts a header, lowercasing the key the way the parser does.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(key.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        Ok(Request {
            method: self.method.ok_or("method missing")?,
            path: self.path.ok_or("path missing")?,
            version: self.version.unwrap_or(Version::Http11),
            headers: self.headers,
            body: self.body,
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
