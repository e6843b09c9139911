use crate::http::request::{Method, Request, Version};
use std::collections::HashMap;
use thiserror::Error;

/// Hard cap on a full request: head and body together. Reaching it without a
/// complete request is a parse failure, never a bigger buffer.
pub const MAX_REQUEST_BYTES: usize = 8192;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("request head is not valid UTF-8")]
    InvalidEncoding,
    #[error("malformed request line")]
    InvalidRequestLine,
    #[error("unsupported HTTP version {0:?}")]
    InvalidVersion(String),
    #[error("malformed header line")]
    InvalidHeader,
    #[error("invalid Content-Length")]
    InvalidContentLength,
    #[error("request exceeds {} bytes", MAX_REQUEST_BYTES)]
    TooLarge,
    #[error("incomplete request")]
    Incomplete,
}

/// Parses one request from the front of `buf`.
///
/// Returns the request and the number of bytes consumed; the caller drains
/// exactly that many and keeps the rest for the next iteration.
/// [`ParseError::Incomplete`] means "read more and try again" — the session
/// loops on it until the blank line (and, for POST, the declared body)
/// arrives or [`MAX_REQUEST_BYTES`] is hit.
///
/// Policy notes, fixed deliberately:
/// - the request line must have exactly three tokens;
/// - header keys are lowercased, values trimmed; a duplicate key overwrites
///   the earlier one (last wins);
/// - the body is read only for POST and only up to Content-Length, with head
///   and body together capped at [`MAX_REQUEST_BYTES`].
pub fn parse_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    let headers_end = find_headers_end(buf).ok_or(ParseError::Incomplete)?;
    let head_len = headers_end + 4;
    if head_len > MAX_REQUEST_BYTES {
        return Err(ParseError::TooLarge);
    }

    let head = std::str::from_utf8(&buf[..headers_end]).map_err(|_| ParseError::InvalidEncoding)?;
    let mut lines = head.split("\r\n");

    let request_line = lines.next().ok_or(ParseError::InvalidRequestLine)?;
    let mut parts = request_line.split_whitespace();
    let (Some(method_token), Some(path), Some(version_token), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ParseError::InvalidRequestLine);
    };

    let method = Method::parse(method_token);
    let version = Version::parse(version_token)
        .ok_or_else(|| ParseError::InvalidVersion(version_token.to_string()))?;

    let mut headers = HashMap::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        let (key, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;
        headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    // Body applies to POST only; a Content-Length on anything else is ignored
    // and its bytes are left in the buffer.
    let content_length = if method == Method::POST {
        headers
            .get("content-length")
            .map(|v| v.parse::<usize>().map_err(|_| ParseError::InvalidContentLength))
            .transpose()?
            .unwrap_or(0)
    } else {
        0
    };

    if head_len + content_length > MAX_REQUEST_BYTES {
        return Err(ParseError::TooLarge);
    }

    let body_bytes = &buf[head_len..];
    if body_bytes.len() < content_length {
        return Err(ParseError::Incomplete);
    }
    let body = body_bytes[..content_length].to_vec();

    let request = Request {
        method,
        path: path.to_string(),
        version,
        headers,
        body,
    };

    Ok((request, head_len + content_length))
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
