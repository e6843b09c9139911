use anyhow::Context;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::{Body, Response, StatusCode};

const HTTP_VERSION: &str = "HTTP/1.1";

/// Keep-alive parameters echoed to the client when the connection persists.
#[derive(Debug, Clone, Copy)]
pub struct KeepAlive {
    pub timeout_secs: u64,
    pub max_requests: u32,
}

/// Current time as an RFC 7231 IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn http_date() -> String {
    chrono::Utc::now()
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

// Header order is part of the wire contract: Date, Content-Type,
// Content-Length, Content-Disposition, Connection, Keep-Alive.
fn serialize_head(response: &Response, keep_alive: Option<&KeepAlive>) -> Vec<u8> {
    let mut head = Vec::with_capacity(256);

    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        response.status.as_u16(),
        response.status.reason_phrase()
    );
    head.extend_from_slice(status_line.as_bytes());

    head.extend_from_slice(format!("Date: {}\r\n", http_date()).as_bytes());
    if let Some(content_type) = response.content_type {
        head.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
    }
    head.extend_from_slice(format!("Content-Length: {}\r\n", response.body.len()).as_bytes());
    if let Some(disposition) = &response.content_disposition {
        head.extend_from_slice(format!("Content-Disposition: {}\r\n", disposition).as_bytes());
    }
    match keep_alive {
        Some(ka) => {
            head.extend_from_slice(b"Connection: keep-alive\r\n");
            head.extend_from_slice(
                format!("Keep-Alive: timeout={}, max={}\r\n", ka.timeout_secs, ka.max_requests)
                    .as_bytes(),
            );
        }
        None => head.extend_from_slice(b"Connection: close\r\n"),
    }

    head.extend_from_slice(b"\r\n");
    head
}

/// Serializes and writes one complete response: head, then body, then flush.
/// `keep_alive: Some` emits the persistence header pair, `None` emits
/// `Connection: close`. Any error aborts the session; there is no retry and
/// no partially-recovered state.
pub async fn write_response<S>(
    stream: &mut S,
    response: Response,
    keep_alive: Option<KeepAlive>,
) -> anyhow::Result<()>
where
    S: AsyncWrite + Unpin,
{
    let head = serialize_head(&response, keep_alive.as_ref());
    stream.write_all(&head).await.context("writing response head")?;

    match response.body {
        Body::Bytes(bytes) => {
            stream.write_all(&bytes).await.context("writing response body")?;
        }
        Body::File { mut file, len } => {
            let copied = tokio::io::copy(&mut file, stream)
                .await
                .context("streaming file body")?;
            if copied != len {
                anyhow::bail!("file body truncated: wrote {copied} of {len} bytes");
            }
        }
    }

    stream.flush().await.context("flushing response")?;
    Ok(())
}

/// The acceptor's overflow path: a minimal 503 written outside the session
/// machinery. The caller closes the socket afterwards; no worker or queue
/// slot is ever consumed for it.
pub async fn write_service_unavailable<S>(stream: &mut S, retry_after_secs: u64) -> anyhow::Result<()>
where
    S: AsyncWrite + Unpin,
{
    let status = StatusCode::ServiceUnavailable;
    let body = format!(
        "<html><head><title>{code} {reason}</title></head>\
         <body><h1>{code} {reason}</h1><p>The server is over capacity; try again shortly.</p></body></html>\n",
        code = status.as_u16(),
        reason = status.reason_phrase(),
    );
    let head = format!(
        "{} {} {}\r\nDate: {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nRetry-After: {}\r\nConnection: close\r\n\r\n",
        HTTP_VERSION,
        status.as_u16(),
        status.reason_phrase(),
        http_date(),
        body.len(),
        retry_after_secs,
    );

    stream.write_all(head.as_bytes()).await?;
    stream.write_all(body.as_bytes()).await?;
    stream.flush().await?;
    Ok(())
}
