//! GET handler: serves files from the resource root.
//!
//! Paths arriving here already passed the security gate, so the only
//! concerns left are the content-type table and streaming the bytes out.

use std::path::Path;

use anyhow::Context;
use tokio::fs::File;

use crate::http::response::{Response, ResponseBuilder, StatusCode};

/// How a served file is presented to the client.
enum Presentation {
    /// Rendered in the browser.
    Inline(&'static str),
    /// Downloaded as an attachment with an octet-stream type.
    Attachment,
}

// The extension table is closed: a file the server refuses to type is
// treated as absent, not forbidden.
fn presentation_for(extension: &str) -> Option<Presentation> {
    match extension {
        "html" => Some(Presentation::Inline("text/html; charset=utf-8")),
        "txt" | "png" | "jpg" | "jpeg" | "json" => Some(Presentation::Attachment),
        _ => None,
    }
}

/// Strips anything from a filename that could break out of the
/// Content-Disposition header value: path separators, quotes, CR/LF.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '/' | '\\' | '"' | '\r' | '\n'))
        .collect()
}

pub struct StaticFiles;

impl StaticFiles {
    pub fn new() -> Self {
        Self
    }

    /// Serves a pre-validated canonical path. Directories and untyped
    /// extensions are 404s; the file body is streamed, not buffered.
    pub async fn serve(&self, resolved: &Path) -> anyhow::Result<Response> {
        let metadata = tokio::fs::metadata(resolved)
            .await
            .with_context(|| format!("stat {}", resolved.display()))?;
        if metadata.is_dir() {
            return Ok(Response::error(StatusCode::NotFound, "No such resource."));
        }

        let extension = resolved
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let Some(presentation) = presentation_for(&extension) else {
            return Ok(Response::error(StatusCode::NotFound, "No such resource."));
        };

        let file = File::open(resolved)
            .await
            .with_context(|| format!("open {}", resolved.display()))?;

        let builder = ResponseBuilder::new(StatusCode::Ok).file(file, metadata.len());
        let response = match presentation {
            Presentation::Inline(content_type) => builder.content_type(content_type),
            Presentation::Attachment => {
                let name = resolved
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(sanitize_filename)
                    .unwrap_or_default();
                builder
                    .content_type("application/octet-stream")
                    .content_disposition(format!("attachment; filename=\"{name}\""))
            }
        };
        Ok(response.build())
    }
}

impl Default for StaticFiles {
    fn default() -> Self {
        Self::new()
    }
}
