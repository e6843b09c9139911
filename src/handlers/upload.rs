//! POST handler: validates and stores JSON documents.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;
use serde_json::json;
use tracing::info;

use crate::http::response::{Response, StatusCode};

/// Process-wide upload sequence. Filenames combine a wall-clock timestamp
/// with this counter, so concurrent uploads in the same second never collide.
static UPLOAD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

pub struct JsonUpload {
    dir: PathBuf,
}

impl JsonUpload {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Stores a request body as a new JSON file in the uploads directory.
    ///
    /// The body must parse as JSON; if it does, the raw bytes are stored
    /// verbatim — re-serializing would silently normalize user data. An
    /// unparseable body is a client error (JSON-bodied 400), not an internal
    /// failure.
    pub async fn store(&self, body: &[u8]) -> anyhow::Result<Response> {
        if serde_json::from_slice::<serde_json::Value>(body).is_err() {
            return Ok(Response::json(
                StatusCode::BadRequest,
                &json!({ "error": "request body is not valid JSON" }),
            ));
        }

        let sequence = UPLOAD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let name = format!(
            "upload_{}_{}.json",
            chrono::Utc::now().format("%Y%m%d_%H%M%S"),
            sequence
        );
        let path = self.dir.join(&name);
        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("writing upload {}", path.display()))?;
        info!(file = %name, bytes = body.len(), "upload stored");

        Ok(Response::json(
            StatusCode::Created,
            &json!({ "created": format!("/uploads/{name}") }),
        ))
    }
}
