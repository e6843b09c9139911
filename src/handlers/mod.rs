//! The two collaborators the session dispatches into once validation has
//! passed: static file serving for GET, JSON storage for POST.
//!
//! Handlers only ever see pre-validated inputs — a canonical path inside the
//! resource root, or a body whose Content-Type already checked out. Their
//! errors are internal failures; the session maps them to a generic 500.

pub mod files;
pub mod upload;

use std::path::Path;

use anyhow::Context;

use crate::config::Config;
use crate::handlers::files::StaticFiles;
use crate::handlers::upload::JsonUpload;

/// Bundle handed to every connection. Construction fails fast if the
/// resource layout is unusable.
pub struct Handlers {
    pub static_files: StaticFiles,
    pub uploads: JsonUpload,
}

impl Handlers {
    /// Creates the uploads directory if absent and wires up both handlers.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let root: &Path = &config.resources_dir;
        anyhow::ensure!(
            root.is_dir(),
            "resource root {} is not a directory",
            root.display()
        );
        let uploads_dir = config.uploads_dir();
        tokio::fs::create_dir_all(&uploads_dir)
            .await
            .with_context(|| format!("creating uploads directory {}", uploads_dir.display()))?;

        Ok(Self {
            static_files: StaticFiles::new(),
            uploads: JsonUpload::new(uploads_dir),
        })
    }
}
