//! Request validation that must pass before any handler or filesystem work.
//!
//! Two concerns live here: the Host header must equal the configured
//! authority, and a GET path must canonicalize to a location inside the
//! resource root. Handlers only ever see inputs that already passed.

use std::path::{Path, PathBuf};

use anyhow::Context;
use thiserror::Error;

use crate::http::request::Request;

/// Rejection reasons produced by the gate. Each variant maps to exactly one
/// status code; the session owns that mapping and the logging.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("missing Host header")]
    MissingHost,
    #[error("host {got:?} does not match {expected:?}")]
    HostMismatch { got: String, expected: String },
    #[error("path {0:?} fails the traversal checks")]
    SuspiciousPath(String),
    #[error("path {0:?} resolves outside the resource root")]
    OutsideRoot(String),
    #[error("no resource at {0:?}")]
    NotFound(String),
    #[error("unsupported media type {0:?}")]
    UnsupportedMediaType(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub struct SecurityGate {
    authority: String,
    root: PathBuf,
}

impl SecurityGate {
    /// `authority` is the exact `host:port` clients must send. `root` is
    /// canonicalized here, once; every resolved path is checked against the
    /// canonical form.
    pub fn new(authority: String, root: &Path) -> anyhow::Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("resource root {} is not usable", root.display()))?;
        Ok(Self { authority, root })
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Host check: absent is a 400-class error, present-but-wrong is
    /// 403-class. Runs for every request before anything else.
    pub fn check_host(&self, request: &Request) -> Result<(), GateError> {
        let Some(host) = request.header("host") else {
            return Err(GateError::MissingHost);
        };
        if !authority_matches(&self.authority, host.trim()) {
            return Err(GateError::HostMismatch {
                got: host.to_string(),
                expected: self.authority.clone(),
            });
        }
        Ok(())
    }

    /// Resolves a GET path to a canonical target inside the root.
    ///
    /// The pattern stage (origin-form only, no `..` segment, no doubled
    /// separator) rejects before any filesystem access; canonicalization and
    /// the containment check run after. `Path::starts_with` compares whole
    /// components, so a sibling like `resources_evil` never passes for root
    /// `resources`.
    pub async fn resolve_path(&self, raw_path: &str) -> Result<PathBuf, GateError> {
        if !raw_path.starts_with('/')
            || raw_path.contains("//")
            || raw_path.split('/').any(|segment| segment == "..")
        {
            return Err(GateError::SuspiciousPath(raw_path.to_string()));
        }

        // "/" serves the default document.
        let relative = match raw_path.trim_start_matches('/') {
            "" => "index.html",
            rel => rel,
        };
        let candidate = self.root.join(relative);

        // NotADirectory covers a path routed through a regular file, e.g.
        // /data.txt/x; the target is just as absent as a missing entry.
        let resolved = match tokio::fs::canonicalize(&candidate).await {
            Ok(path) => path,
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
                ) =>
            {
                return Err(GateError::NotFound(raw_path.to_string()));
            }
            Err(e) => return Err(GateError::Io(e)),
        };

        if !resolved.starts_with(&self.root) {
            return Err(GateError::OutsideRoot(raw_path.to_string()));
        }
        Ok(resolved)
    }

    /// POST bodies must be declared `application/json`. Parameters after `;`
    /// are ignored and the media type compares case-insensitively; a missing
    /// header is a mismatch.
    pub fn check_content_type(request: &Request) -> Result<(), GateError> {
        let declared = request.header("content-type").unwrap_or("");
        let media_type = declared.split(';').next().unwrap_or("").trim();
        if media_type.eq_ignore_ascii_case("application/json") {
            Ok(())
        } else {
            Err(GateError::UnsupportedMediaType(declared.to_string()))
        }
    }
}

// Case-insensitive on the host part, exact on the port string; no implied
// default ports.
fn authority_matches(expected: &str, got: &str) -> bool {
    match (expected.rsplit_once(':'), got.rsplit_once(':')) {
        (Some((eh, ep)), Some((gh, gp))) => eh.eq_ignore_ascii_case(gh) && ep == gp,
        (None, None) => expected.eq_ignore_ascii_case(got),
        _ => false,
    }
}
