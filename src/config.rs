//! Server configuration: serde-deserializable, loadable from a YAML file,
//! with defaults matching the stock deployment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Bind host; also the host part of the authority clients must send.
    pub host: String,
    /// Bind port. 0 asks the OS for an ephemeral port (tests rely on this).
    pub port: u16,
    /// Worker-pool size: at most this many sessions run concurrently.
    pub workers: usize,
    /// Admission-queue bound. Connections past workers + queue get a 503.
    pub queue_capacity: usize,
    /// Root directory GET paths resolve under.
    pub resources_dir: PathBuf,
    /// Idle deadline for the next request on a persistent connection.
    pub keep_alive_timeout_secs: u64,
    /// Requests served on one connection before it is forced closed.
    pub max_requests: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: 10,
            queue_capacity: 50,
            resources_dir: PathBuf::from("resources"),
            keep_alive_timeout_secs: 30,
            max_requests: 100,
        }
    }
}

impl Config {
    /// Loads configuration from a YAML file. Missing keys fall back to the
    /// defaults; unknown keys are rejected so typos surface at startup.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.workers >= 1, "workers must be at least 1");
        anyhow::ensure!(self.queue_capacity >= 1, "queue_capacity must be at least 1");
        anyhow::ensure!(self.max_requests >= 1, "max_requests must be at least 1");
        anyhow::ensure!(
            self.keep_alive_timeout_secs >= 1,
            "keep_alive_timeout_secs must be at least 1"
        );
        Ok(())
    }

    /// The `host:port` string the listener binds.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Uploads live in a fixed subdirectory of the resource root, so stored
    /// documents are themselves servable via GET `/uploads/...`.
    pub fn uploads_dir(&self) -> PathBuf {
        self.resources_dir.join("uploads")
    }

    pub fn keep_alive_timeout(&self) -> Duration {
        Duration::from_secs(self.keep_alive_timeout_secs)
    }
}
