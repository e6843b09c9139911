//! Accept loop: binds the configured address and feeds the worker pool.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::Config;
use crate::handlers::Handlers;
use crate::http::connection::Connection;
use crate::http::writer;
use crate::security::SecurityGate;
use crate::server::pool::{Submit, WorkerPool};

const RETRY_AFTER_SECS: u64 = 5;

pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    pool: WorkerPool,
    config: Arc<Config>,
    gate: Arc<SecurityGate>,
    handlers: Arc<Handlers>,
}

impl Server {
    /// Prepares the resource layout, binds the listener, and starts the
    /// worker pool. Fails fast on any unusable piece of configuration.
    pub async fn bind(config: Config) -> anyhow::Result<Self> {
        config.validate()?;
        let handlers = Handlers::new(&config).await?;

        let listener = TcpListener::bind(config.listen_addr())
            .await
            .with_context(|| format!("binding {}", config.listen_addr()))?;
        let local_addr = listener.local_addr().context("reading bound address")?;

        // The Host check compares against the actual bound port, so binding
        // port 0 stays coherent.
        let authority = format!("{}:{}", config.host, local_addr.port());
        let gate = SecurityGate::new(authority, &config.resources_dir)?;

        let pool = WorkerPool::start(config.workers, config.queue_capacity);
        info!(
            addr = %local_addr,
            workers = config.workers,
            queue_capacity = config.queue_capacity,
            root = %gate.root().display(),
            "listening"
        );

        Ok(Self {
            listener,
            local_addr,
            pool,
            config: Arc::new(config),
            gate: Arc::new(gate),
            handlers: Arc::new(handlers),
        })
    }

    /// The actual bound address (tests bind port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accepts connections forever, submitting each to the pool. Overflow
    /// gets a minimal 503 written outside the session machinery, spawned so
    /// a slow client never stalls the accept loop.
    pub async fn run(&self) -> anyhow::Result<()> {
        loop {
            let (stream, peer) = self.listener.accept().await.context("accepting connection")?;
            info!(%peer, busy = self.pool.busy_workers(), queued = self.pool.queue_depth(), "connection accepted");

            let conn = Connection::new(
                stream,
                peer,
                Arc::clone(&self.config),
                Arc::clone(&self.gate),
                Arc::clone(&self.handlers),
            );
            if let Submit::Overflow(conn) = self.pool.submit(conn) {
                warn!(%peer, "pool and queue saturated, rejecting with 503");
                tokio::spawn(async move {
                    let mut stream = conn.into_stream();
                    let _ = writer::write_service_unavailable(&mut stream, RETRY_AFTER_SECS).await;
                    let _ = stream.shutdown().await;
                });
            }
        }
    }
}
