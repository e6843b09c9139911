//! Bounded worker pool with a FIFO admission queue.
//!
//! N long-lived worker tasks draw connections from one bounded channel. An
//! idle worker awaits the queue (no polling); a busy worker finishes its
//! session, socket fully closed, before taking the next connection. Admission
//! is strictly in arrival order; at most N sessions ever run at once.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::Mutex;
use tracing::{debug, info_span, warn, Instrument};

use crate::http::connection::Connection;

/// Result of [`WorkerPool::submit`]. Overflow hands the connection back so
/// the acceptor can write its 503 without consuming a pool slot.
pub enum Submit {
    Admitted,
    Overflow(Connection),
}

pub struct WorkerPool {
    queue: mpsc::Sender<Connection>,
    busy: Arc<AtomicUsize>,
}

impl WorkerPool {
    /// Spawns `workers` worker tasks sharing a queue bounded at
    /// `queue_capacity`.
    pub fn start(workers: usize, queue_capacity: usize) -> Self {
        let (queue, receiver) = mpsc::channel::<Connection>(queue_capacity);
        let receiver = Arc::new(Mutex::new(receiver));
        let busy = Arc::new(AtomicUsize::new(0));

        for id in 0..workers {
            let receiver = Arc::clone(&receiver);
            let busy = Arc::clone(&busy);
            tokio::spawn(async move {
                loop {
                    // The lock is held only for the dequeue, never across a
                    // session, so idle workers contend only on hand-off.
                    let next = receiver.lock().await.recv().await;
                    let Some(mut conn) = next else {
                        break;
                    };

                    busy.fetch_add(1, Ordering::SeqCst);
                    let peer = conn.peer();
                    async {
                        debug!(%peer, "session started");
                        if let Err(err) = conn.run().await {
                            warn!(%peer, %err, "session aborted");
                        }
                    }
                    .instrument(info_span!("worker", id))
                    .await;
                    busy.fetch_sub(1, Ordering::SeqCst);
                }
            });
        }

        Self { queue, busy }
    }

    /// Admits a connection: handed to an idle worker immediately, or queued
    /// if the queue has room. A full queue hands the connection back.
    pub fn submit(&self, conn: Connection) -> Submit {
        match self.queue.try_send(conn) {
            Ok(()) => Submit::Admitted,
            Err(TrySendError::Full(conn)) | Err(TrySendError::Closed(conn)) => {
                Submit::Overflow(conn)
            }
        }
    }

    /// Workers currently running a session.
    pub fn busy_workers(&self) -> usize {
        self.busy.load(Ordering::SeqCst)
    }

    /// Connections admitted but not yet picked up by a worker.
    pub fn queue_depth(&self) -> usize {
        self.queue.max_capacity() - self.queue.capacity()
    }
}
