//! Listener-side plumbing: the accept loop and the bounded worker pool that
//! owns session execution.

pub mod acceptor;
pub mod pool;
