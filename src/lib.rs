//! rampart - hardened HTTP/1.1 static-file and upload server.
//!
//! A bounded worker pool drives per-connection sessions that parse, validate
//! (Host and path containment), dispatch, and respond with keep-alive
//! semantics.

pub mod config;
pub mod handlers;
pub mod http;
pub mod security;
pub mod server;
