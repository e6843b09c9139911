//! HTTP protocol implementation.
//!
//! - **`connection`**: the per-connection session state machine
//! - **`parser`**: parses incoming requests from byte buffers
//! - **`request`**: request representation and lookup helpers
//! - **`response`**: response representation with builder pattern
//! - **`writer`**: serializes and writes responses to the client
//!
//! # Connection State Machine
//!
//! Each connection loops through the session states:
//!
//! ```text
//!        ┌────────────────┐
//!        │  AwaitRequest  │ ← Read under the idle deadline, parse
//!        └───────┬────────┘
//!                │ Request parsed (validate, dispatch)
//!                ▼
//!        ┌────────────────┐
//!        │    Respond     │ ← Write the response
//!        └───────┬────────┘
//!                ├─ Keep-Alive → AwaitRequest (same connection)
//!                └─ Close → connection shut down
//! ```

pub mod connection;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
