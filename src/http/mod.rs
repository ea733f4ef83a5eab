//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum catch-all router, request ID, trace layer)
//!     → strategy picks a healthy backend
//!     → request forwarded with a bounded timeout
//!     → latency at first byte fed back to the strategy
//!     → backend response streamed to the client
//! ```

pub mod server;

pub use server::{AppState, GatewayServer};
