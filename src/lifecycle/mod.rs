//! Lifecycle management.
//!
//! Startup wiring lives in `main.rs`; this module owns shutdown
//! coordination. Every long-running task (server loop, health monitor,
//! admin API) subscribes to one broadcast channel and exits when it fires.

pub mod shutdown;

pub use shutdown::Shutdown;
