//! Demo preview server for the Lume bar.
//!
//! Serves the demo page and data document from a fixed route table and hosts
//! a WebSocket endpoint that broadcasts a reload signal to every connected
//! client whenever any client sends a message. This is preview scaffolding,
//! not a general-purpose file server.

pub mod http;

pub use http::{DemoServer, ReloadSignal, RunningDemoServer, resolve_bind_address};
