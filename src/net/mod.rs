//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming UDP datagram
//!     → listener.rs (bound socket, in-flight handler permits)
//!     → Hand off to dispatch layer
//!
//! Outgoing:
//!     replies go out on the listening socket
//!     backend forwarding uses a transient per-request socket
//! ```
//!
//! # Design Decisions
//! - Payloads are opaque bytes, capped at 512 bytes per datagram
//! - Health probes share the wire with queries, distinguished by sentinel
//! - Bounded in-flight permits prevent handler-task exhaustion

pub mod listener;

/// Maximum datagram payload size in bytes.
pub const MAX_DATAGRAM_SIZE: usize = 512;

/// Payload a health probe carries. Backends must recognize it.
pub const HEALTH_PROBE: &[u8] = b"health_check";

/// Payload a backend answers a health probe with.
pub const HEALTH_ACK: &[u8] = b"healthy";
