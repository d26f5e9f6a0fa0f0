//! Dispatch subsystem: the request-handling core.
//!
//! # Data Flow
//! ```text
//! Datagram received on the listening socket
//!     → in-flight permit (or silent drop when saturated)
//!     → per-request handler task:
//!         rate limit check        → silent drop on rejection
//!         cache lookup            → reply on hit
//!         backend selection       → silent drop when none healthy
//!         forward + bounded wait  → silent drop on timeout/error
//!         cache fill → reply → registry upsert
//! ```
//!
//! # Design Decisions
//! - The receive loop never blocks on a handler; every datagram gets its
//!   own task
//! - Dropped requests send nothing back; the client observes a timeout
//!   whichever way the request died
//! - All dispatch failures are request-scoped and leave shared state intact

pub mod server;

pub use server::{DispatchError, DispatchOutcome, DispatchState, Dispatcher};
