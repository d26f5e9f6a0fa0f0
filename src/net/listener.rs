//! UDP listener with handler backpressure.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Receive inbound datagrams
//! - Enforce max_in_flight limit via semaphore
//! - Hand the socket to handlers for replies

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::Semaphore;

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug)]
pub enum ListenerError {
    /// Failed to bind to address.
    Bind(std::io::Error),
    /// Failed to receive a datagram.
    Recv(std::io::Error),
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerError::Bind(e) => write!(f, "Failed to bind: {}", e),
            ListenerError::Recv(e) => write!(f, "Failed to receive: {}", e),
        }
    }
}

impl std::error::Error for ListenerError {}

/// A bounded UDP listener that limits concurrent request handlers.
///
/// Uses a semaphore to enforce `max_in_flight`. Unlike a stream listener
/// there is no connection to refuse: when the limit is reached the datagram
/// is dropped, which the client observes as a timeout.
pub struct UdpListener {
    /// The underlying UDP socket, shared with handlers for replies.
    socket: Arc<UdpSocket>,
    /// Semaphore limiting concurrent in-flight handlers.
    in_flight: Arc<Semaphore>,
    /// Configured maximum in-flight handlers.
    max_in_flight: usize,
}

impl UdpListener {
    /// Bind to the configured address.
    pub async fn bind(config: &ListenerConfig) -> Result<Self, ListenerError> {
        let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
            ListenerError::Bind(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
        })?;

        let socket = UdpSocket::bind(addr).await.map_err(ListenerError::Bind)?;
        let local_addr = socket.local_addr().map_err(ListenerError::Bind)?;

        tracing::info!(
            address = %local_addr,
            max_in_flight = config.max_in_flight,
            "Listener bound"
        );

        Ok(Self {
            socket: Arc::new(socket),
            in_flight: Arc::new(Semaphore::new(config.max_in_flight)),
            max_in_flight: config.max_in_flight,
        })
    }

    /// Receive the next datagram into `buf`.
    pub async fn recv(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr), ListenerError> {
        self.socket.recv_from(buf).await.map_err(ListenerError::Recv)
    }

    /// Try to reserve an in-flight handler slot.
    ///
    /// Returns `None` when the limit has been reached; the caller drops the
    /// datagram in that case.
    pub fn try_permit(&self) -> Option<HandlerPermit> {
        self.in_flight
            .clone()
            .try_acquire_owned()
            .ok()
            .map(|permit| HandlerPermit { _permit: permit })
    }

    /// The socket handlers reply on.
    pub fn socket(&self) -> Arc<UdpSocket> {
        self.socket.clone()
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.socket.local_addr()
    }

    /// Get current available handler slots.
    pub fn available_permits(&self) -> usize {
        self.in_flight.available_permits()
    }

    /// Get configured maximum in-flight handlers.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }
}

/// A permit representing an in-flight handler slot.
///
/// When dropped, the slot is released back to the pool. This keeps the
/// bound accurate even if the handler task panics.
#[derive(Debug)]
pub struct HandlerPermit {
    _permit: tokio::sync::OwnedSemaphorePermit,
}
