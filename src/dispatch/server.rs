//! Dispatcher setup and the per-request state machine.
//!
//! # Responsibilities
//! - Build all shared state from configuration
//! - Run the receive loop, spawning one handler task per datagram
//! - Spawn the long-lived companions (health monitor, janitor, admin API)
//! - Walk each request through rate check → cache → selection → forward

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::sync::broadcast;
use tokio::time;
use uuid::Uuid;

use crate::admin::{self, AdminState};
use crate::cache::ResponseCache;
use crate::config::BalancerConfig;
use crate::health::HealthMonitor;
use crate::lifecycle::Shutdown;
use crate::load_balancer::pool::{BackendPool, NoHealthyBackend};
use crate::net::listener::{ListenerError, UdpListener};
use crate::net::MAX_DATAGRAM_SIZE;
use crate::observability::metrics;
use crate::registry::ActiveClientRegistry;
use crate::security::RateLimiter;

/// Request-scoped dispatch failures.
///
/// None of these is fatal: the handler logs the outcome, sends nothing to
/// the client, and the listener keeps receiving.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Client exceeded its sliding-window quota.
    #[error("rate limit exceeded for {0}")]
    RateLimited(IpAddr),

    /// The healthy subset is empty.
    #[error(transparent)]
    NoHealthyBackend(#[from] NoHealthyBackend),

    /// The selected backend did not reply within the bounded wait.
    #[error("backend {0} timed out")]
    BackendTimeout(SocketAddr),

    /// Reaching the backend failed outright.
    #[error("backend {addr} unreachable: {source}")]
    BackendUnreachable {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The reply to the client could not be sent.
    #[error("socket error: {0}")]
    Socket(#[from] std::io::Error),
}

/// How an admitted request was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Served from the response cache.
    CacheHit,
    /// Forwarded to the given backend and answered.
    Forwarded(SocketAddr),
}

/// State shared by every request handler.
#[derive(Clone)]
pub struct DispatchState {
    pub backends: Arc<BackendPool>,
    pub limiter: Arc<RateLimiter>,
    pub cache: Arc<ResponseCache>,
    pub registry: Arc<ActiveClientRegistry>,
    /// The listening socket; replies to clients go out here.
    reply_socket: Arc<UdpSocket>,
    /// Bounded wait for a backend reply.
    backend_reply_timeout: Duration,
}

/// The balancer's request-handling server.
pub struct Dispatcher {
    listener: UdpListener,
    state: DispatchState,
    config: BalancerConfig,
}

impl Dispatcher {
    /// Bind the listening socket and build all shared state.
    pub async fn bind(config: BalancerConfig) -> Result<Self, ListenerError> {
        let listener = UdpListener::bind(&config.listener).await?;

        let state = DispatchState {
            backends: Arc::new(BackendPool::from_config(&config.backends)),
            limiter: Arc::new(RateLimiter::new(
                config.rate_limit.window(),
                config.rate_limit.max_requests,
            )),
            cache: Arc::new(ResponseCache::new(config.cache.ttl())),
            registry: Arc::new(ActiveClientRegistry::new()),
            reply_socket: listener.socket(),
            backend_reply_timeout: config.timeouts.backend_reply(),
        };

        Ok(Self {
            listener,
            state,
            config,
        })
    }

    /// Get the address the listener actually bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.listener.local_addr()
    }

    /// Get a handle on the shared state (used by tests and the admin API).
    pub fn state(&self) -> DispatchState {
        self.state.clone()
    }

    /// Run the receive loop until shutdown is signalled.
    ///
    /// Spawns the health monitor, the janitor sweep, and (when enabled)
    /// the admin API before entering the loop.
    pub async fn run(self, shutdown: Arc<Shutdown>) -> Result<(), ListenerError> {
        let monitor = HealthMonitor::new(
            self.state.backends.clone(),
            self.config.health_check.clone(),
        );
        tokio::spawn(monitor.run(shutdown.subscribe()));

        tokio::spawn(janitor(
            self.state.cache.clone(),
            self.state.limiter.clone(),
            self.config.cache.sweep_interval(),
            shutdown.subscribe(),
        ));

        if self.config.admin.enabled {
            let admin_state = AdminState {
                backends: self.state.backends.clone(),
                cache: self.state.cache.clone(),
                registry: self.state.registry.clone(),
            };
            tokio::spawn(admin::run(
                admin_state,
                self.config.admin.bind_address.clone(),
                shutdown.subscribe(),
            ));
        }

        tracing::info!(
            backends = self.state.backends.all_backends().len(),
            max_in_flight = self.listener.max_in_flight(),
            "Dispatcher starting"
        );

        let mut shutdown_rx = shutdown.subscribe();
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];

        loop {
            tokio::select! {
                result = self.listener.recv(&mut buf) => {
                    match result {
                        Ok((len, peer)) => {
                            let Some(permit) = self.listener.try_permit() else {
                                // Saturation looks like rate limiting from
                                // the client's side: nothing comes back.
                                tracing::warn!(peer = %peer, "In-flight limit reached, dropping datagram");
                                metrics::record_request("overloaded");
                                continue;
                            };

                            let payload = buf[..len].to_vec();
                            let state = self.state.clone();
                            tokio::spawn(async move {
                                handle_request(state, payload, peer).await;
                                drop(permit);
                            });
                        }
                        Err(e) => {
                            // Transport faults abandon the datagram, never
                            // the listener.
                            tracing::error!(error = %e, "Receive error, continuing");
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Dispatcher received shutdown signal, exiting receive loop");
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Handle one inbound request to its terminal outcome.
async fn handle_request(state: DispatchState, payload: Vec<u8>, peer: SocketAddr) {
    let request_id = Uuid::new_v4();

    match dispatch(&state, &payload, peer).await {
        Ok(DispatchOutcome::CacheHit) => {
            tracing::debug!(request_id = %request_id, peer = %peer, "Served from cache");
            metrics::record_request("cache_hit");
        }
        Ok(DispatchOutcome::Forwarded(backend)) => {
            tracing::debug!(
                request_id = %request_id,
                peer = %peer,
                backend = %backend,
                "Forwarded and answered"
            );
            metrics::record_request("forwarded");
        }
        Err(error) => {
            record_drop(&error);
            match &error {
                DispatchError::RateLimited(client) => {
                    tracing::warn!(request_id = %request_id, client = %client, "Rate limit exceeded, dropping request");
                }
                DispatchError::NoHealthyBackend(_) => {
                    tracing::warn!(request_id = %request_id, peer = %peer, "No healthy backends, dropping request");
                }
                DispatchError::BackendTimeout(backend) => {
                    tracing::warn!(request_id = %request_id, backend = %backend, "Backend reply timed out, dropping request");
                }
                DispatchError::BackendUnreachable { addr, source } => {
                    tracing::warn!(request_id = %request_id, backend = %addr, error = %source, "Backend unreachable, dropping request");
                }
                DispatchError::Socket(e) => {
                    tracing::error!(request_id = %request_id, peer = %peer, error = %e, "Socket error while replying");
                }
            }
        }
    }
}

fn record_drop(error: &DispatchError) {
    let outcome = match error {
        DispatchError::RateLimited(_) => {
            metrics::record_rate_limited();
            "rate_limited"
        }
        DispatchError::NoHealthyBackend(_) => "no_backend",
        DispatchError::BackendTimeout(_) => "backend_timeout",
        DispatchError::BackendUnreachable { .. } => "backend_unreachable",
        DispatchError::Socket(_) => "socket_error",
    };
    metrics::record_request(outcome);
}

/// Walk one request through rate check → cache → selection → forward.
///
/// Failure paths return without sending anything to the client;
/// rate-limit, no-backend, and backend-failure outcomes all look
/// identical on the wire.
async fn dispatch(
    state: &DispatchState,
    payload: &[u8],
    peer: SocketAddr,
) -> Result<DispatchOutcome, DispatchError> {
    let client = peer.ip();

    if !state.limiter.check_and_record(client) {
        return Err(DispatchError::RateLimited(client));
    }

    if let Some(cached) = state.cache.get(payload) {
        state.reply_socket.send_to(&cached, peer).await?;
        state.registry.touch(client);
        return Ok(DispatchOutcome::CacheHit);
    }

    let backend = state.backends.select()?;
    let reply = forward(payload, backend.addr, state.backend_reply_timeout).await?;

    // Insert-or-replace: when two handlers race on the same cold key the
    // later response wins and carries the fresher timestamp.
    state.cache.insert(payload.to_vec(), reply.clone());
    metrics::record_cache_size(state.cache.len());

    state.reply_socket.send_to(&reply, peer).await?;
    state.registry.touch(client);
    metrics::record_active_clients(state.registry.len());

    Ok(DispatchOutcome::Forwarded(backend.addr))
}

/// Forward `payload` over a fresh transient socket and await the reply.
///
/// The socket is connected, so datagrams from any other source are
/// filtered out. A failure here says nothing about backend health; that
/// determination belongs to the health monitor alone.
async fn forward(
    payload: &[u8],
    addr: SocketAddr,
    wait: Duration,
) -> Result<Vec<u8>, DispatchError> {
    let unreachable = |source| DispatchError::BackendUnreachable { addr, source };

    let socket = UdpSocket::bind("0.0.0.0:0").await.map_err(unreachable)?;
    socket.connect(addr).await.map_err(unreachable)?;
    socket.send(payload).await.map_err(unreachable)?;

    let mut buf = [0u8; MAX_DATAGRAM_SIZE];
    let len = time::timeout(wait, socket.recv(&mut buf))
        .await
        .map_err(|_| DispatchError::BackendTimeout(addr))?
        .map_err(unreachable)?;

    Ok(buf[..len].to_vec())
}

/// Background sweep bounding what the lazy expiry paths never revisit:
/// cache entries nobody looks up again and rate-limit logs of clients
/// that never return.
async fn janitor(
    cache: Arc<ResponseCache>,
    limiter: Arc<RateLimiter>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = time::interval(interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                cache.purge_expired();
                limiter.purge_idle();
                metrics::record_cache_size(cache.len());
            }
            _ = shutdown.recv() => {
                tracing::info!("Janitor received shutdown signal, exiting loop");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn forward_returns_backend_reply() {
        let backend = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = backend.local_addr().unwrap();

        tokio::spawn(async move {
            let mut buf = [0u8; MAX_DATAGRAM_SIZE];
            let (len, peer) = backend.recv_from(&mut buf).await.unwrap();
            let mut reply = b"echo:".to_vec();
            reply.extend_from_slice(&buf[..len]);
            backend.send_to(&reply, peer).await.unwrap();
        });

        let reply = forward(b"abc", addr, Duration::from_millis(500))
            .await
            .unwrap();
        assert_eq!(reply, b"echo:abc");
    }

    #[tokio::test]
    async fn forward_times_out_on_silent_backend() {
        let backend = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = backend.local_addr().unwrap();

        let result = forward(b"abc", addr, Duration::from_millis(100)).await;
        assert!(matches!(result, Err(DispatchError::BackendTimeout(a)) if a == addr));
    }
}
