//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;

use udp_balancer::config::{BackendConfig, BalancerConfig};
use udp_balancer::dispatch::{DispatchState, Dispatcher};
use udp_balancer::lifecycle::Shutdown;
use udp_balancer::net::{HEALTH_ACK, HEALTH_PROBE, MAX_DATAGRAM_SIZE};

/// Start a mock backend on an ephemeral port: acks probes, answers queries
/// with `<tag>:<payload>`. Returns its address and a served-query counter.
pub async fn start_mock_backend(tag: &'static str) -> (SocketAddr, Arc<AtomicU32>) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    let served = start_backend_loop(socket, tag);
    (addr, served)
}

/// Start a mock backend on a specific address (used to "revive" a backend
/// whose address the balancer already knows).
#[allow(dead_code)]
pub async fn start_mock_backend_at(addr: SocketAddr, tag: &'static str) -> Arc<AtomicU32> {
    let socket = UdpSocket::bind(addr).await.unwrap();
    start_backend_loop(socket, tag)
}

fn start_backend_loop(socket: UdpSocket, tag: &'static str) -> Arc<AtomicU32> {
    let served = Arc::new(AtomicU32::new(0));
    let counter = served.clone();

    tokio::spawn(async move {
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];
        loop {
            let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                break;
            };
            let payload = &buf[..len];

            if payload == HEALTH_PROBE {
                let _ = socket.send_to(HEALTH_ACK, peer).await;
                continue;
            }

            counter.fetch_add(1, Ordering::SeqCst);
            let mut reply = format!("{}:", tag).into_bytes();
            reply.extend_from_slice(payload);
            let _ = socket.send_to(&reply, peer).await;
        }
    });

    served
}

/// Start a backend that acks probes but never answers queries.
#[allow(dead_code)]
pub async fn start_black_hole_backend() -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();

    tokio::spawn(async move {
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];
        loop {
            let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                break;
            };
            if &buf[..len] == HEALTH_PROBE {
                let _ = socket.send_to(HEALTH_ACK, peer).await;
            }
        }
    });

    addr
}

/// Reserve a loopback address with nothing listening on it.
#[allow(dead_code)]
pub async fn dead_addr() -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    drop(socket);
    addr
}

/// Configuration tuned for fast tests: ephemeral listener port, short
/// probe cycle, generous rate limit (tests that exercise the limiter
/// tighten it themselves), admin API off.
pub fn test_config(backends: &[SocketAddr]) -> BalancerConfig {
    let mut config = BalancerConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.backends = backends
        .iter()
        .map(|addr| BackendConfig {
            address: addr.to_string(),
        })
        .collect();
    config.health_check.interval_secs = 1;
    config.health_check.timeout_ms = 200;
    config.rate_limit.window_secs = 60;
    config.rate_limit.max_requests = 1000;
    config.timeouts.backend_reply_ms = 500;
    config.admin.enabled = false;
    config
}

/// Bind and spawn a balancer; hand back its address, a state handle, and
/// the shutdown coordinator.
pub async fn start_balancer(config: BalancerConfig) -> (SocketAddr, DispatchState, Arc<Shutdown>) {
    let dispatcher = Dispatcher::bind(config).await.unwrap();
    let addr = dispatcher.local_addr().unwrap();
    let state = dispatcher.state();

    let shutdown = Arc::new(Shutdown::new());
    tokio::spawn(dispatcher.run(shutdown.clone()));

    (addr, state, shutdown)
}

/// Send one query and wait up to `wait_ms` for the reply.
/// `None` is the silent-drop outcome a real client sees as a timeout.
pub async fn query(balancer: SocketAddr, payload: &[u8], wait_ms: u64) -> Option<Vec<u8>> {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket.connect(balancer).await.unwrap();
    socket.send(payload).await.unwrap();

    let mut buf = [0u8; MAX_DATAGRAM_SIZE];
    match tokio::time::timeout(Duration::from_millis(wait_ms), socket.recv(&mut buf)).await {
        Ok(Ok(len)) => Some(buf[..len].to_vec()),
        _ => None,
    }
}
