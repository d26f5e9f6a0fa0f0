//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe backends over UDP
//! - Update backend health flags based on results

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::broadcast;
use tokio::time;

use crate::config::HealthCheckConfig;
use crate::load_balancer::pool::BackendPool;
use crate::net::{HEALTH_PROBE, MAX_DATAGRAM_SIZE};
use crate::observability::metrics;

pub struct HealthMonitor {
    backends: Arc<BackendPool>,
    config: HealthCheckConfig,
}

impl HealthMonitor {
    pub fn new(backends: Arc<BackendPool>, config: HealthCheckConfig) -> Self {
        Self { backends, config }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.config.interval_secs,
            timeout_ms = self.config.timeout_ms,
            "Health monitor starting"
        );

        let mut ticker = time::interval(self.config.interval());

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    async fn check_all(&self) {
        for backend in self.backends.all_backends() {
            let addr = backend.addr;
            let healthy = probe(addr, self.config.probe_timeout()).await;

            let was_healthy = backend.set_healthy(healthy);
            if healthy && !was_healthy {
                tracing::info!(addr = %addr, "Backend recovered, rejoining rotation");
            } else if !healthy && was_healthy {
                tracing::warn!(addr = %addr, "Backend failed probe, removed from rotation");
            }

            metrics::record_backend_health(&addr.to_string(), healthy);
        }
    }
}

/// Probe a single backend: sentinel out, any reply before the deadline in.
///
/// Every failure mode (bind, send, timeout, socket error) is the same
/// answer: unhealthy. Probes never raise.
async fn probe(addr: SocketAddr, timeout: Duration) -> bool {
    let socket = match UdpSocket::bind("0.0.0.0:0").await {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(addr = %addr, error = %e, "Health probe failed: socket bind");
            return false;
        }
    };

    if let Err(e) = socket.connect(addr).await {
        tracing::debug!(addr = %addr, error = %e, "Health probe failed: connect");
        return false;
    }

    if let Err(e) = socket.send(HEALTH_PROBE).await {
        tracing::debug!(addr = %addr, error = %e, "Health probe failed: send");
        return false;
    }

    // The reply bytes are not inspected; arrival before the deadline is
    // the health signal.
    let mut buf = [0u8; MAX_DATAGRAM_SIZE];
    match time::timeout(timeout, socket.recv(&mut buf)).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            tracing::debug!(addr = %addr, error = %e, "Health probe failed: recv");
            false
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::HEALTH_ACK;

    #[tokio::test]
    async fn probe_marks_responding_backend_healthy() {
        let backend = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = backend.local_addr().unwrap();

        tokio::spawn(async move {
            let mut buf = [0u8; MAX_DATAGRAM_SIZE];
            let (len, peer) = backend.recv_from(&mut buf).await.unwrap();
            assert_eq!(&buf[..len], HEALTH_PROBE);
            backend.send_to(HEALTH_ACK, peer).await.unwrap();
        });

        assert!(probe(addr, Duration::from_millis(500)).await);
    }

    #[tokio::test]
    async fn probe_marks_silent_backend_unhealthy() {
        // Bound but never answering.
        let backend = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = backend.local_addr().unwrap();

        assert!(!probe(addr, Duration::from_millis(100)).await);
    }

    #[tokio::test]
    async fn monitor_flips_flag_for_dead_backend() {
        // Reserve an address, then free it so nothing answers there.
        let placeholder = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = placeholder.local_addr().unwrap();
        drop(placeholder);

        let pool = Arc::new(BackendPool::new(vec![addr]));
        let config = HealthCheckConfig {
            interval_secs: 1,
            timeout_ms: 100,
        };

        let (tx, rx) = broadcast::channel(1);
        let monitor = HealthMonitor::new(pool.clone(), config);
        tokio::spawn(monitor.run(rx));

        // First tick fires immediately; give it the probe timeout plus slack.
        time::sleep(Duration::from_millis(400)).await;
        assert!(!pool.all_backends()[0].is_healthy());
        let _ = tx.send(());
    }
}
