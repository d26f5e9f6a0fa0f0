//! Client load simulator.
//!
//! Spawns a handful of simulated clients firing randomized queries at the
//! balancer. Silent drops (rate limiting, dead backends, saturation)
//! surface here as receive timeouts, which is exactly what a real client
//! would see.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use rand::Rng;
use tokio::net::UdpSocket;
use tokio::time;

use udp_balancer::net::MAX_DATAGRAM_SIZE;

#[derive(Parser)]
#[command(name = "client-sim")]
#[command(about = "Load generator for the UDP balancer", long_about = None)]
struct Cli {
    /// Balancer address to query.
    #[arg(short, long, default_value = "127.0.0.1:1245")]
    target: SocketAddr,

    /// Number of concurrent simulated clients.
    #[arg(short, long, default_value_t = 4)]
    clients: usize,

    /// How long to wait for a reply before calling it dropped, in ms.
    #[arg(long, default_value_t = 3000)]
    reply_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    tracing::info!(
        target = %cli.target,
        clients = cli.clients,
        "Starting client simulation"
    );

    for id in 0..cli.clients {
        let target = cli.target;
        let wait = Duration::from_millis(cli.reply_timeout_ms);
        tokio::spawn(simulate_client(id, target, wait));
    }

    tokio::signal::ctrl_c().await?;
    Ok(())
}

async fn simulate_client(id: usize, target: SocketAddr, wait: Duration) {
    let socket = match UdpSocket::bind("0.0.0.0:0").await {
        Ok(socket) => socket,
        Err(e) => {
            tracing::error!(client = id, error = %e, "Socket bind failed");
            return;
        }
    };
    if let Err(e) = socket.connect(target).await {
        tracing::error!(client = id, error = %e, "Connect failed");
        return;
    }

    let mut buf = [0u8; MAX_DATAGRAM_SIZE];
    loop {
        // Rng is not held across await points.
        let (value, delay_ms) = {
            let mut rng = rand::thread_rng();
            (rng.gen_range(1..=100u32), rng.gen_range(500..=2000u64))
        };
        let query = format!("Request from client-{}: {}", id, value);

        if let Err(e) = socket.send(query.as_bytes()).await {
            tracing::warn!(client = id, error = %e, "Send failed");
        } else {
            match time::timeout(wait, socket.recv(&mut buf)).await {
                Ok(Ok(len)) => {
                    tracing::info!(
                        client = id,
                        reply = %String::from_utf8_lossy(&buf[..len]),
                        "Answered"
                    );
                }
                Ok(Err(e)) => {
                    tracing::warn!(client = id, error = %e, "Receive error");
                }
                Err(_) => {
                    tracing::info!(client = id, "No reply (dropped or timed out)");
                }
            }
        }

        time::sleep(Duration::from_millis(delay_ms)).await;
    }
}
