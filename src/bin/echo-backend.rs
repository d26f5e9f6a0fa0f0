//! Echo backend worker.
//!
//! The backend collaborator for local runs and load tests: answers the
//! health probe sentinel with the ack sentinel, and any other payload with
//! a readable echo response.

use clap::Parser;
use tokio::net::UdpSocket;

use udp_balancer::net::{HEALTH_ACK, HEALTH_PROBE, MAX_DATAGRAM_SIZE};

#[derive(Parser)]
#[command(name = "echo-backend")]
#[command(about = "UDP echo worker for the balancer", long_about = None)]
struct Cli {
    /// Address to listen on.
    #[arg(short, long, default_value = "127.0.0.1:1250")]
    listen: std::net::SocketAddr,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let socket = UdpSocket::bind(cli.listen).await?;
    tracing::info!(address = %socket.local_addr()?, "Echo backend listening");

    let mut buf = [0u8; MAX_DATAGRAM_SIZE];
    loop {
        let (len, peer) = match socket.recv_from(&mut buf).await {
            Ok(received) => received,
            Err(e) => {
                tracing::error!(error = %e, "Receive error, continuing");
                continue;
            }
        };
        let payload = &buf[..len];

        if payload == HEALTH_PROBE {
            if let Err(e) = socket.send_to(HEALTH_ACK, peer).await {
                tracing::warn!(peer = %peer, error = %e, "Health ack failed");
            }
            continue;
        }

        let mut reply = b"Response for ".to_vec();
        reply.extend_from_slice(payload);
        reply.truncate(MAX_DATAGRAM_SIZE);

        tracing::debug!(peer = %peer, bytes = len, "Answering query");
        if let Err(e) = socket.send_to(&reply, peer).await {
            tracing::warn!(peer = %peer, error = %e, "Reply failed");
        }
    }
}
