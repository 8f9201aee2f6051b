use crate::{create_router, AppState};
use anyhow::Context;
use auditai_core::AuditConfig;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};

pub struct Server {
    state: AppState,
    addr: SocketAddr,
}

impl Server {
    pub fn new(addr: SocketAddr, state: AppState) -> Self {
        Self { state, addr }
    }

    pub async fn from_config(config: &AuditConfig) -> anyhow::Result<Self> {
        let addr = resolve_listen_addr(&config.server.host, config.server.port).await?;
        let state = AppState::from_config(config)?;
        Ok(Self::new(addr, state))
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let router = create_router(self.state);

        info!("Starting AuditAI API server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.addr))?;

        info!("Server listening on http://{}", self.addr);
        info!("API endpoints:");
        info!("  POST /contract - Analyze a contract address or source code");
        info!("  GET /health - Health check");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;

        Ok(())
    }
}

/// Resolve a configured host (IP literal or hostname) and port to a socket address.
pub async fn resolve_listen_addr(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("Failed to resolve listen address {}:{}", host, port))?
        .next()
        .with_context(|| format!("No address found for {}:{}", host, port))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            warn!("Received SIGTERM, shutting down");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    #[tokio::test]
    async fn test_resolve_ip_literals() {
        let addr = resolve_listen_addr("127.0.0.1", 5000).await.unwrap();
        assert_eq!(addr, SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 5000));

        for host in ["::1", "[::1]"] {
            let addr = resolve_listen_addr(host, 5000).await.unwrap();
            assert_eq!(addr, SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), 5000));
        }
    }

    #[tokio::test]
    async fn test_resolve_localhost() {
        let addr = resolve_listen_addr("localhost", 5000).await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 5000);
    }
}
