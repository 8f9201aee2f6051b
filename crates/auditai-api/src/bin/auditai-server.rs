use auditai_api::{bootstrap_subscriber, init_tracing, Server};
use auditai_core::ConfigManager;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "auditai-server", version, about = "AuditAI smart contract analysis server")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides configuration)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides configuration)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // The log format comes from configuration, so load it under a temporary subscriber
    let manager = tracing::subscriber::with_default(bootstrap_subscriber(), || {
        ConfigManager::load_from(args.config.as_deref())
    })?;
    let mut config = manager.config().clone();
    init_tracing(&config.logging)?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    info!(
        config_file = ?manager.config_path(),
        provider = %config.llm.provider,
        "Configuration loaded"
    );

    Server::from_config(&config).await?.run().await
}
