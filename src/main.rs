use std::path::PathBuf;

use clap::Parser;

use rampart::config::Config;
use rampart::server::acceptor::Server;

/// Hardened HTTP/1.1 static-file and upload server.
#[derive(Parser)]
#[command(name = "rampart", version)]
struct Cli {
    /// YAML configuration file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bind host
    #[arg(long)]
    host: Option<String>,

    /// Bind port
    #[arg(long)]
    port: Option<u16>,

    /// Worker-pool size
    #[arg(long)]
    workers: Option<usize>,

    /// Root directory for served resources
    #[arg(long)]
    resources_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(resources_dir) = cli.resources_dir {
        config.resources_dir = resources_dir;
    }

    let server = Server::bind(config).await?;

    tokio::select! {
        res = server.run() => {
            res?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
