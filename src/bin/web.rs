use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use xsecdb::config::{config_path, CONFIG_ENV};
use xsecdb::mysql::MySqlConnector;

/// Serves the cross section database over HTTP.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: SocketAddr,

    /// MySQL credentials file
    #[arg(long, env = CONFIG_ENV)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    xsecdb::register_logger();

    let connector = MySqlConnector::new(args.config.unwrap_or_else(config_path));
    tracing::info!(config = %connector.config_path().display(), "credentials");
    xsecdb::server::serve(args.addr, connector).await?;
    Ok(())
}
