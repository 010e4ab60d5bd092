//! Prints the cross sections for a list of samples, one per line.
//!
//! ```bash
//! XSECCONF=$HOME/my.cnf ENERGY=8 get_xs sample_i_definitely_stored_elsewhere
//! ```

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use xsecdb::config::{config_path, CONFIG_ENV};
use xsecdb::db::{Connector, XsecConnection};
use xsecdb::mysql::MySqlConnector;
use xsecdb::{reader, Energy};

/// Look up cross sections in the central database.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Samples to look up
    #[arg(required = true, value_name = "SAMPLE")]
    samples: Vec<String>,

    /// Energy table to read from (7, 8, 13 or 14)
    #[arg(long, env = "ENERGY", default_value = "13")]
    energy: Energy,

    /// MySQL credentials file
    #[arg(long, env = CONFIG_ENV)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    xsecdb::register_logger();

    let connector = MySqlConnector::new(args.config.unwrap_or_else(config_path));
    let mut conn = connector
        .connect()
        .await
        .with_context(|| format!("connecting with {}", connector.config_path().display()))?;
    let result = reader::get_xsec(&mut conn, args.energy, &args.samples).await;
    conn.close().await;

    for xs in result? {
        println!("{}", xsecdb::render::format_value(xs));
    }
    Ok(())
}
