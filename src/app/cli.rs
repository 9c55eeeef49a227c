use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};

use super::{config::Config, envy::Envy};

#[derive(Debug, Parser)]
#[command(name = "peppermint", version, about = "Browse ThreeFold minting receipts")]
pub struct Cli {
    /// Receipts database file, overrides DB_PATH.
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the receipts browser over HTTP.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Reload open pages when the server restarts.
        #[arg(long)]
        live_reload: bool,
    },
    /// Poll the minting API for new receipts, forever.
    Poll {
        /// Node to poll in addition to the ones already stored. Repeatable.
        #[arg(long = "node")]
        nodes: Vec<u32>,
        /// Seconds between polling cycles.
        #[arg(long)]
        interval: Option<u64>,
        /// Run a single cycle and exit.
        #[arg(long)]
        once: bool,
    },
    /// Fetch and store the receipts of one node.
    Fetch {
        node_id: u32,
        /// Fetch even if the stored receipts are still current.
        #[arg(long)]
        force: bool,
    },
    /// Print one receipt, fetching it if it is not stored yet.
    Receipt { hash: String },
    /// Print nodes ranked by average uptime.
    Rank {
        #[arg(long, default_value_t = 50)]
        top: usize,
    },
}

impl Cli {
    /// Resolves the effective configuration: flags win over the environment.
    pub fn config(&self, envy: Envy) -> Config {
        let mut config = Config::from_envy(envy);

        if let Some(db_path) = &self.db_path {
            config.db_path = db_path.to_owned();
        }

        match &self.command {
            Command::Serve {
                host,
                port,
                live_reload,
            } => {
                if let Some(host) = host {
                    config.host = host.to_string();
                }
                if let Some(port) = port {
                    config.port = *port;
                }
                if *live_reload {
                    config.live_reload = true;
                }
            }
            Command::Poll {
                nodes, interval, ..
            } => {
                config.node_ids.extend(nodes.iter().copied());
                config.node_ids.sort_unstable();
                config.node_ids.dedup();

                if let Some(interval) = interval {
                    config.poll_interval = Duration::from_secs((*interval).max(1));
                }
            }
            _ => {}
        }

        config
    }
}
