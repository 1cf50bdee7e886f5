use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::paths::DEFAULT_CONFIG_FILE;

#[derive(Debug, Parser)]
#[command(
    name = "myshows-notify",
    version,
    about = "Send Telegram notifications about new episodes of shows followed on myshows.me"
)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Record due episodes as sent without contacting Telegram
    #[arg(long, global = true)]
    pub skip: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Notify every recipient about due episodes of watchlisted shows
    Notify,
    /// Add show ids to the watchlist
    Watch {
        #[arg(required = true)]
        ids: Vec<u64>,
        /// Also mark the shows as "watching" on myshows.me
        #[arg(long)]
        follow: bool,
    },
    /// Remove show ids from the watchlist
    Unwatch {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
    /// List shows from the myshows.me profile, '*' marks watchlisted ones
    List,
    /// Search the catalog by name
    Search { query: String },
    /// Print the top rated shows
    Top { count: u32 },
    /// Print details about one show
    Info { id: u64 },
}
