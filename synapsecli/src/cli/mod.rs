use std::path::PathBuf;

use clap::Parser;

pub mod dataset;
pub mod network;

#[derive(Parser)]
pub enum Cli {
    /// Manage datasets of training samples.
    Dataset {
        #[arg(long, short)]
        /// Path to the database file.
        path: PathBuf,

        #[arg(long, default_value_t = -4096)]
        /// SQLite database cache size.
        ///
        /// Positive value sets cache size in bytes, negative - in sqlite pages.
        cache_size: i64,

        #[command(subcommand)]
        command: dataset::DatasetCli
    },

    /// Manage feed-forward network models.
    Network {
        #[arg(long, short)]
        /// Path to the database file.
        path: PathBuf,

        #[arg(long, default_value_t = -4096)]
        /// SQLite database cache size.
        ///
        /// Positive value sets cache size in bytes, negative - in sqlite pages.
        cache_size: i64,

        #[command(subcommand)]
        command: network::NetworkCli
    }
}

impl Cli {
    #[inline]
    pub fn execute(self) -> anyhow::Result<()> {
        match self {
            Self::Dataset { command, path, cache_size } => command.execute(path, cache_size),
            Self::Network { command, path, cache_size } => command.execute(path, cache_size)
        }
    }
}
