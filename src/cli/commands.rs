//! CLI commands and argument parsing

use crate::repo::RepositoryKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Boundary-driven pagination demo CLI
#[derive(Parser, Debug)]
#[command(name = "pagestream")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the first page of a collection to verify connectivity
    Check {
        /// Collection to fetch (defaults to the configured one)
        collection: Option<String>,
    },

    /// Open a listing and stream pages as the consumer scrolls through it
    Read {
        /// Collection to open (defaults to the configured one)
        collection: Option<String>,

        /// Paging strategy
        #[arg(short, long)]
        engine: Option<EngineArg>,

        /// Number of boundary fetches to simulate after the first page
        #[arg(long, default_value = "3")]
        pages: u32,

        /// Page size override
        #[arg(long)]
        page_size: Option<u32>,
    },
}

/// Paging strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EngineArg {
    /// Durable-store-backed paging
    Db,
    /// In-memory cursor paging
    InMemory,
}

impl From<EngineArg> for RepositoryKind {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Db => Self::Db,
            EngineArg::InMemory => Self::InMemory,
        }
    }
}
