//! CLI module - Command-line interface for reportkeep
//!
//! Provisioning commands live in `commands`; `serve` is handled in the crate
//! root because it owns the runtime lifecycle.

mod commands;

use clap::{Parser, Subcommand};

/// reportkeep - users and reports behind bearer-token authentication
#[derive(Parser)]
#[command(name = "reportkeep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API until Ctrl+C
    #[command(alias = "daemon")]
    Serve,

    /// Create a default config file with a random secret key
    #[command(alias = "--init")]
    Init,

    /// Apply migrations and create the bootstrap admin if missing
    InitDb,

    /// Create an admin user
    CreateAdmin {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },
}

pub use commands::*;
