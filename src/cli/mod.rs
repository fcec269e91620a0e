//! Command-line interface for cinelog.

mod commands;

use clap::{Parser, Subcommand};

/// cinelog - personal movie catalog server
#[derive(Parser)]
#[command(name = "cinelog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (default)
    #[command(alias = "web")]
    Serve,

    /// Bring the schema up to date and reconcile the admin account
    Migrate,

    /// Insert the sample catalog for an existing account
    Seed {
        /// Email of the account that receives the samples
        #[arg(long)]
        email: String,
    },

    /// Look up posters for movies that have none
    Posters,

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
