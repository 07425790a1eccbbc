//! CLI module for the CarData Gateway
//!
//! Subcommands:
//! - `serve`: run the HTTP gateway (default)
//! - `keygen`: mint an API key and print the parts an operator needs

pub mod keygen;
pub mod serve;

use clap::{Parser, Subcommand};

/// CarData Gateway - metered vehicle-data API
#[derive(Parser)]
#[command(name = "cardata-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API gateway server
    Serve,

    /// Generate a new API key
    Keygen(keygen::KeygenArgs),
}
