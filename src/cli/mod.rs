//! CLI module for the wizard
//!
//! Provides commands:
//! - `serve`: Start the HTTP server (default)
//! - `actions`: List every screen and action in the catalog

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod actions;

/// Setup Wizard CLI
#[derive(Parser, Debug)]
#[command(name = "wizard")]
#[command(about = "Local setup wizard for running maintenance scripts")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub serve: ServeArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server (default)
    Serve(ServeArgs),
    /// List screens and actions from the catalog
    Actions {
        /// Action catalog file
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

/// Overrides for the server configuration
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,
    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,
    /// Action catalog file
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

impl ServeArgs {
    /// Apply command line overrides on top of the loaded configuration
    pub fn apply(self, config: &mut crate::server::config::AppConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(catalog) = self.catalog {
            config.catalog.path = catalog;
        }
    }
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = crate::server::load_config()?;

    match cli.command {
        Some(Commands::Actions { catalog }) => {
            let path = catalog.unwrap_or(config.catalog.path);
            actions::run(&path)
        }
        Some(Commands::Serve(args)) => {
            args.apply(&mut config);
            crate::server::run(config).await
        }
        None => {
            cli.serve.apply(&mut config);
            crate::server::run(config).await
        }
    }
}
