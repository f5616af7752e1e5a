//! WebPify - convert images to WebP over HTTP or from the command line.
//!
//! Upload one image and get a `.webp` back; upload several and get a ZIP.
//!
//! # Usage
//!
//! ```bash
//! # Run the HTTP service
//! webpify serve --port 8000
//!
//! # Convert a single image
//! curl -X POST "http://localhost:8000/api/convert?quality=90" \
//!   -F "files=@image.png" --output image.webp
//!
//! # Convert a directory locally
//! webpify convert ./photos/ --output ./webp --quality 80
//!
//! # View configuration
//! webpify config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;
mod server;

/// WebPify - convert images to WebP.
#[derive(Parser, Debug)]
#[command(name = "webpify")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "WEBPIFY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP conversion service
    Serve(cli::serve::ServeArgs),

    /// Convert local images to WebP
    Convert(cli::convert::ConvertArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match cli::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) if cli.config.is_some() => return Err(e),
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `webpify config path`."
            );
            webpify_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("WebPify v{}", webpify_core::VERSION);

    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Convert(args) => cli::convert::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, cli.config.as_deref()).await,
    }
}
