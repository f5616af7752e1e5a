//! The `webpify serve` command.

use clap::Args;
use webpify_core::Config;

/// Arguments for the `serve` command.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Interface to bind (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Execute the serve command.
pub async fn execute(args: ServeArgs, config: Config) -> anyhow::Result<()> {
    let config = apply_overrides(config, &args);
    crate::server::run(config).await
}

fn apply_overrides(mut config: Config, args: &ServeArgs) -> Config {
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config
}
