//! Command line entry point: parses flags and serves the script tree.

use clap::Parser;
use log::info;
use maiden::Config;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = Config::parse();

    env_logger::Builder::new()
        .filter_level(config.log_level())
        .parse_default_env()
        .init();

    info!("maiden ({})", env!("CARGO_PKG_VERSION"));
    info!("  port: {}", config.port);
    info!("  site: {}", config.site.display());
    info!("  data: {}", config.data.display());

    maiden::api::serve(config).await
}
