use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use vizchat::cli::{parse_args, run_cli_command};
use vizchat::config::ClientConfig;

/// Log filter from `VIZCHAT_LOG`, then `RUST_LOG`, defaulting to `warn`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("VIZCHAT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let args = parse_args(std::env::args());

    let mut config = ClientConfig::from_env();
    if let Some(url) = args.api_url {
        config = config.with_base_url(url);
    }

    run_cli_command(args.command, config).await
}
