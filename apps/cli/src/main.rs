//! dlcpwn entry point.

mod app;
mod config;
mod shell;
mod sources;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "dlcpwn",
    version,
    about = "Install CreamAPI/ScreamAPI into Steam and Epic games"
)]
struct Cli {
    #[arg(long, help = "Path to config file")]
    config: Option<PathBuf>,

    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(config::config_path);
    let config = config::Config::load(&config_path)?;

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path.display(),
        "starting dlcpwn"
    );

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(app::run(config))?;
    Ok(())
}
