// Main entry point - Logging, configuration and command dispatch
use clap::Parser;
use energy_dashboard::infrastructure::config::{load_settings, load_settings_from, write_default_config};
use energy_dashboard::presentation::app_state::AppState;
use energy_dashboard::presentation::cli::{Cli, Command, ConfigCommand};
use energy_dashboard::presentation::handlers;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so that stdout stays clean for exports
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Command::Config {
        command: ConfigCommand::Init { path },
    } = &cli.command
    {
        let written = write_default_config(path)?;
        println!("{}", written.display());
        return Ok(());
    }

    let settings = match &cli.config {
        Some(path) => load_settings_from(path)?,
        None => load_settings()?,
    };
    tracing::debug!("Loaded settings: {:?}", settings);

    let state = AppState::new(settings);
    handlers::handle(&state, cli.command).await
}
