//! Switchyard server
//!
//! Bootstraps controllers from the manifest directory and serves them.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use switchyard::{AppState, Config, ControllerFactories, ControllerRegistry, ShortcutRegistry};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default)
    Serve,
    /// List every registered route
    Routes,
    /// List menu shortcuts by category
    Shortcuts,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing();

    let config = Config::from_env().context("failed to load configuration")?;
    info!(dir = %config.controllers_dir.display(), "configuration loaded");

    let controllers = ControllerRegistry::global();
    let shortcuts = ShortcutRegistry::global();
    let roots = switchyard::bootstrap(
        &config.controllers_dir,
        &ControllerFactories::with_builtins(),
        controllers,
        shortcuts,
    )
    .context("failed to bootstrap controllers")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Routes => {
            switchyard::cli::cmd_routes(controllers);
            Ok(())
        }
        Command::Shortcuts => {
            switchyard::cli::cmd_shortcuts(shortcuts, controllers);
            Ok(())
        }
        Command::Serve => serve(&config, &roots).await,
    }
}

async fn serve(config: &Config, roots: &[switchyard::Controller]) -> Result<()> {
    let state = AppState::new(config).context("failed to initialize application state")?;
    let app = switchyard::app::router(roots)
        .context("failed to build application router")?
        .with_state(state);

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
