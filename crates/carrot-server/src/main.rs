mod config;

use clap::{Parser, Subcommand};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use carrot_api::routes;
use carrot_api::state::AppStateInner;
use carrot_db::Database;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "carrot")]
#[command(about = "Neighborhood marketplace API server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations, then serve the REST API (default)
    Serve,
    /// Apply pending migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carrot=debug,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => migrate(&config),
        Command::Serve => serve(config).await,
    }
}

fn migrate(config: &Config) -> anyhow::Result<()> {
    let db = Database::open(&config.db_path)?;
    let version = db.migrate()?;
    info!("Schema at version {}", version);
    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    if let Err(e) = config.check_secret() {
        error!("{}. Set it in your .env file and restart.", e);
        return Err(e.into());
    }

    let db = Database::open(&config.db_path)?;
    let version = db.migrate()?;
    info!("Schema at version {}", version);

    let state = AppStateInner::new(db, config.jwt_secret.clone(), config.session_hours);

    let app = routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = config.addr()?;
    info!("Carrot server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
