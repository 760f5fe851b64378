use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bizops_api::auth::{generate_jwt, Claims, Role};
use bizops_api::config::{self, StoreKind};
use bizops_api::database;
use bizops_api::{app, AppState};

#[derive(Parser)]
#[command(name = "bizops-api", version, about = "Business operations API server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Port to bind, overrides BIZOPS_PORT/PORT
        #[arg(long)]
        port: Option<u16>,
        /// Use the in-memory store instead of PostgreSQL
        #[arg(long)]
        memory: bool,
    },
    /// Print a signed session token for local testing
    Token {
        #[arg(long)]
        sub: String,
        #[arg(long, default_value = "admin")]
        role: Role,
        /// Lifetime in hours, defaults to SECURITY_JWT_EXPIRY_HOURS
        #[arg(long)]
        hours: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bizops_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve { port: None, memory: false }) {
        Command::Serve { port, memory } => serve(port, memory).await,
        Command::Token { sub, role, hours } => print_token(sub, role, hours),
    }
}

async fn serve(port: Option<u16>, memory: bool) -> Result<()> {
    let mut config = config::config().clone();
    if let Some(port) = port {
        config.server.port = port;
    }
    if memory {
        config.database.store = StoreKind::Memory;
    }
    tracing::info!("Starting BizOps API in {:?} mode", config.environment);

    let store = database::open_store(&config.database)
        .await
        .context("failed to open document store")?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("BizOps API listening on http://{}", bind_addr);

    axum::serve(listener, app(AppState::new(config, store)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

fn print_token(sub: String, role: Role, hours: Option<u64>) -> Result<()> {
    let config = config::config();
    let secret = config
        .security
        .jwt_secret
        .as_deref()
        .context("JWT_SECRET is not configured")?;
    let claims = Claims::new(sub, role, hours.unwrap_or(config.security.jwt_expiry_hours))?;
    println!("{}", generate_jwt(&claims, secret)?);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
