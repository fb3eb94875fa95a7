use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::models::Role;
use crate::database::{DatabaseManager, MemoryStore, PgStore, Store};
use crate::router::app;
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "blog-api")]
#[command(about = "Blog API - users, posts, comments and likes over REST")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides PORT)")]
        port: Option<u16>,
        #[arg(long, help = "Use the in-memory store even if DATABASE_URL is set")]
        memory: bool,
    },

    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Create a user directly in the database")]
    CreateUser {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "user", help = "user, admin or superAdmin")]
        role: Role,
    },
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve {
        port: None,
        memory: false,
    }) {
        Commands::Serve { port, memory } => serve(config, port, memory).await,
        Commands::Migrate => migrate(&config).await,
        Commands::CreateUser {
            name,
            email,
            password,
            role,
        } => create_user(config, name, email, password, role).await,
    }
}

async fn serve(mut config: AppConfig, port: Option<u16>, memory: bool) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }
    if config.security.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET is not set; token issuance and verification will fail");
    }

    let store: Arc<dyn Store> = if memory {
        tracing::info!("Using in-memory store");
        Arc::new(MemoryStore::new())
    } else {
        DatabaseManager::connect(&config.database)
            .await
            .context("failed to initialize the store")?
    };

    let state = AppState::new(store, config);

    if let Some((name, email, password)) = state.config.bootstrap.admin() {
        state
            .users()
            .ensure_admin(name, email, password)
            .await
            .map_err(|e| anyhow::anyhow!("admin bootstrap failed: {}", e.message()))?;
    }

    let bind_addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!(
        "Blog API listening on http://{} ({:?})",
        bind_addr,
        state.config.environment
    );

    axum::serve(listener, app(state)).await?;
    Ok(())
}

async fn postgres(config: &AppConfig) -> anyhow::Result<PgStore> {
    let pool = DatabaseManager::pool(&config.database)
        .await
        .context("a PostgreSQL DATABASE_URL is required")?;
    Ok(PgStore::new(pool))
}

async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    postgres(config).await?.migrate().await?;
    println!("Migrations applied");
    Ok(())
}

async fn create_user(config: AppConfig, name: String, email: String, password: String, role: Role) -> anyhow::Result<()> {
    let store = postgres(&config).await?;
    store.migrate().await?;

    let state = AppState::new(Arc::new(store), config);
    let user = state
        .users()
        .create_user(name, email, &password, role)
        .await
        .map_err(|e| anyhow::anyhow!(e.message().to_string()))?;

    println!("Created {} {} ({})", user.role, user.email, user.id);
    Ok(())
}
