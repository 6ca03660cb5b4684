use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::auth::hash_password;
use crate::config::{AppConfig, StorageBackend};
use crate::models::{Role, User};
use crate::state::AppState;
use crate::store::{MemoryStore, PgStore, Store};

#[derive(Parser)]
#[command(name = "careerbridge")]
#[command(about = "CareerBridge - job board API server and administration")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides CAREERBRIDGE_PORT)")]
        port: Option<u16>,

        #[arg(long, help = "Use the in-memory store instead of PostgreSQL")]
        memory: bool,
    },

    #[command(about = "Apply the database schema")]
    Migrate,

    #[command(about = "User account management")]
    User {
        #[command(subcommand)]
        cmd: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create an account of any role, including admin")]
    Add {
        email: String,

        #[arg(long)]
        password: String,

        #[arg(long, default_value = "student", help = "student, employer or admin")]
        role: String,

        #[arg(long)]
        name: Option<String>,
    },
}

pub async fn run(cli: Cli, mut config: AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve { port, memory } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if memory {
                config.database.backend = StorageBackend::Memory;
            }
            serve(config).await
        }
        Commands::Migrate => {
            let store = PgStore::connect(&config.database).await.context("connecting to PostgreSQL")?;
            store.migrate().await.context("applying schema")?;
            println!("Schema applied");
            Ok(())
        }
        Commands::User { cmd } => match cmd {
            UserCommands::Add { email, password, role, name } => {
                let role: Role = role.parse().map_err(anyhow::Error::msg)?;
                let store = PgStore::connect(&config.database).await.context("connecting to PostgreSQL")?;

                let mut user = User::new(email.trim(), role);
                user.display_name = name;
                user.password_hash = Some(hash_password(&password));
                store.insert_user(&user).await.context("creating user")?;

                println!("Created {} {} ({})", user.role, user.email, user.id);
                Ok(())
            }
        },
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let store: Arc<dyn Store> = match config.database.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on exit");
            Arc::new(MemoryStore::new())
        }
        StorageBackend::Postgres => {
            Arc::new(PgStore::connect(&config.database).await.context("connecting to PostgreSQL")?)
        }
    };

    let bind_addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let app = crate::app(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("CareerBridge listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
