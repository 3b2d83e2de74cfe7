//! storehub server
//!
//! Serves the dashboard API against the configured database engine.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use storehub_db::{DatabaseConfig, DbError, DialectMode, MySqlSettings, PlaceholderMode};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use storehub_api::{build_router, init_schema, serve, AppState};

/// Store and menu dashboard API.
#[derive(Parser)]
#[command(name = "storehub")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database engine: postgresql, mysql or sqlite.
    #[arg(long, env = "DATABASE_MODE")]
    database_mode: Option<String>,

    /// PostgreSQL or SQLite connection URL.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// MySQL host.
    #[arg(long, env = "DB_HOST")]
    db_host: Option<String>,

    /// MySQL port.
    #[arg(long, env = "DB_PORT", default_value_t = storehub_db::config::DEFAULT_MYSQL_PORT)]
    db_port: u16,

    /// MySQL user.
    #[arg(long, env = "DB_USER")]
    db_user: Option<String>,

    /// MySQL password.
    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    db_password: Option<String>,

    /// MySQL database name.
    #[arg(long, env = "DB_NAME")]
    db_name: Option<String>,

    /// Pool size.
    #[arg(long, default_value_t = storehub_db::config::DEFAULT_MAX_CONNECTIONS)]
    max_connections: u32,

    /// PostgreSQL TLS mode.
    #[arg(long, default_value = "prefer")]
    pg_ssl_mode: String,

    /// Leave `?` inside quoted strings and comments untouched on PostgreSQL.
    #[arg(long)]
    skip_literals: bool,

    /// Address to listen on.
    #[arg(short, long, default_value = "127.0.0.1:3000")]
    listen: SocketAddr,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the API (default).
    Serve,

    /// Create missing tables for the configured engine.
    InitSchema,

    /// Check that the database is reachable.
    Check,
}

impl Cli {
    fn database_config(&self) -> Result<DatabaseConfig, DbError> {
        let mode = DialectMode::resolve(self.database_mode.as_deref());
        let mut config = DatabaseConfig::new(mode)
            .mysql(MySqlSettings {
                host: self.db_host.clone(),
                port: self.db_port,
                user: self.db_user.clone(),
                password: self.db_password.clone(),
                database: self.db_name.clone(),
            })
            .max_connections(self.max_connections)
            .pg_ssl_mode(&self.pg_ssl_mode)?;
        if let Some(url) = &self.database_url {
            config = config.url(url);
        }
        if self.skip_literals {
            config.placeholders = PlaceholderMode::SkipLiterals;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = cli.database_config()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let state = match config.connect() {
                Ok(db) => AppState::new(db),
                Err(DbError::NotConfigured) => {
                    warn!(mode = %config.mode, "Database not configured, requests will fail");
                    AppState::unconfigured()
                }
                Err(err) => return Err(err.into()),
            };
            let router = build_router(state)?;
            serve(cli.listen, router).await?;
        }

        Commands::InitSchema => {
            let db = config.connect()?;
            info!(mode = %config.mode, "Creating tables...");
            init_schema(db.as_ref()).await?;
            info!("Schema ready.");
            db.close().await;
        }

        Commands::Check => {
            let db = config.connect()?;
            db.ping().await?;
            db.close().await;
        }
    }

    Ok(())
}
