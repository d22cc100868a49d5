//! warden-server binary.
//!
//! Reads `warden.toml` (or the path given with `--config`) layered with
//! `WARDEN_*` environment variables, opens the SQLite store, and serves the
//! Warden API over HTTP.
//!
//! # Bootstrapping an admin
//!
//! New accounts always start as `user`. Promote the first admin directly:
//!
//! ```sh
//! cargo run -p warden-server -- set-role alice@example.com admin
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use warden_core::{role::Role, store::Store, user::normalize_email};
use warden_server::{AppState, ServerConfig};
use warden_store_sqlite::{SqliteStore, now};

const PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[derive(Parser)]
#[command(author, version, about = "Warden todo server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "warden.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (the default).
  Serve,
  /// Change the role of an existing account.
  SetRole {
    email: String,
    /// One of `user`, `manager`, `admin`.
    role:  String,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("WARDEN"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(store, server_cfg).await,
    Command::SetRole { email, role } => set_role(&store, &email, &role).await,
  }
}

async fn set_role(store: &SqliteStore, email: &str, role: &str) -> anyhow::Result<()> {
  let role = Role::parse(role)?;
  let email = normalize_email(email);
  let user = store
    .set_role(&email, role)
    .await
    .context("failed to update role")?
    .with_context(|| format!("no account for {email}"))?;
  println!("{} is now {}", user.email, user.role);
  Ok(())
}

async fn serve(store: SqliteStore, server_cfg: ServerConfig) -> anyhow::Result<()> {
  tokio::spawn(purge_sessions(store.clone()));

  let state = AppState {
    store:  Arc::new(store),
    config: Arc::new(server_cfg.clone()),
  };

  let app = warden_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

/// Periodically delete expired sessions.
async fn purge_sessions(store: SqliteStore) {
  let mut interval = tokio::time::interval(PURGE_INTERVAL);
  loop {
    interval.tick().await;
    match store.purge_expired_sessions(now()).await {
      Ok(0) => {}
      Ok(n) => tracing::info!(count = n, "purged expired sessions"),
      Err(e) => tracing::warn!(error = %e, "failed to purge expired sessions"),
    }
  }
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
