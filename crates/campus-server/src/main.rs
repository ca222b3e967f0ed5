//! campus-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered with
//! `CAMPUS_*` environment variables, opens the SQLite store, and serves the
//! feedback API over HTTP.
//!
//! ```
//! campus-server --config config.toml serve
//! campus-server hash-password
//! campus-server seed seed.json
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use campus_server::{AppState, ServerConfig, auth::hash_password, seed};
use campus_store_sqlite::SqliteStore;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Campus feedback server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the API (default).
  Serve,
  /// Print the argon2 hash for a password entered on stdin and exit.
  HashPassword,
  /// Provision users, profiles and subjects from a JSON file.
  Seed {
    /// Path to the seed file.
    file: PathBuf,
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

  match cli.command.unwrap_or(Command::Serve) {
    Command::HashPassword => {
      let password = read_password()?;
      println!("{}", hash_password(&password)?);
      Ok(())
    }
    Command::Seed { file } => {
      let server_cfg = load_config(&cli.config)?;
      let store = open_store(&server_cfg).await?;
      let raw = std::fs::read_to_string(&file)
        .with_context(|| format!("reading seed file {}", file.display()))?;
      let seed_file: seed::SeedFile =
        serde_json::from_str(&raw).context("parsing seed file")?;
      let report = seed::apply(&store, seed_file).await?;
      tracing::info!(?report, "seed applied");
      Ok(())
    }
    Command::Serve => {
      let server_cfg = load_config(&cli.config)?;
      server_cfg.validate()?;
      let store = open_store(&server_cfg).await?;
      serve(server_cfg, store).await
    }
  }
}

fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("CAMPUS"))
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")
}

async fn open_store(server_cfg: &ServerConfig) -> anyhow::Result<SqliteStore> {
  let store_path = expand_tilde(&server_cfg.store_path);
  SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))
}

async fn serve(server_cfg: ServerConfig, store: SqliteStore) -> anyhow::Result<()> {
  let state = AppState {
    store:  Arc::new(store),
    config: Arc::new(server_cfg.clone()),
  };

  let app = campus_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!("failed to listen for ctrl-c: {e}");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutdown requested");
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
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
