//! `campus`: terminal feedback form for the campus datastore.
//!
//! # Usage
//!
//! ```
//! campus --url http://localhost:8080 --api-key KEY --email sam@example.edu --password secret
//! campus --config ~/.config/campus/config.toml
//! ```

mod app;
mod client;
mod form;
mod loader;
mod ui;

#[cfg(test)]
mod tests;

use std::{fs::OpenOptions, io, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use client::{ApiClient, ApiConfig, Datastore};
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "campus", about = "Submit course feedback to the campus datastore")]
struct Args {
  /// Path to a TOML config file (url, api_key, email, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Datastore endpoint.
  #[arg(long, env = "CAMPUS_URL")]
  url: Option<String>,

  /// Datastore access key.
  #[arg(long, env = "CAMPUS_API_KEY")]
  api_key: Option<String>,

  /// Email of the signed-in user.
  #[arg(long, env = "CAMPUS_EMAIL")]
  email: Option<String>,

  /// Password of the signed-in user (plaintext).
  #[arg(long, env = "CAMPUS_PASSWORD")]
  password: Option<String>,

  /// Log file. The terminal belongs to the UI, so logs go here.
  #[arg(long, value_name = "FILE", default_value = "campus.log")]
  log_file: PathBuf,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  api_key:  String,
  #[serde(default)]
  email:    String,
  #[serde(default)]
  password: String,
}

fn pick(flag: Option<String>, file: &str) -> String {
  flag
    .or_else(|| (!file.is_empty()).then(|| file.to_string()))
    .unwrap_or_default()
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let log_file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(&args.log_file)
    .with_context(|| format!("opening log file {}", args.log_file.display()))?;
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    )
    .with_writer(std::sync::Mutex::new(log_file))
    .with_ansi(false)
    .init();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags (and their env vars) override the config file.
  let api_config = ApiConfig {
    base_url: pick(args.url, &file_cfg.url),
    api_key:  pick(args.api_key, &file_cfg.api_key),
    email:    pick(args.email, &file_cfg.email),
    password: pick(args.password, &file_cfg.password),
  };

  let client = Arc::new(ApiClient::new(api_config)?);

  let user = match client.current_user().await {
    Ok(user) => Some(user),
    Err(e) => {
      tracing::warn!(error = %format!("{e:#}"), "could not resolve signed-in user");
      None
    }
  };

  let mut app = App::new(Arc::clone(&client));
  app.start(user);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  // Abort anything still in flight before the runtime shuts down.
  drop(app);
  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop<B: Datastore>(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App<B>,
) -> Result<()> {
  loop {
    app.poll();
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event {
      if key.kind != KeyEventKind::Press {
        continue;
      }
      if !app.handle_key(key) {
        break;
      }
    }
  }

  Ok(())
}
