//! HTTP server for the campus feedback service.
//!
//! Mounts the JSON API from `campus-api` under `/api`, guarded by the
//! access-key and credential check in [`auth`].

pub mod auth;
pub mod error;
pub mod seed;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware, routing::get};
use campus_core::store::CampusStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CAMPUS_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  /// Shared access key every client must send in the `apikey` header.
  #[serde(default)]
  pub api_key:    String,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("campus.db") }

impl ServerConfig {
  /// Reject configurations that would only fail later, per request.
  pub fn validate(&self) -> Result<(), Error> {
    if self.api_key.trim().is_empty() {
      return Err(Error::Config("api_key must be set".to_string()));
    }
    if self.host.trim().is_empty() {
      return Err(Error::Config("host must not be empty".to_string()));
    }
    Ok(())
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the middleware.
#[derive(Clone)]
pub struct AppState<S: CampusStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the server.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: CampusStore + Clone + 'static,
{
  let api = campus_api::api_router(state.store.clone())
    .layer(middleware::from_fn_with_state(state.clone(), auth::require_user::<S>));

  Router::new()
    .route("/health", get(health))
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str { "ok" }
