//! JSON REST API for the campus feedback service.
//!
//! Exposes an axum [`Router`] backed by any [`campus_core::store::CampusStore`].
//! Authentication, TLS, and transport concerns are the caller's
//! responsibility; handlers expect the authenticated
//! [`User`](campus_core::model::User) as a request extension (see [`Actor`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", campus_api::api_router(store.clone()).layer(auth))
//! ```

pub mod actor;
pub mod error;
pub mod feedback;
pub mod me;
pub mod reference;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use campus_core::store::CampusStore;

pub use actor::Actor;
pub use error::ApiError;

/// Build the API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: CampusStore + 'static,
{
  Router::new()
    .route("/me", get(me::whoami))
    .route("/me/student", get(me::student::<S>))
    .route("/subjects", get(reference::subjects::<S>))
    .route("/faculty", get(reference::faculty::<S>))
    .route("/feedback", post(feedback::create::<S>))
    .with_state(store)
}
