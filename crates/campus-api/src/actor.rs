//! The authenticated user making a request.

use axum::{extract::FromRequestParts, http::request::Parts};
use campus_core::model::User;

use crate::error::ApiError;

/// The user on whose behalf a request runs.
///
/// Authentication is not this crate's concern: the server's middleware
/// verifies credentials and inserts the [`User`] as a request extension.
/// Requests that reach a handler without one are rejected with 401.
#[derive(Debug, Clone)]
pub struct Actor(pub User);

impl<S: Send + Sync> FromRequestParts<S> for Actor {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    parts
      .extensions
      .get::<User>()
      .cloned()
      .map(Actor)
      .ok_or(ApiError::Unauthorized)
  }
}
