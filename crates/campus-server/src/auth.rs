//! Access-key and HTTP Basic authentication.
//!
//! Every `/api` request must carry the configured access key in the `apikey`
//! header and `email:password` Basic credentials for a provisioned user. The
//! resolved [`User`] is inserted as a request extension for the API
//! handlers.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::{Request, State},
  http::HeaderMap,
  middleware::Next,
  response::Response,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use campus_core::{model::User, store::CampusStore};
use rand_core::OsRng;
use subtle::ConstantTimeEq as _;

use crate::{AppState, error::Error};

pub const API_KEY_HEADER: &str = "apikey";

/// Hash `password` into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::Hash(e.to_string()))
}

/// Check the `apikey` header against the configured key in constant time.
pub fn verify_api_key(headers: &HeaderMap, expected: &str) -> Result<(), Error> {
  let given = headers
    .get(API_KEY_HEADER)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;
  if expected.is_empty() || !bool::from(given.as_bytes().ct_eq(expected.as_bytes())) {
    return Err(Error::Unauthorized);
  }
  Ok(())
}

/// Decode `Authorization: Basic …` into `(email, password)`.
pub fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val.strip_prefix("Basic ").ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (email, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;
  Ok((email.to_owned(), password.to_owned()))
}

/// Resolve the user for a request, or fail with [`Error::Unauthorized`].
pub async fn authenticate<S>(headers: &HeaderMap, state: &AppState<S>) -> Result<User, Error>
where
  S: CampusStore,
{
  verify_api_key(headers, &state.config.api_key)?;
  let (email, password) = basic_credentials(headers)?;

  let creds = state
    .store
    .find_user_by_email(&email)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or(Error::Unauthorized)?;

  let parsed_hash =
    PasswordHash::new(&creds.password_hash).map_err(|_| Error::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)?;

  Ok(creds.user)
}

/// Middleware: authenticate, then hand the [`User`] to the handlers.
pub async fn require_user<S>(
  State(state): State<AppState<S>>,
  mut req: Request,
  next: Next,
) -> Result<Response, Error>
where
  S: CampusStore + Clone + 'static,
{
  let headers = req.headers().clone();
  let user = match authenticate(&headers, &state).await {
    Ok(user) => user,
    Err(e) => {
      tracing::debug!(path = %req.uri().path(), error = %e, "rejected request");
      return Err(e);
    }
  };
  tracing::debug!(user_id = %user.id, role = %user.role, "request authenticated");
  req.extensions_mut().insert(user);
  Ok(next.run(req).await)
}
