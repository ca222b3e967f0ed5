//! Handlers for `/me` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/me` | The authenticated user |
//! | `GET`  | `/me/student` | 404 if the user has no student profile |

use std::sync::Arc;

use axum::{Json, extract::State};
use campus_core::{
  model::{Student, User},
  store::CampusStore,
};

use crate::{actor::Actor, error::ApiError};

/// `GET /me`
pub async fn whoami(Actor(user): Actor) -> Json<User> { Json(user) }

/// `GET /me/student`
pub async fn student<S>(
  State(store): State<Arc<S>>,
  Actor(user): Actor,
) -> Result<Json<Student>, ApiError>
where
  S: CampusStore,
{
  let student = store
    .find_student_by_user(user.id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("no student profile for user {}", user.id)))?;
  Ok(Json(student))
}
