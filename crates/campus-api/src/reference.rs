//! Handlers for the read-only reference lists.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/subjects` | Ordered by name |
//! | `GET`  | `/faculty` | Ordered by the faculty member's display name |

use std::sync::Arc;

use axum::{Json, extract::State};
use campus_core::{
  model::{FacultyMember, Subject},
  store::CampusStore,
};

use crate::{actor::Actor, error::ApiError};

/// `GET /subjects`
pub async fn subjects<S>(
  State(store): State<Arc<S>>,
  _actor: Actor,
) -> Result<Json<Vec<Subject>>, ApiError>
where
  S: CampusStore,
{
  let subjects = store.list_subjects().await.map_err(ApiError::from_store)?;
  Ok(Json(subjects))
}

/// `GET /faculty`
pub async fn faculty<S>(
  State(store): State<Arc<S>>,
  _actor: Actor,
) -> Result<Json<Vec<FacultyMember>>, ApiError>
where
  S: CampusStore,
{
  let faculty = store.list_faculty().await.map_err(ApiError::from_store)?;
  Ok(Json(faculty))
}
