//! Handler for `POST /feedback`.
//!
//! The body is a [`NewFeedback`]. The store checks that `student_id` belongs
//! to the caller, so a student can only submit under their own identity.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use campus_core::{model::NewFeedback, store::CampusStore};

use crate::{actor::Actor, error::ApiError};

/// `POST /feedback`: returns 201 + the stored [`Feedback`](campus_core::model::Feedback).
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Actor(user): Actor,
  Json(body): Json<NewFeedback>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CampusStore,
{
  body.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let feedback = store
    .add_feedback(user.id, body)
    .await
    .map_err(ApiError::from_store)?;

  tracing::info!(
    feedback_id = %feedback.id,
    student_id = %feedback.student_id,
    subject_id = %feedback.subject_id,
    rating = feedback.rating.get(),
    "feedback stored"
  );
  Ok((StatusCode::CREATED, Json(feedback)))
}
