//! Async HTTP client wrapping the campus JSON API.

use std::{future::Future, time::Duration};

use anyhow::{Context, Result, anyhow, bail};
use campus_core::model::{FacultyMember, Feedback, NewFeedback, Student, Subject, User};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Deserialize;

/// The datastore operations the feedback form needs.
///
/// Implemented by [`ApiClient`]; tests substitute an in-memory double.
pub trait Datastore: Send + Sync + 'static {
  /// The student profile of the signed-in user, or `None` if there is none.
  fn current_student(&self) -> impl Future<Output = Result<Option<Student>>> + Send + '_;

  /// All subjects, ordered by name.
  fn list_subjects(&self) -> impl Future<Output = Result<Vec<Subject>>> + Send + '_;

  /// All faculty with display names, ordered by name.
  fn list_faculty(&self) -> impl Future<Output = Result<Vec<FacultyMember>>> + Send + '_;

  /// Insert one feedback record.
  fn insert_feedback(
    &self,
    input: NewFeedback,
  ) -> impl Future<Output = Result<Feedback>> + Send + '_;
}

/// Connection settings for the campus API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Datastore endpoint, e.g. `http://localhost:8080`.
  pub base_url: String,
  /// Access key sent in the `apikey` header.
  pub api_key:  String,
  pub email:    String,
  pub password: String,
}

impl ApiConfig {
  /// Fail at startup rather than on the first request.
  pub fn validate(&self) -> Result<()> {
    if self.base_url.trim().is_empty() {
      bail!("datastore endpoint is not configured (--url / CAMPUS_URL)");
    }
    reqwest::Url::parse(&self.base_url)
      .with_context(|| format!("invalid datastore endpoint {:?}", self.base_url))?;
    if self.api_key.trim().is_empty() {
      bail!("datastore access key is not configured (--api-key / CAMPUS_API_KEY)");
    }
    Ok(())
  }
}

/// Async HTTP client for the campus JSON REST API.
///
/// Clones share the inner [`reqwest::Client`] pool.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    config.validate()?;
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
    let req = self
      .client
      .request(method, self.url(path))
      .header("apikey", &self.config.api_key);
    if self.config.email.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.email, Some(&self.config.password))
    }
  }

  /// Turn a non-success response into an error carrying the server's
  /// message, so it can be shown to the user as-is.
  async fn check(resp: Response, what: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
      .map(|b| b.error)
      .ok()
      .filter(|m| !m.is_empty())
      .unwrap_or_else(|| {
        if body.trim().is_empty() { format!("{what} → {status}") } else { body }
      });
    Err(anyhow!(message))
  }

  /// `GET /api/me`
  pub async fn current_user(&self) -> Result<User> {
    let resp = self
      .request(Method::GET, "/me")
      .send()
      .await
      .context("GET /me failed")?;
    Self::check(resp, "GET /me").await?.json().await.context("deserialising user")
  }
}

impl Datastore for ApiClient {
  /// `GET /api/me/student`. A 404 means "no profile", not an error.
  async fn current_student(&self) -> Result<Option<Student>> {
    let resp = self
      .request(Method::GET, "/me/student")
      .send()
      .await
      .context("GET /me/student failed")?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    let student = Self::check(resp, "GET /me/student")
      .await?
      .json()
      .await
      .context("deserialising student")?;
    Ok(Some(student))
  }

  /// `GET /api/subjects`
  async fn list_subjects(&self) -> Result<Vec<Subject>> {
    let resp = self
      .request(Method::GET, "/subjects")
      .send()
      .await
      .context("GET /subjects failed")?;
    Self::check(resp, "GET /subjects")
      .await?
      .json()
      .await
      .context("deserialising subjects")
  }

  /// `GET /api/faculty`
  async fn list_faculty(&self) -> Result<Vec<FacultyMember>> {
    let resp = self
      .request(Method::GET, "/faculty")
      .send()
      .await
      .context("GET /faculty failed")?;
    Self::check(resp, "GET /faculty")
      .await?
      .json()
      .await
      .context("deserialising faculty")
  }

  /// `POST /api/feedback`
  async fn insert_feedback(&self, input: NewFeedback) -> Result<Feedback> {
    let resp = self
      .request(Method::POST, "/feedback")
      .json(&input)
      .send()
      .await
      .context("POST /feedback failed")?;
    Self::check(resp, "POST /feedback")
      .await?
      .json()
      .await
      .context("deserialising stored feedback")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn config(url: &str, key: &str) -> ApiConfig {
    ApiConfig {
      base_url: url.into(),
      api_key:  key.into(),
      email:    "stu@example.edu".into(),
      password: "pw".into(),
    }
  }

  #[test]
  fn empty_connection_parameters_fail_eagerly() {
    assert!(ApiClient::new(config("", "key")).is_err());
    assert!(ApiClient::new(config("http://localhost:8080", "")).is_err());
    assert!(ApiClient::new(config("not a url", "key")).is_err());
  }

  #[test]
  fn urls_are_joined_under_api() {
    let client = ApiClient::new(config("http://localhost:8080/", "key")).unwrap();
    assert_eq!(client.url("/subjects"), "http://localhost:8080/api/subjects");
  }
}
