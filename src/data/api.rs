//! Listings API client
//!
//! Thin typed wrapper over the JSON HTTP API. Every request goes through one
//! `reqwest::Client` with a cookie store, so the session cookie set by login
//! is sent with every later request.

use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use super::{Amenity, Place, PublicUser, Review, User};

/// Default base URL for a locally running backend
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Errors that can occur when talking to the listings API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure or invalid client configuration
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Server answered with a non-success status
    #[error("Server responded with status {status}")]
    Status {
        status: u16,
        /// `error` or `message` field from the response body, if any
        message: Option<String>,
    },
}

impl ApiError {
    /// Whether the server rejected the request for lack of a session
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }

    /// Text suitable for showing inline in a form
    ///
    /// Transport failures map to a generic retry hint, status failures to
    /// the server's own message or `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::RequestFailed(_) => "Network error. Please try again.".to_string(),
            ApiError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Error body shape used by the backend (`{"error": ...}` or `{"message": ...}`)
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Payload for `POST /api/v3/reviews/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewReview {
    pub place_id: String,
    pub user_id: String,
    pub rating: u8,
    pub text: String,
}

/// Payload for `POST /api/v3/auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Payload for `POST /api/v1/users/`
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Client for the listings API
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for the given base URL with a fresh cookie jar
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Creates a client around an existing HTTP client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /api/v3/places/`
    pub async fn fetch_places(&self) -> Result<Vec<Place>, ApiError> {
        self.get_json("/api/v3/places/").await
    }

    /// `GET /api/v3/places/{id}`
    pub async fn fetch_place(&self, place_id: &str) -> Result<Place, ApiError> {
        self.get_json(&format!("/api/v3/places/{}", place_id)).await
    }

    /// `GET /api/v3/amenities/`
    pub async fn fetch_amenities(&self) -> Result<Vec<Amenity>, ApiError> {
        self.get_json("/api/v3/amenities/").await
    }

    /// `GET /api/v3/reviews/places/{id}/reviews`
    pub async fn fetch_reviews(&self, place_id: &str) -> Result<Vec<Review>, ApiError> {
        self.get_json(&format!("/api/v3/reviews/places/{}/reviews", place_id))
            .await
    }

    /// `GET /api/v3/users/{id}/public`
    pub async fn fetch_public_user(&self, user_id: &str) -> Result<PublicUser, ApiError> {
        self.get_json(&format!("/api/v3/users/{}/public", user_id))
            .await
    }

    /// `POST /api/v3/reviews/`
    pub async fn submit_review(&self, review: &NewReview) -> Result<Review, ApiError> {
        self.post_json("/api/v3/reviews/", review).await
    }

    /// `GET /api/v3/auth/protected`
    ///
    /// Returns `Ok(None)` when the server answers 401 (no session).
    pub async fn check_session(&self) -> Result<Option<User>, ApiError> {
        match self.get_json::<User>("/api/v3/auth/protected").await {
            Ok(user) => Ok(Some(user)),
            Err(e) if e.is_unauthorized() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// `POST /api/v3/auth/login`
    ///
    /// On success the session cookie is stored in the client's jar.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/api/v3/auth/login"))
            .json(credentials)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// `POST /api/v3/auth/logout`
    pub async fn logout(&self) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/api/v3/auth/logout"))
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// `POST /api/v1/users/`
    pub async fn register(&self, user: &NewUser) -> Result<User, ApiError> {
        self.post_json("/api/v1/users/", user).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let response = self.client.get(&url).send().await?;
        let response = Self::check_status(response).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        tracing::debug!(%url, "POST");
        let response = self.client.post(&url).json(body).send().await?;
        let response = Self::check_status(response).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Converts a non-success response into `ApiError::Status`
    async fn check_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.error.or(body.message));

        tracing::debug!(status = status.as_u16(), ?message, "request rejected");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}
