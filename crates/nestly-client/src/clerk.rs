use std::time::Duration;

use nestly_core::error::AppError;
use nestly_core::identity::DirectoryUser;
use nestly_core::traits::IdentityDirectory;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.clerk.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the identity provider's Backend API.
#[derive(Clone)]
pub struct ClerkDirectory {
    client: Client,
    api_url: Url,
    secret_key: String,
}

impl ClerkDirectory {
    pub fn new(secret_key: &str) -> Result<Self, AppError> {
        Self::with_api_url(secret_key, DEFAULT_API_URL)
    }

    pub fn with_api_url(secret_key: &str, api_url: &str) -> Result<Self, AppError> {
        if secret_key.trim().is_empty() {
            return Err(AppError::ConfigError(
                "Identity provider secret key is empty".into(),
            ));
        }

        let api_url = Url::parse(api_url.trim_end_matches('/'))
            .map_err(|e| AppError::ConfigError(format!("Invalid identity API URL: {e}")))?;
        if api_url.cannot_be_a_base() {
            return Err(AppError::ConfigError(format!(
                "Identity API URL cannot be a base: {api_url}"
            )));
        }

        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            api_url,
            secret_key: secret_key.to_string(),
        })
    }

    /// `{api_url}/users/{clerk_id}` with the id percent-encoded as a single segment.
    fn user_url(&self, clerk_id: &str) -> Url {
        let mut url = self.api_url.clone();
        // cannot_be_a_base was rejected in the constructor
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("users").push(clerk_id);
        }
        url
    }
}

#[derive(Deserialize)]
struct ApiErrors {
    errors: Vec<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl IdentityDirectory for ClerkDirectory {
    async fn get_user(&self, clerk_id: &str) -> Result<Option<DirectoryUser>, AppError> {
        let url = self.user_url(clerk_id);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::HttpError("Identity provider timed out".into())
                } else {
                    AppError::HttpError(format!("Identity provider request failed: {e}"))
                }
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(%clerk_id, "User not found in identity provider");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrors>(&body)
                .ok()
                .and_then(|e| e.errors.into_iter().next())
                .map(|e| e.message)
                .unwrap_or_else(|| format!("HTTP {}: {}", status.as_u16(), body));
            return Err(AppError::HttpError(message));
        }

        let user: DirectoryUser = response
            .json()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to parse user: {e}")))?;

        Ok(Some(user))
    }
}
