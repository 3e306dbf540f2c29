use std::time::Duration;

use nestly_core::error::AppError;
use nestly_core::traits::ObjectStore;
use reqwest::Client;
use url::Url;

pub const DEFAULT_BUCKET: &str = "property-images";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Supabase Storage client authenticated with the service-role key.
///
/// Objects are uploaded with `POST /storage/v1/object/{bucket}/{path}` and
/// served from the bucket's public URL.
#[derive(Clone)]
pub struct SupabaseStorage {
    client: Client,
    base_url: Url,
    service_key: String,
    bucket: String,
}

impl SupabaseStorage {
    pub fn new(base_url: &str, service_key: &str, bucket: &str) -> Result<Self, AppError> {
        if service_key.trim().is_empty() {
            return Err(AppError::ConfigError("Storage service key is empty".into()));
        }
        if bucket.trim().is_empty() || bucket.contains('/') {
            return Err(AppError::ConfigError(format!(
                "Invalid storage bucket: {bucket:?}"
            )));
        }

        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| AppError::ConfigError(format!("Invalid storage URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::ConfigError(format!(
                "Storage URL cannot be a base: {base_url}"
            )));
        }

        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            service_key: service_key.to_string(),
            bucket: bucket.to_string(),
        })
    }

    fn object_url(&self, public: bool, path: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["storage", "v1", "object"]);
            if public {
                segments.push("public");
            }
            segments
                .push(&self.bucket)
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        url
    }
}

impl ObjectStore for SupabaseStorage {
    async fn put_object(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), AppError> {
        let url = self.object_url(false, path);
        let size = bytes.len();

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::StorageError(format!("Upload request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::StorageError(format!(
                "HTTP {} uploading {}: {}",
                status.as_u16(),
                path,
                body
            )));
        }

        tracing::debug!(%path, size, bucket = %self.bucket, "Object uploaded");
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        self.object_url(true, path).to_string()
    }
}
