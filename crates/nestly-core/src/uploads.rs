use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::traits::ObjectStore;

/// Prefix under which listing images are stored in the bucket.
pub const PROPERTY_IMAGE_PREFIX: &str = "properties";

/// Largest accepted image, in bytes.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Serialize)]
pub struct StoredImage {
    pub path: String,
    pub url: String,
}

/// Reduce a client-supplied filename to a safe object-key segment.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '-');
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.chars().take(100).collect()
    }
}

/// Object key `properties/<millis>-<random>-<name>`.
pub fn image_object_path(filename: &str) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{PROPERTY_IMAGE_PREFIX}/{}-{}-{}",
        Utc::now().timestamp_millis(),
        &random[..9],
        sanitize_filename(filename)
    )
}

fn validate_image(content_type: &str, bytes: &[u8]) -> Result<(), AppError> {
    if !content_type.trim().to_ascii_lowercase().starts_with("image/") {
        return Err(AppError::validation(format!(
            "Only image uploads are accepted, got content type '{content_type}'"
        )));
    }
    if bytes.is_empty() {
        return Err(AppError::validation("Upload body is empty"));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::validation(format!(
            "Image exceeds the {MAX_IMAGE_BYTES}-byte limit"
        )));
    }
    Ok(())
}

/// Validate and store a listing image, returning its key and public URL.
pub async fn store_property_image<S: ObjectStore>(
    store: &S,
    filename: &str,
    content_type: &str,
    bytes: Vec<u8>,
) -> Result<StoredImage, AppError> {
    validate_image(content_type, &bytes)?;

    let path = image_object_path(filename);
    let size = bytes.len();
    store.put_object(&path, content_type, bytes).await?;
    tracing::info!(path = %path, size, "Stored property image");

    Ok(StoredImage {
        url: store.public_url(&path),
        path,
    })
}
