//! Verification and decoding of identity-provider webhooks.
//!
//! Deliveries are signed Svix-style: the signature is
//! `base64(HMAC-SHA256(key, "{id}.{timestamp}.{body}"))`, where the key is the
//! base64 payload of a `whsec_` secret. The signature header carries one or
//! more space-separated `v1,<signature>` entries.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, TimeDelta, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::AppError;
use crate::identity::DirectoryUser;
use crate::models::IdentityProfile;

type HmacSha256 = Hmac<Sha256>;

/// Deliveries whose timestamp is further than this from now are rejected.
pub const TIMESTAMP_TOLERANCE: TimeDelta = TimeDelta::minutes(5);

/// The three signature headers of a webhook delivery.
#[derive(Debug, Clone)]
pub struct WebhookHeaders {
    pub id: String,
    pub timestamp: String,
    pub signature: String,
}

#[derive(Clone)]
pub struct WebhookVerifier {
    mac: HmacSha256,
}

impl WebhookVerifier {
    pub fn new(secret: &str) -> Result<Self, AppError> {
        let encoded = secret.strip_prefix("whsec_").unwrap_or(secret);
        let key = STANDARD
            .decode(encoded)
            .map_err(|e| AppError::ConfigError(format!("Invalid webhook secret: {e}")))?;
        if key.is_empty() {
            return Err(AppError::ConfigError("Webhook secret is empty".into()));
        }
        let mac = <HmacSha256 as Mac>::new_from_slice(&key)
            .map_err(|e| AppError::ConfigError(format!("Invalid webhook secret: {e}")))?;
        Ok(Self { mac })
    }

    /// Compute the base64 signature for a delivery.
    pub fn sign(&self, id: &str, timestamp: i64, payload: &str) -> String {
        STANDARD.encode(self.mac(id, &timestamp.to_string(), payload))
    }

    /// Check the timestamp window and that at least one `v1` signature matches.
    pub fn verify(
        &self,
        headers: &WebhookHeaders,
        payload: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let ts: i64 = headers
            .timestamp
            .trim()
            .parse()
            .map_err(|_| AppError::WebhookError("Invalid signature timestamp".into()))?;
        let sent_at = DateTime::<Utc>::from_timestamp(ts, 0)
            .ok_or_else(|| AppError::WebhookError("Invalid signature timestamp".into()))?;
        if (now - sent_at).abs() > TIMESTAMP_TOLERANCE {
            return Err(AppError::WebhookError(
                "Message timestamp outside the tolerance window".into(),
            ));
        }

        let expected = self.mac(&headers.id, headers.timestamp.trim(), payload);

        let matched = headers
            .signature
            .split_whitespace()
            .filter_map(|entry| entry.split_once(','))
            .filter(|(version, _)| *version == "v1")
            .filter_map(|(_, sig)| STANDARD.decode(sig).ok())
            .any(|candidate| bool::from(candidate.ct_eq(&expected)));

        if !matched {
            return Err(AppError::WebhookError("No matching signature found".into()));
        }
        Ok(())
    }

    fn mac(&self, id: &str, timestamp: &str, payload: &str) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

/// Identity events this service reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentityEvent {
    UserUpserted(IdentityProfile),
    UserDeleted { clerk_id: String },
    Ignored(String),
}

#[derive(Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Deserialize)]
struct DeletedData {
    #[serde(default)]
    id: Option<String>,
}

/// Decode a verified payload into an [`IdentityEvent`].
pub fn parse_event(payload: &str) -> Result<IdentityEvent, AppError> {
    let raw: RawEvent = serde_json::from_str(payload)?;

    match raw.event_type.as_str() {
        "user.created" | "user.updated" => {
            let user: DirectoryUser = serde_json::from_value(raw.data)?;
            Ok(IdentityEvent::UserUpserted(user.into_profile()?))
        }
        "user.deleted" => {
            let data: DeletedData = serde_json::from_value(raw.data)?;
            let clerk_id = data
                .id
                .filter(|id| !id.is_empty())
                .ok_or_else(|| AppError::validation("Missing user ID"))?;
            Ok(IdentityEvent::UserDeleted { clerk_id })
        }
        other => Ok(IdentityEvent::Ignored(other.to_string())),
    }
}
