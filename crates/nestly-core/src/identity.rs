use serde::Deserialize;

use crate::error::AppError;
use crate::models::{IdentityProfile, UserRole};
use crate::traits::IdentityDirectory;

/// User record as returned by the identity provider's Backend API and
/// embedded in its webhook events.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryUser {
    pub id: String,
    #[serde(default)]
    pub email_addresses: Vec<DirectoryEmail>,
    #[serde(default)]
    pub primary_email_address_id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub unsafe_metadata: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryEmail {
    #[serde(default)]
    pub id: Option<String>,
    pub email_address: String,
}

impl DirectoryUser {
    /// The primary address when flagged, otherwise the first one listed.
    pub fn email(&self) -> Option<&str> {
        let primary = self.primary_email_address_id.as_deref().and_then(|pid| {
            self.email_addresses
                .iter()
                .find(|e| e.id.as_deref() == Some(pid))
        });
        primary
            .or_else(|| self.email_addresses.first())
            .map(|e| e.email_address.as_str())
            .filter(|e| !e.is_empty())
    }

    /// Role chosen at sign-up, stored in the unsafe metadata. Missing or
    /// unrecognised roles fall back to tenant.
    pub fn role(&self) -> UserRole {
        self.unsafe_metadata
            .get("role")
            .and_then(|r| r.as_str())
            .and_then(|r| r.parse().ok())
            .unwrap_or_default()
    }

    pub fn into_profile(self) -> Result<IdentityProfile, AppError> {
        if self.id.is_empty() {
            return Err(AppError::validation("Missing user ID"));
        }
        let email = self
            .email()
            .ok_or_else(|| AppError::validation("Missing email"))?
            .to_string();
        let role = self.role();
        Ok(IdentityProfile {
            clerk_id: self.id,
            email,
            first_name: self.first_name.filter(|n| !n.is_empty()),
            last_name: self.last_name.filter(|n| !n.is_empty()),
            role: Some(role),
        })
    }
}

/// Work out who a session belongs to when the user has no local record yet.
///
/// The directory is authoritative when configured and reachable; otherwise the
/// profile carried in the session claims is used.
pub async fn resolve_profile<D: IdentityDirectory>(
    directory: Option<&D>,
    clerk_id: &str,
    claims: Option<IdentityProfile>,
) -> Option<IdentityProfile> {
    if let Some(directory) = directory {
        match directory.get_user(clerk_id).await {
            Ok(Some(user)) => match user.into_profile() {
                Ok(profile) => return Some(profile),
                Err(e) => tracing::warn!(clerk_id, error = %e, "Directory user is incomplete"),
            },
            Ok(None) => tracing::debug!(clerk_id, "User not found in identity directory"),
            Err(e) => tracing::warn!(clerk_id, error = %e, "Identity directory lookup failed"),
        }
    }
    claims.filter(|c| c.clerk_id == clerk_id && !c.email.is_empty())
}
