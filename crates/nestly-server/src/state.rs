use nestly_client::{ClerkDirectory, SupabaseStorage};
use nestly_core::AppError;
use nestly_core::webhook::WebhookVerifier;
use nestly_db::Database;

use crate::auth::SessionVerifier;
use crate::config::ServerConfig;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub db: Database,
    pub sessions: SessionVerifier,
    /// Identity-provider Backend API (None = fall back to session claims).
    pub directory: Option<ClerkDirectory>,
    /// Image storage (None = uploads answer 503).
    pub storage: Option<SupabaseStorage>,
    /// Webhook signature verifier (None = webhook answers 500).
    pub webhook: Option<WebhookVerifier>,
}

impl AppState {
    pub fn from_config(db: Database, config: &ServerConfig) -> Result<Self, AppError> {
        let sessions = SessionVerifier::from_key(&config.session_key, config.issuer.as_deref())?;

        let directory = config
            .clerk_secret_key
            .as_deref()
            .map(|key| ClerkDirectory::with_api_url(key, &config.clerk_api_url))
            .transpose()?;

        let storage = config
            .storage
            .as_ref()
            .map(|s| SupabaseStorage::new(&s.url, &s.service_key, &s.bucket))
            .transpose()?;

        let webhook = config
            .webhook_secret
            .as_deref()
            .map(WebhookVerifier::new)
            .transpose()?;

        if directory.is_none() {
            tracing::warn!("CLERK_SECRET_KEY not set; new users are created from session claims");
        }
        if storage.is_none() {
            tracing::warn!("Supabase storage not configured; image uploads are disabled");
        }
        if webhook.is_none() {
            tracing::warn!("CLERK_WEBHOOK_SECRET not set; identity webhooks will be rejected");
        }

        Ok(Self {
            db,
            sessions,
            directory,
            storage,
            webhook,
        })
    }
}
