use nestly_client::clerk::DEFAULT_API_URL;
use nestly_client::storage::DEFAULT_BUCKET;
use nestly_core::AppError;

const DEFAULT_PORT: u16 = 3000;

/// How session tokens are verified.
#[derive(Debug, Clone)]
pub enum SessionKey {
    /// RS256 PEM public key of the identity provider.
    RsaPem(String),
    /// HS256 shared secret.
    Secret(String),
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub url: String,
    pub service_key: String,
    pub bucket: String,
}

/// Server configuration read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub session_key: SessionKey,
    pub issuer: Option<String>,
    pub clerk_secret_key: Option<String>,
    pub clerk_api_url: String,
    pub webhook_secret: Option<String>,
    pub storage: Option<StorageConfig>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("NESTLY_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| AppError::ConfigError(format!("Invalid NESTLY_PORT: {raw}")))?,
            None => DEFAULT_PORT,
        };

        // Keys pasted into .env files often carry literal "\n" sequences.
        let session_key = match (get("CLERK_JWT_KEY"), get("SESSION_JWT_SECRET")) {
            (Some(pem), _) => SessionKey::RsaPem(pem.replace("\\n", "\n")),
            (None, Some(secret)) => SessionKey::Secret(secret),
            (None, None) => {
                return Err(AppError::ConfigError(
                    "CLERK_JWT_KEY or SESSION_JWT_SECRET must be set".into(),
                ));
            }
        };

        let storage = match (get("SUPABASE_URL"), get("SUPABASE_SERVICE_KEY")) {
            (Some(url), Some(service_key)) => Some(StorageConfig {
                url,
                service_key,
                bucket: get("STORAGE_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            port,
            session_key,
            issuer: get("CLERK_ISSUER"),
            clerk_secret_key: get("CLERK_SECRET_KEY"),
            clerk_api_url: get("CLERK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            webhook_secret: get("CLERK_WEBHOOK_SECRET"),
            storage,
        })
    }
}
