use thiserror::Error;

/// Application-wide error types for Nestly.
#[derive(Error, Debug)]
pub enum AppError {
    /// No valid session was presented.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The acting user may not perform this operation.
    #[error("{0}")]
    Forbidden(String),

    /// The addressed resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Request input failed validation.
    #[error("{0}")]
    ValidationError(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Required configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An upstream HTTP service (identity directory) failed.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Object storage rejected or failed an upload.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// An optional integration is not configured on this deployment.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Webhook payload could not be verified or understood.
    #[error("Webhook error: {0}")]
    WebhookError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(format!("{what} not found"))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::ValidationError(message.into())
    }

    /// Returns true if the failure is on the server side rather than the caller's.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            AppError::DatabaseError(_)
                | AppError::ConfigError(_)
                | AppError::HttpError(_)
                | AppError::StorageError(_)
                | AppError::Unavailable(_)
                | AppError::Generic(_)
        )
    }
}
