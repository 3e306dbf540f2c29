use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use nestly_core::AppError;
use nestly_core::models::IdentityProfile;

use crate::config::SessionKey;
use crate::error::ApiError;
use crate::state::AppState;

/// Cookie the identity provider's frontend SDK stores the session token in.
pub const SESSION_COOKIE: &str = "__session";

/// The authenticated caller, inserted into request extensions by [`require_session`].
#[derive(Debug, Clone)]
pub struct Session {
    pub clerk_id: String,
    /// Profile data carried in the token, when it has at least an email.
    pub claims: Option<IdentityProfile>,
}

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

impl From<SessionClaims> for Session {
    fn from(c: SessionClaims) -> Self {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let claims = non_empty(c.email).map(|email| IdentityProfile {
            clerk_id: c.sub.clone(),
            email,
            first_name: non_empty(c.first_name),
            last_name: non_empty(c.last_name),
            role: c.role.and_then(|r| r.parse().ok()),
        });
        Session {
            clerk_id: c.sub,
            claims,
        }
    }
}

/// Verifies session JWTs.
pub struct SessionVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    pub fn from_key(key: &SessionKey, issuer: Option<&str>) -> Result<Self, AppError> {
        match key {
            SessionKey::RsaPem(pem) => Self::rs256(pem, issuer),
            SessionKey::Secret(secret) => Ok(Self::hs256(secret, issuer)),
        }
    }

    pub fn rs256(pem: &str, issuer: Option<&str>) -> Result<Self, AppError> {
        let key = DecodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| AppError::ConfigError(format!("Invalid session public key: {e}")))?;
        Ok(Self {
            key,
            validation: validation(Algorithm::RS256, issuer),
        })
    }

    pub fn hs256(secret: &str, issuer: Option<&str>) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: validation(Algorithm::HS256, issuer),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Session, AppError> {
        let data = decode::<SessionClaims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AppError::Unauthorized("Session expired".into()),
                _ => AppError::Unauthorized(format!("Invalid session token: {e}")),
            }
        })?;

        if data.claims.sub.trim().is_empty() {
            return Err(AppError::Unauthorized("Session has no subject".into()));
        }
        Ok(data.claims.into())
    }
}

fn validation(algorithm: Algorithm, issuer: Option<&str>) -> Validation {
    let mut validation = Validation::new(algorithm);
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["exp", "sub"]);
    if let Some(issuer) = issuer {
        validation.set_issuer(&[issuer]);
    }
    validation
}

/// `Authorization: Bearer <token>` first, then the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    bearer.or_else(|| {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, value)| value.trim())
            .filter(|t| !t.is_empty())
    })
}

/// Middleware that rejects requests without a valid session and exposes the
/// [`Session`] to handlers.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let session = match session_token(request.headers()) {
        Some(token) => state.sessions.verify(token),
        None => Err(AppError::Unauthorized(
            "Missing session. Expected: Authorization: Bearer <token> or __session cookie".into(),
        )),
    };

    match session {
        Ok(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected unauthenticated request");
            ApiError(e).into_response()
        }
    }
}
