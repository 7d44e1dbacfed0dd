//! Password hashing, bearer-token issuance and the `CurrentUser` extractor.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

/// Hex SHA-256 over the user id followed by the password.
pub fn hash_password(user_id: Uuid, password: &str) -> String {
    let digest = Sha256::new()
        .chain_update(user_id.as_bytes())
        .chain_update(password.as_bytes())
        .finalize();
    hex::encode(digest)
}

/// Extract the token from an `Authorization` header value. The scheme is
/// matched case-insensitively.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

struct Issued {
    user_id: Uuid,
    expires_at: Instant,
}

/// Live bearer tokens. Clones share the same registry.
#[derive(Clone)]
pub struct TokenRegistry {
    tokens: Arc<RwLock<HashMap<String, Issued>>>,
    ttl: Duration,
}

impl TokenRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            tokens: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Issue a fresh token, dropping every expired one on the way.
    pub async fn issue(&self, user_id: Uuid) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let now = Instant::now();
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, issued| issued.expires_at > now);
        if tokens.len() < before {
            debug!(purged = before - tokens.len(), "dropped expired tokens");
        }
        tokens.insert(
            token.clone(),
            Issued {
                user_id,
                expires_at: now + self.ttl,
            },
        );
        token
    }

    /// The owner of a live token. Expired tokens are dropped on sight.
    pub async fn resolve(&self, token: &str) -> Option<Uuid> {
        let mut tokens = self.tokens.write().await;
        let (user_id, expires_at) = tokens.get(token).map(|i| (i.user_id, i.expires_at))?;
        if Instant::now() >= expires_at {
            tokens.remove(token);
            debug!("dropped expired token");
            return None;
        }
        Some(user_id)
    }
}

/// The authenticated caller of a protected route.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Uuid);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized("Missing Authorization header"))?;
        let token = bearer_token(header)
            .ok_or(ApiError::Unauthorized("Invalid Authorization header format"))?;
        let user_id = state
            .tokens
            .resolve(token)
            .await
            .ok_or(ApiError::Unauthorized("Session expired or unknown"))?;
        Ok(CurrentUser(user_id))
    }
}
