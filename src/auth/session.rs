use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use rand::{distributions::Alphanumeric, Rng};
use time::{Duration, OffsetDateTime};

use crate::auth::repo::User;
use crate::error::ApiError;
use crate::state::AppState;

const TOKEN_LEN: usize = 48;

struct SessionEntry {
    email: String,
    established_at: OffsetDateTime,
}

/// Process-local session registry mapping an opaque bearer token to the
/// normalized email it was established for. Clearing a token revokes it for
/// every later request.
#[derive(Clone)]
pub struct SessionStore {
    ttl: Duration,
    inner: Arc<RwLock<HashMap<String, SessionEntry>>>,
}

impl SessionStore {
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            ttl: Duration::minutes(ttl_minutes),
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Issue a fresh token correlated to `email`.
    pub fn establish(&self, email: &str) -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        let entry = SessionEntry {
            email: email.to_string(),
            established_at: OffsetDateTime::now_utc(),
        };
        self.inner
            .write()
            .expect("session lock poisoned")
            .insert(token.clone(), entry);
        token
    }

    /// Map a token back to its email. Unknown and expired tokens both come
    /// back as `None`; expired entries are dropped here.
    pub fn resolve(&self, token: &str) -> Option<String> {
        let mut sessions = self.inner.write().expect("session lock poisoned");
        match sessions.get(token) {
            Some(entry) if OffsetDateTime::now_utc() - entry.established_at < self.ttl => {
                Some(entry.email.clone())
            }
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    pub fn clear(&self, token: &str) {
        self.inner
            .write()
            .expect("session lock poisoned")
            .remove(token);
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")))
}

/// Resolved caller identity. Handlers receive the user id explicitly; nothing
/// downstream reads ambient session state.
pub struct AuthUser(pub i64);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::Unauthenticated)?;
        let email = state
            .sessions
            .resolve(token)
            .ok_or(ApiError::Unauthenticated)?;
        let user = User::find_by_email(&state.db, &email)
            .await?
            .ok_or(ApiError::Unauthenticated)?;
        Ok(AuthUser(user.id))
    }
}

/// The raw bearer token, for handlers that act on the session itself.
pub struct SessionToken(pub String);

#[async_trait]
impl FromRequestParts<AppState> for SessionToken {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        bearer_token(parts)
            .map(|t| SessionToken(t.to_string()))
            .ok_or(ApiError::Unauthenticated)
    }
}
