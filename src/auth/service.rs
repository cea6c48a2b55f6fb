use lazy_static::lazy_static;
use regex::Regex;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::User;
use crate::error::ApiError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trim + lowercase. This is the canonical form stored in the database and
/// used for every lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn register(db: &SqlitePool, email: &str, password: &str) -> Result<User, ApiError> {
    let email = normalize_email(email);
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::Validation(
            "Email and password are required".into(),
        ));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "register with invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }

    if User::find_by_email(db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::DuplicateEmail);
    }

    let hash = hash_password(password)?;
    // The UNIQUE constraint backstops the lookup above.
    let user = User::create(db, &email, &hash).await.map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            ApiError::DuplicateEmail
        }
        other => other.into(),
    })?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(user)
}

pub async fn authenticate(db: &SqlitePool, email: &str, password: &str) -> Result<User, ApiError> {
    let email = normalize_email(email);
    let user = match User::find_by_email(db, &email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login with unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = user.id, "login with invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    Ok(user)
}
