use std::time::Duration;

use thiserror::Error;

use crate::auth::{generate_token, hash_token};
use crate::db::operations::user::{self, NewUser, User};
use crate::db::{Store, StoreError};

const BCRYPT_COST: u32 = 10;
const MAX_AGE: i64 = 150;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Different passwords")]
    PasswordMismatch,
    #[error("User already exists")]
    EmailTaken,
    #[error("Wrong email or password")]
    InvalidCredentials,
    #[error("{0}")]
    Invalid(&'static str),
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AccountError {
    /// Errors caused by the submitted form rather than by the server.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, AccountError::Hash(_) | AccountError::Store(_))
    }
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub password_repeat: String,
    pub surname: String,
    pub name: String,
    pub age: i64,
}

impl Registration {
    fn validate(&self) -> Result<(), AccountError> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AccountError::Invalid("A valid email is required"));
        }
        if self.password.is_empty() {
            return Err(AccountError::Invalid("Password is required"));
        }
        if self.name.trim().is_empty() || self.surname.trim().is_empty() {
            return Err(AccountError::Invalid("Name and surname are required"));
        }
        if !(0..=MAX_AGE).contains(&self.age) {
            return Err(AccountError::Invalid("Age is out of range"));
        }
        if self.password != self.password_repeat {
            return Err(AccountError::PasswordMismatch);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LoginSession {
    pub user: User,
    pub token: String,
    pub expires_at_ms: i64,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn register(store: &Store, registration: &Registration) -> Result<User, AccountError> {
    registration.validate()?;
    let email = normalize_email(&registration.email);

    if user::find_user_by_email(store.pool(), &email).await?.is_some() {
        return Err(AccountError::EmailTaken);
    }

    let password_hash = bcrypt::hash(&registration.password, BCRYPT_COST)?;
    let api_token = generate_token();

    let new_user = NewUser {
        email: &email,
        name: registration.name.trim(),
        surname: registration.surname.trim(),
        age: registration.age,
        password_hash: &password_hash,
        token: &api_token,
    };

    let user_id = match user::create_user(store.pool(), &new_user).await {
        Ok(id) => id,
        Err(err) if err.is_unique_violation() => return Err(AccountError::EmailTaken),
        Err(err) => return Err(err.into()),
    };

    tracing::info!(user_id, "user registered");

    user::find_user_by_id(store.pool(), user_id)
        .await?
        .ok_or(AccountError::Store(StoreError::Missing("users")))
}

pub async fn login(
    store: &Store,
    email: &str,
    password: &str,
    ttl: Duration,
) -> Result<LoginSession, AccountError> {
    let email = normalize_email(email);
    let Some(found) = user::find_user_by_email(store.pool(), &email).await? else {
        return Err(AccountError::InvalidCredentials);
    };

    if !bcrypt::verify(password, &found.password_hash)? {
        return Err(AccountError::InvalidCredentials);
    }

    let now_ms = chrono::Utc::now().timestamp_millis();
    let purged = user::purge_expired_sessions(store.pool(), now_ms).await?;
    if purged > 0 {
        tracing::debug!(purged, "expired sessions removed");
    }

    let token = generate_token();
    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    let expires_at_ms = now_ms.saturating_add(ttl_ms);
    user::create_session(store.pool(), &hash_token(&token), found.id, expires_at_ms).await?;

    tracing::info!(user_id = found.id, "user logged in");

    Ok(LoginSession {
        user: found,
        token,
        expires_at_ms,
    })
}

pub async fn logout(store: &Store, session_token: &str) -> Result<(), StoreError> {
    user::delete_session(store.pool(), &hash_token(session_token)).await
}

pub async fn user_for_session(store: &Store, session_token: &str) -> Result<Option<User>, StoreError> {
    let now_ms = chrono::Utc::now().timestamp_millis();
    let Some(user_id) =
        user::find_session_user_id(store.pool(), &hash_token(session_token), now_ms).await?
    else {
        return Ok(None);
    };
    user::find_user_by_id(store.pool(), user_id).await
}

pub async fn user_for_api_token(store: &Store, token: &str) -> Result<Option<User>, StoreError> {
    let token = token.trim();
    if token.is_empty() {
        return Ok(None);
    }
    user::find_user_by_token(store.pool(), token).await
}
