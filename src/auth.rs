use axum::http::{header, HeaderMap, HeaderValue};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::db::operations::user::User;

pub const SESSION_COOKIE_NAME: &str = "ortho_session";

/// The logged-in user, attached to request extensions by the auth middleware.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub age: i64,
    pub token: Option<String>,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            surname: user.surname,
            age: user.age,
            token: user.token,
        }
    }
}

/// 16 random bytes, URL-safe base64 without padding.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    get_cookie(headers, SESSION_COOKIE_NAME).filter(|value| !value.is_empty())
}

pub fn session_cookie(token: &str, max_age_secs: Option<i64>, secure: bool) -> Option<HeaderValue> {
    let mut parts = vec![
        format!("{SESSION_COOKIE_NAME}={token}"),
        "Path=/".to_string(),
        "HttpOnly".to_string(),
        "SameSite=Lax".to_string(),
    ];
    if let Some(max_age) = max_age_secs {
        parts.push(format!("Max-Age={max_age}"));
    }
    if secure {
        parts.push("Secure".to_string());
    }
    HeaderValue::from_str(&parts.join("; ")).ok()
}

pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("ortho_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for raw in headers.get_all(header::COOKIE) {
        let Ok(raw) = raw.to_str() else {
            continue;
        };
        for part in raw.split(';') {
            if let Some((key, value)) = part.trim().split_once('=') {
                if key == name {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}
