use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::auth::get_cookie;

pub const CSRF_COOKIE_NAME: &str = "csrf_token";
pub const CSRF_FORM_FIELD: &str = "csrf_token";

/// The token rendered into forms for the current request.
#[derive(Debug, Clone)]
pub struct CsrfToken(pub String);

pub async fn csrf_token_middleware(mut req: Request<Body>, next: Next) -> Response {
    let existing = get_cookie(req.headers(), CSRF_COOKIE_NAME).filter(|value| !value.is_empty());
    let is_new = existing.is_none();
    let token = existing.unwrap_or_else(generate_csrf_token);

    req.extensions_mut().insert(CsrfToken(token.clone()));
    let mut response = next.run(req).await;

    if is_new {
        if let Ok(header_value) = HeaderValue::from_str(&build_csrf_cookie_header(&token)) {
            response
                .headers_mut()
                .append(header::SET_COOKIE, header_value);
        }
    }

    response
}

/// Double-submit check: the form field must echo the cookie.
pub fn verify_form_token(headers: &HeaderMap, submitted: Option<&str>) -> bool {
    let Some(cookie_token) = get_cookie(headers, CSRF_COOKIE_NAME) else {
        return false;
    };
    let Some(submitted) = submitted else {
        return false;
    };
    !cookie_token.is_empty() && secure_eq(cookie_token.as_bytes(), submitted.as_bytes())
}

fn generate_csrf_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

fn build_csrf_cookie_header(token: &str) -> String {
    format!("{CSRF_COOKIE_NAME}={token}; Path=/; Max-Age=86400; SameSite=Lax")
}

fn secure_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (left, right) in a.iter().zip(b.iter()) {
        diff |= left ^ right;
    }
    diff == 0
}
