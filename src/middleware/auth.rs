use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::auth::{extract_session_token, CurrentUser};
use crate::services::accounts;
use crate::state::AppState;

/// Attaches the session's user, if any. Never rejects.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_session_token(req.headers()) else {
        return next.run(req).await;
    };

    match accounts::user_for_session(state.store(), &token).await {
        Ok(Some(user)) => {
            req.extensions_mut().insert(CurrentUser::from(user));
        }
        Ok(None) => {}
        Err(err) => tracing::warn!(error = %err, "session lookup failed"),
    }

    next.run(req).await
}

/// Sends anonymous visitors to the login page. Runs after `optional_auth`.
pub async fn require_auth(req: Request<Body>, next: Next) -> Response {
    if req.extensions().get::<CurrentUser>().is_none() {
        return Redirect::to("/login").into_response();
    }
    next.run(req).await
}
