mod api;
mod health;
mod html;
mod pages;

use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::middleware::auth::{optional_auth, require_auth};
use crate::middleware::csrf::csrf_token_middleware;
use crate::response::json_error;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/token", get(pages::token))
        .route("/local_stats", get(pages::local_stats))
        .route_layer(middleware::from_fn(require_auth));

    Router::new()
        .route("/", get(pages::index).post(pages::correct_text))
        .route("/register", get(pages::register_page).post(pages::register))
        .route("/login", get(pages::login_page).post(pages::login))
        .route("/logout", post(pages::logout))
        .route("/stats", get(pages::stats))
        .merge(protected)
        .nest("/api", api::router())
        .nest("/health", health::router())
        .layer(middleware::from_fn_with_state(state.clone(), optional_auth))
        .layer(middleware::from_fn(csrf_token_middleware))
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Not found").into_response()
}
