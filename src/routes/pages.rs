use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Extension, Form};
use serde::Deserialize;

use crate::auth::{self, CurrentUser};
use crate::middleware::csrf::{verify_form_token, CsrfToken};
use crate::response::AppError;
use crate::routes::html;
use crate::services::accounts::{self, AccountError, Registration};
use crate::services::statistics::{self, StatsScope};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TextForm {
    #[serde(default)]
    text: String,
    csrf_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    password_repeat: String,
    #[serde(default)]
    surname: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    age: String,
    csrf_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    remember: Option<String>,
    csrf_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LogoutForm {
    csrf_token: Option<String>,
}

pub async fn index(
    user: Option<Extension<CurrentUser>>,
    Extension(csrf): Extension<CsrfToken>,
) -> Response {
    let user = user.map(|Extension(user)| user);
    html::page("Ortho", user.as_ref(), &csrf.0, &text_form(&csrf.0, "", None)).into_response()
}

pub async fn correct_text(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Extension(csrf): Extension<CsrfToken>,
    headers: HeaderMap,
    Form(form): Form<TextForm>,
) -> Response {
    let user = user.map(|Extension(user)| user);
    if !verify_form_token(&headers, form.csrf_token.as_deref()) {
        return forbidden(user.as_ref(), &csrf.0);
    }

    match state
        .corrections()
        .correct(&form.text, user.as_ref().map(|u| u.id))
        .await
    {
        Ok(outcome) => {
            let mut body = text_form(&csrf.0, &form.text, None);
            body.push_str("\n<h2>Corrected text</h2>\n<pre>");
            body.push_str(&html::escape(&outcome.corrected_text));
            body.push_str("</pre>\n<ul>\n");
            for entry in &outcome.entries {
                body.push_str(&format!(
                    "<li>{} &rarr; {} ({})</li>\n",
                    html::escape(&entry.wrong),
                    html::escape(&entry.correct),
                    html::escape(&entry.language)
                ));
            }
            body.push_str("</ul>");
            html::page("Result", user.as_ref(), &csrf.0, &body).into_response()
        }
        Err(err) => {
            let err = AppError::from(err);
            let body = text_form(&csrf.0, &form.text, Some(err.public_message()));
            (err.status(), html::page("Ortho", user.as_ref(), &csrf.0, &body)).into_response()
        }
    }
}

pub async fn register_page(
    user: Option<Extension<CurrentUser>>,
    Extension(csrf): Extension<CsrfToken>,
) -> Response {
    let user = user.map(|Extension(user)| user);
    html::page("Register", user.as_ref(), &csrf.0, &register_form(&csrf.0, None)).into_response()
}

pub async fn register(
    State(state): State<AppState>,
    Extension(csrf): Extension<CsrfToken>,
    headers: HeaderMap,
    Form(form): Form<RegisterForm>,
) -> Response {
    if !verify_form_token(&headers, form.csrf_token.as_deref()) {
        return forbidden(None, "");
    }

    let Ok(age) = form.age.trim().parse::<i64>() else {
        return register_failed(&csrf.0, "Age must be a number");
    };

    let registration = Registration {
        email: form.email,
        password: form.password,
        password_repeat: form.password_repeat,
        surname: form.surname,
        name: form.name,
        age,
    };

    match accounts::register(state.store(), &registration).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(err) if err.is_user_facing() => register_failed(&csrf.0, &err.to_string()),
        Err(err) => internal_error(err),
    }
}

pub async fn login_page(
    user: Option<Extension<CurrentUser>>,
    Extension(csrf): Extension<CsrfToken>,
) -> Response {
    let user = user.map(|Extension(user)| user);
    html::page("Login", user.as_ref(), &csrf.0, &login_form(&csrf.0, None)).into_response()
}

pub async fn login(
    State(state): State<AppState>,
    Extension(csrf): Extension<CsrfToken>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    if !verify_form_token(&headers, form.csrf_token.as_deref()) {
        return forbidden(None, "");
    }

    let remember = form.remember.is_some();
    let config = state.config();
    let ttl = if remember {
        config.remember_ttl
    } else {
        config.session_ttl
    };

    match accounts::login(state.store(), &form.email, &form.password, ttl).await {
        Ok(session) => {
            let max_age = remember.then(|| ttl.as_secs() as i64);
            let mut response = Redirect::to("/").into_response();
            match auth::session_cookie(&session.token, max_age, config.cookie_secure) {
                Some(cookie) => {
                    response.headers_mut().append(header::SET_COOKIE, cookie);
                    response
                }
                None => internal_error(AccountError::Invalid("unencodable session cookie")),
            }
        }
        Err(err) if err.is_user_facing() => {
            let body = login_form(&csrf.0, Some(&err.to_string()));
            (StatusCode::OK, html::page("Login", None, "", &body)).into_response()
        }
        Err(err) => internal_error(err),
    }
}

pub async fn logout(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Extension(csrf): Extension<CsrfToken>,
    headers: HeaderMap,
    Form(form): Form<LogoutForm>,
) -> Response {
    if !verify_form_token(&headers, form.csrf_token.as_deref()) {
        let user = user.map(|Extension(user)| user);
        return forbidden(user.as_ref(), &csrf.0);
    }

    if let Some(token) = auth::extract_session_token(&headers) {
        if let Err(err) = accounts::logout(state.store(), &token).await {
            tracing::warn!(error = %err, "logout session delete failed");
        }
    }

    let mut response = Redirect::to("/").into_response();
    response
        .headers_mut()
        .append(header::SET_COOKIE, auth::clear_session_cookie());
    response
}

pub async fn token(
    Extension(user): Extension<CurrentUser>,
    Extension(csrf): Extension<CsrfToken>,
) -> Response {
    let token = user.token.as_deref().unwrap_or("");
    let body = format!(
        "<h1>API token</h1>\n<p>Pass it as <code>token</code> to the API.</p>\n<pre>{}</pre>",
        html::escape(token)
    );
    html::page("Token", Some(&user), &csrf.0, &body).into_response()
}

pub async fn stats(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Extension(csrf): Extension<CsrfToken>,
) -> Result<Response, AppError> {
    let user = user.map(|Extension(user)| user);
    let listing = statistics::mistake_listing(state.store(), StatsScope::Global).await?;
    let by_age = statistics::stats_by_age(state.store()).await?;
    let by_language = statistics::stats_by_language(state.store(), StatsScope::Global).await?;

    let body = format!(
        "<h1>Statistics</h1>\n<h2>Mistakes</h2>\n{}\n<h2>By age</h2>\n{}\n<h2>By language</h2>\n{}",
        html::mistakes_table(&listing),
        html::age_table(&by_age),
        html::language_table(&by_language)
    );
    Ok(html::page("Statistics", user.as_ref(), &csrf.0, &body).into_response())
}

pub async fn local_stats(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Extension(csrf): Extension<CsrfToken>,
) -> Result<Response, AppError> {
    let scope = StatsScope::User(user.id);
    let listing = statistics::mistake_listing(state.store(), scope).await?;
    let by_language = statistics::stats_by_language(state.store(), scope).await?;

    let body = format!(
        "<h1>My mistakes</h1>\n{}\n<h2>By language</h2>\n{}",
        html::mistakes_table(&listing),
        html::language_table(&by_language)
    );
    Ok(html::page("My mistakes", Some(&user), &csrf.0, &body).into_response())
}

fn text_form(csrf: &str, text: &str, message: Option<&str>) -> String {
    format!(
        "<h1>Check spelling</h1>\n{}<form method=\"post\" action=\"/\">\n{}\n<textarea name=\"text\" rows=\"10\" cols=\"80\">{}</textarea>\n<button type=\"submit\">Check</button>\n</form>",
        html::message(message),
        html::csrf_field(csrf),
        html::escape(text)
    )
}

fn register_form(csrf: &str, message: Option<&str>) -> String {
    format!(
        "<h1>Register</h1>\n{}<form method=\"post\" action=\"/register\">\n{}\n\
         <label>Email <input type=\"email\" name=\"email\" required></label>\n\
         <label>Password <input type=\"password\" name=\"password\" required></label>\n\
         <label>Password repeat <input type=\"password\" name=\"password_repeat\" required></label>\n\
         <label>Surname <input name=\"surname\" required></label>\n\
         <label>Name <input name=\"name\" required></label>\n\
         <label>Age <input type=\"number\" name=\"age\" min=\"0\" required></label>\n\
         <button type=\"submit\">Register</button>\n</form>",
        html::message(message),
        html::csrf_field(csrf)
    )
}

fn login_form(csrf: &str, message: Option<&str>) -> String {
    format!(
        "<h1>Login</h1>\n{}<form method=\"post\" action=\"/login\">\n{}\n\
         <label>Email <input type=\"email\" name=\"email\" required></label>\n\
         <label>Password <input type=\"password\" name=\"password\" required></label>\n\
         <label><input type=\"checkbox\" name=\"remember\"> Remember me</label>\n\
         <button type=\"submit\">Login</button>\n</form>",
        html::message(message),
        html::csrf_field(csrf)
    )
}

fn register_failed(csrf: &str, message: &str) -> Response {
    let body = register_form(csrf, Some(message));
    (StatusCode::OK, html::page("Register", None, "", &body)).into_response()
}

fn forbidden(user: Option<&CurrentUser>, csrf: &str) -> Response {
    (
        StatusCode::FORBIDDEN,
        html::page("Forbidden", user, csrf, "<p>The form has expired. Reload the page and try again.</p>"),
    )
        .into_response()
}

fn internal_error(err: AccountError) -> Response {
    tracing::error!(error = %err, "account operation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        html::page("Error", None, "", "<p>Internal server error</p>"),
    )
        .into_response()
}
