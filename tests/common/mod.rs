#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use futures::future::BoxFuture;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use ortho_backend::config::Config;
use ortho_backend::db::config::DbConfig;
use ortho_backend::db::Store;
use ortho_backend::services::language::LanguageDetector;
use ortho_backend::services::lemmatizer::LowercaseLemmatizer;
use ortho_backend::services::reconciler::SpellingMistake;
use ortho_backend::services::speller::Spellchecker;
use ortho_backend::services::upstream::UpstreamError;
use ortho_backend::state::AppState;

/// Flags whole words found in a fixed dictionary of misspellings.
pub struct DictionarySpeller {
    corrections: HashMap<String, String>,
}

impl DictionarySpeller {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            corrections: pairs
                .iter()
                .map(|(wrong, right)| (wrong.to_string(), right.to_string()))
                .collect(),
        }
    }
}

impl Spellchecker for DictionarySpeller {
    fn check<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<SpellingMistake>, UpstreamError>> {
        Box::pin(async move {
            let chars: Vec<char> = text.chars().collect();
            let mut found = Vec::new();
            let mut start = 0;
            while start < chars.len() {
                if !chars[start].is_alphanumeric() {
                    start += 1;
                    continue;
                }
                let mut end = start;
                while end < chars.len() && chars[end].is_alphanumeric() {
                    end += 1;
                }
                let word: String = chars[start..end].iter().collect();
                if let Some(right) = self.corrections.get(&word) {
                    found.push(SpellingMistake::new(start, end - start, &[right.as_str()]));
                }
                start = end;
            }
            Ok(found)
        })
    }
}

/// Always fails, as an unreachable spellchecker would.
pub struct DownSpeller;

impl Spellchecker for DownSpeller {
    fn check<'a>(&'a self, _text: &'a str) -> BoxFuture<'a, Result<Vec<SpellingMistake>, UpstreamError>> {
        Box::pin(async { Err(UpstreamError::malformed("speller", "connection refused")) })
    }
}

/// "ru" for Cyrillic words, "en" for everything else.
pub struct ScriptDetector;

impl LanguageDetector for ScriptDetector {
    fn detect<'a>(&'a self, word: &'a str) -> BoxFuture<'a, Result<String, UpstreamError>> {
        Box::pin(async move {
            let cyrillic = word.chars().any(|c| ('\u{0400}'..='\u{04FF}').contains(&c));
            Ok(if cyrillic { "ru" } else { "en" }.to_string())
        })
    }
}

pub const DICTIONARY: &[(&str, &str)] = &[
    ("Прагулка", "Прогулка"),
    ("полисаднику", "палисаднику"),
    ("helo", "hello"),
    ("wrld", "world"),
];

pub struct TestApp {
    pub router: Router,
    pub store: Store,
    pub state: AppState,
    _dir: TempDir,
}

pub async fn open_store() -> (Store, TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = Store::open(&DbConfig::at(dir.path().join("ortho.db")))
        .await
        .expect("open store");
    (store, dir)
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with(Arc::new(DictionarySpeller::new(DICTIONARY))).await
}

pub async fn create_test_app_with(speller: Arc<dyn Spellchecker>) -> TestApp {
    let (store, dir) = open_store().await;
    let state = AppState::new(
        Config::default(),
        store.clone(),
        speller,
        Arc::new(ScriptDetector),
        Arc::new(LowercaseLemmatizer),
    );
    TestApp {
        router: ortho_backend::app(state.clone()),
        store,
        state,
        _dir: dir,
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.expect("request")
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).expect("json body")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn post_form(uri: &str, cookies: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let body = fields
        .iter()
        .map(|(key, value)| format!("{}={}", form_encode(key), form_encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::COOKIE, cookies)
        .body(Body::from(body))
        .expect("request")
}

pub fn get_with_cookies(uri: &str, cookies: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookies)
        .body(Body::empty())
        .expect("request")
}

/// `name=value` of the first Set-Cookie header for `name`.
pub fn set_cookie(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.starts_with(&format!("{name}=")))
        .map(str::to_string)
}

pub fn cookie_value(pair: &str) -> &str {
    pair.split_once('=').map(|(_, v)| v).unwrap_or("")
}

pub fn assert_redirect(response: &Response<Body>, location: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some(location)
    );
}

pub fn query_encode(value: &str) -> String {
    form_encode(value)
}

fn form_encode(value: &str) -> String {
    let mut out = String::new();
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
