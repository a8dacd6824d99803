use std::time::Duration;

use futures::future::BoxFuture;
use serde::Deserialize;

use crate::services::upstream::{build_client, get_json_with_retry, UpstreamError};

pub const DEFAULT_TRANSLATE_ENDPOINT: &str = "https://translate.yandex.net/api/v1.5/tr.json/detect";

const SERVICE: &str = "language detector";

pub trait LanguageDetector: Send + Sync {
    /// Returns the lower-cased acronym of the language `word` is written in.
    fn detect<'a>(&'a self, word: &'a str) -> BoxFuture<'a, Result<String, UpstreamError>>;
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    lang: Option<String>,
}

fn acronym_from(response: DetectResponse) -> Result<String, UpstreamError> {
    if let Some(code) = response.code {
        if code != 200 {
            return Err(UpstreamError::malformed(SERVICE, format!("status code {code}")));
        }
    }
    let acronym = response
        .lang
        .map(|lang| lang.trim().to_lowercase())
        .filter(|lang| !lang.is_empty())
        .ok_or_else(|| UpstreamError::malformed(SERVICE, "no language in response"))?;
    Ok(acronym)
}

#[derive(Clone)]
pub struct YandexDetector {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl YandexDetector {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            client: build_client(timeout),
        }
    }

    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

impl LanguageDetector for YandexDetector {
    fn detect<'a>(&'a self, word: &'a str) -> BoxFuture<'a, Result<String, UpstreamError>> {
        Box::pin(async move {
            let api_key = self.api_key.as_deref().ok_or(UpstreamError::NotConfigured {
                service: SERVICE,
                key: "TRANSLATE_API_KEY",
            })?;

            let response: DetectResponse = get_json_with_retry(
                &self.client,
                SERVICE,
                &self.endpoint,
                &[("key", api_key), ("text", word)],
            )
            .await?;

            acronym_from(response)
        })
    }
}
