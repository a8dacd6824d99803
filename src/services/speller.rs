use std::time::Duration;

use futures::future::BoxFuture;
use serde::Deserialize;

use crate::services::reconciler::SpellingMistake;
use crate::services::upstream::{build_client, get_json_with_retry, UpstreamError};

pub const DEFAULT_SPELLER_ENDPOINT: &str =
    "https://speller.yandex.net/services/spellservice.json/checkText";

const SERVICE: &str = "spellchecker";

pub trait Spellchecker: Send + Sync {
    /// Flags misspelled spans of `text`, in ascending order of position.
    fn check<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<SpellingMistake>, UpstreamError>>;
}

/// One element of the `checkText` response.
#[derive(Debug, Deserialize)]
struct SpellerHit {
    pos: i64,
    len: i64,
    #[serde(default)]
    s: Vec<String>,
}

impl SpellerHit {
    fn into_mistake(self) -> Result<SpellingMistake, UpstreamError> {
        let position = usize::try_from(self.pos)
            .map_err(|_| UpstreamError::malformed(SERVICE, format!("negative position {}", self.pos)))?;
        let length = usize::try_from(self.len)
            .map_err(|_| UpstreamError::malformed(SERVICE, format!("negative length {}", self.len)))?;
        Ok(SpellingMistake {
            position,
            length,
            suggestions: self.s,
        })
    }
}

#[derive(Clone)]
pub struct YandexSpeller {
    endpoint: String,
    client: reqwest::Client,
}

impl YandexSpeller {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: build_client(timeout),
        }
    }
}

impl Spellchecker for YandexSpeller {
    fn check<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<SpellingMistake>, UpstreamError>> {
        Box::pin(async move {
            let hits: Vec<SpellerHit> = get_json_with_retry(
                &self.client,
                SERVICE,
                &self.endpoint,
                &[("text", text), ("format", "plain")],
            )
            .await?;

            hits.into_iter().map(SpellerHit::into_mistake).collect()
        })
    }
}
