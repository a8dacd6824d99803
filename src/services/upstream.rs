use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

const MAX_RETRIES: usize = 2;
const BASE_BACKOFF_MS: u64 = 200;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{service} is not configured: missing {key}")]
    NotConfigured {
        service: &'static str,
        key: &'static str,
    },
    #[error("{service} request failed: {source}")]
    Request {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} returned HTTP {status}: {body}")]
    HttpStatus {
        service: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("{service} returned a malformed response: {reason}")]
    Malformed {
        service: &'static str,
        reason: String,
    },
}

impl UpstreamError {
    pub fn malformed(service: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            service,
            reason: reason.into(),
        }
    }
}

pub fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// GETs `url` with `params` and decodes a JSON body, retrying transport
/// failures and retryable statuses with exponential backoff.
pub async fn get_json_with_retry<T: DeserializeOwned>(
    client: &reqwest::Client,
    service: &'static str,
    url: &str,
    params: &[(&str, &str)],
) -> Result<T, UpstreamError> {
    let mut retry = 0usize;
    loop {
        let result = client.get(url).query(params).send().await;

        let err = match result {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    return resp
                        .json::<T>()
                        .await
                        .map_err(|e| UpstreamError::malformed(service, e.to_string()));
                }
                let body = resp.text().await.unwrap_or_default();
                let err = UpstreamError::HttpStatus {
                    service,
                    status,
                    body,
                };
                if !is_retryable(status) {
                    return Err(err);
                }
                err
            }
            Err(source) => UpstreamError::Request { service, source },
        };

        if retry >= MAX_RETRIES {
            return Err(err);
        }
        let backoff = Duration::from_millis(BASE_BACKOFF_MS * (1 << retry));
        warn!(service, retry, error = %err, "upstream call failed, retrying");
        sleep(backoff).await;
        retry += 1;
    }
}

fn is_retryable(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || status == reqwest::StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}
