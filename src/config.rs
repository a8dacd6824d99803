use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::services::language::DEFAULT_TRANSLATE_ENDPOINT;
use crate::services::speller::DEFAULT_SPELLER_ENDPOINT;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub speller_endpoint: String,
    pub translate_endpoint: String,
    pub translate_api_key: Option<String>,
    pub upstream_timeout: Duration,
    pub session_ttl: Duration,
    pub remember_ttl: Duration,
    pub cookie_secure: bool,
    pub max_text_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 5000,
            log_level: "info".to_string(),
            speller_endpoint: DEFAULT_SPELLER_ENDPOINT.to_string(),
            translate_endpoint: DEFAULT_TRANSLATE_ENDPOINT.to_string(),
            translate_api_key: None,
            upstream_timeout: Duration::from_secs(10),
            session_ttl: Duration::from_secs(24 * 60 * 60),
            remember_ttl: Duration::from_secs(30 * 24 * 60 * 60),
            cookie_secure: false,
            max_text_chars: 10_000,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(defaults.host);

        let log_level = std::env::var("RUST_LOG").unwrap_or(defaults.log_level);

        Self {
            host,
            port,
            log_level,
            speller_endpoint: env_string("SPELLER_ENDPOINT").unwrap_or(defaults.speller_endpoint),
            translate_endpoint: env_string("TRANSLATE_ENDPOINT").unwrap_or(defaults.translate_endpoint),
            translate_api_key: env_string("TRANSLATE_API_KEY"),
            upstream_timeout: env_u64("UPSTREAM_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.upstream_timeout),
            session_ttl: env_u64("SESSION_TTL_HOURS")
                .map(|hours| Duration::from_secs(hours * 60 * 60))
                .unwrap_or(defaults.session_ttl),
            remember_ttl: env_u64("REMEMBER_TTL_DAYS")
                .map(|days| Duration::from_secs(days * 24 * 60 * 60))
                .unwrap_or(defaults.remember_ttl),
            cookie_secure: env_bool("COOKIE_SECURE").unwrap_or(defaults.cookie_secure),
            max_text_chars: env_u64("MAX_TEXT_CHARS")
                .map(|value| value as usize)
                .unwrap_or(defaults.max_text_chars),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_u64(key: &str) -> Option<u64> {
    env_string(key)?.parse().ok()
}

fn env_bool(key: &str) -> Option<bool> {
    let value = env_string(key)?;
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
