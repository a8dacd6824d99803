use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::config::Config;
use crate::db::Store;
use crate::services::correction::CorrectionService;
use crate::services::language::{LanguageDetector, YandexDetector};
use crate::services::lemmatizer::{Lemmatizer, MorphLemmatizer};
use crate::services::speller::{Spellchecker, YandexSpeller};

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    config: Arc<Config>,
    store: Store,
    corrections: Arc<CorrectionService>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Store,
        speller: Arc<dyn Spellchecker>,
        detector: Arc<dyn LanguageDetector>,
        lemmatizer: Arc<dyn Lemmatizer>,
    ) -> Self {
        let corrections = CorrectionService::new(
            store.clone(),
            speller,
            detector,
            lemmatizer,
            config.max_text_chars,
        );

        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            config: Arc::new(config),
            store,
            corrections: Arc::new(corrections),
        }
    }

    /// Wires the Yandex speller and language detector described by `config`,
    /// keying mistakes by their Russian dictionary form.
    pub fn with_yandex(config: Config, store: Store) -> Self {
        let speller = YandexSpeller::new(config.speller_endpoint.clone(), config.upstream_timeout);
        let detector = YandexDetector::new(
            config.translate_endpoint.clone(),
            config.translate_api_key.clone(),
            config.upstream_timeout,
        );
        if !detector.is_available() {
            tracing::warn!("TRANSLATE_API_KEY not set, language detection will fail");
        }

        Self::new(
            config,
            store,
            Arc::new(speller),
            Arc::new(detector),
            Arc::new(MorphLemmatizer::russian()),
        )
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn corrections(&self) -> &CorrectionService {
        &self.corrections
    }
}
