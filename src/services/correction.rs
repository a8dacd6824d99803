use std::collections::VecDeque;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::db::Store;
use crate::services::ingest::{self, IngestError, IngestReport};
use crate::services::language::LanguageDetector;
use crate::services::lemmatizer::Lemmatizer;
use crate::services::reconciler::{self, MistakeEntry, ReconcileError};
use crate::services::speller::Spellchecker;
use crate::services::upstream::UpstreamError;

#[derive(Debug, Clone, Serialize)]
pub struct CorrectionOutcome {
    pub corrected_text: String,
    pub entries: Vec<MistakeEntry>,
    pub skipped: Vec<usize>,
    pub report: IngestReport,
}

#[derive(Debug, Error)]
pub enum CorrectionError {
    #[error("text must not be empty")]
    EmptyText,
    #[error("text must be at most {max} characters")]
    TooLong { max: usize },
    #[error(transparent)]
    Validation(#[from] ReconcileError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

/// Runs one submitted text through spellcheck, reconciliation and ingestion.
pub struct CorrectionService {
    store: Store,
    speller: Arc<dyn Spellchecker>,
    detector: Arc<dyn LanguageDetector>,
    lemmatizer: Arc<dyn Lemmatizer>,
    max_chars: usize,
}

impl CorrectionService {
    pub fn new(
        store: Store,
        speller: Arc<dyn Spellchecker>,
        detector: Arc<dyn LanguageDetector>,
        lemmatizer: Arc<dyn Lemmatizer>,
        max_chars: usize,
    ) -> Self {
        Self {
            store,
            speller,
            detector,
            lemmatizer,
            max_chars,
        }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn check_text(&self, text: &str) -> Result<(), CorrectionError> {
        if text.trim().is_empty() {
            return Err(CorrectionError::EmptyText);
        }
        if text.chars().count() > self.max_chars {
            return Err(CorrectionError::TooLong { max: self.max_chars });
        }
        Ok(())
    }

    pub async fn correct(
        &self,
        text: &str,
        user_id: Option<i64>,
    ) -> Result<CorrectionOutcome, CorrectionError> {
        self.check_text(text)?;

        let mistakes = self.speller.check(text).await?;
        reconciler::validate(text.chars().count(), &mistakes)?;

        let mut languages = VecDeque::with_capacity(mistakes.len());
        for word in reconciler::chosen_corrections(&mistakes) {
            languages.push_back(self.detector.detect(word).await?);
        }

        let reconciliation =
            reconciler::reconcile(text, &mistakes, |_| languages.pop_front().unwrap_or_default())?;

        let report = ingest::ingest(
            &self.store,
            self.lemmatizer.as_ref(),
            &reconciliation.entries,
            user_id,
        )
        .await?;

        tracing::info!(
            mistakes = reconciliation.entries.len(),
            skipped = reconciliation.skipped.len(),
            user_id = ?user_id,
            "text corrected"
        );

        Ok(CorrectionOutcome {
            corrected_text: reconciliation.corrected_text,
            entries: reconciliation.entries,
            skipped: reconciliation.skipped,
            report,
        })
    }
}
