//! Books reconciled corrections into the mistake store.
//!
//! Every entry is committed in its own transaction. A failure stops the batch;
//! entries committed before it stay committed, so callers may see partial
//! success. Re-submitting is safe: rows are keyed by acronym, normalized name
//! and (user, mistake), so a retry only adds counts, never duplicate rows.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::db::operations::{associations, languages, mistakes, user};
use crate::db::{Store, StoreError};
use crate::services::lemmatizer::Lemmatizer;
use crate::services::reconciler::MistakeEntry;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub committed: usize,
    pub retried: usize,
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("user {0} does not exist")]
    UserNotFound(i64),
    #[error("ingestion stopped at entry {index} after {committed} committed entries: {source}")]
    Store {
        index: usize,
        committed: usize,
        #[source]
        source: StoreError,
    },
}

pub async fn ingest(
    store: &Store,
    lemmatizer: &dyn Lemmatizer,
    entries: &[MistakeEntry],
    user_id: Option<i64>,
) -> Result<IngestReport, IngestError> {
    if let Some(user_id) = user_id {
        let found = user::find_user_by_id(store.pool(), user_id)
            .await
            .map_err(|source| IngestError::Store {
                index: 0,
                committed: 0,
                source,
            })?;
        if found.is_none() {
            return Err(IngestError::UserNotFound(user_id));
        }
    }

    let mut report = IngestReport::default();

    for (index, entry) in entries.iter().enumerate() {
        let name = lemmatizer.normalize(&entry.correct);

        let first = ingest_entry(store, &entry.language, &name, user_id).await;
        let outcome = match first {
            Err(err) if err.is_retryable() => {
                warn!(index, mistake = %name, error = %err, "mistake ingestion conflict, retrying once");
                report.retried += 1;
                ingest_entry(store, &entry.language, &name, user_id).await
            }
            other => other,
        };

        if let Err(source) = outcome {
            return Err(IngestError::Store {
                index,
                committed: report.committed,
                source,
            });
        }
        report.committed += 1;
    }

    debug!(committed = report.committed, retried = report.retried, "mistakes ingested");
    Ok(report)
}

async fn ingest_entry(
    store: &Store,
    language: &str,
    name: &str,
    user_id: Option<i64>,
) -> Result<(), StoreError> {
    let mut tx = store.begin().await?;

    let language_id = languages::resolve_or_create_language(&mut tx, language).await?;
    let mistake_id = mistakes::resolve_or_create_mistake(&mut tx, name, language_id).await?;
    mistakes::increment_mistake(&mut tx, mistake_id).await?;

    if let Some(user_id) = user_id {
        associations::resolve_or_create_association(&mut tx, user_id, mistake_id).await?;
        associations::increment_association(&mut tx, user_id, mistake_id).await?;
    }

    tx.commit().await?;
    Ok(())
}
