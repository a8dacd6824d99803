use std::collections::BTreeMap;

use serde::Serialize;

use crate::db::operations::statistics::{self as stats_db, AgeCount, LanguageCount, MistakeCount};
use crate::db::{Store, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsScope {
    Global,
    User(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeRangeCount {
    pub age_range: String,
    pub count: i64,
}

pub fn age_range_label(bracket: i64) -> String {
    format!("{} - {}", bracket, bracket + 9)
}

pub fn age_bracket(age: i64) -> i64 {
    age.div_euclid(10) * 10
}

pub async fn stats_by_language(store: &Store, scope: StatsScope) -> Result<Vec<LanguageCount>, StoreError> {
    match scope {
        StatsScope::Global => stats_db::language_counts(store.pool()).await,
        StatsScope::User(user_id) => stats_db::user_language_counts(store.pool(), user_id).await,
    }
}

pub async fn stats_by_age(store: &Store) -> Result<Vec<AgeRangeCount>, StoreError> {
    let rows = stats_db::age_counts(store.pool()).await?;
    Ok(group_by_bracket(rows))
}

/// Folds per-age totals into decade brackets, youngest first.
fn group_by_bracket(rows: Vec<AgeCount>) -> Vec<AgeRangeCount> {
    let mut brackets: BTreeMap<i64, i64> = BTreeMap::new();
    for row in rows {
        *brackets.entry(age_bracket(row.age)).or_default() += row.count;
    }
    brackets
        .into_iter()
        .map(|(bracket, count)| AgeRangeCount {
            age_range: age_range_label(bracket),
            count,
        })
        .collect()
}

pub async fn mistake_listing(store: &Store, scope: StatsScope) -> Result<Vec<MistakeCount>, StoreError> {
    match scope {
        StatsScope::Global => stats_db::mistake_listing(store.pool()).await,
        StatsScope::User(user_id) => stats_db::user_mistake_listing(store.pool(), user_id).await,
    }
}
