use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct LanguageCount {
    pub language: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AgeCount {
    pub age: i64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct MistakeCount {
    pub name: String,
    pub count: i64,
    #[serde(rename = "lang")]
    pub language: String,
}

pub async fn language_counts(pool: &SqlitePool) -> Result<Vec<LanguageCount>, StoreError> {
    let rows = sqlx::query_as::<_, LanguageCount>(
        r#"
        SELECT l."acronym" AS "language", SUM(m."count") AS "count"
        FROM "mistakes" m
        JOIN "languages" l ON l."id" = m."language_id"
        GROUP BY l."acronym"
        ORDER BY l."acronym"
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn user_language_counts(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<LanguageCount>, StoreError> {
    let rows = sqlx::query_as::<_, LanguageCount>(
        r#"
        SELECT l."acronym" AS "language", SUM(a."count") AS "count"
        FROM "association" a
        JOIN "mistakes" m ON m."id" = a."mistake_id"
        JOIN "languages" l ON l."id" = m."language_id"
        WHERE a."user_id" = ?1
        GROUP BY l."acronym"
        ORDER BY l."acronym"
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Sums association counts per user age; users without mistakes do not appear.
pub async fn age_counts(pool: &SqlitePool) -> Result<Vec<AgeCount>, StoreError> {
    let rows = sqlx::query_as::<_, AgeCount>(
        r#"
        SELECT u."age" AS "age", SUM(a."count") AS "count"
        FROM "association" a
        JOIN "users" u ON u."id" = a."user_id"
        GROUP BY u."age"
        ORDER BY u."age"
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn mistake_listing(pool: &SqlitePool) -> Result<Vec<MistakeCount>, StoreError> {
    let rows = sqlx::query_as::<_, MistakeCount>(
        r#"
        SELECT m."name" AS "name", m."count" AS "count", l."acronym" AS "language"
        FROM "mistakes" m
        JOIN "languages" l ON l."id" = m."language_id"
        ORDER BY m."count" DESC, m."name"
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn user_mistake_listing(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<MistakeCount>, StoreError> {
    let rows = sqlx::query_as::<_, MistakeCount>(
        r#"
        SELECT m."name" AS "name", a."count" AS "count", l."acronym" AS "language"
        FROM "association" a
        JOIN "mistakes" m ON m."id" = a."mistake_id"
        JOIN "languages" l ON l."id" = m."language_id"
        WHERE a."user_id" = ?1
        ORDER BY a."count" DESC, m."name"
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
