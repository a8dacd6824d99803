use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Mistake {
    pub id: i64,
    pub name: String,
    pub count: i64,
    pub language_id: i64,
}

/// Returns the id of the mistake keyed by `name`. A new row starts at `count = 0`
/// and belongs to `language_id`; an existing row keeps its original language.
pub async fn resolve_or_create_mistake(
    conn: &mut SqliteConnection,
    name: &str,
    language_id: i64,
) -> Result<i64, StoreError> {
    sqlx::query(
        r#"
        INSERT INTO "mistakes" ("name", "count", "language_id") VALUES (?1, 0, ?2)
        ON CONFLICT ("name") DO NOTHING
        "#,
    )
    .bind(name)
    .bind(language_id)
    .execute(&mut *conn)
    .await?;

    let id: Option<i64> = sqlx::query_scalar(r#"SELECT "id" FROM "mistakes" WHERE "name" = ?1"#)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    id.ok_or(StoreError::Missing("mistakes"))
}

pub async fn increment_mistake(conn: &mut SqliteConnection, mistake_id: i64) -> Result<i64, StoreError> {
    let count: Option<i64> = sqlx::query_scalar(
        r#"UPDATE "mistakes" SET "count" = "count" + 1 WHERE "id" = ?1 RETURNING "count""#,
    )
    .bind(mistake_id)
    .fetch_optional(&mut *conn)
    .await?;

    count.ok_or(StoreError::Missing("mistakes"))
}

pub async fn find_mistake(pool: &SqlitePool, name: &str) -> Result<Option<Mistake>, StoreError> {
    let row = sqlx::query_as::<_, Mistake>(
        r#"SELECT "id", "name", "count", "language_id" FROM "mistakes" WHERE "name" = ?1"#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn total_mistake_count(pool: &SqlitePool) -> Result<i64, StoreError> {
    let total: i64 = sqlx::query_scalar(r#"SELECT COALESCE(SUM("count"), 0) FROM "mistakes""#)
        .fetch_one(pool)
        .await?;
    Ok(total)
}

pub async fn count_mistake_rows(pool: &SqlitePool) -> Result<i64, StoreError> {
    let rows: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "mistakes""#)
        .fetch_one(pool)
        .await?;
    Ok(rows)
}
