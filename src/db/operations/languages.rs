use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Language {
    pub id: i64,
    pub acronym: String,
}

/// Returns the id of the language with `acronym`, inserting it first when unseen.
pub async fn resolve_or_create_language(
    conn: &mut SqliteConnection,
    acronym: &str,
) -> Result<i64, StoreError> {
    sqlx::query(r#"INSERT INTO "languages" ("acronym") VALUES (?1) ON CONFLICT ("acronym") DO NOTHING"#)
        .bind(acronym)
        .execute(&mut *conn)
        .await?;

    let id: Option<i64> = sqlx::query_scalar(r#"SELECT "id" FROM "languages" WHERE "acronym" = ?1"#)
        .bind(acronym)
        .fetch_optional(&mut *conn)
        .await?;

    id.ok_or(StoreError::Missing("languages"))
}

pub async fn find_language(pool: &SqlitePool, acronym: &str) -> Result<Option<Language>, StoreError> {
    let row = sqlx::query_as::<_, Language>(
        r#"SELECT "id", "acronym" FROM "languages" WHERE "acronym" = ?1"#,
    )
    .bind(acronym)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn list_languages(pool: &SqlitePool) -> Result<Vec<Language>, StoreError> {
    let rows = sqlx::query_as::<_, Language>(r#"SELECT "id", "acronym" FROM "languages" ORDER BY "acronym""#)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}
