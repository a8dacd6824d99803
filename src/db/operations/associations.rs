use sqlx::{SqliteConnection, SqlitePool};

use crate::db::StoreError;

pub async fn resolve_or_create_association(
    conn: &mut SqliteConnection,
    user_id: i64,
    mistake_id: i64,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO "association" ("user_id", "mistake_id", "count") VALUES (?1, ?2, 0)
        ON CONFLICT ("user_id", "mistake_id") DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(mistake_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn increment_association(
    conn: &mut SqliteConnection,
    user_id: i64,
    mistake_id: i64,
) -> Result<i64, StoreError> {
    let count: Option<i64> = sqlx::query_scalar(
        r#"
        UPDATE "association" SET "count" = "count" + 1
        WHERE "user_id" = ?1 AND "mistake_id" = ?2
        RETURNING "count"
        "#,
    )
    .bind(user_id)
    .bind(mistake_id)
    .fetch_optional(&mut *conn)
    .await?;

    count.ok_or(StoreError::Missing("association"))
}

pub async fn association_count(
    pool: &SqlitePool,
    user_id: i64,
    mistake_id: i64,
) -> Result<Option<i64>, StoreError> {
    let count: Option<i64> = sqlx::query_scalar(
        r#"SELECT "count" FROM "association" WHERE "user_id" = ?1 AND "mistake_id" = ?2"#,
    )
    .bind(user_id)
    .bind(mistake_id)
    .fetch_optional(pool)
    .await?;
    Ok(count)
}

pub async fn count_user_associations(pool: &SqlitePool, user_id: i64) -> Result<i64, StoreError> {
    let rows: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "association" WHERE "user_id" = ?1"#)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(rows)
}
