use serde::Serialize;
use sqlx::{SqliteExecutor, SqlitePool};

use crate::db::StoreError;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub age: i64,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub token: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub surname: &'a str,
    pub age: i64,
    pub password_hash: &'a str,
    pub token: &'a str,
}

const USER_COLUMNS: &str =
    r#""id", "email", "name", "surname", "age", "password_hash", "token", "created_at""#;

pub async fn create_user(pool: &SqlitePool, user: &NewUser<'_>) -> Result<i64, StoreError> {
    let now = chrono::Utc::now().timestamp_millis();
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO "users" ("email", "name", "surname", "age", "password_hash", "token", "created_at")
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        RETURNING "id"
        "#,
    )
    .bind(user.email)
    .bind(user.name)
    .bind(user.surname)
    .bind(user.age)
    .bind(user.password_hash)
    .bind(user.token)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn find_user_by_id<'e>(
    executor: impl SqliteExecutor<'e>,
    user_id: i64,
) -> Result<Option<User>, StoreError> {
    let sql = format!(r#"SELECT {USER_COLUMNS} FROM "users" WHERE "id" = ?1"#);
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;
    Ok(row)
}

pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, StoreError> {
    let sql = format!(r#"SELECT {USER_COLUMNS} FROM "users" WHERE "email" = ?1"#);
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_user_by_token(pool: &SqlitePool, token: &str) -> Result<Option<User>, StoreError> {
    let sql = format!(r#"SELECT {USER_COLUMNS} FROM "users" WHERE "token" = ?1"#);
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(token)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create_session(
    pool: &SqlitePool,
    token_hash: &str,
    user_id: i64,
    expires_at_ms: i64,
) -> Result<(), StoreError> {
    sqlx::query(r#"INSERT INTO "sessions" ("token_hash", "user_id", "expires_at") VALUES (?1, ?2, ?3)"#)
        .bind(token_hash)
        .bind(user_id)
        .bind(expires_at_ms)
        .execute(pool)
        .await?;
    Ok(())
}

/// Resolves a live session to its user id; expired sessions resolve to nothing.
pub async fn find_session_user_id(
    pool: &SqlitePool,
    token_hash: &str,
    now_ms: i64,
) -> Result<Option<i64>, StoreError> {
    let user_id: Option<i64> = sqlx::query_scalar(
        r#"SELECT "user_id" FROM "sessions" WHERE "token_hash" = ?1 AND "expires_at" > ?2"#,
    )
    .bind(token_hash)
    .bind(now_ms)
    .fetch_optional(pool)
    .await?;
    Ok(user_id)
}

pub async fn delete_session(pool: &SqlitePool, token_hash: &str) -> Result<(), StoreError> {
    sqlx::query(r#"DELETE FROM "sessions" WHERE "token_hash" = ?1"#)
        .bind(token_hash)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn purge_expired_sessions(pool: &SqlitePool, now_ms: i64) -> Result<u64, StoreError> {
    let result = sqlx::query(r#"DELETE FROM "sessions" WHERE "expires_at" <= ?1"#)
        .bind(now_ms)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
