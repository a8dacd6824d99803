use sqlx::SqlitePool;

pub const SCHEMA_VERSION: &str = "1.0.0";

pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS "_db_metadata" (
    "key" TEXT PRIMARY KEY NOT NULL,
    "value" TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS "languages" (
    "id" INTEGER PRIMARY KEY AUTOINCREMENT,
    "acronym" TEXT NOT NULL UNIQUE CHECK (length("acronym") > 0)
);

CREATE TABLE IF NOT EXISTS "mistakes" (
    "id" INTEGER PRIMARY KEY AUTOINCREMENT,
    "name" TEXT NOT NULL UNIQUE,
    "count" INTEGER NOT NULL DEFAULT 0 CHECK ("count" >= 0),
    "language_id" INTEGER NOT NULL REFERENCES "languages" ("id")
);

CREATE TABLE IF NOT EXISTS "users" (
    "id" INTEGER PRIMARY KEY AUTOINCREMENT,
    "email" TEXT NOT NULL UNIQUE,
    "name" TEXT NOT NULL,
    "surname" TEXT NOT NULL,
    "age" INTEGER NOT NULL CHECK ("age" >= 0),
    "password_hash" TEXT NOT NULL,
    "token" TEXT UNIQUE,
    "created_at" INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS "association" (
    "user_id" INTEGER NOT NULL REFERENCES "users" ("id") ON DELETE CASCADE,
    "mistake_id" INTEGER NOT NULL REFERENCES "mistakes" ("id"),
    "count" INTEGER NOT NULL DEFAULT 0 CHECK ("count" >= 0),
    PRIMARY KEY ("user_id", "mistake_id")
);

CREATE TABLE IF NOT EXISTS "sessions" (
    "token_hash" TEXT PRIMARY KEY NOT NULL,
    "user_id" INTEGER NOT NULL REFERENCES "users" ("id") ON DELETE CASCADE,
    "expires_at" INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS "idx_mistakes_language" ON "mistakes" ("language_id");
CREATE INDEX IF NOT EXISTS "idx_sessions_user" ON "sessions" ("user_id");
"#;

pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_single_quote = false;
    let mut in_double_quote = false;

    for ch in sql.chars() {
        match ch {
            '\'' if !in_double_quote => in_single_quote = !in_single_quote,
            '"' if !in_single_quote => in_double_quote = !in_double_quote,
            ';' if !in_single_quote && !in_double_quote => {
                let stmt = current.trim();
                if !stmt.is_empty() {
                    statements.push(stmt.to_string());
                }
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }

    let tail = current.trim();
    if !tail.is_empty() {
        statements.push(tail.to_string());
    }

    statements
}

pub async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for stmt in split_sql_statements(SCHEMA_SQL) {
        let sql: String = stmt
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let trimmed = sql.trim();
        if trimmed.is_empty() {
            continue;
        }
        sqlx::query(trimmed).execute(pool).await?;
    }

    sqlx::query(r#"INSERT OR REPLACE INTO "_db_metadata" ("key", "value") VALUES ('schema_version', ?1)"#)
        .bind(SCHEMA_VERSION)
        .execute(pool)
        .await?;

    Ok(())
}
