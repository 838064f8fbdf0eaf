use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::error::{AppError, Result};

const SCHEMA: &str = include_str!("../../../resources/schema.sql");

const SCHEMA_VERSION: i32 = 1;

/// Open (creating if missing) the analytics database and ensure the schema
/// is applied. Schema versioning uses PRAGMA user_version; a database newer
/// than this binary expects fails fast.
pub async fn init_db(db_path: &Path) -> Result<SqlitePool> {
    let pool = connect_pool(db_path).await?;

    let version = read_user_version(&pool).await?;
    if version > SCHEMA_VERSION {
        return Err(AppError::DatabaseError(format!(
            "Database schema too new: db user_version={} > supported_version={}",
            version, SCHEMA_VERSION
        )));
    }

    apply_schema(&pool).await?;
    set_user_version(&pool, SCHEMA_VERSION).await?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Database health check failed: {e}")))?;

    Ok(pool)
}

pub async fn connect_pool(db_path: &Path) -> Result<SqlitePool> {
    let db_url = db_path_to_url(db_path)?;
    let options = SqliteConnectOptions::from_str(&db_url)
        .map_err(|e| AppError::DatabaseError(format!("Failed to parse database URL: {e}")))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(4)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to connect to database: {e}")))
}

/// Apply the bundled schema additively (CREATE IF NOT EXISTS throughout).
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    for stmt in split_sql_statements(SCHEMA) {
        let sql = stmt.trim();
        if sql.is_empty() {
            continue;
        }
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to apply schema statement: {e}")))?;
    }
    Ok(())
}

fn db_path_to_url(db_path: &Path) -> Result<String> {
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| AppError::DatabaseError("Database path is not valid UTF-8".to_string()))?;
    Ok(format!("sqlite://{}", db_path_str.replace('\\', "/")))
}

async fn read_user_version(pool: &SqlitePool) -> Result<i32> {
    sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to read PRAGMA user_version: {e}")))
}

async fn set_user_version(pool: &SqlitePool, version: i32) -> Result<()> {
    let sql = format!("PRAGMA user_version = {}", version);
    sqlx::query(&sql)
        .execute(pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to set PRAGMA user_version: {e}")))?;
    Ok(())
}

/// Split schema SQL on semicolons, ignoring semicolons inside quotes and
/// line comments. The schema has no triggers, so no block tracking needed.
fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut buf = String::new();

    let mut in_single = false;
    let mut in_double = false;
    let mut in_line_comment = false;

    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        if in_line_comment {
            buf.push(c);
            if c == '\n' {
                in_line_comment = false;
            }
            continue;
        }

        if !in_single && !in_double && c == '-' && chars.peek() == Some(&'-') {
            buf.push(c);
            in_line_comment = true;
            continue;
        }

        if c == '\'' && !in_double {
            in_single = !in_single;
        } else if c == '"' && !in_single {
            in_double = !in_double;
        }

        if c == ';' && !in_single && !in_double {
            buf.push(c);
            out.push(buf.clone());
            buf.clear();
            continue;
        }

        buf.push(c);
    }

    if !buf.trim().is_empty() {
        out.push(buf);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_statements_outside_quotes() {
        let sql = "CREATE TABLE t (a TEXT DEFAULT 'x;y');\n-- comment; still comment\nCREATE INDEX i ON t(a);";
        let stmts = split_sql_statements(sql);
        assert_eq!(stmts.len(), 2);
        assert!(stmts[0].contains("'x;y'"));
        assert!(stmts[1].contains("CREATE INDEX"));
    }

    #[test]
    fn bundled_schema_has_table_view_and_indexes() {
        let stmts = split_sql_statements(SCHEMA);
        let joined = stmts.join(" ");
        assert!(joined.contains("CREATE TABLE IF NOT EXISTS orders"));
        assert!(joined.contains("CREATE VIEW IF NOT EXISTS order_summary"));
        assert!(joined.contains("idx_orders_year_month"));
    }
}
