use rusqlite::{params, OptionalExtension};
use serde_json::Value;

use crate::db::DbPool;
use crate::error::AppError;

/// Read the JSON document stored under `key`. Returns None if the key was never written.
///
/// A row whose text no longer parses is reported as `AppError::Serde` rather
/// than read as empty, so a corrupt collection is never silently overwritten.
pub fn get_document(pool: &DbPool, key: &str) -> Result<Option<Value>, AppError> {
    let conn = pool.get()?;
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;

    raw.map(|text| serde_json::from_str(&text))
        .transpose()
        .map_err(AppError::from)
}

/// Replace the document under `key` with `value`, stamping `updated_at`.
pub fn put_document(pool: &DbPool, key: &str, value: &Value) -> Result<(), AppError> {
    let text = serde_json::to_string(value)?;
    let now = chrono::Utc::now().to_rfc3339();
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO kv_store (key, value, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, text, now],
    )?;
    Ok(())
}
