use crate::db::{timestamp, Db};
use crate::error::AppError;
use crate::models::content::ContentList;
use rusqlite::{params, OptionalExtension};
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

const CARDS_JSON: &str = include_str!("../content/cards.json");
const RELICS_JSON: &str = include_str!("../content/relics.json");
const EVENTS_JSON: &str = include_str!("../content/events.json");

const EMBEDDED: &[(&str, &str)] = &[
    ("cards", CARDS_JSON),
    ("relics", RELICS_JSON),
    ("events", EVENTS_JSON),
];

fn checksum(payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Seeds the embedded content tables on first start. A content type that
/// already has an active version is left alone, so redeploys do not touch
/// live rows.
pub fn seed_content(db: &Db) -> Result<(), AppError> {
    let now = timestamp();
    db.with_tx(|tx| {
        for (content_type, payload) in EMBEDDED {
            let active: Option<String> = tx
                .query_row(
                    "SELECT id FROM content_versions
                     WHERE content_type = ?1 AND is_active = 1",
                    params![content_type],
                    |row| row.get(0),
                )
                .optional()?;
            if active.is_some() {
                continue;
            }

            let items: Vec<Value> = serde_json::from_str(payload).map_err(|e| {
                AppError::Internal(format!("embedded {content_type} payload: {e}"))
            })?;

            let version_id = Uuid::new_v4().to_string();
            tx.execute(
                "INSERT INTO content_versions
                     (id, content_type, version, checksum_sha256, is_active, created_at)
                 VALUES (?1, ?2, 'v1', ?3, 1, ?4)",
                params![version_id, content_type, checksum(payload), now],
            )?;
            for item in &items {
                let item_id = item.get("id").and_then(Value::as_i64).unwrap_or(0);
                tx.execute(
                    "INSERT INTO content_items (content_version_id, item_id, data)
                     VALUES (?1, ?2, ?3)",
                    params![version_id, item_id, item.to_string()],
                )?;
            }
        }
        Ok(())
    })
}

/// Pass-through read of the active version's rows for one content type.
pub fn list_content(db: &Db, content_type: &str) -> Result<ContentList, AppError> {
    if !EMBEDDED.iter().any(|(name, _)| *name == content_type) {
        return Err(AppError::NotFound(format!("content type {content_type}")));
    }

    let version: Option<(String, String, String)> = db.with_conn(|conn| {
        conn.query_row(
            "SELECT id, version, checksum_sha256 FROM content_versions
             WHERE content_type = ?1 AND is_active = 1",
            params![content_type],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()
    })?;
    let (version_id, version, checksum_sha256) = match version {
        Some(found) => found,
        None => {
            return Err(AppError::NotFound(format!(
                "no active {content_type} version"
            )))
        }
    };

    let raw_items: Vec<String> = db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT data FROM content_items
             WHERE content_version_id = ?1
             ORDER BY item_id ASC",
        )?;
        let rows = stmt.query_map(params![version_id], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>()
    })?;

    let items = raw_items
        .iter()
        .map(|raw| serde_json::from_str(raw).unwrap_or(Value::Null))
        .collect();

    Ok(ContentList {
        content_type: content_type.to_string(),
        version,
        checksum_sha256,
        items,
    })
}
