use crate::db::Db;
use crate::error::AppError;
use crate::models::deck::LatestDeck;
use rusqlite::{params, OptionalExtension};
use serde_json::Value;

/// How many of the player's newest runs the fallback scan inspects.
const RECENT_RUN_SCAN: i64 = 10;

const DECK_KEYS: &[&str] = &["deck", "cards", "list"];
const RELIC_KEYS: &[&str] = &["relics", "items", "list"];

/// Clients store collections either as a plain array or nested in an object
/// under one of a few known keys. Anything else flattens to empty.
fn normalize_collection(value: &Value, keys: &[&str]) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Object(map) => {
            for key in keys {
                if let Some(Value::Array(items)) = map.get(*key) {
                    return items.clone();
                }
            }
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn stored_collections(deck_raw: &str, relics_raw: &str) -> (Vec<Value>, Vec<Value>) {
    let deck_value: Value = serde_json::from_str(deck_raw).unwrap_or(Value::Null);
    let relics_value: Value = serde_json::from_str(relics_raw).unwrap_or(Value::Null);
    (
        normalize_collection(&deck_value, DECK_KEYS),
        normalize_collection(&relics_value, RELIC_KEYS),
    )
}

/// Resolves the deck/relic snapshot to display for a player: the best run
/// when it has anything, otherwise the newest recent run with a non-empty
/// collection, otherwise an explicit empty result. Unknown players are a
/// not-found, distinct from "no deck yet".
pub fn latest_deck(db: &Db, user_id: &str) -> Result<LatestDeck, AppError> {
    let player: Option<(String, Option<String>)> = db
        .with_conn(|conn| {
            conn.query_row(
                "SELECT id, best_run_id FROM players WHERE user_id = ?1",
                params![user_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
        })?;
    let (player_id, best_run_id) = match player {
        Some(found) => found,
        None => return Err(AppError::NotFound(format!("player {user_id}"))),
    };

    if let Some(best_run_id) = best_run_id {
        let best: Option<(String, String)> = db.with_conn(|conn| {
            conn.query_row(
                "SELECT end_deck, end_relics FROM runs WHERE id = ?1",
                params![best_run_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
        })?;
        if let Some((deck_raw, relics_raw)) = best {
            let (deck, relics) = stored_collections(&deck_raw, &relics_raw);
            if !deck.is_empty() || !relics.is_empty() {
                return Ok(LatestDeck {
                    user_id: user_id.to_string(),
                    source_run_id: Some(best_run_id),
                    deck,
                    relics,
                });
            }
        }
    }

    let recent: Vec<(String, String, String)> = db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, end_deck, end_relics FROM runs
             WHERE player_id = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![player_id, RECENT_RUN_SCAN], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })?;
        rows.collect::<Result<Vec<_>, _>>()
    })?;

    for (run_id, deck_raw, relics_raw) in recent {
        let (deck, relics) = stored_collections(&deck_raw, &relics_raw);
        if !deck.is_empty() || !relics.is_empty() {
            return Ok(LatestDeck {
                user_id: user_id.to_string(),
                source_run_id: Some(run_id),
                deck,
                relics,
            });
        }
    }

    Ok(LatestDeck {
        user_id: user_id.to_string(),
        source_run_id: None,
        deck: Vec::new(),
        relics: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_arrays_pass_through() {
        let value = json!([{"card_id": 1}, {"card_id": 2}]);
        assert_eq!(normalize_collection(&value, DECK_KEYS).len(), 2);
    }

    #[test]
    fn recognized_wrapper_keys_unwrap() {
        for key in ["deck", "cards", "list"] {
            let value = json!({ key: [{"card_id": 7}] });
            assert_eq!(normalize_collection(&value, DECK_KEYS).len(), 1, "{key}");
        }
        for key in ["relics", "items", "list"] {
            let value = json!({ key: [{"relic_id": 3}] });
            assert_eq!(normalize_collection(&value, RELIC_KEYS).len(), 1, "{key}");
        }
    }

    #[test]
    fn unknown_shapes_flatten_to_empty() {
        assert!(normalize_collection(&json!({"other": [1]}), DECK_KEYS).is_empty());
        assert!(normalize_collection(&json!({"deck": {"nested": 1}}), DECK_KEYS).is_empty());
        assert!(normalize_collection(&json!(42), DECK_KEYS).is_empty());
        assert!(normalize_collection(&Value::Null, DECK_KEYS).is_empty());
    }
}
