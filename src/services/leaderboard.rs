use crate::db::Db;
use crate::error::AppError;
use crate::models::leaderboard::{LeaderboardItem, LeaderboardPage};
use crate::models::run::RunResult;
use rusqlite::params;
use serde_json::Value;

pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 200;

fn parse_stored_json(raw: Option<String>) -> Option<Value> {
    raw.as_deref().and_then(|s| serde_json::from_str(s).ok())
}

/// Ranked view of accepted runs. Entries whose run row has been removed
/// independently still rank; their run detail comes back null.
pub fn get_leaderboard(db: &Db, limit: Option<i64>) -> Result<LeaderboardPage, AppError> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT).max(1);

    let mut items = db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT lb.run_id, lb.user_id, lb.nickname, lb.score, lb.created_at,
                    r.current_floor, r.run_result, r.end_deck, r.end_relics
             FROM leaderboard lb
             LEFT JOIN runs r ON r.id = lb.run_id
             ORDER BY lb.score DESC, lb.created_at ASC, lb.id ASC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(LeaderboardItem {
                rank: 0,
                run_id: row.get(0)?,
                user_id: row.get(1)?,
                nickname: row.get(2)?,
                score: row.get(3)?,
                created_at: row.get(4)?,
                current_floor: row.get(5)?,
                run_result: row
                    .get::<_, Option<String>>(6)?
                    .as_deref()
                    .and_then(RunResult::parse),
                end_deck: parse_stored_json(row.get(7)?),
                end_relics: parse_stored_json(row.get(8)?),
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>()
    })?;

    for (index, item) in items.iter_mut().enumerate() {
        item.rank = index as i64 + 1;
    }

    Ok(LeaderboardPage { items })
}
