use crate::db::{timestamp, Db};
use crate::error::AppError;
use crate::models::player::{PlayerProfile, ProfileUpsert};
use rusqlite::params;
use uuid::Uuid;

fn fetch_profile(db: &Db, user_id: &str) -> Result<PlayerProfile, AppError> {
    let result = db.with_conn(|conn| {
        conn.query_row(
            "SELECT user_id, nickname, best_score, best_run_id,
                    platform, platform_user_id, app_version, avatar_id,
                    first_seen, last_seen
             FROM players WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok(PlayerProfile {
                    user_id: row.get(0)?,
                    nickname: row.get(1)?,
                    best_score: row.get(2)?,
                    best_run_id: row.get(3)?,
                    platform: row.get(4)?,
                    platform_user_id: row.get(5)?,
                    app_version: row.get(6)?,
                    avatar_id: row.get(7)?,
                    first_seen: row.get(8)?,
                    last_seen: row.get(9)?,
                })
            },
        )
    });

    match result {
        Ok(profile) => Ok(profile),
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            Err(AppError::NotFound(format!("player {user_id}")))
        }
        Err(e) => Err(AppError::from(e)),
    }
}

pub fn get_profile(db: &Db, user_id: &str) -> Result<PlayerProfile, AppError> {
    fetch_profile(db, user_id)
}

/// Creates or refreshes a player profile. Best score and best run are owned
/// by the ingestion path and are never written here; absent metadata fields
/// keep their stored values.
pub fn upsert_profile(
    db: &Db,
    user_id: &str,
    upsert: ProfileUpsert,
) -> Result<PlayerProfile, AppError> {
    let now = timestamp();
    let player_id = Uuid::new_v4().to_string();

    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO players (id, user_id, nickname, best_score,
                 platform, platform_user_id, app_version, avatar_id,
                 first_seen, last_seen)
             VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6, ?7, ?8, ?8)
             ON CONFLICT(user_id) DO UPDATE SET
                 nickname = excluded.nickname,
                 platform = COALESCE(excluded.platform, players.platform),
                 platform_user_id = COALESCE(excluded.platform_user_id, players.platform_user_id),
                 app_version = COALESCE(excluded.app_version, players.app_version),
                 avatar_id = COALESCE(excluded.avatar_id, players.avatar_id),
                 last_seen = excluded.last_seen",
            params![
                player_id,
                user_id,
                upsert.nickname,
                upsert.platform,
                upsert.platform_user_id,
                upsert.app_version,
                upsert.avatar_id,
                now,
            ],
        )
    })?;

    fetch_profile(db, user_id)
}
