use crate::db::{timestamp, Db};
use crate::error::AppError;
use crate::models::run::RunSubmission;
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

#[derive(Debug)]
pub struct SubmitOutcome {
    pub run_id: String,
    pub best_score: i64,
    /// False when the submission matched an existing (player, run_seed,
    /// run_result) tuple and no rows were created.
    pub created: bool,
}

/// Applies a validated submission in one all-or-nothing transaction:
/// player upsert, resubmission check, run + leaderboard inserts, capacity
/// eviction, best-score update. Safe to retry: a replayed submission
/// returns the original run id.
pub fn submit_run(
    db: &Db,
    sub: RunSubmission,
    leaderboard_capacity: usize,
) -> Result<SubmitOutcome, AppError> {
    let now = timestamp();
    let new_run_id = Uuid::new_v4().to_string();
    let new_player_id = Uuid::new_v4().to_string();

    db.with_tx(|tx| {
        tx.execute(
            "INSERT INTO players (id, user_id, nickname, best_score, first_seen, last_seen)
             VALUES (?1, ?2, ?3, 0, ?4, ?4)
             ON CONFLICT(user_id) DO UPDATE SET
                 nickname = excluded.nickname,
                 last_seen = excluded.last_seen",
            params![new_player_id, sub.user_id, sub.nickname, now],
        )?;
        let (player_id, prior_best): (String, i64) = tx.query_row(
            "SELECT id, best_score FROM players WHERE user_id = ?1",
            params![sub.user_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        // Resubmission of the same (player, run_seed, result) tuple returns
        // the original run and creates nothing.
        let existing: Option<String> = tx
            .query_row(
                "SELECT id FROM runs
                 WHERE player_id = ?1 AND run_seed = ?2 AND run_result = ?3",
                params![player_id, sub.run_seed, sub.run_result.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(run_id) = existing {
            return Ok(SubmitOutcome {
                run_id,
                best_score: prior_best,
                created: false,
            });
        }

        tx.execute(
            "INSERT INTO runs (id, player_id, user_id, nickname_snapshot, score, seed,
                 run_seed, run_time_ms, version, current_floor,
                 start_class, start_deck, start_relics,
                 end_class, end_deck, end_relics,
                 floor_events, nodes_state, run_result,
                 inputs_hash, proof_hash, flags, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                 ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23)",
            params![
                new_run_id,
                player_id,
                sub.user_id,
                sub.nickname,
                sub.score,
                sub.seed,
                sub.run_seed,
                sub.run_time_ms,
                sub.version,
                sub.current_floor,
                sub.start_class.as_str(),
                sub.start_deck.to_string(),
                sub.start_relics.to_string(),
                sub.end_class.as_str(),
                sub.end_deck.to_string(),
                sub.end_relics.to_string(),
                sub.floor_events.to_string(),
                sub.nodes_state.to_string(),
                sub.run_result.as_str(),
                sub.inputs_hash,
                sub.proof_hash,
                sub.flags.as_ref().map(|f| f.to_string()),
                now,
            ],
        )?;

        tx.execute(
            "INSERT INTO leaderboard (run_id, player_id, user_id, nickname, score, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![new_run_id, player_id, sub.user_id, sub.nickname, sub.score, now],
        )?;

        // Keep only the top entries; overflow is removed in rank order.
        tx.execute(
            "DELETE FROM leaderboard WHERE id IN (
                 SELECT id FROM leaderboard
                 ORDER BY score DESC, created_at ASC, id ASC
                 LIMIT -1 OFFSET ?1)",
            params![leaderboard_capacity as i64],
        )?;

        // Best score is compared against the value read in this same
        // transaction, so concurrent submissions cannot lose an update.
        if sub.score > prior_best {
            tx.execute(
                "UPDATE players SET best_score = ?1, best_run_id = ?2 WHERE id = ?3",
                params![sub.score, new_run_id, player_id],
            )?;
        }

        Ok(SubmitOutcome {
            run_id: new_run_id.clone(),
            best_score: prior_best.max(sub.score),
            created: true,
        })
    })
}
