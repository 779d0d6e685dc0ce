mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;
mod validation;

use config::Config;
use db::Db;
use ntex::web;
use ntex_cors::Cors;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[ntex::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let db = Arc::new(
        Db::open(&config.database_path, config.busy_timeout_ms)
            .expect("failed to open database"),
    );
    services::content::seed_content(&db).expect("failed to seed content tables");

    tracing::info!(
        "umbral-spire server starting on {}:{}",
        config.host,
        config.port
    );

    let bind_addr = format!("{}:{}", config.host, config.port);
    let app_config = config.clone();
    web::HttpServer::new(move || {
        web::App::new()
            .state(db.clone())
            .state(app_config.clone())
            .wrap(
                Cors::new()
                    .allowed_origin("*")
                    .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
                    .allowed_headers(vec!["Content-Type"])
                    .max_age(3600)
                    .finish(),
            )
            .route("/health", web::get().to(health))
            .route("/submit-run", web::post().to(handlers::runs::submit_run))
            .route(
                "/leaderboard",
                web::get().to(handlers::leaderboard::get_leaderboard),
            )
            .route(
                "/players/{user_id}",
                web::get().to(handlers::players::get_player),
            )
            .route(
                "/players/{user_id}",
                web::put().to(handlers::players::put_player),
            )
            .route(
                "/players/{user_id}/latest-deck",
                web::get().to(handlers::decks::get_latest_deck),
            )
            .route(
                "/content/{content_type}",
                web::get().to(handlers::content::get_content),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}

async fn health() -> web::HttpResponse {
    web::HttpResponse::Ok().json(&serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::ingest::SubmitOutcome;
    use rusqlite::params;
    use serde_json::{json, Value};

    fn test_db() -> Db {
        Db::open_in_memory().expect("in-memory database")
    }

    fn run_payload(user_id: &str, nickname: &str, score: i64, run_seed: i64, result: &str) -> Value {
        json!({
            "user_id": user_id,
            "nickname": nickname,
            "score": score,
            "seed": format!("client-{run_seed}"),
            "run_seed": run_seed,
            "run_time_ms": 15 * 60 * 1000,
            "version": "1.4.2",
            "current_floor": 12,
            "start_class": "titan",
            "start_deck": [{"card_id": 1}, {"card_id": 2}],
            "start_relics": [{"relic_id": 1}],
            "end_class": "titan",
            "end_deck": [{"card_id": 1}, {"card_id": 2}, {"card_id": 11}],
            "end_relics": [{"relic_id": 1}, {"relic_id": 5}],
            "floor_events": [{"floor": 1, "event": "battle"}],
            "nodes_state": {"current_floor": 12, "visited_nodes": 15},
            "run_result": result,
        })
    }

    fn submit_with_capacity(db: &Db, payload: &Value, capacity: usize) -> SubmitOutcome {
        let sub = validation::validate_run_payload(payload).expect("payload should validate");
        services::ingest::submit_run(db, sub, capacity).expect("submission should succeed")
    }

    fn submit(db: &Db, payload: &Value) -> SubmitOutcome {
        submit_with_capacity(db, payload, 100)
    }

    fn count_rows(db: &Db, table: &str) -> i64 {
        db.with_conn(|conn| {
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })
        })
        .unwrap()
    }

    #[test]
    fn test_db_open_in_memory() {
        let db = test_db();
        db.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table'
                 AND name IN ('players', 'runs', 'leaderboard', 'content_versions', 'content_items')",
                [],
                |row| row.get(0),
            )?;
            assert_eq!(count, 5);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_submit_and_query_leaderboard() {
        let db = test_db();
        let outcome = submit(&db, &run_payload("U1", "Marcos", 350, 930003, "victory"));
        assert!(outcome.created);
        assert_eq!(outcome.best_score, 350);

        let page = services::leaderboard::get_leaderboard(&db, Some(10)).unwrap();
        assert_eq!(page.items.len(), 1);
        let item = &page.items[0];
        assert_eq!(item.rank, 1);
        assert_eq!(item.run_id, outcome.run_id);
        assert_eq!(item.nickname, "Marcos");
        assert_eq!(item.score, 350);
        assert_eq!(item.current_floor, Some(12));
        assert_eq!(item.run_result, Some(models::run::RunResult::Victory));
        assert_eq!(item.end_deck.as_ref().unwrap().as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_resubmission_is_idempotent() {
        let db = test_db();
        let first = submit(&db, &run_payload("U1", "Marcos", 350, 930003, "victory"));
        let replay = submit(&db, &run_payload("U1", "Marcos", 350, 930003, "victory"));

        assert!(!replay.created);
        assert_eq!(replay.run_id, first.run_id);
        assert_eq!(replay.best_score, 350);
        assert_eq!(count_rows(&db, "runs"), 1);
        assert_eq!(count_rows(&db, "leaderboard"), 1);
    }

    #[test]
    fn test_same_seed_different_result_is_a_new_run() {
        let db = test_db();
        let defeat = submit(&db, &run_payload("U1", "Marcos", 110, 930001, "defeat"));
        let victory = submit(&db, &run_payload("U1", "Marcos", 230, 930001, "victory"));
        assert!(victory.created);
        assert_ne!(victory.run_id, defeat.run_id);
        assert_eq!(count_rows(&db, "runs"), 2);
    }

    #[test]
    fn test_best_score_tracks_maximum() {
        let db = test_db();
        let a = submit(&db, &run_payload("U1", "Juan", 100, 5, "defeat"));
        assert_eq!(a.best_score, 100);

        let b = submit(&db, &run_payload("U1", "Juan", 80, 6, "victory"));
        assert!(b.created);
        assert_eq!(b.best_score, 100);

        let replay = submit(&db, &run_payload("U1", "Juan", 100, 5, "defeat"));
        assert!(!replay.created);
        assert_eq!(replay.run_id, a.run_id);
        assert_eq!(replay.best_score, 100);

        let c = submit(&db, &run_payload("U1", "Juan", 120, 7, "victory"));
        assert_eq!(c.best_score, 120);

        let profile = services::players::get_profile(&db, "U1").unwrap();
        assert_eq!(profile.best_score, 120);
        assert_eq!(profile.best_run_id.as_deref(), Some(c.run_id.as_str()));
    }

    #[test]
    fn test_leaderboard_stays_bounded() {
        let db = test_db();
        let scores = [300, 100, 500, 200, 400];
        for (index, score) in scores.iter().enumerate() {
            let user = format!("U{index}");
            submit_with_capacity(
                &db,
                &run_payload(&user, "Crawler", *score, index as i64, "defeat"),
                3,
            );
        }

        assert_eq!(count_rows(&db, "leaderboard"), 3);
        let page = services::leaderboard::get_leaderboard(&db, None).unwrap();
        let surviving: Vec<i64> = page.items.iter().map(|item| item.score).collect();
        assert_eq!(surviving, vec![500, 400, 300]);
        assert_eq!(
            page.items.iter().map(|item| item.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_eviction_keeps_earlier_entries_on_ties() {
        let db = test_db();
        let first = submit_with_capacity(&db, &run_payload("U1", "AAA", 100, 1, "defeat"), 2);
        let second = submit_with_capacity(&db, &run_payload("U2", "BBB", 100, 2, "defeat"), 2);
        submit_with_capacity(&db, &run_payload("U3", "CCC", 100, 3, "defeat"), 2);

        let page = services::leaderboard::get_leaderboard(&db, None).unwrap();
        let run_ids: Vec<&str> = page.items.iter().map(|item| item.run_id.as_str()).collect();
        assert_eq!(run_ids, vec![first.run_id.as_str(), second.run_id.as_str()]);
    }

    #[test]
    fn test_dangling_leaderboard_entry_degrades() {
        let db = test_db();
        let kept = submit(&db, &run_payload("U1", "Juan", 300, 1, "defeat"));
        let removed = submit(&db, &run_payload("U2", "Pedro", 200, 2, "defeat"));

        db.with_conn(|conn| {
            conn.execute("DELETE FROM runs WHERE id = ?1", params![removed.run_id])
        })
        .unwrap();

        let page = services::leaderboard::get_leaderboard(&db, None).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].run_id, kept.run_id);
        assert!(page.items[0].current_floor.is_some());
        assert_eq!(page.items[1].run_id, removed.run_id);
        assert!(page.items[1].current_floor.is_none());
        assert!(page.items[1].end_deck.is_none());
    }

    #[test]
    fn test_latest_deck_prefers_best_run() {
        let db = test_db();
        let best = submit(&db, &run_payload("U1", "Juan", 330, 910003, "victory"));
        submit(&db, &run_payload("U1", "Juan", 120, 910001, "defeat"));

        let deck = services::decks::latest_deck(&db, "U1").unwrap();
        assert_eq!(deck.source_run_id.as_deref(), Some(best.run_id.as_str()));
        assert_eq!(deck.deck.len(), 3);
        assert_eq!(deck.relics.len(), 2);
    }

    #[test]
    fn test_latest_deck_falls_back_to_recent_runs() {
        let db = test_db();
        let older = submit(&db, &run_payload("U1", "Juan", 100, 2, "defeat"));

        let mut empty_best = run_payload("U1", "Juan", 500, 1, "victory");
        empty_best["end_deck"] = json!([]);
        empty_best["end_relics"] = json!([]);
        submit(&db, &empty_best);

        let deck = services::decks::latest_deck(&db, "U1").unwrap();
        assert_eq!(deck.source_run_id.as_deref(), Some(older.run_id.as_str()));
        assert_eq!(deck.deck.len(), 3);
    }

    #[test]
    fn test_latest_deck_unwraps_nested_collections() {
        let db = test_db();
        let mut payload = run_payload("U1", "Juan", 200, 1, "victory");
        payload["end_deck"] = json!({"cards": [{"card_id": 1}, {"card_id": 2}]});
        payload["end_relics"] = json!({"items": [{"relic_id": 5}]});
        submit(&db, &payload);

        let deck = services::decks::latest_deck(&db, "U1").unwrap();
        assert_eq!(deck.deck.len(), 2);
        assert_eq!(deck.relics.len(), 1);
    }

    #[test]
    fn test_latest_deck_empty_vs_missing_player() {
        let db = test_db();
        let upsert = validation::validate_profile_payload(&json!({"nickname": "Pedro_7"})).unwrap();
        services::players::upsert_profile(&db, "U9", upsert).unwrap();

        let deck = services::decks::latest_deck(&db, "U9").unwrap();
        assert!(deck.source_run_id.is_none());
        assert!(deck.deck.is_empty());
        assert!(deck.relics.is_empty());

        let missing = services::decks::latest_deck(&db, "nobody");
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_profile_upsert_never_touches_best_score() {
        let db = test_db();
        submit(&db, &run_payload("U1", "Juan", 330, 910003, "victory"));

        let upsert = validation::validate_profile_payload(&json!({
            "nickname": "Juan_Renamed",
            "platform": "steam",
        }))
        .unwrap();
        let profile = services::players::upsert_profile(&db, "U1", upsert).unwrap();
        assert_eq!(profile.nickname, "Juan_Renamed");
        assert_eq!(profile.platform.as_deref(), Some("steam"));
        assert_eq!(profile.best_score, 330);
        assert!(profile.best_run_id.is_some());

        // Absent metadata stays put on the next upsert.
        let upsert = validation::validate_profile_payload(&json!({"nickname": "Juan_Again"})).unwrap();
        let profile = services::players::upsert_profile(&db, "U1", upsert).unwrap();
        assert_eq!(profile.platform.as_deref(), Some("steam"));
    }

    #[test]
    fn test_get_profile_missing_player() {
        let db = test_db();
        let result = services::players::get_profile(&db, "ghost");
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_content_seeding_is_idempotent() {
        let db = test_db();
        services::content::seed_content(&db).unwrap();
        let versions = count_rows(&db, "content_versions");
        let items = count_rows(&db, "content_items");
        assert_eq!(versions, 3);
        assert!(items > 0);

        services::content::seed_content(&db).unwrap();
        assert_eq!(count_rows(&db, "content_versions"), versions);
        assert_eq!(count_rows(&db, "content_items"), items);

        let cards = services::content::list_content(&db, "cards").unwrap();
        assert_eq!(cards.version, "v1");
        assert_eq!(cards.checksum_sha256.len(), 64);
        assert!(!cards.items.is_empty());

        let unknown = services::content::list_content(&db, "omens");
        assert!(matches!(unknown, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_schema_version_gate() {
        let path = std::env::temp_dir().join(format!("umbral-spire-test-{}.db", uuid::Uuid::new_v4()));
        let path_str = path.to_str().unwrap().to_string();
        {
            let conn = rusqlite::Connection::open(&path_str).unwrap();
            conn.execute_batch("PRAGMA user_version = 99;").unwrap();
        }

        let result = Db::open(&path_str, 5000);
        assert!(matches!(result, Err(AppError::Migration(_))));

        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{path_str}{suffix}"));
        }
    }
}
