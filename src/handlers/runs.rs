use crate::config::Config;
use crate::db::Db;
use crate::error::AppError;
use crate::models::run::SubmitResponse;
use crate::services::ingest;
use crate::validation;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn submit_run(
    db: web::types::State<Arc<Db>>,
    config: web::types::State<Config>,
    body: web::types::Json<serde_json::Value>,
) -> Result<HttpResponse, AppError> {
    let submission = validation::validate_run_payload(&body).map_err(AppError::Validation)?;
    let outcome = ingest::submit_run(&db, submission, config.leaderboard_capacity)?;
    let response = SubmitResponse {
        run_id: outcome.run_id,
        best_score: outcome.best_score,
    };
    if outcome.created {
        Ok(HttpResponse::Created().json(&response))
    } else {
        Ok(HttpResponse::Ok().json(&response))
    }
}
