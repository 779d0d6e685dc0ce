use crate::db::Db;
use crate::error::AppError;
use crate::models::leaderboard::LeaderboardQuery;
use crate::services::leaderboard as service;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn get_leaderboard(
    db: web::types::State<Arc<Db>>,
    query: web::types::Query<LeaderboardQuery>,
) -> Result<HttpResponse, AppError> {
    let page = service::get_leaderboard(&db, query.limit)?;
    Ok(HttpResponse::Ok().json(&page))
}
