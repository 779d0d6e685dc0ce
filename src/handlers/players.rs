use crate::db::Db;
use crate::error::AppError;
use crate::services::players as service;
use crate::validation;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn get_player(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = validation::validate_user_id_param(&path).map_err(AppError::Validation)?;
    let profile = service::get_profile(&db, &user_id)?;
    Ok(HttpResponse::Ok().json(&profile))
}

pub async fn put_player(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<String>,
    body: web::types::Json<serde_json::Value>,
) -> Result<HttpResponse, AppError> {
    let user_id = validation::validate_user_id_param(&path).map_err(AppError::Validation)?;
    let upsert = validation::validate_profile_payload(&body).map_err(AppError::Validation)?;
    let profile = service::upsert_profile(&db, &user_id, upsert)?;
    Ok(HttpResponse::Ok().json(&profile))
}
