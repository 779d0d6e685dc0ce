use crate::db::Db;
use crate::error::AppError;
use crate::services::decks as service;
use crate::validation;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn get_latest_deck(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = validation::validate_user_id_param(&path).map_err(AppError::Validation)?;
    let deck = service::latest_deck(&db, &user_id)?;
    Ok(HttpResponse::Ok().json(&deck))
}
