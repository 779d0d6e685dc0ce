use crate::db::Db;
use crate::error::AppError;
use crate::services::content as service;
use ntex::web::{self, HttpResponse};
use std::sync::Arc;

pub async fn get_content(
    db: web::types::State<Arc<Db>>,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let list = service::list_content(&db, &path)?;
    Ok(HttpResponse::Ok().json(&list))
}
