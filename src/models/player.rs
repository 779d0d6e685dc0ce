use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PlayerProfile {
    pub user_id: String,
    pub nickname: String,
    pub best_score: i64,
    pub best_run_id: Option<String>,
    pub platform: Option<String>,
    pub platform_user_id: Option<String>,
    pub app_version: Option<String>,
    pub avatar_id: Option<String>,
    pub first_seen: String,
    pub last_seen: String,
}

/// Validated profile upsert. Absent metadata fields leave stored values
/// untouched; best score and best run are never written through this path.
#[derive(Debug)]
pub struct ProfileUpsert {
    pub nickname: String,
    pub platform: Option<String>,
    pub platform_user_id: Option<String>,
    pub app_version: Option<String>,
    pub avatar_id: Option<String>,
}
