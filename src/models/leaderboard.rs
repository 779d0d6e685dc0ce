use crate::models::run::RunResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
}

/// One ranked row. The run-detail fields are null when the referenced run
/// no longer exists.
#[derive(Debug, Serialize)]
pub struct LeaderboardItem {
    pub rank: i64,
    pub run_id: String,
    pub user_id: String,
    pub nickname: String,
    pub score: i64,
    pub created_at: String,
    pub current_floor: Option<i64>,
    pub run_result: Option<RunResult>,
    pub end_deck: Option<Value>,
    pub end_relics: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardPage {
    pub items: Vec<LeaderboardItem>,
}
