use serde::Serialize;
use serde_json::Value;

/// The "current deck" view for a player. `source_run_id` is null when the
/// player exists but no run has a usable deck or relic collection yet.
#[derive(Debug, Serialize)]
pub struct LatestDeck {
    pub user_id: String,
    pub source_run_id: Option<String>,
    pub deck: Vec<Value>,
    pub relics: Vec<Value>,
}
